use shared::domain::UserRecord;

/// Read-only user listing. Always the same two records, in id order.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDirectory;

impl UserDirectory {
    pub fn list(&self) -> Vec<UserRecord> {
        seeded_users()
    }
}

pub fn seeded_users() -> Vec<UserRecord> {
    vec![
        UserRecord::new(1, "John Doe", "john@example.com", "Admin"),
        UserRecord::new(2, "Jane Smith", "jane@example.com", "User"),
    ]
}
