use shared::{domain::FormField, protocol::ViewState};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormSessionError {
    #[error("cannot edit '{field}' after the form was submitted; reset first")]
    EditWhileSubmitted { field: FormField },
}

/// Form state for one user interaction.
///
/// Values are stored exactly as received. Nothing here checks that a field is
/// non-empty or that `email` looks like an address: `submit` is accepted from
/// any `Editing` state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSession {
    name: String,
    email: String,
    message: String,
    submitted: bool,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.submitted {
            Phase::Submitted
        } else {
            Phase::Editing
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn edit_field(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), FormSessionError> {
        if self.submitted {
            return Err(FormSessionError::EditWhileSubmitted { field });
        }
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Message => &mut self.message,
        };
        *slot = value.into();
        Ok(())
    }

    pub fn submit(&mut self) {
        self.submitted = true;
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
        self.submitted = false;
    }

    pub fn current_view(&self) -> ViewState {
        match self.phase() {
            Phase::Editing => ViewState::Form {
                name: self.name.clone(),
                email: self.email.clone(),
                message: self.message.clone(),
            },
            Phase::Submitted => ViewState::ThankYou {
                name: self.name.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_form() -> ViewState {
        ViewState::Form {
            name: String::new(),
            email: String::new(),
            message: String::new(),
        }
    }

    #[test]
    fn fresh_session_shows_empty_form() {
        let session = FormSession::new();
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(session.name(), "");
        assert_eq!(session.email(), "");
        assert_eq!(session.message(), "");
        assert!(!session.is_submitted());
        assert_eq!(session.current_view(), empty_form());
    }

    #[test]
    fn edits_are_stored_verbatim() {
        let mut session = FormSession::new();
        for value in ["", "  padded  ", "MiXeD", "naïve ✓", "line\nbreak"] {
            session.edit_field(FormField::Name, value).expect("edit");
            match session.current_view() {
                ViewState::Form { name, .. } => assert_eq!(name, value),
                other => panic!("unexpected view {other:?}"),
            }
        }
    }

    #[test]
    fn each_field_is_written_independently() {
        let mut session = FormSession::new();
        session.edit_field(FormField::Email, "not an email").expect("edit");
        session.edit_field(FormField::Message, "hello").expect("edit");
        assert_eq!(
            session.current_view(),
            ViewState::Form {
                name: String::new(),
                email: "not an email".into(),
                message: "hello".into(),
            }
        );
    }

    #[test]
    fn submit_accepts_empty_fields() {
        let mut session = FormSession::new();
        session.submit();
        assert!(session.is_submitted());
        assert_eq!(
            session.current_view(),
            ViewState::ThankYou {
                name: String::new()
            }
        );
    }

    #[test]
    fn submit_twice_stays_submitted() {
        let mut session = FormSession::new();
        session.edit_field(FormField::Name, "Bo").expect("edit");
        session.submit();
        let once = session.clone();
        session.submit();
        assert_eq!(session, once);
        assert_eq!(session.phase(), Phase::Submitted);
    }

    #[test]
    fn edit_while_submitted_is_rejected_without_change() {
        let mut session = FormSession::new();
        session.edit_field(FormField::Name, "Alice").expect("edit");
        session.submit();
        let before = session.clone();

        let err = session
            .edit_field(FormField::Name, "Mallory")
            .expect_err("should reject");
        assert_eq!(
            err,
            FormSessionError::EditWhileSubmitted {
                field: FormField::Name
            }
        );
        assert_eq!(session, before);
    }

    #[test]
    fn reset_clears_everything_and_is_idempotent() {
        let mut session = FormSession::new();
        session.edit_field(FormField::Name, "Alice").expect("edit");
        session.edit_field(FormField::Email, "alice@x.com").expect("edit");
        session.edit_field(FormField::Message, "hi").expect("edit");
        session.submit();

        session.reset();
        assert_eq!(session, FormSession::new());
        session.reset();
        assert_eq!(session, FormSession::new());
        assert_eq!(session.current_view(), empty_form());
    }

    #[test]
    fn reset_from_editing_discards_draft() {
        let mut session = FormSession::new();
        session.edit_field(FormField::Message, "draft").expect("edit");
        session.reset();
        assert_eq!(session.current_view(), empty_form());
    }

    #[test]
    fn alice_round_trip() {
        let mut session = FormSession::new();
        session.edit_field(FormField::Name, "Alice").expect("edit");
        session.edit_field(FormField::Email, "alice@x.com").expect("edit");
        session.edit_field(FormField::Message, "hi").expect("edit");
        session.submit();
        assert_eq!(
            session.current_view(),
            ViewState::ThankYou {
                name: "Alice".into()
            }
        );
        session.reset();
        assert_eq!(session.current_view(), empty_form());
    }
}
