use serde::{Deserialize, Serialize};

use crate::domain::SessionId;

pub const THANK_YOU_HEADING: &str = "Thank you for your submission!";

/// What the rendering layer should show for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ViewState {
    Form {
        name: String,
        email: String,
        message: String,
    },
    ThankYou {
        name: String,
    },
}

impl ViewState {
    pub fn is_thank_you(&self) -> bool {
        matches!(self, ViewState::ThankYou { .. })
    }

    pub fn thank_you_heading(&self) -> Option<&'static str> {
        self.is_thank_you().then_some(THANK_YOU_HEADING)
    }

    /// The confirmation line shown under the heading, interpolating the name verbatim.
    pub fn confirmation(&self) -> Option<String> {
        match self {
            ViewState::ThankYou { name } => Some(format!("We received your message, {name}!")),
            ViewState::Form { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditFieldRequest {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
    pub view: ViewState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub view: ViewState,
}
