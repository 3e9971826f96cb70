//! User-visible feedback for dashboard actions

use serde::Serialize;

use crate::error::Error;

/// Inline message shown after an action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub success: bool,
    pub message: String,
}

impl Feedback {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(error: &Error) -> Self {
        Self {
            success: false,
            message: error.to_string(),
        }
    }
}

/// A successful action with the message to show and its result
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<T> {
    pub message: String,
    pub value: T,
}

impl<T> Accepted<T> {
    pub fn new(message: impl Into<String>, value: T) -> Self {
        Self {
            message: message.into(),
            value,
        }
    }

    pub fn feedback(&self) -> Feedback {
        Feedback::ok(self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_feedback_uses_display() {
        let feedback = Feedback::error(&Error::InvalidAmount);
        assert!(!feedback.success);
        assert_eq!(feedback.message, "Please enter a valid amount");
    }
}
