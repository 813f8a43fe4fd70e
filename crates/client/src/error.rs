//! Client-side action errors.

use thiserror::Error;

/// Why a toggle action did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// No signed-in user. The UI should prompt for sign-in.
    #[error("Sign in to continue")]
    Unauthenticated,

    /// The action is not allowed, e.g. following yourself.
    #[error("{0}")]
    InvalidOperation(String),

    /// The target no longer exists.
    #[error("{0}")]
    NotFound(String),

    /// Network or server failure.
    #[error("Something went wrong: {0}")]
    TransientFailure(String),
}

impl ActionError {
    /// Decode an API error code into a client error.
    #[must_use]
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "UNAUTHENTICATED" => Self::Unauthenticated,
            "INVALID_OPERATION" | "FORBIDDEN" | "VALIDATION_ERROR" | "CONFLICT" => {
                Self::InvalidOperation(message)
            }
            "NOT_FOUND" | "USER_NOT_FOUND" | "POST_NOT_FOUND" => Self::NotFound(message),
            _ => Self::TransientFailure(message),
        }
    }

    /// Network or server failure, as opposed to a rejected action.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFailure(_))
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        Self::TransientFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(
            ActionError::from_code("UNAUTHENTICATED", "x"),
            ActionError::Unauthenticated
        );
        assert_eq!(
            ActionError::from_code("INVALID_OPERATION", "You cannot follow yourself"),
            ActionError::InvalidOperation("You cannot follow yourself".to_string())
        );
        assert!(matches!(
            ActionError::from_code("POST_NOT_FOUND", "gone"),
            ActionError::NotFound(_)
        ));
        assert!(ActionError::from_code("DATABASE_ERROR", "boom").is_transient());
        assert!(ActionError::from_code("SOMETHING_NEW", "?").is_transient());
    }

    #[test]
    fn test_display() {
        assert_eq!(ActionError::Unauthenticated.to_string(), "Sign in to continue");
        assert_eq!(
            ActionError::TransientFailure("timeout".to_string()).to_string(),
            "Something went wrong: timeout"
        );
    }
}
