//! Error types for the pantry engine.
//!
//! `ApiError` is what a single request can come back with. The two
//! structured codes the server uses for recoverable situations are kept as
//! their own variants so the flows can route them instead of reporting them.
//! `PantryError` is what a whole user action ends with.

use thiserror::Error;

/// Wire code the server sends when a catalog name collides with another entry.
pub const CODE_MERGE_CONFIRMATION: &str = "merge_confirmation_required";

/// Wire code the server sends when recipe rows name unknown catalog entries.
pub const CODE_MISSING_INGREDIENTS: &str = "missing_ingredients";

/// Fallback message when the server gave no usable text.
pub const GENERIC_FAILURE: &str = "The request failed";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 409 with `merge_confirmation_required`
    #[error("{message}")]
    MergeConfirmationRequired {
        message: String,
        target_id: Option<i64>,
    },

    /// Recipe save blocked by rows that name no catalog entry
    #[error("Missing ingredients: {}", .0.join(", "))]
    MissingIngredients(Vec<String>),

    /// Any other non-2xx response
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Connection refused, reset, DNS, timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the contract
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a rejection, substituting the generic message for blank server text.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };
        ApiError::Rejected { status, message }
    }
}

#[derive(Error, Debug)]
pub enum PantryError {
    /// Required field empty or malformed; caught before any request.
    #[error("{0}")]
    Validation(String),

    /// Terminal API failure for this attempt.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Missing-ingredient registration did not unblock the recipe save.
    #[error("Recipe still has unregistered ingredients after registration: {}", .0.join(", "))]
    StillMissing(Vec<String>),

    /// Arithmetic requested on an item whose quantity is not tracked.
    #[error("\"{0}\" is in stock without a tracked quantity; set an amount first")]
    UntrackedAmount(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PantryError {
    pub fn code(&self) -> i32 {
        match self {
            PantryError::Validation(_) => -32602,
            PantryError::Api(ApiError::Transport(_)) => -32001,
            PantryError::Api(ApiError::Decode(_)) => -32700,
            PantryError::Api(_) => -32600,
            PantryError::StillMissing(_) => -32010,
            PantryError::UntrackedAmount(_) => -32011,
            PantryError::NotFound(_) => -32004,
            PantryError::Config(_) => -32005,
            PantryError::Image(_) => -32006,
            PantryError::Io(_) => -32007,
            PantryError::Json(_) => -32700,
        }
    }

    /// True when the failure happened before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, PantryError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PantryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_blank_message_uses_fallback() {
        let err = ApiError::rejected(500, "   ");
        assert_eq!(err.to_string(), GENERIC_FAILURE);

        let err = ApiError::rejected(409, "in use by 2 recipes");
        assert_eq!(err.to_string(), "in use by 2 recipes");
    }

    #[test]
    fn test_error_codes_distinct_for_transport_and_rejection() {
        let transport = PantryError::Api(ApiError::Transport("x".into()));
        let rejected = PantryError::Api(ApiError::rejected(400, "x"));
        assert_ne!(transport.code(), rejected.code());
        assert!(PantryError::Validation("name".into()).is_validation());
    }
}
