//! Exit codes for pantryctl

use pantry_common::error::{ApiError, PantryError};

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors, including a partially failed batch
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when input was rejected before anything was sent
pub const EXIT_VALIDATION: i32 = 64;

/// Exit code when the server sent something unreadable
pub const EXIT_INVALID_RESPONSE: i32 = 65;

/// Exit code when the server is unreachable
pub const EXIT_SERVER_UNAVAILABLE: i32 = 70;

pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PantryError>() {
        Some(PantryError::Validation(_)) => EXIT_VALIDATION,
        Some(PantryError::Api(api)) => api_exit_code(api),
        Some(_) => EXIT_GENERAL_ERROR,
        None => match err.downcast_ref::<ApiError>() {
            Some(api) => api_exit_code(api),
            None => EXIT_GENERAL_ERROR,
        },
    }
}

fn api_exit_code(err: &ApiError) -> i32 {
    match err {
        ApiError::Transport(_) => EXIT_SERVER_UNAVAILABLE,
        ApiError::Decode(_) => EXIT_INVALID_RESPONSE,
        _ => EXIT_GENERAL_ERROR,
    }
}
