//! Uniform response envelope

use serde::{Deserialize, Serialize};

/// Message carried by every successful response
pub const SUCCESS_MESSAGE: &str = "success";

/// `{status, message, data}` wrapper around every handler result.
///
/// `status` mirrors the HTTP status code; `data` is left out of the JSON
/// when there is nothing to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(status: u16, data: T) -> Self {
        Self {
            status,
            message: SUCCESS_MESSAGE.to_string(),
            data: Some(data),
        }
    }

    pub fn empty(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }
}
