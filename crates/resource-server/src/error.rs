//! Error types for every layer of the pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use resource_types::ApiResponse;
use std::fmt;
use thiserror::Error;

/// Errors raised by storage adapters and the in-memory store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(u64),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Persistence(format!("payload encoding: {}", err))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Business operation an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl Operation {
    /// Client-facing message when the operation fails
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "create failed",
            Operation::Get => "retrieve failed",
            Operation::List => "list failed",
            Operation::Update => "update failed",
            Operation::Delete => "delete failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "creation",
            Operation::Get => "retrieval",
            Operation::List => "listing",
            Operation::Update => "update",
            Operation::Delete => "deletion",
        };
        f.write_str(name)
    }
}

/// Domain errors returned by the business-rule layer
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{op} failed: resource {id} not found")]
    NotFound { op: Operation, id: u64 },

    #[error("{op} failed: {reason}")]
    Invalid { op: Operation, reason: String },

    #[error("{op} failed")]
    Store {
        op: Operation,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Wrap a storage error, keeping not-found distinguishable
    pub fn wrap(op: Operation, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::NotFound { op, id },
            source => ServiceError::Store { op, source },
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ServiceError::NotFound { op, .. }
            | ServiceError::Invalid { op, .. }
            | ServiceError::Store { op, .. } => *op,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ServiceError::Store {
                source: StoreError::Cancelled,
                ..
            }
        )
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Message for unparsable identifiers
pub const INVALID_ID_MESSAGE: &str = "invalid id format";
/// Message for unparsable or rejected request bodies
pub const INVALID_BODY_MESSAGE: &str = "invalid request data";
/// Message for absent resources
pub const NOT_FOUND_MESSAGE: &str = "resource not found";

/// Errors surfaced by HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid id format: {0}")]
    InvalidId(String),

    #[error("invalid request data: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("listing render failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Invalid { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Store { .. }) | ApiError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidId(_) => INVALID_ID_MESSAGE,
            ApiError::InvalidBody(_) | ApiError::Service(ServiceError::Invalid { .. }) => {
                INVALID_BODY_MESSAGE
            }
            ApiError::Service(ServiceError::NotFound { .. }) => NOT_FOUND_MESSAGE,
            ApiError::Service(err) => err.operation().failure_message(),
            ApiError::Render(_) => Operation::List.failure_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail goes to the log only
        match &self {
            ApiError::Service(ServiceError::Store { op, source }) => {
                tracing::error!(operation = %op, error = %source, "Request failed");
            }
            ApiError::Render(err) => {
                tracing::error!(error = %err, "Listing render failed");
            }
            other => {
                tracing::warn!(status = status.as_u16(), "Request rejected: {}", other);
            }
        }

        let body = ApiResponse::<()>::empty(status.as_u16(), self.message());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
