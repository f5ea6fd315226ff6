use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt::Display;
use thiserror::Error;

use crate::storage::StorageError;

/// Error body some endpoints send alongside a non-success status.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.message, &self.error) {
            (Some(message), Some(error)) => write!(f, "{message}: {error}"),
            (Some(text), None) | (None, Some(text)) => write!(f, "{text}"),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Auth token rejected by the API")]
    Unauthorized,

    #[error("No auth token stored")]
    MissingToken,

    #[error("Client is missing required configuration: {0}")]
    Unconfigured(String),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Data error: {0}")]
    DataError(#[from] DataError),

    #[error("Response format error: {0}")]
    ResponseError(#[from] ResponseError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::RequestError(e) => e.status(),
            Self::ResponseError(ResponseError::HttpStatus { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    #[error("Invalid type for field '{field}': expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl DataError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_type(field: &'static str, expected: &'static str) -> Self {
        Self::InvalidType { field, expected }
    }

    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Unexpected response structure: {0}")]
    UnexpectedStructure(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
}

impl ResponseError {
    pub fn unexpected_structure(description: impl Into<String>) -> Self {
        Self::UnexpectedStructure(description.into())
    }

    pub fn http_status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }
}
