//! Transport-neutral controller output.

use serde::Serialize;
use serde_json::Value;
use vh_core::responses::Envelope;

use crate::error::ApiError;

/// Status code plus the `{message, data}` body a transport would send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Envelope<Value>,
}

impl ApiResponse {
    /// 200 with `data`.
    pub fn ok<T: Serialize>(message: &str, data: &T) -> Self {
        Self::with_status(200, message, data)
    }

    /// 201 with `data`.
    pub fn created<T: Serialize>(message: &str, data: &T) -> Self {
        Self::with_status(201, message, data)
    }

    /// 200 without a data member.
    #[must_use]
    pub fn message(message: &str) -> Self {
        Self {
            status: 200,
            body: Envelope::message(message),
        }
    }

    fn with_status<T: Serialize>(status: u16, message: &str, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                status,
                body: Envelope::with_data(message, value),
            },
            Err(error) => {
                tracing::error!(%error, "response serialization failed");
                Self {
                    status: 500,
                    body: Envelope::message(format!("Failed to serialize response: {error}")),
                }
            }
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

impl From<ApiError> for ApiResponse {
    fn from(error: ApiError) -> Self {
        let status = error.status();
        if error.is_server_error() {
            tracing::error!(status, %error, "request failed");
        } else {
            tracing::debug!(status, %error, "request rejected");
        }
        Self {
            status,
            body: Envelope::message(error.to_string()),
        }
    }
}
