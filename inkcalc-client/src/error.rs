//! Client error types.

use inkcalc_core::CalcError;
use thiserror::Error;

/// Errors that can occur when talking to the recognition service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is invalid.
    #[error("invalid recognition API URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("recognition HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("recognition service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// The response body was not JSON.
    #[error("failed to parse recognition payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Check if the failure came from the network or the service, as opposed
    /// to the payload.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::Json(_))
    }
}

impl From<ClientError> for CalcError {
    fn from(err: ClientError) -> Self {
        if err.is_unavailable() {
            CalcError::RecognitionUnavailable(err.to_string())
        } else {
            CalcError::MalformedResponse(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_unavailable() {
        let err: CalcError = ClientError::Status {
            status: 503,
            body: "down".into(),
        }
        .into();
        assert!(matches!(err, CalcError::RecognitionUnavailable(_)));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_invalid_url_maps_to_unavailable() {
        let err: CalcError = ClientError::InvalidUrl("nope".into()).into();
        assert!(matches!(err, CalcError::RecognitionUnavailable(_)));
    }

    #[test]
    fn test_json_maps_to_malformed() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: CalcError = ClientError::from(json_err).into();
        assert!(matches!(err, CalcError::MalformedResponse(_)));
    }
}
