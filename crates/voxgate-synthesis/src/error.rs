use http::StatusCode;
use thiserror::Error;
use voxgate_core::HttpError;

pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Synthesis pipeline errors
///
/// Policy outcomes (throttled, provider disabled) are not errors; they
/// travel as explicit values the orchestrator turns into skipped units.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Request carried no items to speak
    #[error("no input items to synthesize")]
    EmptyInput,

    /// Synthesis backend unreachable
    #[error("synthesis backend connection: {0}")]
    Connection(String),

    /// Synthesis call exceeded its time budget
    #[error("synthesis call timed out")]
    Timeout,

    /// Backend answered with a non-2xx status
    #[error("synthesis rejected ({status}): {message}")]
    ProviderRejected { status: u16, message: String },

    /// Throttle counter store failure
    #[error(transparent)]
    Throttle(#[from] voxgate_throttle::ThrottleError),

    /// Invalid pipeline configuration
    #[error("synthesis config: {0}")]
    Config(String),
}

impl HttpError for SynthesisError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyInput => StatusCode::BAD_REQUEST,
            Self::ProviderRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Connection(_) | Self::Timeout => StatusCode::BAD_GATEWAY,
            Self::Throttle(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::EmptyInput => "invalid_request_error",
            Self::ProviderRejected { .. } => "provider_error",
            Self::Connection(_) | Self::Timeout => "upstream_error",
            Self::Throttle(_) | Self::Config(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::EmptyInput => self.to_string(),
            // Backend details stay in the logs
            _ => "speech synthesis is temporarily unavailable".to_owned(),
        }
    }
}

impl axum::response::IntoResponse for SynthesisError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": {
                "type": self.error_type(),
                "message": self.client_message(),
            }
        });

        tracing::debug!(error = %self, status = %status, "synthesis request failed");

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_a_client_error() {
        let err = SynthesisError::EmptyInput;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type(), "invalid_request_error");
    }

    #[test]
    fn provider_rejection_preserves_status() {
        let err = SynthesisError::ProviderRejected {
            status: 422,
            message: "unsupported markup".to_owned(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn backend_details_are_not_leaked() {
        let err = SynthesisError::Connection("10.0.0.5 refused".to_owned());
        assert!(!err.client_message().contains("10.0.0.5"));
    }
}
