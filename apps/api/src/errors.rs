use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::search::SearchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Extraction problems never show up here: a reply that does not match the
/// expected headings produces empty or fallback data, not an error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{service} API key not configured")]
    NotConfigured {
        service: String,
        env_var: &'static str,
    },

    #[error("{service} API error (status {status}): {message}")]
    Upstream {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::NotConfigured { provider } => AppError::NotConfigured {
                service: provider.display_name().to_string(),
                env_var: provider.api_key_env(),
            },
            LlmError::Api {
                provider,
                status,
                message,
            } => AppError::Upstream {
                service: provider.display_name().to_string(),
                status,
                message,
            },
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::NotConfigured { backend } => AppError::NotConfigured {
                service: backend.display_name().to_string(),
                env_var: backend.api_key_env(),
            },
            SearchError::Api { backend, status, message } => AppError::Upstream {
                service: backend.display_name().to_string(),
                status,
                message,
            },
            other => AppError::Search(other.to_string()),
        }
    }
}

/// Malformed or non-JSON bodies get the same 400 shape as a missing field.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status, machine code and optional remediation hint for this error.
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", None),
            AppError::NotConfigured { env_var, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                Some(format!(
                    "Set the {env_var} environment variable and restart the service."
                )),
            ),
            AppError::Upstream { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_ERROR",
                None,
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            AppError::Llm(_) => (StatusCode::INTERNAL_SERVER_ERROR, "LLM_ERROR", None),
            AppError::Search(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SEARCH_ERROR", None),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXECUTION_ERROR", None),
        }
    }

    /// The JSON error body, also embedded per module by the orchestrator.
    pub fn to_body(&self) -> Value {
        let (_, code, hint) = self.parts();
        let message = match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::Internal(e) => e.to_string(),
            other => other.to_string(),
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        if let Some(hint) = hint {
            body["hint"] = json!(hint);
        }
        if let AppError::Upstream { status, service, .. } = self {
            body["status"] = json!(status);
            body["service"] = json!(service);
        }
        body
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _, _) = self.parts();

        match &self {
            AppError::Validation(msg) => tracing::debug!("Rejected request: {msg}"),
            AppError::NotConfigured { env_var, .. } => {
                tracing::error!("Missing configuration: {env_var} is not set")
            }
            AppError::Upstream {
                service,
                status,
                message,
            } => tracing::error!("{service} returned {status}: {message}"),
            AppError::NotFound(_) => {}
            AppError::Llm(msg) => tracing::error!("LLM error: {msg}"),
            AppError::Search(msg) => tracing::error!("Search error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        (status, Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Provider;

    #[test]
    fn test_validation_maps_to_400() {
        let err = AppError::Validation("technology is required".to_string());
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
        assert_eq!(err.to_body()["error"], "technology is required");
        assert_eq!(err.to_body()["success"], false);
    }

    #[test]
    fn test_missing_key_message_and_hint() {
        let err: AppError = LlmError::NotConfigured {
            provider: Provider::Claude,
        }
        .into();
        let body = err.to_body();
        assert_eq!(err.parts().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("not configured"));
        assert!(body["hint"].as_str().unwrap().contains("CLAUDE_API_KEY"));
    }

    #[test]
    fn test_upstream_status_passes_through() {
        let err: AppError = LlmError::Api {
            provider: Provider::OpenAi,
            status: 429,
            message: "Rate limit reached".to_string(),
        }
        .into();
        assert_eq!(err.parts().0, StatusCode::TOO_MANY_REQUESTS);
        let body = err.to_body();
        assert_eq!(body["error"], "Rate limit reached");
        assert_eq!(body["status"], 429);
    }

    #[test]
    fn test_invalid_upstream_status_becomes_bad_gateway() {
        let err = AppError::Upstream {
            service: "Gemini".to_string(),
            status: 42,
            message: "weird".to_string(),
        };
        assert_eq!(err.parts().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_exposes_message() {
        let err = AppError::Internal(anyhow::anyhow!("task panicked"));
        assert_eq!(err.to_body()["error"], "task panicked");
        assert_eq!(err.to_body()["code"], "EXECUTION_ERROR");
    }
}
