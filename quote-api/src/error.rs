use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quote_catalog::PricingError;
use quote_core::CoreError;
use quote_order::SessionError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    ServiceUnavailable(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// The price list could not be loaded; the request can be retried later
    pub fn price_list(err: CoreError) -> Self {
        AppError::ServiceUnavailable(err.to_string())
    }

    pub fn invalid_settings(err: PricingError) -> Self {
        AppError::ValidationError(err.to_string())
    }

    pub fn session(err: SessionError) -> Self {
        AppError::AuthenticationError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
