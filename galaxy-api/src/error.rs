use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use galaxy_booking::{FlowError, SessionError};
use galaxy_core::repository::StoreError;
use galaxy_core::{CoreError, ValidationErrors};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(ValidationErrors),
    BadRequest(String),
    NotFoundError(String),
    ConflictError(String),
    /// The charge was declined. Carries the flow view so the client can retry.
    PaymentFailed { message: String, flow: serde_json::Value },
    ServiceUnavailable(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "fields": errors }),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::PaymentFailed { message, flow } => (
                StatusCode::PAYMENT_REQUIRED,
                json!({ "error": message, "flow": flow }),
            ),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Collaborator unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "Service temporarily unavailable, please retry" }),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(errors)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFoundError(format!("{} not found", what)),
            StoreError::Conflict(msg) => AppError::ConflictError(msg),
            StoreError::Backend(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Validation(errors) => AppError::ValidationError(errors),
            FlowError::InvalidTransition { .. } | FlowError::Unavailable { .. } => {
                AppError::ConflictError(err.to_string())
            }
            FlowError::UnknownOffer(_) | FlowError::PassengerOutOfRange { .. } => {
                AppError::BadRequest(err.to_string())
            }
            FlowError::Invariant(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Flow(e) => e.into(),
            SessionError::Catalog(e) => AppError::ServiceUnavailable(format!("Flight catalog: {}", e)),
            SessionError::Store(e) => e.into(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => AppError::ValidationError(errors),
            CoreError::Identity(msg) => AppError::AuthenticationError(msg),
        }
    }
}
