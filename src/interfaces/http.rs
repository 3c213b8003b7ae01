use crate::application::order_issuer::{OrderHandle, OrderIssuer};
use crate::application::payment_verifier::{Confirmation, PaymentCallback, PaymentVerifier};
use crate::domain::ports::{ClockRef, EventStoreRef};
use crate::domain::status::{EventStatus, compute_status};
use crate::error::{Entity, RegistrationError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handles for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<OrderIssuer>,
    pub verifier: Arc<PaymentVerifier>,
    pub events: EventStoreRef,
    pub clock: ClockRef,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/events/:event_id/status", get(event_status))
        .route("/api/payments/order", post(create_order))
        .route("/api/payments/verify", post(verify_payment))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

/// Error wrapper that renders the public `{ error, code? }` body.
pub struct ApiError(RegistrationError);

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        Self(RegistrationError::InvalidInput(
            "malformed request body".to_string(),
        ))
    }
}

pub fn status_code(err: &RegistrationError) -> StatusCode {
    match err {
        RegistrationError::InvalidInput(_)
        | RegistrationError::InvalidState(_)
        | RegistrationError::Conflict(_)
        | RegistrationError::SignatureInvalid
        | RegistrationError::OrderMismatch => StatusCode::BAD_REQUEST,
        RegistrationError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistrationError::Unavailable(_)
        | RegistrationError::Upstream(_)
        | RegistrationError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.public_message(),
            code: self.0.code(),
        };
        (status, Json(body)).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn event_status(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventStatus>, ApiError> {
    let event = state
        .events
        .get(&event_id)
        .await?
        .ok_or(RegistrationError::NotFound(Entity::Event))?;
    Ok(Json(compute_status(&event, state.clock.now())))
}

async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderHandle>, ApiError> {
    let Json(request) = payload?;
    let handle = state
        .issuer
        .issue_order(
            request.event_id.as_deref().unwrap_or_default(),
            request.registration_id.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(handle))
}

async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentCallback>, JsonRejection>,
) -> Result<Json<Confirmation>, ApiError> {
    let Json(callback) = payload?;
    let confirmation = state.verifier.verify(&callback).await?;
    Ok(Json(confirmation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConflictKind, Dependency, StateViolation};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_code(&RegistrationError::InvalidState(StateViolation::FreeEvent)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&RegistrationError::Conflict(ConflictKind::AlreadyPaid)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&RegistrationError::OrderMismatch),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&RegistrationError::NotFound(Entity::Registration)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_code(&RegistrationError::Unavailable(Dependency::Gateway)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_code(&RegistrationError::Upstream("timeout".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
