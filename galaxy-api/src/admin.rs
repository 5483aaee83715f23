use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use galaxy_core::analytics::Analytics;
use galaxy_core::flight::{FlightOffer, FlightPatch};
use galaxy_shared::models::events::{DomainEvent, FlightChange, FlightChangedEvent};
use serde::Serialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
struct FlightResponse {
    flight: FlightOffer,
    message: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/flights", post(create_flight))
        .route("/admin/flights/{id}", patch(update_flight))
        .route("/admin/analytics", get(analytics))
}

/// POST /admin/flights. Any id in the payload is replaced by the catalog's.
async fn create_flight(
    State(state): State<AppState>,
    Json(flight): Json<FlightOffer>,
) -> Result<(StatusCode, Json<FlightResponse>), AppError> {
    flight.validate()?;
    let flight = state.flight_admin.create_flight(flight).await?;
    publish_change(&state, &flight, FlightChange::Created);

    Ok((
        StatusCode::CREATED,
        Json(FlightResponse { flight, message: "Flight added successfully" }),
    ))
}

/// PATCH /admin/flights/{id}. The patched flight must still be valid.
async fn update_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<FlightPatch>,
) -> Result<Json<FlightResponse>, AppError> {
    let mut preview = state
        .catalog
        .get_flight(&id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Flight not found".to_string()))?;
    patch.apply_to(&mut preview);
    preview.validate()?;

    let flight = state.flight_admin.update_flight(&id, &patch).await?;
    publish_change(&state, &flight, FlightChange::Updated);
    Ok(Json(FlightResponse { flight, message: "Flight updated successfully" }))
}

/// GET /admin/analytics
async fn analytics(State(state): State<AppState>) -> Result<Json<Analytics>, AppError> {
    Ok(Json(state.bookings.aggregate_analytics().await?))
}

fn publish_change(state: &AppState, flight: &FlightOffer, change: FlightChange) {
    state.publish(DomainEvent::FlightChanged(FlightChangedEvent {
        flight_id: flight.id.clone(),
        flight_number: flight.flight_number.clone(),
        date: flight.date,
        change,
        timestamp: Utc::now().timestamp(),
    }));
}
