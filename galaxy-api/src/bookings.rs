use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use galaxy_core::booking::{BookingRecord, BookingStatus};
use galaxy_core::identity::Principal;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    booking: BookingRecord,
}

#[derive(Debug, Serialize)]
struct BookingListResponse {
    bookings: Vec<BookingRecord>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
}

/// GET /bookings?status=confirmed
async fn list_bookings(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
) -> Result<Json<BookingListResponse>, AppError> {
    let mut bookings = state.bookings.list_bookings(&principal.user_id).await?;
    if let Some(status) = params.status {
        bookings.retain(|b| b.status == status);
    }
    Ok(Json(BookingListResponse { bookings }))
}

/// GET /bookings/{id}. Other users' bookings are indistinguishable from missing ones.
async fn get_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .bookings
        .get_booking(&id)
        .await?
        .filter(|b| principal.can_read_booking_of(&b.user_id))
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    Ok(Json(BookingResponse { booking }))
}
