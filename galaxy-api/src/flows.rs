use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::Utc;
use galaxy_booking::{BookingFlow, FlowError, FlowStep, Selection};
use galaxy_catalog::listing::OfferListing;
use galaxy_catalog::pricing::Quote;
use galaxy_core::booking::BookingRecord;
use galaxy_core::identity::Principal;
use galaxy_core::passenger::{PassengerField, PassengerKind, PassengerRecord};
use galaxy_core::payment::PaymentDetails;
use galaxy_core::search::SearchCriteria;
use galaxy_shared::models::events::{
    BookingConfirmedEvent, DomainEvent, FlightChange, FlightChangedEvent,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, flights::ListingParams, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

/// What the client renders for the current step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowView {
    pub id: Uuid,
    pub step: FlowStep,
    pub criteria: Option<SearchCriteria>,
    /// Offers for the leg being chosen; empty outside the selection steps.
    pub candidates: Vec<OfferListing>,
    pub selection: Selection,
    pub quote: Option<Quote>,
    pub total_price: Option<u64>,
    pub passengers: Vec<PassengerSlot>,
    pub payment_error: Option<String>,
    pub booking: Option<BookingRecord>,
}

impl FlowView {
    pub fn new(id: Uuid, flow: &BookingFlow, params: ListingParams) -> Self {
        Self {
            id,
            step: flow.step(),
            criteria: flow.criteria().cloned(),
            candidates: flow.listings(params.stops, params.sort),
            selection: flow.selection().clone(),
            quote: flow.quote(),
            total_price: flow.frozen_total().or_else(|| flow.current_total()),
            passengers: PassengerSlot::label(flow),
            payment_error: flow.payment_error().map(str::to_string),
            booking: flow.booking().cloned(),
        }
    }
}

/// One passenger form entry, tagged with the fare kind its slot is for.
#[derive(Debug, Serialize)]
pub struct PassengerSlot {
    pub kind: PassengerKind,
    #[serde(flatten)]
    pub details: PassengerRecord,
}

impl PassengerSlot {
    fn label(flow: &BookingFlow) -> Vec<Self> {
        let adults = flow.criteria().map_or(0, |c| c.passengers.adults);
        flow.passengers()
            .iter()
            .enumerate()
            .map(|(index, details)| Self {
                kind: PassengerKind::for_index(index, adults),
                details: details.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFlightRequest {
    pub flight_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PassengersRequest {
    pub passengers: Vec<PassengerRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PassengerFieldRequest {
    pub field: PassengerField,
    pub value: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flows", post(create_flow))
        .route("/flows/{id}", get(get_flow).delete(logout))
        .route("/flows/{id}/search", post(search))
        .route("/flows/{id}/select-outbound", post(select_outbound))
        .route("/flows/{id}/select-return", post(select_return))
        .route("/flows/{id}/clear-outbound", post(clear_outbound))
        .route("/flows/{id}/review", post(review))
        .route("/flows/{id}/passengers", post(submit_passengers))
        .route("/flows/{id}/passengers/{index}", patch(update_passenger))
        .route("/flows/{id}/pay", post(pay))
        .route("/flows/{id}/restart", post(restart))
}

// ============================================================================
// Handlers
// ============================================================================

/// Apply a synchronous transition under the session lock. On error the stored
/// flow is left as it was.
async fn transition<F>(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    params: ListingParams,
    apply: F,
) -> Result<Json<FlowView>, AppError>
where
    F: FnOnce(&BookingFlow) -> Result<BookingFlow, FlowError>,
{
    let handle = state.flows.get(id, principal).await?;
    let mut session = handle.lock().await;
    session.flow = apply(&session.flow)?;
    let view = FlowView::new(id, &session.flow, params);
    Ok(Json(view))
}

/// POST /flows
async fn create_flow(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> (StatusCode, Json<FlowView>) {
    let (id, handle) = state.flows.create(&principal.user_id).await;
    let session = handle.lock().await;
    let view = FlowView::new(id, &session.flow, ListingParams::default());
    (StatusCode::CREATED, Json(view))
}

/// GET /flows/{id}?sort=&stops=
async fn get_flow(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListingParams>,
) -> Result<Json<FlowView>, AppError> {
    let handle = state.flows.get(id, &principal).await?;
    let session = handle.lock().await;
    let view = FlowView::new(id, &session.flow, params);
    Ok(Json(view))
}

/// POST /flows/{id}/search
async fn search(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListingParams>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Json<FlowView>, AppError> {
    let handle = state.flows.get(id, &principal).await?;
    let mut session = handle.lock().await;
    session.flow = state.orchestrator.search(&session.flow, criteria).await?;
    let view = FlowView::new(id, &session.flow, params);
    Ok(Json(view))
}

/// POST /flows/{id}/select-outbound
async fn select_outbound(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListingParams>,
    Json(req): Json<SelectFlightRequest>,
) -> Result<Json<FlowView>, AppError> {
    transition(&state, &principal, id, params, |flow| flow.select_outbound(&req.flight_id)).await
}

/// POST /flows/{id}/select-return
async fn select_return(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListingParams>,
    Json(req): Json<SelectFlightRequest>,
) -> Result<Json<FlowView>, AppError> {
    transition(&state, &principal, id, params, |flow| flow.select_return(&req.flight_id)).await
}

/// POST /flows/{id}/clear-outbound
async fn clear_outbound(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListingParams>,
) -> Result<Json<FlowView>, AppError> {
    transition(&state, &principal, id, params, BookingFlow::clear_outbound).await
}

/// POST /flows/{id}/review: accept the reviewed itinerary and open the passenger form.
async fn review(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowView>, AppError> {
    transition(&state, &principal, id, ListingParams::default(), BookingFlow::proceed_to_passengers).await
}

/// PATCH /flows/{id}/passengers/{index}
async fn update_passenger(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<PassengerFieldRequest>,
) -> Result<Json<FlowView>, AppError> {
    transition(&state, &principal, id, ListingParams::default(), |flow| {
        flow.update_passenger(index, req.field, req.value)
    })
    .await
}

/// POST /flows/{id}/passengers: replace the whole form and continue to payment.
async fn submit_passengers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<PassengersRequest>,
) -> Result<Json<FlowView>, AppError> {
    transition(&state, &principal, id, ListingParams::default(), |flow| {
        flow.replace_passengers(req.passengers)?.submit_passengers()
    })
    .await
}

/// POST /flows/{id}/pay
async fn pay(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(details): Json<PaymentDetails>,
) -> Result<Json<FlowView>, AppError> {
    let handle = state.flows.get(id, &principal).await?;
    let mut session = handle.lock().await;
    session.flow = state.orchestrator.pay(&session.flow, &principal.user_id, &details).await?;

    let view = FlowView::new(id, &session.flow, ListingParams::default());
    if session.flow.step() == FlowStep::Paying {
        let message = view.payment_error.clone().unwrap_or_else(|| "Payment failed".to_string());
        let flow = serde_json::to_value(&view)
            .map_err(|e| AppError::InternalServerError(format!("Flow serialization failed: {}", e)))?;
        return Err(AppError::PaymentFailed { message, flow });
    }

    if let Some(booking) = session.flow.booking() {
        publish_confirmation(&state, booking);
    }
    Ok(Json(view))
}

/// POST /flows/{id}/restart
async fn restart(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowView>, AppError> {
    transition(&state, &principal, id, ListingParams::default(), |flow| Ok(flow.restart())).await
}

/// DELETE /flows/{id}: logout. Whatever was in progress is discarded.
async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = state.flows.get(id, &principal).await?;
    {
        let mut session = handle.lock().await;
        session.flow = session.flow.logout();
    }
    state.flows.remove(id).await;
    Ok(StatusCode::NO_CONTENT)
}

fn publish_confirmation(state: &AppState, booking: &BookingRecord) {
    let timestamp = Utc::now().timestamp();
    state.publish(DomainEvent::BookingConfirmed(BookingConfirmedEvent {
        booking_id: booking.booking_id.clone(),
        user_id: booking.user_id.clone(),
        flight_ids: booking.legs().map(|leg| leg.id.clone()).collect(),
        class_type: booking.class_type().as_str().to_string(),
        passenger_count: booking.party_size(),
        total_price: booking.total_price,
        timestamp,
    }));
    for leg in booking.legs() {
        state.publish(DomainEvent::FlightChanged(FlightChangedEvent {
            flight_id: leg.id.clone(),
            flight_number: leg.flight_number.clone(),
            date: leg.date,
            change: FlightChange::SeatsConsumed,
            timestamp,
        }));
    }
}
