use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use galaxy_catalog::listing::{present, OfferListing, SortKey, StopFilter};
use galaxy_core::flight::FlightOffer;
use galaxy_core::search::SearchCriteria;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::{error::AppError, state::AppState};

/// `?sort=price|duration|departure&stops=all|non-stop|1-stop|2-stops`
#[derive(Debug, Default, Deserialize, Clone, Copy)]
pub struct ListingParams {
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub stops: StopFilter,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub outbound: Vec<OfferListing>,
    #[serde(rename = "return")]
    pub inbound: Vec<OfferListing>,
}

#[derive(Debug, Serialize)]
struct RoutesResponse {
    routes: BTreeMap<String, Vec<String>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights", get(list_flights))
        .route("/flights/routes", get(list_routes))
        .route("/flights/search", post(search_flights))
        .route("/flights/{id}", get(get_flight))
}

async fn list_flights(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let flights: Vec<FlightOffer> = state.catalog.list_flights().await?;
    Ok(Json(json!({ "flights": flights })))
}

async fn list_routes(State(state): State<AppState>) -> Result<Json<RoutesResponse>, AppError> {
    Ok(Json(RoutesResponse { routes: state.catalog.routes().await? }))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let flight = state
        .catalog
        .get_flight(&id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Flight not found".to_string()))?;
    Ok(Json(json!({ "flight": flight })))
}

/// Stateless search: both legs, priced and sorted for the requested cabin.
async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Json<SearchResponse>, AppError> {
    let results = state.orchestrator.find_offers(&criteria).await?;
    let (class, party) = (criteria.class_type, criteria.party_size());

    Ok(Json(SearchResponse {
        outbound: present(&results.outbound, class, party, params.stops, params.sort),
        inbound: present(&results.inbound, class, party, params.stops, params.sort),
    }))
}
