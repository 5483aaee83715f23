use axum::{extract::State, routing::post, Json, Router};
use galaxy_core::identity::Role;
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::issue_token, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/guest", post(login_guest))
}

/// Development sign-in: a fresh user-role identity, never admin.
async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let user_id = format!("guest-{}", Uuid::new_v4());
    let token = issue_token(&state.auth, &user_id, None, Role::User)?;
    tracing::info!("Issued guest token for {}", user_id);
    Ok(Json(AuthResponse { token, user_id }))
}
