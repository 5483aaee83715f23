use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use galaxy_core::identity::{IdentityProvider, Principal, Role};
use galaxy_core::CoreError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    pub exp: usize,
}

pub fn issue_token(
    auth: &AuthConfig,
    user_id: &str,
    email: Option<String>,
    role: Role,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        email,
        role,
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

// ============================================================================
// Identity provider backed by HS256 tokens
// ============================================================================

pub struct JwtIdentityProvider {
    secret: String,
}

impl JwtIdentityProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn authenticate(&self, bearer: &str) -> Result<Principal, CoreError> {
        let token_data = decode::<Claims>(
            bearer,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| CoreError::Identity(e.to_string()))?;

        let claims = token_data.claims;
        Ok(Principal { user_id: claims.sub, email: claims.email, role: claims.role })
    }
}

// ============================================================================
// Middleware
// ============================================================================

async fn principal_from(state: &AppState, headers: &HeaderMap) -> Result<Principal, AppError> {
    let Authorization(bearer) = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::AuthenticationError("Unauthorized - please login first".to_string()))?;

    state.identity.authenticate(bearer.token()).await.map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::AuthenticationError("Invalid or expired token".to_string())
    })
}

/// Any signed-in user. Injects the [`Principal`] into request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = principal_from(&state, req.headers()).await?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Admin role only; the role claim is the sole source of truth.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = principal_from(&state, req.headers()).await?;
    if !principal.is_admin() {
        return Err(AppError::AuthorizationError("Admin access required".to_string()));
    }
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig { secret: "test-secret".to_string(), expiration: 3600 }
    }

    #[tokio::test]
    async fn test_token_roundtrip_keeps_role() {
        let token = issue_token(&auth(), "admin-1", Some("ops@galaxy.test".into()), Role::Admin).unwrap();
        let principal = JwtIdentityProvider::new("test-secret").authenticate(&token).await.unwrap();
        assert_eq!(principal.user_id, "admin-1");
        assert!(principal.is_admin());
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = issue_token(&auth(), "user-1", None, Role::User).unwrap();
        let result = JwtIdentityProvider::new("other-secret").authenticate(&token).await;
        assert!(matches!(result, Err(CoreError::Identity(_))));
    }
}
