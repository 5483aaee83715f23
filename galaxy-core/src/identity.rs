use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// The caller as vouched for by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners see their own bookings; admins see everyone's.
    pub fn can_read_booking_of(&self, owner_id: &str) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an opaque bearer credential into a principal.
    async fn authenticate(&self, bearer: &str) -> Result<Principal, CoreError>;
}
