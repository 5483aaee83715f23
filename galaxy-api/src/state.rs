use std::sync::Arc;

use galaxy_booking::{BookingOrchestrator, RetryPolicy};
use galaxy_core::identity::IdentityProvider;
use galaxy_core::payment::PaymentAdapter;
use galaxy_core::repository::{BookingStore, FlightAdmin, FlightCatalog};
use galaxy_shared::models::events::DomainEvent;
use galaxy_store::GalaxyStore;
use tokio::sync::broadcast;

use crate::middleware::JwtIdentityProvider;
use crate::sessions::{FlowRegistry, SessionPolicy};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn FlightCatalog>,
    pub flight_admin: Arc<dyn FlightAdmin>,
    pub bookings: Arc<dyn BookingStore>,
    pub orchestrator: Arc<BookingOrchestrator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub flows: Arc<FlowRegistry>,
    pub events_tx: broadcast::Sender<DomainEvent>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(
        store: Arc<GalaxyStore>,
        payments: Arc<dyn PaymentAdapter>,
        retry: RetryPolicy,
        auth: AuthConfig,
    ) -> Self {
        let orchestrator = BookingOrchestrator::new(store.clone(), store.clone(), payments).with_retry(retry);
        let (events_tx, _) = broadcast::channel(100);

        Self {
            catalog: store.clone(),
            flight_admin: store.clone(),
            bookings: store,
            orchestrator: Arc::new(orchestrator),
            identity: Arc::new(JwtIdentityProvider::new(auth.secret.clone())),
            flows: Arc::new(FlowRegistry::new()),
            events_tx,
            auth,
        }
    }

    /// Replaces the default flow lifetimes. Call before the state is shared.
    pub fn with_session_policy(mut self, policy: SessionPolicy) -> Self {
        self.flows = Arc::new(FlowRegistry::with_policy(policy));
        self
    }

    /// Fire-and-forget; having no subscribers is fine.
    pub fn publish(&self, event: DomainEvent) {
        if self.events_tx.send(event).is_err() {
            tracing::debug!("No event subscribers");
        }
    }
}
