use std::sync::Arc;
use std::time::Duration;

use galaxy_shared::models::events::DomainEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::sessions::FlowRegistry;

/// Writes every published domain event to the log as one JSON line.
/// Runs until the sending side is dropped.
pub async fn start_event_logger(mut rx: broadcast::Receiver<DomainEvent>) {
    info!("Event logger started");
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => info!(target: "galaxy_api::events", "{}", line),
                Err(e) => warn!("Unserializable event {:?}: {}", event, e),
            },
            Err(RecvError::Lagged(skipped)) => warn!("Event logger lagged, {} events skipped", skipped),
            Err(RecvError::Closed) => break,
        }
    }
    info!("Event logger stopped");
}

/// Periodically drops expired booking flows. Runs for the life of the process.
pub async fn start_session_sweeper(flows: Arc<FlowRegistry>, every: Duration) {
    info!("Session sweeper started, every {:?}", every);
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let evicted = flows.sweep(Instant::now()).await;
        if evicted > 0 {
            info!("Evicted {} expired flows, {} remain", evicted, flows.len().await);
        } else {
            debug!("No expired flows");
        }
    }
}
