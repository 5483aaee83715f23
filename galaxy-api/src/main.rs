use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use galaxy_api::{app, sessions::SessionPolicy, state::{AppState, AuthConfig}, worker};
use galaxy_booking::{RetryPolicy, SimulatedPaymentAdapter};
use galaxy_store::app_config::{Config, StoreBackend};
use galaxy_store::{seed_sample_flights, GalaxyStore, KvStore, MemoryKv, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galaxy_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Galaxy API on port {}", config.server.port);

    let kv: Arc<dyn KvStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Arc::new(MemoryKv::new())
        }
        StoreBackend::Redis => {
            let url = config
                .store
                .redis_url
                .as_deref()
                .context("store.redis_url is required for the redis backend")?;
            Arc::new(RedisClient::new(url).await.context("Failed to connect to Redis")?)
        }
    };
    let store = Arc::new(GalaxyStore::new(kv));

    if config.store.seed_sample_flights {
        seed_sample_flights(&store).await.context("Failed to seed sample flights")?;
    }

    let payments = Arc::new(SimulatedPaymentAdapter::new(config.payment.simulated_delay()));
    let retry = RetryPolicy::new(config.search.retry_attempts, config.search.initial_backoff());

    let app_state = AppState::new(
        store,
        payments,
        retry,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    )
    .with_session_policy(SessionPolicy {
        idle_ttl: config.sessions.idle_ttl(),
        confirmed_ttl: config.sessions.confirmed_ttl(),
        max_per_owner: config.sessions.max_per_owner,
    });

    tokio::spawn(worker::start_event_logger(app_state.events_tx.subscribe()));
    tokio::spawn(worker::start_session_sweeper(
        app_state.flows.clone(),
        config.sessions.sweep_interval(),
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
