use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use galaxy_booking::{BookingFlow, FlowStep};
use galaxy_core::identity::Principal;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::AppError;

pub struct FlowSession {
    pub flow: BookingFlow,
    last_touched: Instant,
}

impl FlowSession {
    fn new() -> Self {
        Self { flow: BookingFlow::new(), last_touched: Instant::now() }
    }

    fn expired(&self, policy: &SessionPolicy, now: Instant) -> bool {
        now.saturating_duration_since(self.last_touched) >= policy.ttl_for(self.flow.step())
    }
}

pub type SessionHandle = Arc<Mutex<FlowSession>>;

/// How long flows live and how many one user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub idle_ttl: Duration,
    /// Grace period for reading a confirmed flow before it is dropped.
    pub confirmed_ttl: Duration,
    pub max_per_owner: usize,
}

impl SessionPolicy {
    pub fn ttl_for(&self, step: FlowStep) -> Duration {
        match step {
            FlowStep::Confirmed => self.confirmed_ttl,
            _ => self.idle_ttl,
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            confirmed_ttl: Duration::from_secs(5 * 60),
            max_per_owner: 5,
        }
    }
}

struct Entry {
    owner: String,
    /// Creation order, for picking an owner's oldest flow.
    seq: u64,
    handle: SessionHandle,
}

/// Server-side flows keyed by id. Each session has its own lock so a slow
/// payment on one flow never blocks another, and two requests on the same
/// flow are applied one after the other.
#[derive(Default)]
pub struct FlowRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    next_seq: AtomicU64,
    policy: SessionPolicy,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SessionPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    /// Opens a flow for `owner`. An owner already at the limit loses their
    /// oldest flow.
    pub async fn create(&self, owner: &str) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(FlowSession::new()));

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        let mut sessions = self.sessions.write().await;
        let mut owned: Vec<(u64, Uuid)> = sessions
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(id, entry)| (entry.seq, *id))
            .collect();
        let keep = self.policy.max_per_owner.saturating_sub(1);
        if owned.len() > keep {
            owned.sort_unstable();
            let excess = owned.len() - keep;
            for (_, old) in owned.into_iter().take(excess) {
                sessions.remove(&old);
                tracing::info!("Flow {} of {} evicted, owner at flow limit", old, owner);
            }
        }

        sessions.insert(id, Entry { owner: owner.to_string(), seq, handle: handle.clone() });
        tracing::debug!("Flow {} created for {}", id, owner);
        (id, handle)
    }

    /// Another user's flow is reported as missing. A successful lookup
    /// counts as activity.
    pub async fn get(&self, id: Uuid, principal: &Principal) -> Result<SessionHandle, AppError> {
        let handle = {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(entry) if entry.owner == principal.user_id => entry.handle.clone(),
                _ => return Err(AppError::NotFoundError(format!("Flow {} not found", id))),
            }
        };

        handle.lock().await.last_touched = Instant::now();
        Ok(handle)
    }

    pub async fn remove(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops idle flows and confirmed flows past their grace period.
    /// Sessions busy with a request are kept for the next sweep.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.handle.try_lock() {
            Ok(session) => !session.expired(&self.policy, now),
            Err(_) => true,
        });
        before - sessions.len()
    }
}
