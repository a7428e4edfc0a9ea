//! On-demand resolution of posts that were not generated ahead of time

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::{DetailResolver, DetailState};

/// How long a settled state waits for its requester to come back
const SETTLED_TTL: Duration = Duration::from_secs(60);

/// Upper bound on settled states held at once
const MAX_SETTLED: usize = 256;

struct Entry {
    state: DetailState,
    /// `None` while the resolution is in flight
    settled_at: Option<Instant>,
}

/// Tracks uids whose page is being resolved in the background.
///
/// The first request for a uid starts the resolution and sees `Pending`;
/// the first request after it settles receives the settled state, after
/// which the uid is forgotten. Settled states nobody asks for expire after
/// a while, oldest first once too many pile up.
pub struct FallbackPages {
    resolver: DetailResolver,
    states: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    max_settled: usize,
}

impl FallbackPages {
    pub fn new(resolver: DetailResolver) -> Arc<Self> {
        Self::with_limits(resolver, SETTLED_TTL, MAX_SETTLED)
    }

    pub fn with_limits(resolver: DetailResolver, ttl: Duration, max_settled: usize) -> Arc<Self> {
        Arc::new(Self {
            resolver,
            states: Mutex::new(HashMap::new()),
            ttl,
            max_settled,
        })
    }

    /// Current state for `id`, starting a resolution if none is known
    pub fn poll(self: &Arc<Self>, id: &str) -> DetailState {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);

        if matches!(states.get(id), Some(entry) if entry.settled_at.is_none()) {
            return DetailState::Pending;
        }
        if let Some(entry) = states.remove(id) {
            return entry.state;
        }

        self.sweep(&mut states);
        states.insert(
            id.to_string(),
            Entry {
                state: DetailState::Pending,
                settled_at: None,
            },
        );
        drop(states);

        let this = Arc::clone(self);
        let id = id.to_string();
        tokio::spawn(async move {
            this.resolve_in_background(id).await;
        });

        DetailState::Pending
    }

    /// Number of uids currently tracked
    pub fn len(&self) -> usize {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired settled states, then the oldest ones beyond the limit
    fn sweep(&self, states: &mut HashMap<String, Entry>) {
        let ttl = self.ttl;
        states.retain(|_, entry| match entry.settled_at {
            Some(at) => at.elapsed() < ttl,
            None => true,
        });

        let mut settled: Vec<(Instant, String)> = states
            .iter()
            .filter_map(|(id, entry)| entry.settled_at.map(|at| (at, id.clone())))
            .collect();
        if settled.len() <= self.max_settled {
            return;
        }

        settled.sort();
        let excess = settled.len() - self.max_settled;
        for (_, id) in settled.into_iter().take(excess) {
            states.remove(&id);
        }
        tracing::debug!("Dropped {} unclaimed post state(s)", excess);
    }

    async fn resolve_in_background(&self, id: String) {
        tracing::debug!("Resolving post {} on demand", id);
        let result = self.resolver.resolve(&id).await;

        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(state) => {
                states.insert(
                    id,
                    Entry {
                        state,
                        settled_at: Some(Instant::now()),
                    },
                );
            }
            Err(e) => {
                // Forget the uid so the next poll starts over
                tracing::error!("Failed to resolve post {}: {}", id, e);
                states.remove(&id);
            }
        }
    }
}
