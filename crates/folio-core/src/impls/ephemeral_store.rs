//! In-memory artifact store with a fixed retention window.

use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::domain::artifact::{StoreStats, StoredArtifact};
use crate::domain::ids::ArtifactId;
use crate::ports::{ArtifactStore, Clock, IdGenerator};

/// Expiry entry for the priority queue.
///
/// We use Reverse ordering so BinaryHeap acts as a min-heap (earliest first).
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledEviction {
    expires_at: DateTime<Utc>,
    id: ArtifactId,
}

impl PartialOrd for ScheduledEviction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEviction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse ordering: earlier expiry has higher priority
        other
            .expires_at
            .cmp(&self.expires_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Store state, guarded by a single mutex.
#[derive(Default)]
struct StoreState {
    /// Live artifacts (single source of truth).
    artifacts: HashMap<ArtifactId, StoredArtifact>,

    /// Pending expiries. May hold ids that were already evicted.
    expiries: BinaryHeap<ScheduledEviction>,

    total_bytes: u64,
}

impl StoreState {
    fn remove(&mut self, id: &ArtifactId) -> Option<StoredArtifact> {
        let removed = self.artifacts.remove(id)?;
        self.total_bytes = self.total_bytes.saturating_sub(removed.size());
        Some(removed)
    }

    /// Drop heap entries whose artifact is gone.
    fn skip_stale(&mut self) {
        while let Some(top) = self.expiries.peek() {
            if self.artifacts.contains_key(&top.id) {
                break;
            }
            self.expiries.pop();
        }
    }
}

/// EphemeralStore keeps processed files in memory until their window ends.
///
/// # Concurrency
/// 全操作は 1 つの `std::sync::Mutex` の中で完結します（await しない）。
/// `Arc<EphemeralStore>` を複数タスクで共有できます。
pub struct EphemeralStore {
    state: Mutex<StoreState>,
    retention: Duration,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl EphemeralStore {
    pub fn new(retention: Duration, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            retention,
            clock,
            ids,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // 状態は各操作の途中で壊れないので、poison されても使い続ける
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ArtifactStore for EphemeralStore {
    fn store(&self, payload: Bytes, filename: &str, content_type: &str) -> ArtifactId {
        let id = self.ids.generate_artifact_id();
        let created_at = self.clock.now();
        let expires_at = created_at + self.retention;
        let size = payload.len() as u64;

        let artifact = StoredArtifact {
            id,
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            payload,
            created_at,
            expires_at,
        };

        {
            let mut state = self.lock();
            state.total_bytes += size;
            state.artifacts.insert(id, artifact);
            state.expiries.push(ScheduledEviction { expires_at, id });
        }

        debug!(artifact_id = %id, filename, size, %expires_at, "artifact stored");
        id
    }

    fn retrieve(&self, id: &ArtifactId) -> Option<StoredArtifact> {
        let now = self.clock.now();
        let state = self.lock();
        state
            .artifacts
            .get(id)
            .filter(|a| !a.is_expired(now))
            .cloned()
    }

    fn evict(&self, id: &ArtifactId) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            debug!(artifact_id = %id, "artifact evicted");
        }
        removed
    }

    fn sweep(&self) -> Vec<ArtifactId> {
        let now = self.clock.now();
        let mut evicted = Vec::new();
        {
            let mut state = self.lock();
            // 期限ちょうどの entry は残す（age > window で初めて期限切れ）
            while state.expiries.peek().is_some_and(|top| top.expires_at < now) {
                let Some(entry) = state.expiries.pop() else {
                    break;
                };
                if state.remove(&entry.id).is_some() {
                    evicted.push(entry.id);
                }
            }
            state.skip_stale();
        }

        if !evicted.is_empty() {
            info!(count = evicted.len(), "swept expired artifacts");
        }
        evicted
    }

    fn evict_all(&self) -> usize {
        let count = {
            let mut state = self.lock();
            let count = state.artifacts.len();
            state.artifacts.clear();
            state.expiries.clear();
            state.total_bytes = 0;
            count
        };
        info!(count, "evicted all artifacts");
        count
    }

    fn stats(&self) -> StoreStats {
        let now = self.clock.now();
        let state = self.lock();
        StoreStats {
            count: state.artifacts.len(),
            total_bytes: state.total_bytes,
            oldest_age_ms: state.artifacts.values().map(|a| a.age_ms(now)).max(),
        }
    }

    fn next_expiry(&self) -> Option<DateTime<Utc>> {
        let mut state = self.lock();
        state.skip_stale();
        state.expiries.peek().map(|e| e.expires_at)
    }
}
