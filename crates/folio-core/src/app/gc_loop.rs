//! GcLoop - 期限切れ artifact の削除
//!
//! # フロー
//! 1. 次の期限（なければ sweep 間隔）まで眠る
//! 2. `ArtifactStore::sweep` で期限切れを削除
//! 3. shutdown が来るまで繰り返す
//!
//! 眠る時間は `min(next_expiry - now, sweep_interval)` なので、
//! 期限から sweep までの遅れは sweep 間隔を超えません。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::ports::{ArtifactStore, Clock};

/// Slack added after an expiry so the entry is strictly past its window.
const EXPIRY_SLACK: Duration = Duration::from_millis(1);

/// GC loop handle.
/// - `request_shutdown()` は同期で呼べる（unload 時）
/// - `shutdown_and_join()` でループの終了を待てる
pub struct GcLoop {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl GcLoop {
    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(store: Arc<dyn ArtifactStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            gc_loop(store, clock, interval, &mut shutdown_rx).await;
        });
        Self { shutdown_tx, join }
    }

    /// Ask the loop to stop. In-flight sweeps finish first.
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for the loop.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn gc_loop(
    store: Arc<dyn ArtifactStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    debug!(?interval, "gc loop started");
    loop {
        // shutdown が来ていたら抜ける
        if *shutdown_rx.borrow() {
            break;
        }

        let wait = next_wake(store.next_expiry(), clock.now(), interval);
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender が drop されたら終了
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        store.sweep();
    }
    debug!("gc loop stopped");
}

/// How long to sleep before the next sweep.
fn next_wake(next_expiry: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> Duration {
    match next_expiry {
        Some(at) => {
            let until = (at - now).to_std().unwrap_or(Duration::ZERO) + EXPIRY_SLACK;
            until.min(interval)
        }
        None => interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::EphemeralStore;
    use crate::ports::{FixedClock, UlidGenerator};
    use bytes::Bytes;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn sleeps_until_next_expiry_or_interval() {
        let now = start();
        let interval = Duration::from_secs(300);

        assert_eq!(next_wake(None, now, interval), interval);
        assert_eq!(
            next_wake(Some(now + chrono::Duration::seconds(10)), now, interval),
            Duration::from_secs(10) + EXPIRY_SLACK
        );
        assert_eq!(
            next_wake(Some(now + chrono::Duration::hours(1)), now, interval),
            interval
        );
        // already due
        assert_eq!(
            next_wake(Some(now - chrono::Duration::seconds(5)), now, interval),
            EXPIRY_SLACK
        );
    }

    #[tokio::test]
    async fn sweeps_expired_artifacts_and_stops() {
        let clock = Arc::new(FixedClock::new(start()));
        let store = Arc::new(EphemeralStore::new(
            chrono::Duration::minutes(30),
            clock.clone(),
            Arc::new(UlidGenerator::new(clock.clone())),
        ));
        store.store(Bytes::from_static(b"%PDF"), "a.pdf", "application/pdf");
        clock.advance(chrono::Duration::minutes(31));

        let gc = GcLoop::spawn(store.clone(), clock.clone(), Duration::from_secs(60));

        let mut remaining = store.stats().count;
        for _ in 0..200 {
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            remaining = store.stats().count;
        }
        assert_eq!(remaining, 0);

        gc.shutdown_and_join().await;
    }

    #[tokio::test]
    async fn shutdown_interrupts_a_long_sleep() {
        let clock = Arc::new(FixedClock::new(start()));
        let store = Arc::new(EphemeralStore::new(
            chrono::Duration::minutes(30),
            clock.clone(),
            Arc::new(UlidGenerator::new(clock.clone())),
        ));

        let gc = GcLoop::spawn(store, clock, Duration::from_secs(3600));
        tokio::time::timeout(Duration::from_secs(5), gc.shutdown_and_join())
            .await
            .expect("loop stops promptly");
    }
}
