//! ArtifactStore port - 処理結果の一時保管
//!
//! ArtifactStore は処理済みファイルを保持期限付きで保存します。
//!
//! # 実装
//! - **EphemeralStore**: メモリ上、min-heap で期限を管理

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::domain::artifact::{StoreStats, StoredArtifact};
use crate::domain::ids::ArtifactId;

/// ArtifactStore は処理済みファイルを期限付きで保持
///
/// # 設計原則
/// - 全操作は同期・アトミック（async 境界をまたいでロックしない）
/// - miss はエラーではなく `None` / `false`
/// - 期限切れの削除は `sweep`（GC ループ）と `evict_all`（終了時）が担う
pub trait ArtifactStore: Send + Sync {
    /// Register a payload. Never fails.
    fn store(&self, payload: Bytes, filename: &str, content_type: &str) -> ArtifactId;

    /// `None` for unknown, evicted, or expired ids.
    fn retrieve(&self, id: &ArtifactId) -> Option<StoredArtifact>;

    /// Idempotent; `true` only when something was removed.
    fn evict(&self, id: &ArtifactId) -> bool;

    /// Remove every entry past its retention window.
    fn sweep(&self) -> Vec<ArtifactId>;

    /// Remove everything. Returns how many entries were dropped.
    fn evict_all(&self) -> usize;

    fn stats(&self) -> StoreStats;

    /// Earliest pending expiry, if any.
    fn next_expiry(&self) -> Option<DateTime<Utc>>;
}
