//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: Clock の時刻 + 乱数から ID を作る

use crate::domain::ids::{ArtifactId, RequestId};
use crate::ports::Clock;

/// IdGenerator は artifact / request の ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（ストアは複数タスクから使われる）
pub trait IdGenerator: Send + Sync {
    fn generate_artifact_id(&self) -> ArtifactId;

    fn generate_request_id(&self) -> RequestId;
}

/// UlidGenerator は Clock を使って timestamp 部分を決める
///
/// テストでは FixedClock を渡すと timestamp が固定されます（random 部分は変わる）。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn timestamp_ms(&self) -> u64 {
        self.clock.now().timestamp_millis().max(0) as u64
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_artifact_id(&self) -> ArtifactId {
        ArtifactId::from_parts(self.timestamp_ms(), rand::random())
    }

    fn generate_request_id(&self) -> RequestId {
        RequestId::from_parts(self.timestamp_ms(), rand::random())
    }
}
