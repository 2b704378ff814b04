//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（時計・乱数・一時ストア・リモートバックエンド）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - 永続化はしない（ストアはメモリのみ、期限付き）
//! - リモートは不透明な RPC として扱う

pub mod artifact_store;
pub mod clock;
pub mod dispatch;
pub mod id_generator;
pub mod remote;

// 主要な trait を再エクスポート
pub use self::artifact_store::ArtifactStore;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::dispatch::{DispatchStrategy, Route, TransformFn};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::remote::{RemoteBoundary, RemoteCall, RemoteData, RemoteFault, RemoteFile, RemoteReply};
