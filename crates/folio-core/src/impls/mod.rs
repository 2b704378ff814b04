//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **EphemeralStore**: メモリ上の期限付き ArtifactStore
//! - **RouteTable**: 既定の DispatchStrategy（tool id → Local / Remote）
//! - **HttpRemote**: reqwest による RemoteBoundary

pub mod dispatch;
pub mod ephemeral_store;
pub mod http_remote;

// 主要な型を再エクスポート
pub use self::dispatch::{FALLBACK_ENDPOINT, RouteError, RouteTable};
pub use self::ephemeral_store::EphemeralStore;
pub use self::http_remote::HttpRemote;
