//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **App**: process / download / ライフサイクルの表面
//! - **Dispatcher**: tool id → Local transform / Remote boundary
//! - **GcLoop**: 期限切れ artifact の削除

pub mod builder;
pub mod dispatcher;
pub mod gc_loop;
pub mod runtime;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{AppBuilder, BuildError};
pub use self::dispatcher::Dispatcher;
pub use self::gc_loop::GcLoop;
pub use self::runtime::{App, DownloadError};
pub use self::status::ProcessOutcome;
