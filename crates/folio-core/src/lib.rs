//! folio-core
//!
//! Core building blocks for the Folio PDF toolkit: an in-memory ephemeral
//! file store and a dispatcher that runs each tool locally or on a remote backend.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, tool, options, request, outcome, artifact, errors）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, ArtifactStore, DispatchStrategy, RemoteBoundary）
//! - **impls**: 実装（EphemeralStore, RouteTable, HttpRemote）
//! - **transform**: lopdf によるローカル transform
//! - **app**: アプリケーションロジック（builder, dispatcher, gc_loop, runtime, status）
//! - **config**: 環境変数からの設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod transform;

pub use app::{App, AppBuilder, BuildError, DownloadError, ProcessOutcome};
pub use config::{Config, ConfigError};
pub use domain::{ArtifactId, FolioError, InputFile, ToolId, ToolOptions};
