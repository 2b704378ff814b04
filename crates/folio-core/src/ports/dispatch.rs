//! DispatchStrategy port - tool id から処理経路へのマッピング
//!
//! # 実装
//! - **RouteTable**: 起動時に組み立てる不変のテーブル

use std::fmt;

use crate::domain::errors::{FolioError, TransformError};
use crate::domain::options::ToolOptions;
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

/// Local transform: bytes + options in, bytes out. No I/O.
pub type TransformFn = fn(&[InputFile], &ToolOptions) -> Result<Vec<OutputFile>, TransformError>;

/// Where a tool runs.
#[derive(Clone, Copy)]
pub enum Route {
    Local(TransformFn),
    /// Endpoint name on the remote backend.
    Remote(&'static str),
}

impl Route {
    pub fn is_local(&self) -> bool {
        matches!(self, Route::Local(_))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Local(_) => f.write_str("Local"),
            Route::Remote(endpoint) => f.debug_tuple("Remote").field(endpoint).finish(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Local(_) => f.write_str("local"),
            Route::Remote(endpoint) => write!(f, "remote:{endpoint}"),
        }
    }
}

/// DispatchStrategy は tool id を処理経路に解決
///
/// - `&self` なので object-safe（`Arc<dyn DispatchStrategy>` で共有）
/// - 未登録の tool は `FolioError::NoRoute`
pub trait DispatchStrategy: Send + Sync {
    fn select_route(&self, tool: ToolId) -> Result<Route, FolioError>;
}
