//! RouteTable - tool id と処理経路の対応表
//!
//! 起動時に一度だけ組み立て、以後は読み取り専用で共有します。
//! 未登録の tool を黙って別の処理に回すことはしません。

use std::collections::HashMap;

use crate::domain::errors::FolioError;
use crate::domain::tool::ToolId;
use crate::ports::{DispatchStrategy, Route};
use crate::transform;

/// Endpoint for remote tools without a dedicated one.
pub const FALLBACK_ENDPOINT: &str = "process-pdf";

/// RouteError は RouteTable の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Route for tool '{0}' is already registered")]
    AlreadyRegistered(ToolId),
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<ToolId, Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Every tool wired to its default route.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for tool in ToolId::ALL {
            table.set(tool, default_route(tool));
        }
        table
    }

    pub fn register(&mut self, tool: ToolId, route: Route) -> Result<(), RouteError> {
        if self.routes.contains_key(&tool) {
            return Err(RouteError::AlreadyRegistered(tool));
        }
        self.routes.insert(tool, route);
        Ok(())
    }

    /// Insert or replace.
    pub fn set(&mut self, tool: ToolId, route: Route) {
        self.routes.insert(tool, route);
    }

    pub fn remove(&mut self, tool: ToolId) -> Option<Route> {
        self.routes.remove(&tool)
    }

    pub fn get(&self, tool: ToolId) -> Option<Route> {
        self.routes.get(&tool).copied()
    }

    /// Registered tools, in `ToolId::ALL` order.
    pub fn registered_tools(&self) -> Vec<ToolId> {
        ToolId::ALL
            .into_iter()
            .filter(|t| self.routes.contains_key(t))
            .collect()
    }
}

impl DispatchStrategy for RouteTable {
    fn select_route(&self, tool: ToolId) -> Result<Route, FolioError> {
        self.get(tool).ok_or(FolioError::NoRoute(tool))
    }
}

/// Route used by [`RouteTable::standard`].
pub fn default_route(tool: ToolId) -> Route {
    match tool {
        ToolId::Merge => Route::Local(transform::merge),
        ToolId::Split => Route::Local(transform::split),
        ToolId::Compress => Route::Local(transform::compress),
        ToolId::Rotate => Route::Local(transform::rotate),
        ToolId::Extract => Route::Local(transform::extract),
        ToolId::Watermark => Route::Local(transform::watermark),
        ToolId::Crop => Route::Local(transform::crop),
        other => Route::Remote(remote_endpoint(other)),
    }
}

/// Backend endpoint for a remote tool.
pub fn remote_endpoint(tool: ToolId) -> &'static str {
    match tool {
        ToolId::Ocr => "ocr-pdf",
        ToolId::PdfToWord | ToolId::PdfToExcel | ToolId::PdfToPowerpoint | ToolId::PdfToJpg => {
            "convert-pdf"
        }
        ToolId::WordToPdf | ToolId::JpgToPdf | ToolId::HtmlToPdf => "convert-to-pdf",
        ToolId::Protect | ToolId::Unlock => "pdf-security",
        _ => FALLBACK_ENDPOINT,
    }
}
