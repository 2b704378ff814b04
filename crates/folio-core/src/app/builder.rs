//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 既定では全 tool（`ToolId::ALL`）に route があることを期待する
//! - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
//! - 不足があれば BuildError を返す（起動後に NoRoute で気付くことはない）

use std::sync::Arc;

use crate::app::dispatcher::Dispatcher;
use crate::app::runtime::App;
use crate::config::Config;
use crate::domain::errors::RemoteError;
use crate::domain::tool::ToolId;
use crate::impls::{EphemeralStore, HttpRemote, RouteTable};
use crate::ports::{Clock, IdGenerator, RemoteBoundary, Route, SystemClock, UlidGenerator};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(Config::from_env()?)
///     .remote(Arc::new(my_backend))
///     .build()?;
/// app.init();
/// ```
pub struct AppBuilder {
    config: Config,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    remote: Option<Arc<dyn RemoteBoundary>>,
    routes: RouteTable,
    expected_tools: Vec<ToolId>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing routes for tools: {0:?}. These tools were expected but have no route.")]
    MissingRoutes(Vec<ToolId>),

    #[error("could not set up the processing backend: {0}")]
    Remote(#[from] RemoteError),
}

impl AppBuilder {
    /// 全 tool に既定の route を張った builder を作成
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            ids: None,
            remote: None,
            routes: RouteTable::standard(),
            expected_tools: ToolId::ALL.to_vec(),
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 既定は clock を使う UlidGenerator
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// 既定は `config.remote.base_url` があれば HttpRemote、なければなし
    pub fn remote(mut self, remote: Arc<dyn RemoteBoundary>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Route を差し替え
    pub fn route(mut self, tool: ToolId, route: Route) -> Self {
        self.routes.set(tool, route);
        self
    }

    pub fn without_route(mut self, tool: ToolId) -> Self {
        self.routes.remove(tool);
        self
    }

    /// 期待される tool のリストを設定（既定: 全 tool）
    pub fn expect_tools(mut self, tools: &[ToolId]) -> Self {
        self.expected_tools = tools.to_vec();
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// # 検証
    /// - expect_tools() の tool が全て route を持つかチェック
    /// - remote 未指定かつ base_url ありなら HttpRemote を作る
    pub fn build(self) -> Result<App, BuildError> {
        let registered = self.routes.registered_tools();
        let missing: Vec<ToolId> = self
            .expected_tools
            .iter()
            .filter(|t| !registered.contains(t))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingRoutes(missing));
        }

        let remote = match (self.remote, &self.config.remote.base_url) {
            (Some(remote), _) => Some(remote),
            (None, Some(_)) => {
                Some(Arc::new(HttpRemote::new(&self.config.remote)?) as Arc<dyn RemoteBoundary>)
            }
            (None, None) => None,
        };

        let ids = self.ids.unwrap_or_else(|| {
            Arc::new(UlidGenerator::new(self.clock.clone())) as Arc<dyn IdGenerator>
        });
        let store = Arc::new(EphemeralStore::new(
            self.config.retention.window(),
            self.clock.clone(),
            ids.clone(),
        ));
        let dispatcher = Dispatcher::new(Arc::new(self.routes), remote, self.clock.clone());

        Ok(App::new(self.config, store, dispatcher, ids, self.clock))
    }
}
