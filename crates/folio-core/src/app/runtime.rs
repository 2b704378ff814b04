//! App - ストアとディスパッチャをまとめた明示的なコンテキスト
//!
//! # ライフサイクル
//! - `init()`: GC ループを起動（tokio runtime 内で呼ぶ）
//! - `process()`: 検証 → dispatch → 出力をストアに登録 → handle を返す
//! - `on_visibility_hidden()`: その場で sweep
//! - `on_unload()` / `dispose()`: GC ループ停止 + 全 artifact を削除

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::app::dispatcher::Dispatcher;
use crate::app::gc_loop::GcLoop;
use crate::app::status::ProcessOutcome;
use crate::config::Config;
use crate::domain::artifact::{StoreStats, StoredArtifact};
use crate::domain::errors::FolioError;
use crate::domain::ids::ArtifactId;
use crate::domain::options::ToolOptions;
use crate::domain::outcome::ProcessingResult;
use crate::domain::request::{InputFile, ProcessingRequest};
use crate::domain::tool::ToolId;
use crate::ports::{ArtifactStore, Clock, IdGenerator, Route};

/// DownloadError は artifact の書き出し失敗
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("file {0} has expired or was never stored")]
    Expired(ArtifactId),

    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct App {
    config: Config,
    store: Arc<dyn ArtifactStore>,
    dispatcher: Dispatcher,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    gc: Mutex<Option<GcLoop>>,
}

impl App {
    pub(crate) fn new(
        config: Config,
        store: Arc<dyn ArtifactStore>,
        dispatcher: Dispatcher,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            dispatcher,
            ids,
            clock,
            gc: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_remote(&self) -> bool {
        self.dispatcher.has_remote()
    }

    pub fn route(&self, tool: ToolId) -> Result<Route, FolioError> {
        self.dispatcher.route(tool)
    }

    /// Start the GC loop. Calling it twice keeps the first loop.
    ///
    /// Panics outside a tokio runtime (`tokio::spawn`).
    pub fn init(&self) {
        let mut gc = self.gc.lock().unwrap_or_else(PoisonError::into_inner);
        if gc.is_some() {
            return;
        }
        *gc = Some(GcLoop::spawn(
            self.store.clone(),
            self.clock.clone(),
            self.config.retention.sweep_interval(),
        ));
        info!(
            window_minutes = self.config.retention.window_minutes,
            "artifact gc started"
        );
    }

    pub fn new_request(
        &self,
        tool: ToolId,
        files: Vec<InputFile>,
        options: ToolOptions,
    ) -> ProcessingRequest {
        ProcessingRequest::new(self.ids.generate_request_id(), tool, files, options)
    }

    /// Build a request from a tool string and JSON options (`null` = defaults).
    pub fn parse_request(
        &self,
        tool: &str,
        files: Vec<InputFile>,
        options: serde_json::Value,
    ) -> Result<ProcessingRequest, FolioError> {
        let tool: ToolId = tool.parse()?;
        let options = ToolOptions::from_json(tool, options)?;
        Ok(self.new_request(tool, files, options))
    }

    /// Validate, run, and register the outputs. Failures come back as `Failed`.
    pub async fn process(&self, request: &ProcessingRequest) -> ProcessOutcome {
        if let Err(e) = request.validate(self.config.uploads.max_file_bytes) {
            warn!(
                request_id = %request.id,
                tool = %request.tool,
                error = %e,
                "request rejected"
            );
            return ProcessOutcome::failed(request, &ProcessingResult::from(e));
        }

        let result = self.dispatcher.dispatch(request).await;
        if !result.is_success() {
            return ProcessOutcome::failed(request, &result);
        }

        let mut handles = Vec::with_capacity(result.outputs().len());
        for output in result.outputs() {
            let id = self
                .store
                .store(output.bytes.clone(), &output.filename, &output.content_type);
            match self.store.retrieve(&id) {
                Some(artifact) => handles.push(artifact.handle()),
                None => warn!(artifact_id = %id, "artifact expired before it was handed out"),
            }
        }
        ProcessOutcome::completed(request, handles)
    }

    pub fn retrieve(&self, id: &ArtifactId) -> Option<StoredArtifact> {
        self.store.retrieve(id)
    }

    pub fn evict(&self, id: &ArtifactId) -> bool {
        self.store.evict(id)
    }

    /// Write the payload to `dir/<filename>` and return the path.
    pub async fn download(&self, id: &ArtifactId, dir: &Path) -> Result<PathBuf, DownloadError> {
        let artifact = self.store.retrieve(id).ok_or(DownloadError::Expired(*id))?;
        let path = dir.join(safe_file_name(&artifact.filename, id));
        tokio::fs::write(&path, &artifact.payload)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;
        info!(artifact_id = %id, path = %path.display(), "artifact downloaded");
        Ok(path)
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// The page went to the background: sweep now.
    pub fn on_visibility_hidden(&self) -> Vec<ArtifactId> {
        self.store.sweep()
    }

    /// Synchronous teardown. The loop stops on its own shortly after.
    pub fn on_unload(&self) -> usize {
        if let Some(gc) = self
            .gc
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            gc.request_shutdown();
        }
        self.store.evict_all()
    }

    /// Stop the GC loop, wait for it, then drop every artifact.
    pub async fn dispose(&self) -> usize {
        let gc = self
            .gc
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(gc) = gc {
            gc.shutdown_and_join().await;
        }
        self.store.evict_all()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(gc) = self
            .gc
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            gc.request_shutdown();
        }
        self.store.evict_all();
    }
}

/// Last path component of `name`; falls back to the artifact id.
fn safe_file_name(name: &str, id: &ArtifactId) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => id.to_string(),
        other => other.to_string(),
    }
}
