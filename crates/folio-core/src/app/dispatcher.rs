//! Dispatcher - tool id から処理を選んで実行
//!
//! # フロー
//! 1. RouteTable で Local / Remote を決める
//! 2. Local: blocking thread で transform を実行（リトライなし）
//! 3. Remote: 未接続なら 1 回だけ reconnect、その後 invoke
//! 4. 結果を `ProcessingResult` に正規化（失敗は値として返す）
//!
//! 結果の保存はしません（`App::process` が担当）。

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::{FolioError, RemoteError, TransformError};
use crate::domain::outcome::{OutputFile, ProcessingResult};
use crate::domain::request::ProcessingRequest;
use crate::domain::tool::ToolId;
use crate::ports::{Clock, DispatchStrategy, RemoteBoundary, RemoteCall, Route, TransformFn};

pub struct Dispatcher {
    routes: Arc<dyn DispatchStrategy>,
    remote: Option<Arc<dyn RemoteBoundary>>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(
        routes: Arc<dyn DispatchStrategy>,
        remote: Option<Arc<dyn RemoteBoundary>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            routes,
            remote,
            clock,
        }
    }

    pub fn route(&self, tool: ToolId) -> Result<Route, FolioError> {
        self.routes.select_route(tool)
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Run one request. Never fails: errors come back as `Failure`.
    pub async fn dispatch(&self, request: &ProcessingRequest) -> ProcessingResult {
        match self.try_dispatch(request).await {
            Ok(outputs) => {
                info!(
                    request_id = %request.id,
                    tool = %request.tool,
                    outputs = outputs.len(),
                    "request processed"
                );
                ProcessingResult::success(outputs)
            }
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    tool = %request.tool,
                    kind = ?e.kind(),
                    error = %e,
                    "request failed"
                );
                ProcessingResult::from(e)
            }
        }
    }

    async fn try_dispatch(&self, request: &ProcessingRequest) -> Result<Vec<OutputFile>, FolioError> {
        match self.routes.select_route(request.tool)? {
            Route::Local(transform) => self.run_local(transform, request).await,
            Route::Remote(endpoint) => self.run_remote(endpoint, request).await,
        }
    }

    async fn run_local(
        &self,
        transform: TransformFn,
        request: &ProcessingRequest,
    ) -> Result<Vec<OutputFile>, FolioError> {
        let files = request.files.clone();
        let options = request.options.resolved(self.clock.now());

        // lopdf は同期 API なので runtime のスレッドを塞がない
        let outputs = tokio::task::spawn_blocking(move || transform(&files, &options))
            .await
            .map_err(|e| TransformError::msg(format!("processing was interrupted: {e}")))??;
        Ok(outputs)
    }

    async fn run_remote(
        &self,
        endpoint: &'static str,
        request: &ProcessingRequest,
    ) -> Result<Vec<OutputFile>, FolioError> {
        let Some(remote) = &self.remote else {
            return Err(RemoteError::NotReady("no processing backend configured".into()).into());
        };

        if !remote.is_ready() {
            match remote.reconnect().await {
                Err(RemoteError::Unauthorized(message)) => {
                    return Err(RemoteError::Unauthorized(message).into());
                }
                Err(e) => return Err(RemoteError::NotReady(e.to_string()).into()),
                Ok(()) if !remote.is_ready() => {
                    return Err(
                        RemoteError::NotReady("processing backend did not come up".into()).into(),
                    );
                }
                Ok(()) => {}
            }
        }

        let call = RemoteCall {
            tool: request.tool,
            options: request.options.resolved(self.clock.now()).to_json(),
            files: request.files.clone(),
        };
        let reply = remote.invoke(endpoint, call).await?;
        Ok(reply.into_outputs()?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::ids::RequestId;
    use crate::domain::options::{MergeOptions, RemoteOptions, ToolOptions};
    use crate::domain::request::InputFile;
    use crate::impls::RouteTable;
    use crate::ports::{RemoteFile, RemoteReply, SystemClock};
    use crate::transform::fixtures;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scripted remote boundary.
    pub(crate) struct MockRemote {
        ready: AtomicBool,
        /// Whether `reconnect` brings the boundary up.
        comes_up: bool,
        pub reconnects: AtomicUsize,
        pub calls: Mutex<Vec<(String, ToolId, serde_json::Value, usize)>>,
        reply: Result<RemoteReply, RemoteError>,
    }

    impl MockRemote {
        pub(crate) fn ready(reply: Result<RemoteReply, RemoteError>) -> Self {
            Self {
                ready: AtomicBool::new(true),
                comes_up: true,
                reconnects: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }

        pub(crate) fn offline(comes_up: bool, reply: Result<RemoteReply, RemoteError>) -> Self {
            Self {
                ready: AtomicBool::new(false),
                comes_up,
                ..Self::ready(reply)
            }
        }

        pub(crate) fn one_file(name: &str, bytes: &[u8]) -> Result<RemoteReply, RemoteError> {
            let output = OutputFile::new(name, bytes.to_vec(), "application/octet-stream");
            Ok(RemoteReply::with_files(vec![RemoteFile::from_output(&output)]))
        }
    }

    #[async_trait]
    impl RemoteBoundary for MockRemote {
        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        async fn reconnect(&self) -> Result<(), RemoteError> {
            self.reconnects.fetch_add(1, Ordering::SeqCst);
            if self.comes_up {
                self.ready.store(true, Ordering::SeqCst);
            }
            Ok(())
        }

        async fn invoke(&self, endpoint: &str, call: RemoteCall) -> Result<RemoteReply, RemoteError> {
            self.calls.lock().unwrap().push((
                endpoint.to_string(),
                call.tool,
                call.options,
                call.files.len(),
            ));
            self.reply.clone()
        }
    }

    fn failing(_: &[InputFile], _: &ToolOptions) -> Result<Vec<OutputFile>, TransformError> {
        Err(TransformError::msg("bad input"))
    }

    fn dispatcher(routes: RouteTable, remote: Option<Arc<MockRemote>>) -> Dispatcher {
        Dispatcher::new(
            Arc::new(routes),
            remote.map(|r| r as Arc<dyn RemoteBoundary>),
            Arc::new(SystemClock),
        )
    }

    fn request(tool: ToolId, files: Vec<InputFile>, options: ToolOptions) -> ProcessingRequest {
        ProcessingRequest::new(RequestId::from_parts(1, 7), tool, files, options)
    }

    fn ocr_request() -> ProcessingRequest {
        request(
            ToolId::Ocr,
            vec![fixtures::pdf_file("scan.pdf", 1)],
            ToolOptions::Remote(RemoteOptions::default()),
        )
    }

    #[tokio::test]
    async fn local_route_runs_the_transform() {
        let d = dispatcher(RouteTable::standard(), None);
        let req = request(
            ToolId::Merge,
            vec![fixtures::pdf_file("a.pdf", 1), fixtures::pdf_file("b.pdf", 2)],
            ToolOptions::Merge(MergeOptions {}),
        );

        let result = d.dispatch(&req).await;
        assert!(result.is_success());
        let doc = fixtures::open(&result.outputs()[0].bytes);
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[tokio::test]
    async fn local_failure_carries_the_exact_message() {
        let mut routes = RouteTable::new();
        routes.set(ToolId::Merge, Route::Local(failing));
        let d = dispatcher(routes, None);
        let req = request(
            ToolId::Merge,
            vec![fixtures::pdf_file("a.pdf", 1)],
            ToolOptions::Merge(MergeOptions {}),
        );

        let result = d.dispatch(&req).await;
        assert_eq!(result.message(), Some("bad input"));
        assert!(!result.requires_auth());
    }

    #[tokio::test]
    async fn missing_route_is_a_failure() {
        let d = dispatcher(RouteTable::new(), None);
        let result = d.dispatch(&ocr_request()).await;
        assert!(!result.is_success());
        assert!(!result.requires_auth());
    }

    #[tokio::test]
    async fn remote_route_sends_tool_and_options() {
        let remote = Arc::new(MockRemote::ready(MockRemote::one_file("scan.pdf", b"ocr")));
        let d = dispatcher(RouteTable::standard(), Some(remote.clone()));

        let result = d.dispatch(&ocr_request()).await;
        assert!(result.is_success());
        assert_eq!(&result.outputs()[0].bytes[..], b"ocr");

        let calls = remote.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ocr-pdf");
        assert_eq!(calls[0].1, ToolId::Ocr);
        assert_eq!(calls[0].3, 1);
        assert_eq!(remote.reconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_backend_requires_auth() {
        let d = dispatcher(RouteTable::standard(), None);
        let result = d.dispatch(&ocr_request()).await;
        assert!(result.requires_auth());
    }

    #[tokio::test]
    async fn unready_backend_gets_one_reconnect() {
        let remote = Arc::new(MockRemote::offline(true, MockRemote::one_file("x.pdf", b"ok")));
        let d = dispatcher(RouteTable::standard(), Some(remote.clone()));

        assert!(d.dispatch(&ocr_request()).await.is_success());
        assert_eq!(remote.reconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backend_that_stays_down_requires_auth() {
        let remote = Arc::new(MockRemote::offline(false, MockRemote::one_file("x.pdf", b"ok")));
        let d = dispatcher(RouteTable::standard(), Some(remote.clone()));

        let result = d.dispatch(&ocr_request()).await;
        assert!(result.requires_auth());
        assert_eq!(remote.reconnects.load(Ordering::SeqCst), 1);
        assert!(remote.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_errors_become_failures() {
        let remote = Arc::new(MockRemote::ready(Err(RemoteError::Rejected(
            "file too large".into(),
        ))));
        let d = dispatcher(RouteTable::standard(), Some(remote));
        let result = d.dispatch(&ocr_request()).await;
        assert_eq!(result.message(), Some("file too large"));
        assert!(!result.requires_auth());

        let remote = Arc::new(MockRemote::ready(Ok(RemoteReply::with_error(
            "login first",
            Some("UNAUTHORIZED"),
        ))));
        let d = dispatcher(RouteTable::standard(), Some(remote));
        assert!(d.dispatch(&ocr_request()).await.requires_auth());
    }
}
