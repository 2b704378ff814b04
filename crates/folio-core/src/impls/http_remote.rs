//! HttpRemote - reqwest によるリモート境界
//!
//! `POST <base_url>/<endpoint>` に multipart で送ります。
//! - `tool`: tool id
//! - `options`: JSON 文字列
//! - `files`: 入力ファイル（複数可、順序維持）
//!
//! 認証はオプションの bearer token のみです（取得はこのクレートの外）。

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::domain::errors::RemoteError;
use crate::domain::request::InputFile;
use crate::ports::{RemoteBoundary, RemoteCall, RemoteReply};

const HEALTH_ENDPOINT: &str = "health";

pub struct HttpRemote {
    client: Client,
    base_url: String,
    token: Option<String>,
    ready: AtomicBool,
}

impl HttpRemote {
    /// Build a client for `config`. Fails when no base URL is configured.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| RemoteError::NotReady("no processing backend configured".into()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
            ready: AtomicBool::new(false),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        endpoint_url(&self.base_url, endpoint)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a non-success response to an error.
    async fn check_response(&self, response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                self.ready.store(false, Ordering::SeqCst);
                Err(RemoteError::Unauthorized(format!("{status}")))
            }
            _ => Err(RemoteError::Rejected(format!("{status} - {}", body.trim()))),
        }
    }
}

fn file_part(file: &InputFile) -> Result<Part, RemoteError> {
    let content_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(&content_type)
        .map_err(|e| RemoteError::Transport(format!("invalid content type for {}: {e}", file.name)))
}

/// `<base>/<endpoint>` with exactly one slash between them.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

#[async_trait]
impl RemoteBoundary for HttpRemote {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn reconnect(&self) -> Result<(), RemoteError> {
        let response = self
            .request(self.client.get(self.url(HEALTH_ENDPOINT)))
            .send()
            .await
            .map_err(|e| RemoteError::NotReady(e.to_string()))?;
        self.check_response(response).await.map_err(|e| match e {
            RemoteError::Rejected(message) => RemoteError::NotReady(message),
            other => other,
        })?;

        self.ready.store(true, Ordering::SeqCst);
        debug!(base_url = %self.base_url, "processing backend is ready");
        Ok(())
    }

    async fn invoke(&self, endpoint: &str, call: RemoteCall) -> Result<RemoteReply, RemoteError> {
        let options = serde_json::to_string(&call.options)
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let mut form = Form::new()
            .text("tool", call.tool.as_str())
            .text("options", options);
        for file in &call.files {
            form = form.part("files", file_part(file)?);
        }

        let url = self.url(endpoint);
        debug!(%url, tool = %call.tool, files = call.files.len(), "invoking processing backend");

        let response = self
            .request(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "processing backend unreachable");
                RemoteError::Transport(e.to_string())
            })?;
        let response = self.check_response(response).await?;

        response
            .json::<RemoteReply>()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}
