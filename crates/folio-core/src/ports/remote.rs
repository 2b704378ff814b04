//! RemoteBoundary port - バックエンド処理への境界
//!
//! ローカルの PDF ライブラリで扱えない処理（OCR・変換・暗号化）は
//! ここを通してリモートに送ります。リモート側の実装は不透明です。
//!
//! # 実装
//! - **HttpRemote**: reqwest で multipart POST

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::domain::errors::RemoteError;
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

/// Error codes in a reply that mean "sign in first".
pub const AUTH_ERROR_CODES: [&str; 3] = ["UNAUTHORIZED", "FORBIDDEN", "AUTH_REQUIRED"];

/// One call to the remote backend.
#[derive(Debug, Clone)]
pub struct RemoteCall {
    pub tool: ToolId,
    pub options: serde_json::Value,
    pub files: Vec<InputFile>,
}

/// Reply envelope: `{ "data": {...}, "error": {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteReply {
    #[serde(default)]
    pub data: Option<RemoteData>,
    #[serde(default)]
    pub error: Option<RemoteFault>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteData {
    #[serde(default)]
    pub files: Vec<RemoteFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Standard base64.
    pub content_base64: String,
}

fn default_content_type() -> String {
    crate::domain::request::PDF_CONTENT_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFault {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl RemoteFile {
    pub fn from_output(output: &OutputFile) -> Self {
        Self {
            name: output.filename.clone(),
            content_type: output.content_type.clone(),
            content_base64: STANDARD.encode(&output.bytes),
        }
    }
}

impl RemoteReply {
    pub fn with_files(files: Vec<RemoteFile>) -> Self {
        Self {
            data: Some(RemoteData { files }),
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            data: None,
            error: Some(RemoteFault {
                message: message.into(),
                code: code.map(str::to_string),
            }),
        }
    }

    /// Decode the reply into output files.
    ///
    /// An `error` field wins over `data`. A reply with neither, or with no
    /// files, is malformed.
    pub fn into_outputs(self) -> Result<Vec<OutputFile>, RemoteError> {
        if let Some(fault) = self.error {
            let is_auth = fault
                .code
                .as_deref()
                .is_some_and(|c| AUTH_ERROR_CODES.iter().any(|a| a.eq_ignore_ascii_case(c)));
            return Err(if is_auth {
                RemoteError::Unauthorized(fault.message)
            } else {
                RemoteError::Rejected(fault.message)
            });
        }

        let files = self.data.map(|d| d.files).unwrap_or_default();
        if files.is_empty() {
            return Err(RemoteError::Malformed("reply contained no files".to_string()));
        }

        files
            .into_iter()
            .map(|f| {
                let bytes = STANDARD.decode(f.content_base64.as_bytes()).map_err(|e| {
                    RemoteError::Malformed(format!("{} is not valid base64: {e}", f.name))
                })?;
                Ok(OutputFile::new(f.name, bytes, f.content_type))
            })
            .collect()
    }
}

/// RemoteBoundary はリモート処理の呼び出し口
///
/// # Retry
/// - 呼び出し側（Dispatcher）が `is_ready() == false` のとき 1 回だけ `reconnect()` する
/// - boundary 自身はリトライしない
#[async_trait]
pub trait RemoteBoundary: Send + Sync {
    fn is_ready(&self) -> bool;

    async fn reconnect(&self) -> Result<(), RemoteError>;

    async fn invoke(&self, endpoint: &str, call: RemoteCall) -> Result<RemoteReply, RemoteError>;
}
