//! Errors - エラー型と分類
//!
//! # 分類
//! - Validation: 処理前に検出される入力エラー（リトライ無意味）
//! - Transform: ローカル変換の失敗（壊れた PDF など。決定的なのでリトライしない）
//! - Remote: リモート境界の通信・処理エラー
//! - Unauthorized: 認証が必要／バックエンド未接続（UI は `requires_auth` で分岐）
//!
//! store の miss はエラーではありません（`Option::None`）。

use serde::Serialize;

use super::tool::{ToolId, UnknownTool};

/// ErrorKind は失敗の運用分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    Transform,
    Remote,
    Unauthorized,
}

/// FolioError はドメインエラー
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    UnknownTool(#[from] UnknownTool),

    #[error("no route registered for tool {0}")]
    NoRoute(ToolId),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl FolioError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::Validation(_) | FolioError::UnknownTool(_) | FolioError::NoRoute(_) => {
                ErrorKind::Validation
            }
            FolioError::Transform(_) => ErrorKind::Transform,
            FolioError::Remote(e) if e.requires_auth() => ErrorKind::Unauthorized,
            FolioError::Remote(_) => ErrorKind::Remote,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}

/// Failure raised by a local transform.
///
/// The display text is what the user sees, so most variants print the bare message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("could not read {name}: {message}")]
    Load { name: String, message: String },

    #[error("{0} is password protected")]
    Encrypted(String),

    #[error("{0} has no pages")]
    EmptyDocument(String),

    #[error("could not save document: {0}")]
    Save(String),

    #[error("{0}")]
    Document(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Custom(String),
}

impl TransformError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    pub fn options_mismatch(tool: ToolId) -> Self {
        Self::Invalid(format!("options do not belong to {tool}"))
    }
}

impl From<lopdf::Error> for TransformError {
    fn from(e: lopdf::Error) -> Self {
        Self::Document(e.to_string())
    }
}

/// Failure reported by, or while talking to, the remote boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("processing service is not available: {0}")]
    NotReady(String),

    #[error("sign in required: {0}")]
    Unauthorized(String),

    #[error("could not reach processing service: {0}")]
    Transport(String),

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response from processing service: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// 認証ゲート、または再接続後も未接続のバックエンド
    pub fn requires_auth(&self) -> bool {
        matches!(self, RemoteError::NotReady(_) | RemoteError::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_transform_error_displays_bare_message() {
        let err = FolioError::from(TransformError::msg("bad input"));
        assert_eq!(err.to_string(), "bad input");
        assert_eq!(err.kind(), ErrorKind::Transform);
        assert!(!err.requires_auth());
    }

    #[test]
    fn auth_and_unready_remote_errors_require_auth() {
        let unauthorized = FolioError::from(RemoteError::Unauthorized("token expired".into()));
        let not_ready = FolioError::from(RemoteError::NotReady("offline".into()));
        let rejected = FolioError::from(RemoteError::Rejected("too large".into()));

        assert!(unauthorized.requires_auth());
        assert!(not_ready.requires_auth());
        assert!(!rejected.requires_auth());
        assert_eq!(rejected.kind(), ErrorKind::Remote);
    }

    #[test]
    fn unknown_tool_is_a_validation_error() {
        let err = FolioError::from(UnknownTool("nope".into()));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn error_kind_serializes_screaming() {
        let s = serde_json::to_string(&ErrorKind::Unauthorized).unwrap();
        assert_eq!(s, "\"UNAUTHORIZED\"");
    }
}
