//! Outcome model: common result format for a processing request.
//!
//! Local transforms and the remote boundary fail in different ways; both are
//! folded into `ProcessingResult` so the caller only branches on the kind.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::errors::FolioError;
use super::request::PDF_CONTENT_TYPE;

/// SUCCESS / FAILURE, serialized as SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Success,
    Failure,
}

/// One produced file, before it is handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub filename: String,
    pub bytes: Bytes,
    pub content_type: String,
}

impl OutputFile {
    pub fn new(
        filename: impl Into<String>,
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn pdf(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(filename, bytes, PDF_CONTENT_TYPE)
    }
}

/// Result of `Dispatcher::dispatch`.
///
/// - `Success`: one or more outputs.
/// - `Failure`: a user-facing message; `requires_auth` is set when the remote
///   boundary turned the request away for lack of credentials (or stayed
///   unreachable after one reconnect), not because processing failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult {
    Success { outputs: Vec<OutputFile> },
    Failure { message: String, requires_auth: bool },
}

impl ProcessingResult {
    pub fn success(outputs: Vec<OutputFile>) -> Self {
        Self::Success { outputs }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            requires_auth: false,
        }
    }

    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            requires_auth: true,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::Failure { .. } => OutcomeKind::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind() == OutcomeKind::Success
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failure { message, .. } => Some(message.as_str()),
            Self::Success { .. } => None,
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Failure {
                requires_auth: true,
                ..
            }
        )
    }

    pub fn outputs(&self) -> &[OutputFile] {
        match self {
            Self::Success { outputs } => outputs,
            Self::Failure { .. } => &[],
        }
    }
}

impl From<FolioError> for ProcessingResult {
    fn from(e: FolioError) -> Self {
        Self::Failure {
            requires_auth: e.requires_auth(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{RemoteError, TransformError};

    #[test]
    fn outcome_kind_serializes_as_required_names() {
        let s = serde_json::to_string(&OutcomeKind::Success).unwrap();
        assert_eq!(s, "\"SUCCESS\"");

        let s = serde_json::to_string(&OutcomeKind::Failure).unwrap();
        assert_eq!(s, "\"FAILURE\"");
    }

    #[test]
    fn transform_error_becomes_plain_failure() {
        let result = ProcessingResult::from(FolioError::from(TransformError::msg("bad input")));
        assert_eq!(result.kind(), OutcomeKind::Failure);
        assert_eq!(result.message(), Some("bad input"));
        assert!(!result.requires_auth());
        assert!(result.outputs().is_empty());
    }

    #[test]
    fn unauthorized_remote_error_sets_flag() {
        let result =
            ProcessingResult::from(FolioError::from(RemoteError::Unauthorized("no token".into())));
        assert!(result.requires_auth());
    }

    #[test]
    fn success_exposes_outputs() {
        let result = ProcessingResult::success(vec![OutputFile::pdf("a.pdf", vec![1, 2])]);
        assert!(result.is_success());
        assert_eq!(result.outputs()[0].content_type, "application/pdf");
        assert_eq!(result.message(), None);
    }
}
