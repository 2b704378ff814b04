//! Status - `App::process` の結果
//!
//! 出力はストアに登録済みで、呼び出し側は handle（id + ファイル名 + サイズ）だけを持ちます。

use serde::Serialize;

use crate::domain::artifact::ArtifactHandle;
use crate::domain::ids::RequestId;
use crate::domain::outcome::{OutcomeKind, ProcessingResult};
use crate::domain::request::ProcessingRequest;
use crate::domain::tool::ToolId;

/// What the caller gets back for one request.
///
/// JSON: `{"kind":"SUCCESS", ...}` / `{"kind":"FAILURE", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ProcessOutcome {
    #[serde(rename = "SUCCESS")]
    Completed {
        request_id: RequestId,
        tool: ToolId,
        artifacts: Vec<ArtifactHandle>,
    },
    #[serde(rename = "FAILURE")]
    Failed {
        request_id: RequestId,
        tool: ToolId,
        message: String,
        requires_auth: bool,
    },
}

impl ProcessOutcome {
    pub fn completed(request: &ProcessingRequest, artifacts: Vec<ArtifactHandle>) -> Self {
        Self::Completed {
            request_id: request.id,
            tool: request.tool,
            artifacts,
        }
    }

    /// Failure outcome for a non-success result.
    pub fn failed(request: &ProcessingRequest, result: &ProcessingResult) -> Self {
        Self::Failed {
            request_id: request.id,
            tool: request.tool,
            message: result.message().unwrap_or_default().to_string(),
            requires_auth: result.requires_auth(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Completed { .. } => OutcomeKind::Success,
            Self::Failed { .. } => OutcomeKind::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind() == OutcomeKind::Success
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Completed { request_id, .. } | Self::Failed { request_id, .. } => *request_id,
        }
    }

    pub fn artifacts(&self) -> &[ArtifactHandle] {
        match self {
            Self::Completed { artifacts, .. } => artifacts,
            Self::Failed { .. } => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message.as_str()),
            Self::Completed { .. } => None,
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                requires_auth: true,
                ..
            }
        )
    }
}
