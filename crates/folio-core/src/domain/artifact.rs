//! Stored artifact and the views handed out to callers.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::ArtifactId;

/// A processed file held by the ephemeral store. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArtifact {
    pub id: ArtifactId,
    pub filename: String,
    pub content_type: String,
    pub payload: Bytes,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredArtifact {
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn age_ms(&self, now: DateTime<Utc>) -> u64 {
        (now - self.created_at).num_milliseconds().max(0) as u64
    }

    /// Past its retention window (strictly).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn handle(&self) -> ArtifactHandle {
        ArtifactHandle {
            id: self.id,
            filename: self.filename.clone(),
            size: self.size(),
            expires_at: self.expires_at,
        }
    }
}

/// What the caller keeps after processing: enough to ask for a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactHandle {
    pub id: ArtifactId,
    pub filename: String,
    pub size: u64,
    pub expires_at: DateTime<Utc>,
}

/// Diagnostics snapshot of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub count: usize,
    pub total_bytes: u64,
    pub oldest_age_ms: Option<u64>,
}
