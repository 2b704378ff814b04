//! Domain identifiers (strongly-typed IDs).
//!
//! # ULID ベースの ID + Phantom type
//! 内部表現は ULID（timestamp 48bit + random）です。
//! Display は `{prefix}_{timestamp_ms}_{suffix}` 形式で、suffix は random 部分の
//! 下位 45bit を base-36 の 9 文字にしたものです。
//!
//! - `file_1718000000000_k3j9x0a1b` (ArtifactId)
//! - `req_1718000000000_0z81mfq2c` (RequestId)
//!
//! 衝突確率は無視できる程度ですが、一意性は保証しません。
//! `FromStr` で Display の逆変換ができます（CLI から ID を受け取るため）。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// Number of random bits kept in an id.
pub const SUFFIX_BITS: u32 = 45;
const SUFFIX_MASK: u128 = (1u128 << SUFFIX_BITS) - 1;
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "file", "req"）
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData なので実行時のサイズは ULID と同じです。
/// ArtifactId と RequestId は混同できません。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// Build an id from a millisecond timestamp and random bits.
    /// Only the low [`SUFFIX_BITS`] bits of `random` are kept.
    pub fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        Self {
            ulid: Ulid::from_parts(timestamp_ms, random & SUFFIX_MASK),
            _marker: PhantomData,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.ulid.timestamp_ms()
    }

    pub fn suffix(&self) -> u64 {
        (self.ulid.random() & SUFFIX_MASK) as u64
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            T::prefix(),
            self.timestamp_ms(),
            encode_base36(self.suffix())
        )
    }
}

/// ID 文字列のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("malformed id '{0}'")]
    Malformed(String),

    #[error("id '{value}' does not start with '{expected}_'")]
    WrongPrefix { value: String, expected: &'static str },
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || IdParseError::Malformed(s.to_string());

        // prefix にアンダースコアは含まれないので右から分割する
        let mut parts = s.rsplitn(3, '_');
        let suffix = parts.next().ok_or_else(malformed)?;
        let timestamp = parts.next().ok_or_else(malformed)?;
        let prefix = parts.next().ok_or_else(malformed)?;

        if prefix != T::prefix() {
            return Err(IdParseError::WrongPrefix {
                value: s.to_string(),
                expected: T::prefix(),
            });
        }

        let timestamp_ms: u64 = timestamp.parse().map_err(|_| malformed())?;
        let random = decode_base36(suffix).ok_or_else(malformed)?;
        if u128::from(random) > SUFFIX_MASK {
            return Err(malformed());
        }
        Ok(Self::from_parts(timestamp_ms, u128::from(random)))
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn encode_base36(mut value: u64) -> String {
    let mut buf = [b'0'; SUFFIX_LEN];
    for slot in buf.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    // 2^45 < 36^9 なので必ず 9 桁に収まる
    buf.iter().map(|&b| b as char).collect()
}

fn decode_base36(s: &str) -> Option<u64> {
    if s.len() != SUFFIX_LEN {
        return None;
    }
    s.chars().try_fold(0u64, |acc, c| {
        let digit = c.to_digit(36)?;
        if c.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(36)?.checked_add(u64::from(digit))
    })
}

// ========================================
// マーカー型の定義
// ========================================

/// Stored artifact のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum File {}

impl IdMarker for File {
    fn prefix() -> &'static str {
        "file"
    }
}

/// Processing request のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Request {}

impl IdMarker for Request {
    fn prefix() -> &'static str {
        "req"
    }
}

/// Identifier of an artifact held by the ephemeral store.
pub type ArtifactId = Id<File>;

/// Identifier of one processing request (used for log correlation).
pub type RequestId = Id<Request>;
