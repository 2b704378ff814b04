//! Per-tool configuration.
//!
//! Each tool family has its own struct with named fields and documented
//! defaults. `ToolOptions::from_json` picks the struct from the tool id, so a
//! request can never carry rotate options into a merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::FolioError;
use super::tool::ToolId;

/// Merge has nothing to configure; inputs are concatenated in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeOptions {}

/// Split mode. Defaults to one output per page.
///
/// JSON: `{"mode":"individual"}` or `{"mode":"range","start":2,"end":5}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SplitOptions {
    #[default]
    Individual,
    /// 1-based, inclusive. Clamped to the document when applied.
    Range { start: u32, end: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    /// Flate-encode streams that are stored uncompressed.
    pub compress_streams: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            compress_streams: true,
        }
    }
}

/// Clockwise rotation applied on top of a page's current rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RotationAngle {
    #[default]
    Quarter,
    Half,
    ThreeQuarters,
    CounterQuarter,
}

impl RotationAngle {
    pub fn degrees(self) -> i64 {
        match self {
            RotationAngle::Quarter => 90,
            RotationAngle::Half => 180,
            RotationAngle::ThreeQuarters => 270,
            RotationAngle::CounterQuarter => -90,
        }
    }
}

impl TryFrom<i32> for RotationAngle {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            90 => Ok(RotationAngle::Quarter),
            180 => Ok(RotationAngle::Half),
            270 => Ok(RotationAngle::ThreeQuarters),
            -90 => Ok(RotationAngle::CounterQuarter),
            other => Err(format!(
                "rotation must be one of 90, 180, 270, -90 (got {other})"
            )),
        }
    }
}

impl From<RotationAngle> for i32 {
    fn from(angle: RotationAngle) -> Self {
        angle.degrees() as i32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateOptions {
    pub angle: RotationAngle,
    /// Page-spec string ("1,3-5"). `None` or `"all"` rotates every page.
    pub pages: Option<String>,
}

impl RotateOptions {
    /// The page-spec to apply, or `None` for every page.
    pub fn page_spec(&self) -> Option<&str> {
        match self.pages.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(spec) if spec.eq_ignore_ascii_case("all") => None,
            Some(spec) => Some(spec),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Page-spec string ("1,3-5").
    pub pages: String,
}

/// What to stamp on each page.
///
/// JSON: `{"literal":"DRAFT"}` or `"timestamp"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkText {
    Literal(String),
    /// Rendered as the processing time when the request is dispatched.
    Timestamp,
}

impl Default for WatermarkText {
    fn default() -> Self {
        WatermarkText::Literal("CONFIDENTIAL".to_string())
    }
}

impl WatermarkText {
    pub const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S UTC";

    pub fn resolve(&self, now: DateTime<Utc>) -> String {
        match self {
            WatermarkText::Literal(text) => text.clone(),
            WatermarkText::Timestamp => now.format(Self::TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Where the watermark sits, relative to the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    #[default]
    Center,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl WatermarkPosition {
    /// Horizontal and vertical anchor as fractions of the free space (0 = left/bottom).
    pub fn anchor(self) -> (f32, f32) {
        match self {
            WatermarkPosition::Center => (0.5, 0.5),
            WatermarkPosition::Top => (0.5, 1.0),
            WatermarkPosition::Bottom => (0.5, 0.0),
            WatermarkPosition::TopLeft => (0.0, 1.0),
            WatermarkPosition::TopRight => (1.0, 1.0),
            WatermarkPosition::BottomLeft => (0.0, 0.0),
            WatermarkPosition::BottomRight => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkOptions {
    pub text: WatermarkText,
    /// 0.0 (invisible) ..= 1.0 (opaque). Default 0.3.
    pub opacity: f32,
    /// Points. Default 48.
    pub font_size: f32,
    /// Fill gray level, 0.0 black ..= 1.0 white. Default 0.5.
    pub gray: f32,
    pub position: WatermarkPosition,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: WatermarkText::default(),
            opacity: 0.3,
            font_size: 48.0,
            gray: 0.5,
            position: WatermarkPosition::Center,
        }
    }
}

/// Margins in percent of the page's visible box. Default 10 on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 10.0,
            bottom: 10.0,
            left: 10.0,
        }
    }
}

/// protect-pdf / unlock-pdf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordOptions {
    pub password: String,
}

/// Options for tools that only exist on the remote backend.
///
/// The backend owns their meaning, so they are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteOptions {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Options of one request, keyed by tool family.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOptions {
    Merge(MergeOptions),
    Split(SplitOptions),
    Compress(CompressOptions),
    Rotate(RotateOptions),
    Extract(ExtractOptions),
    Watermark(WatermarkOptions),
    Crop(CropOptions),
    Password(PasswordOptions),
    Remote(RemoteOptions),
}

impl ToolOptions {
    /// Parse the JSON options for `tool`. `null` yields the tool's defaults.
    pub fn from_json(tool: ToolId, value: serde_json::Value) -> Result<Self, FolioError> {
        let value = match value {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        let invalid = |e: serde_json::Error| {
            FolioError::validation(format!("invalid options for {tool}: {e}"))
        };

        let options = match tool {
            ToolId::Merge => ToolOptions::Merge(serde_json::from_value(value).map_err(invalid)?),
            ToolId::Split => {
                // `{}` means the default mode
                let is_empty = value.as_object().is_some_and(|m| m.is_empty());
                if is_empty {
                    ToolOptions::Split(SplitOptions::default())
                } else {
                    ToolOptions::Split(serde_json::from_value(value).map_err(invalid)?)
                }
            }
            ToolId::Compress => {
                ToolOptions::Compress(serde_json::from_value(value).map_err(invalid)?)
            }
            ToolId::Rotate => ToolOptions::Rotate(serde_json::from_value(value).map_err(invalid)?),
            ToolId::Extract => {
                ToolOptions::Extract(serde_json::from_value(value).map_err(invalid)?)
            }
            ToolId::Watermark => {
                ToolOptions::Watermark(serde_json::from_value(value).map_err(invalid)?)
            }
            ToolId::Crop => ToolOptions::Crop(serde_json::from_value(value).map_err(invalid)?),
            ToolId::Protect | ToolId::Unlock => {
                ToolOptions::Password(serde_json::from_value(value).map_err(invalid)?)
            }
            _ => ToolOptions::Remote(serde_json::from_value(value).map_err(invalid)?),
        };
        Ok(options)
    }

    /// Defaults for tools whose options are all optional.
    pub fn default_for(tool: ToolId) -> Option<Self> {
        match tool {
            ToolId::Merge => Some(ToolOptions::Merge(MergeOptions::default())),
            ToolId::Split => Some(ToolOptions::Split(SplitOptions::default())),
            ToolId::Compress => Some(ToolOptions::Compress(CompressOptions::default())),
            ToolId::Rotate => Some(ToolOptions::Rotate(RotateOptions::default())),
            ToolId::Watermark => Some(ToolOptions::Watermark(WatermarkOptions::default())),
            ToolId::Crop => Some(ToolOptions::Crop(CropOptions::default())),
            ToolId::Extract | ToolId::Protect | ToolId::Unlock => None,
            _ => Some(ToolOptions::Remote(RemoteOptions::default())),
        }
    }

    /// Whether these options belong to `tool`.
    pub fn matches(&self, tool: ToolId) -> bool {
        match self {
            ToolOptions::Merge(_) => tool == ToolId::Merge,
            ToolOptions::Split(_) => tool == ToolId::Split,
            ToolOptions::Compress(_) => tool == ToolId::Compress,
            ToolOptions::Rotate(_) => tool == ToolId::Rotate,
            ToolOptions::Extract(_) => tool == ToolId::Extract,
            ToolOptions::Watermark(_) => tool == ToolId::Watermark,
            ToolOptions::Crop(_) => tool == ToolId::Crop,
            ToolOptions::Password(_) => matches!(tool, ToolId::Protect | ToolId::Unlock),
            ToolOptions::Remote(_) => ToolOptions::default_for(tool)
                .is_some_and(|d| matches!(d, ToolOptions::Remote(_))),
        }
    }

    /// Range checks that serde cannot express.
    pub fn validate(&self) -> Result<(), FolioError> {
        match self {
            ToolOptions::Extract(o) if o.pages.trim().is_empty() => {
                Err(FolioError::validation("select at least one page to extract"))
            }
            ToolOptions::Watermark(o) => {
                if let WatermarkText::Literal(text) = &o.text
                    && text.trim().is_empty()
                {
                    return Err(FolioError::validation("watermark text is empty"));
                }
                if !(0.0..=1.0).contains(&o.opacity) {
                    return Err(FolioError::validation("opacity must be between 0 and 1"));
                }
                if !(0.0..=1.0).contains(&o.gray) {
                    return Err(FolioError::validation("gray must be between 0 and 1"));
                }
                if !(o.font_size > 0.0 && o.font_size <= 500.0) {
                    return Err(FolioError::validation("font size must be between 0 and 500"));
                }
                Ok(())
            }
            ToolOptions::Crop(o) => {
                let sides = [o.top, o.right, o.bottom, o.left];
                if sides.iter().any(|m| !(0.0..100.0).contains(m)) {
                    return Err(FolioError::validation("crop margins must be between 0 and 100"));
                }
                if o.left + o.right >= 100.0 || o.top + o.bottom >= 100.0 {
                    return Err(FolioError::validation("crop margins leave no visible area"));
                }
                Ok(())
            }
            ToolOptions::Password(o) if o.password.is_empty() => {
                Err(FolioError::validation("password is required"))
            }
            _ => Ok(()),
        }
    }

    /// Replace values that depend on processing time (timestamp watermarks).
    pub fn resolved(&self, now: DateTime<Utc>) -> Self {
        match self {
            ToolOptions::Watermark(o) => ToolOptions::Watermark(WatermarkOptions {
                text: WatermarkText::Literal(o.text.resolve(now)),
                ..o.clone()
            }),
            other => other.clone(),
        }
    }

    /// JSON form sent to the remote backend.
    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            ToolOptions::Merge(o) => serde_json::to_value(o),
            ToolOptions::Split(o) => serde_json::to_value(o),
            ToolOptions::Compress(o) => serde_json::to_value(o),
            ToolOptions::Rotate(o) => serde_json::to_value(o),
            ToolOptions::Extract(o) => serde_json::to_value(o),
            ToolOptions::Watermark(o) => serde_json::to_value(o),
            ToolOptions::Crop(o) => serde_json::to_value(o),
            ToolOptions::Password(o) => serde_json::to_value(o),
            ToolOptions::Remote(o) => serde_json::to_value(o),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}
