//! ToolId - tool identifier と静的な属性
//!
//! tool identifier は routing のキーです。文字列で受け取った ID は
//! 起動時・リクエスト受付時に `ToolId` に変換するので、未知の tool は
//! dispatch まで届きません。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every tool the suite knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolId {
    #[serde(rename = "merge-pdf")]
    Merge,
    #[serde(rename = "split-pdf")]
    Split,
    #[serde(rename = "compress-pdf")]
    Compress,
    #[serde(rename = "rotate-pdf")]
    Rotate,
    #[serde(rename = "extract-pages")]
    Extract,
    #[serde(rename = "watermark-pdf")]
    Watermark,
    #[serde(rename = "crop-pdf")]
    Crop,
    #[serde(rename = "protect-pdf")]
    Protect,
    #[serde(rename = "unlock-pdf")]
    Unlock,
    #[serde(rename = "pdf-to-word")]
    PdfToWord,
    #[serde(rename = "pdf-to-excel")]
    PdfToExcel,
    #[serde(rename = "pdf-to-powerpoint")]
    PdfToPowerpoint,
    #[serde(rename = "pdf-to-jpg")]
    PdfToJpg,
    #[serde(rename = "word-to-pdf")]
    WordToPdf,
    #[serde(rename = "jpg-to-pdf")]
    JpgToPdf,
    #[serde(rename = "html-to-pdf")]
    HtmlToPdf,
    #[serde(rename = "ocr-pdf")]
    Ocr,
    #[serde(rename = "repair-pdf")]
    Repair,
    #[serde(rename = "sign-pdf")]
    Sign,
}

impl ToolId {
    pub const ALL: [ToolId; 19] = [
        ToolId::Merge,
        ToolId::Split,
        ToolId::Compress,
        ToolId::Rotate,
        ToolId::Extract,
        ToolId::Watermark,
        ToolId::Crop,
        ToolId::Protect,
        ToolId::Unlock,
        ToolId::PdfToWord,
        ToolId::PdfToExcel,
        ToolId::PdfToPowerpoint,
        ToolId::PdfToJpg,
        ToolId::WordToPdf,
        ToolId::JpgToPdf,
        ToolId::HtmlToPdf,
        ToolId::Ocr,
        ToolId::Repair,
        ToolId::Sign,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::Merge => "merge-pdf",
            ToolId::Split => "split-pdf",
            ToolId::Compress => "compress-pdf",
            ToolId::Rotate => "rotate-pdf",
            ToolId::Extract => "extract-pages",
            ToolId::Watermark => "watermark-pdf",
            ToolId::Crop => "crop-pdf",
            ToolId::Protect => "protect-pdf",
            ToolId::Unlock => "unlock-pdf",
            ToolId::PdfToWord => "pdf-to-word",
            ToolId::PdfToExcel => "pdf-to-excel",
            ToolId::PdfToPowerpoint => "pdf-to-powerpoint",
            ToolId::PdfToJpg => "pdf-to-jpg",
            ToolId::WordToPdf => "word-to-pdf",
            ToolId::JpgToPdf => "jpg-to-pdf",
            ToolId::HtmlToPdf => "html-to-pdf",
            ToolId::Ocr => "ocr-pdf",
            ToolId::Repair => "repair-pdf",
            ToolId::Sign => "sign-pdf",
        }
    }

    /// Minimum number of input files a request for this tool must carry.
    pub fn min_inputs(self) -> usize {
        match self {
            ToolId::Merge => 2,
            _ => 1,
        }
    }

    /// Whether every input must be a PDF.
    ///
    /// The `*-to-pdf` converters take other formats.
    pub fn requires_pdf_input(self) -> bool {
        !matches!(
            self,
            ToolId::WordToPdf | ToolId::JpgToPdf | ToolId::HtmlToPdf
        )
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool '{0}'")]
pub struct UnknownTool(pub String);

impl FromStr for ToolId {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolId::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}
