//! Processing request: the files and options handed to the dispatcher.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::errors::FolioError;
use super::ids::RequestId;
use super::options::ToolOptions;
use super::tool::ToolId;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// One user-selected input file.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub name: String,
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            content_type: None,
            last_modified: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared as PDF by extension or content type.
    pub fn is_pdf(&self) -> bool {
        let by_name = self.name.to_ascii_lowercase().ends_with(".pdf");
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE));
        by_name || by_type
    }

    /// File name without a trailing `.pdf`.
    pub fn stem(&self) -> &str {
        let name = self.name.as_str();
        if name.len() > 4 && name.to_ascii_lowercase().ends_with(".pdf") {
            &name[..name.len() - 4]
        } else {
            name
        }
    }
}

/// A tool invocation. Not persisted anywhere.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    pub id: RequestId,
    pub tool: ToolId,
    /// Order matters: merge keeps it in the output.
    pub files: Vec<InputFile>,
    pub options: ToolOptions,
}

impl ProcessingRequest {
    pub fn new(id: RequestId, tool: ToolId, files: Vec<InputFile>, options: ToolOptions) -> Self {
        Self {
            id,
            tool,
            files,
            options,
        }
    }

    /// Checks run before any processing starts.
    ///
    /// - at least one file, and the tool's minimum count
    /// - options belong to the tool and are in range
    /// - every file within `max_file_bytes`
    /// - PDF-only tools get PDFs
    pub fn validate(&self, max_file_bytes: u64) -> Result<(), FolioError> {
        if self.files.is_empty() {
            return Err(FolioError::validation("select at least one file"));
        }
        let min = self.tool.min_inputs();
        if self.files.len() < min {
            return Err(FolioError::validation(format!(
                "{} needs at least {min} files",
                self.tool
            )));
        }
        if !self.options.matches(self.tool) {
            return Err(FolioError::validation(format!(
                "options do not belong to {}",
                self.tool
            )));
        }
        self.options.validate()?;

        for file in &self.files {
            if file.size() > max_file_bytes {
                return Err(FolioError::validation(format!(
                    "{} is larger than the {} MB limit",
                    file.name,
                    max_file_bytes / (1024 * 1024)
                )));
            }
            if self.tool.requires_pdf_input() && !file.is_pdf() {
                return Err(FolioError::validation(format!(
                    "{} is not a PDF file",
                    file.name
                )));
            }
        }
        Ok(())
    }
}
