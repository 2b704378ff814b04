use super::document;
use crate::domain::errors::TransformError;
use crate::domain::options::{SplitOptions, ToolOptions};
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

/// Split the first input, either into single pages or one page range.
pub fn split(files: &[InputFile], options: &ToolOptions) -> Result<Vec<OutputFile>, TransformError> {
    let ToolOptions::Split(mode) = options else {
        return Err(TransformError::options_mismatch(ToolId::Split));
    };
    let Some(file) = files.first() else {
        return Err(TransformError::Invalid("nothing to split".into()));
    };
    let source = document::load_with_pages(file)?;
    let page_count = document::page_count(&source) as u32;

    match *mode {
        SplitOptions::Individual => (1..=page_count)
            .map(|page| {
                let mut doc = source.clone();
                document::keep_pages(&mut doc, &[page]);
                let name = format!("{}_page_{page}.pdf", file.stem());
                Ok(OutputFile::pdf(name, document::save(doc)?))
            })
            .collect(),
        SplitOptions::Range { start, end } => {
            let (first, last) = clamp_range(start, end, page_count);
            let keep: Vec<u32> = (first..=last).collect();
            let mut doc = source;
            // first > last leaves an empty selection: the output has no pages
            document::keep_pages(&mut doc, &keep);
            let name = format!("{}_pages_{first}-{last}.pdf", file.stem());
            Ok(vec![OutputFile::pdf(name, document::save(doc)?)])
        }
    }
}

/// 1-based inclusive range clamped to `1..=page_count`.
fn clamp_range(start: u32, end: u32, page_count: u32) -> (u32, u32) {
    (start.clamp(1, page_count), end.clamp(1, page_count))
}
