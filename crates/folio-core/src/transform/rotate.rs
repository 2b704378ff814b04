use lopdf::Object;

use super::document;
use super::page_spec::parse_page_spec;
use crate::domain::errors::TransformError;
use crate::domain::options::ToolOptions;
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

/// Add a clockwise rotation to every page, or to a page-spec subset.
pub fn rotate(files: &[InputFile], options: &ToolOptions) -> Result<Vec<OutputFile>, TransformError> {
    let ToolOptions::Rotate(opts) = options else {
        return Err(TransformError::options_mismatch(ToolId::Rotate));
    };
    let degrees = opts.angle.degrees();

    files
        .iter()
        .map(|file| {
            let mut doc = document::load_with_pages(file)?;
            let pages = doc.get_pages();

            let targets: Vec<_> = match opts.page_spec() {
                None => pages.values().copied().collect(),
                Some(spec) => parse_page_spec(spec, pages.len())
                    .into_iter()
                    .filter_map(|index| pages.get(&(index as u32 + 1)).copied())
                    .collect(),
            };
            if targets.is_empty() {
                return Err(TransformError::Invalid(format!(
                    "no pages of {} match the selection",
                    file.name
                )));
            }

            for page_id in targets {
                let current = document::inherited_attribute(&doc, page_id, b"Rotate")
                    .and_then(|o| o.as_i64().ok())
                    .unwrap_or(0);
                let rotation = normalize(current + degrees);
                document::page_dict_mut(&mut doc, page_id)?.set("Rotate", Object::Integer(rotation));
            }

            let name = format!("{}_rotated.pdf", file.stem());
            Ok(OutputFile::pdf(name, document::save(doc)?))
        })
        .collect()
}

/// Into `[0, 360)`.
fn normalize(degrees: i64) -> i64 {
    degrees.rem_euclid(360)
}
