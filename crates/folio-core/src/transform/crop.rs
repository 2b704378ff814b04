use super::document;
use crate::domain::errors::TransformError;
use crate::domain::options::{CropOptions, ToolOptions};
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

/// Set every page's CropBox from percentage margins of its visible box.
pub fn crop(files: &[InputFile], options: &ToolOptions) -> Result<Vec<OutputFile>, TransformError> {
    let ToolOptions::Crop(opts) = options else {
        return Err(TransformError::options_mismatch(ToolId::Crop));
    };

    files
        .iter()
        .map(|file| {
            let mut doc = document::load_with_pages(file)?;
            for page_id in doc.get_pages().into_values() {
                let cropped = crop_box(document::effective_box(&doc, page_id), opts);
                document::page_dict_mut(&mut doc, page_id)?
                    .set("CropBox", document::rect_object(cropped));
            }
            let name = format!("{}_cropped.pdf", file.stem());
            Ok(OutputFile::pdf(name, document::save(doc)?))
        })
        .collect()
}

fn crop_box([llx, lly, urx, ury]: [f32; 4], margins: &CropOptions) -> [f32; 4] {
    let width = urx - llx;
    let height = ury - lly;
    [
        llx + width * margins.left / 100.0,
        lly + height * margins.bottom / 100.0,
        urx - width * margins.right / 100.0,
        ury - height * margins.top / 100.0,
    ]
}
