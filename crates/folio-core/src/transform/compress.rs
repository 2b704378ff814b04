use lopdf::{Document, Object};

use super::document;
use crate::domain::errors::TransformError;
use crate::domain::options::ToolOptions;
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

/// Info entries dropped on compression.
pub const STRIPPED_INFO_KEYS: [&[u8]; 6] = [
    b"Title",
    b"Author",
    b"Subject",
    b"Keywords",
    b"Producer",
    b"Creator",
];

/// Strip descriptive metadata, drop unreferenced objects and re-save.
pub fn compress(
    files: &[InputFile],
    options: &ToolOptions,
) -> Result<Vec<OutputFile>, TransformError> {
    let ToolOptions::Compress(opts) = options else {
        return Err(TransformError::options_mismatch(ToolId::Compress));
    };

    files
        .iter()
        .map(|file| {
            let mut doc = document::load(file)?;
            strip_info(&mut doc);
            doc.prune_objects();
            if opts.compress_streams {
                doc.compress();
            }
            let name = format!("{}_compressed.pdf", file.stem());
            Ok(OutputFile::pdf(name, document::save(doc)?))
        })
        .collect()
}

fn strip_info(doc: &mut Document) {
    let info = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(id) => doc.get_object_mut(id).and_then(Object::as_dict_mut).ok(),
        Err(_) => doc.trailer.get_mut(b"Info").and_then(Object::as_dict_mut).ok(),
    };
    if let Some(info) = info {
        for key in STRIPPED_INFO_KEYS {
            info.remove(key);
        }
    }
}
