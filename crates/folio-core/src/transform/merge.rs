use lopdf::{Document, Object, ObjectId};

use super::document;
use crate::domain::errors::TransformError;
use crate::domain::options::ToolOptions;
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

pub const MERGED_FILENAME: &str = "merged.pdf";

/// Concatenate the pages of every input, in input order.
pub fn merge(files: &[InputFile], options: &ToolOptions) -> Result<Vec<OutputFile>, TransformError> {
    let ToolOptions::Merge(_) = options else {
        return Err(TransformError::options_mismatch(ToolId::Merge));
    };
    let Some((first, rest)) = files.split_first() else {
        return Err(TransformError::Invalid("nothing to merge".into()));
    };

    let mut merged = document::load(first)?;
    document::flatten_inherited(&mut merged)?;
    document::detach_root_attributes(&mut merged)?;
    for file in rest {
        let mut next = document::load(file)?;
        document::flatten_inherited(&mut next)?;
        append(&mut merged, next)?;
    }
    merged.prune_objects();

    Ok(vec![OutputFile::pdf(MERGED_FILENAME, document::save(merged)?)])
}

/// Move every page of `secondary` to the end of `primary`'s page tree.
fn append(primary: &mut Document, mut secondary: Document) -> Result<(), TransformError> {
    secondary.renumber_objects_with(primary.max_id + 1);
    let secondary_page_ids: Vec<ObjectId> = secondary.get_pages().into_values().collect();

    primary.objects.extend(secondary.objects);
    primary.max_id = primary.max_id.max(secondary.max_id);

    let pages_root_id = document::pages_root(primary)?;

    {
        let pages_dict = document::page_dict_mut(primary, pages_root_id)?;
        let kids = pages_dict.get_mut(b"Kids").and_then(Object::as_array_mut)?;
        kids.extend(secondary_page_ids.iter().map(|id| Object::Reference(*id)));
        let count = pages_dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages_dict.set("Count", count + secondary_page_ids.len() as i64);
    }

    for page_id in secondary_page_ids {
        document::page_dict_mut(primary, page_id)?.set("Parent", Object::Reference(pages_root_id));
    }
    Ok(())
}
