//! lopdf helpers shared by the local transforms.

use bytes::Bytes;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::domain::errors::TransformError;
use crate::domain::request::InputFile;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when a page carries no usable MediaBox.
pub const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Parse an input file. Encrypted documents are refused.
pub fn load(file: &InputFile) -> Result<Document, TransformError> {
    let doc = Document::load_mem(&file.bytes).map_err(|e| TransformError::Load {
        name: file.name.clone(),
        message: e.to_string(),
    })?;
    if doc.trailer.has(b"Encrypt") {
        return Err(TransformError::Encrypted(file.name.clone()));
    }
    Ok(doc)
}

/// Like [`load`], but a document without pages is an error.
pub fn load_with_pages(file: &InputFile) -> Result<Document, TransformError> {
    let doc = load(file)?;
    if doc.get_pages().is_empty() {
        return Err(TransformError::EmptyDocument(file.name.clone()));
    }
    Ok(doc)
}

pub fn save(mut doc: Document) -> Result<Bytes, TransformError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| TransformError::Save(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Follow a reference to its target. Direct objects are returned as is.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, TransformError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

pub fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, TransformError> {
    Ok(doc.get_object(page_id)?.as_dict()?)
}

pub fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, TransformError> {
    Ok(doc.get_object_mut(page_id)?.as_dict_mut()?)
}

/// Look `key` up on the page, then on each ancestor.
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = Some(page_id);
    // 壊れた page tree の循環対策
    let mut depth = 0;
    while let Some(id) = current {
        if depth > 64 {
            return None;
        }
        depth += 1;
        let dict = doc.get_object(id).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

pub fn obj_to_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f as f32),
        _ => None,
    }
}

fn rect(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let arr = resolve(doc, obj).ok()?.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, value) in out.iter_mut().zip(arr) {
        *slot = obj_to_f32(resolve(doc, value).ok()?)?;
    }
    // normalize so that [0],[1] is the lower-left corner
    Some([
        out[0].min(out[2]),
        out[1].min(out[3]),
        out[0].max(out[2]),
        out[1].max(out[3]),
    ])
}

pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| rect(doc, obj))
        .unwrap_or(FALLBACK_MEDIA_BOX)
}

/// The visible region: CropBox if present, otherwise MediaBox.
pub fn effective_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    inherited_attribute(doc, page_id, b"CropBox")
        .and_then(|obj| rect(doc, obj))
        .unwrap_or_else(|| media_box(doc, page_id))
}

pub fn rect_object(rect: [f32; 4]) -> Object {
    Object::Array(rect.into_iter().map(Object::from).collect())
}

/// Copy inherited attributes onto every page, so pages can be moved to
/// another page tree without losing them.
pub fn flatten_inherited(doc: &mut Document) -> Result<(), TransformError> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        let mut copied = Vec::new();
        {
            let dict = page_dict(doc, page_id)?;
            for key in INHERITABLE {
                if dict.has(key) {
                    continue;
                }
                if let Some(value) = inherited_attribute(doc, page_id, key) {
                    copied.push((key.to_vec(), value.clone()));
                }
            }
        }
        let dict = page_dict_mut(doc, page_id)?;
        for (key, value) in copied {
            dict.set(key, value);
        }
    }
    Ok(())
}

/// Register `object` as `/<category>/<name>` in the page's resources.
///
/// The page ends up with its own inline Resources dictionary (shared and
/// inherited dictionaries are copied, never mutated).
pub fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    object: ObjectId,
) -> Result<(), TransformError> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(obj) => resolve(doc, obj)?.as_dict().cloned().unwrap_or_default(),
        None => Dictionary::new(),
    };

    let mut entries = match resources.get(category.as_bytes()) {
        Ok(obj) => resolve(doc, obj)?.as_dict().cloned().unwrap_or_default(),
        Err(_) => Dictionary::new(),
    };
    entries.set(name, Object::Reference(object));
    resources.set(category, Object::Dictionary(entries));

    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Keep only the given 1-based page numbers.
pub fn keep_pages(doc: &mut Document, keep: &[u32]) {
    let to_drop: Vec<u32> = doc
        .get_pages()
        .into_keys()
        .filter(|n| !keep.contains(n))
        .collect();
    if !to_drop.is_empty() {
        doc.delete_pages(&to_drop);
    }
    doc.prune_objects();
}

/// Root node of the page tree.
pub fn pages_root(doc: &Document) -> Result<ObjectId, TransformError> {
    doc.catalog()?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| TransformError::Document("document has no page tree".into()))
}

/// Remove the inheritable attributes from the page tree root.
///
/// Call after [`flatten_inherited`]; pages attached to the root later must
/// not pick up another document's values.
pub fn detach_root_attributes(doc: &mut Document) -> Result<(), TransformError> {
    let root_id = pages_root(doc)?;
    let root = page_dict_mut(doc, root_id)?;
    for key in INHERITABLE {
        root.remove(key);
    }
    Ok(())
}

/// Draw `overlay` on top of the page.
///
/// The page's own content is wrapped in `q ... Q` and the overlay goes in a
/// stream of its own, so graphics state left by the page stays with the page.
pub fn overlay_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    overlay: Vec<u8>,
) -> Result<(), TransformError> {
    let existing = match page_dict(doc, page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        Ok(_) => {
            return Err(TransformError::Document(
                "page /Contents is not a stream reference".into(),
            ));
        }
        Err(_) => Vec::new(),
    };

    let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let close = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    let stamp = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 3);
    contents.push(Object::Reference(open));
    contents.extend(existing);
    contents.push(Object::Reference(close));
    contents.push(Object::Reference(stamp));
    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

pub fn page_count(doc: &Document) -> usize {
    doc.get_pages().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::fixtures;

    #[test]
    fn garbage_fails_to_load() {
        let err = load(&InputFile::new("junk.pdf", b"not a pdf".to_vec())).unwrap_err();
        assert!(err.to_string().starts_with("could not read junk.pdf"));
    }

    #[test]
    fn inherited_media_box_is_found() {
        let doc = Document::load_mem(&fixtures::pdf_with_inherited_box()).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        assert_eq!(media_box(&doc, page_id), [0.0, 0.0, 400.0, 500.0]);
        assert_eq!(effective_box(&doc, page_id), [0.0, 0.0, 400.0, 500.0]);
    }

    #[test]
    fn flatten_copies_inherited_attributes() {
        let mut doc = Document::load_mem(&fixtures::pdf_with_inherited_box()).unwrap();
        flatten_inherited(&mut doc).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let dict = page_dict(&doc, page_id).unwrap();
        assert!(dict.has(b"MediaBox"));
        assert_eq!(dict.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
    }

    #[test]
    fn keep_pages_drops_the_rest() {
        let mut doc = Document::load_mem(&fixtures::pdf_with_pages(4)).unwrap();
        keep_pages(&mut doc, &[2, 4]);
        assert_eq!(page_count(&doc), 2);
        assert_eq!(
            fixtures::page_labels(&doc),
            vec!["page 2".to_string(), "page 4".to_string()]
        );
    }

    #[test]
    fn overlay_isolates_the_page_content() {
        let mut doc =
            Document::load_mem(&fixtures::pdf_with_content("1 0 0 1 50 50 cm 0 0 m 10 10 l S"))
                .unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        overlay_page_content(&mut doc, page_id, b"q 0 0 m 5 5 l S Q\n".to_vec()).unwrap();

        assert_eq!(
            fixtures::page_operators(&doc, page_id),
            vec!["q", "cm", "m", "l", "S", "Q", "q", "m", "l", "S", "Q"]
        );
    }

    #[test]
    fn overlay_keeps_every_existing_stream() {
        let mut doc = Document::load_mem(&fixtures::pdf_with_pages(1)).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        overlay_page_content(&mut doc, page_id, b"0 g\n".to_vec()).unwrap();
        overlay_page_content(&mut doc, page_id, b"1 g\n".to_vec()).unwrap();

        assert_eq!(
            fixtures::page_operators(&doc, page_id),
            vec!["q", "q", "BT", "Tf", "Td", "Tj", "ET", "Q", "g", "Q", "g"]
        );
    }

    #[test]
    fn detached_root_keeps_page_values() {
        let mut doc = Document::load_mem(&fixtures::pdf_with_inherited_box()).unwrap();
        flatten_inherited(&mut doc).unwrap();
        detach_root_attributes(&mut doc).unwrap();

        let root = page_dict(&doc, pages_root(&doc).unwrap()).unwrap();
        assert!(!root.has(b"Rotate"));
        assert!(!root.has(b"MediaBox"));

        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        assert_eq!(media_box(&doc, page_id), [0.0, 0.0, 400.0, 500.0]);
    }
}
