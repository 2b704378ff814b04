//! Test PDFs built in memory with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::domain::request::InputFile;

/// A document with `n` Letter pages. Page `i` carries `/Label (page i)`.
pub fn pdf_with_pages(n: usize) -> Vec<u8> {
    let labels: Vec<String> = (1..=n).map(|i| format!("page {i}")).collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    pdf_with_labels(&labels)
}

pub fn pdf_with_labels(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];

    let mut page_ids = Vec::new();
    for label in labels {
        let content_str = format!("BT /F1 12 Tf 72 720 Td ({label}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_str.into_bytes()));

        let resources = dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        };
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
            "Resources" => resources,
            "Label" => Object::string_literal(*label),
        }));
    }

    finish(doc, page_ids, dictionary! {})
}

/// One Letter page drawn by `content`, with no resources.
pub fn pdf_with_content(content: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
        "Contents" => Object::Reference(content_id),
    });
    finish(doc, vec![page_id], dictionary! {})
}

/// One page whose MediaBox (400x500) and Rotate (90) live on the page tree root.
pub fn pdf_with_inherited_box() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 10 10 l S".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Contents" => Object::Reference(content_id),
        "Label" => Object::string_literal("page 1"),
    });
    finish(
        doc,
        vec![page_id],
        dictionary! {
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(400),
                Object::Integer(500),
            ],
            "Rotate" => Object::Integer(90),
        },
    )
}

/// A document with Info metadata and an unreferenced object.
pub fn pdf_with_metadata() -> Vec<u8> {
    let mut doc = Document::load_mem(&pdf_with_pages(1)).expect("fixture loads");
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Quarterly report"),
        "Author" => Object::string_literal("Finance"),
        "Subject" => Object::string_literal("Numbers"),
        "Keywords" => Object::string_literal("q3, revenue"),
        "Producer" => Object::string_literal("Some Producer"),
        "Creator" => Object::string_literal("Some Creator"),
        "CreationDate" => Object::string_literal("D:20240101000000Z"),
    });
    doc.trailer.set("Info", Object::Reference(info_id));
    doc.add_object(Stream::new(dictionary! {}, vec![b'x'; 4096]));
    to_bytes(doc)
}

fn finish(mut doc: Document, page_ids: Vec<ObjectId>, mut pages: lopdf::Dictionary) -> Vec<u8> {
    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    pages.set("Type", "Pages");
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set("Kids", kids);
    let pages_id = doc.add_object(pages);

    for &pid in &page_ids {
        if let Ok(page) = doc.get_object_mut(pid).and_then(Object::as_dict_mut) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    to_bytes(doc)
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("fixture saves");
    buf
}

pub fn pdf_file(name: &str, pages: usize) -> InputFile {
    InputFile::new(name, pdf_with_pages(pages))
}

pub fn labelled_file(name: &str, labels: &[&str]) -> InputFile {
    InputFile::new(name, pdf_with_labels(labels))
}

pub fn open(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).expect("output parses")
}

/// Decoded content stream operations of one page.
pub fn page_operations(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
    let bytes = doc.get_page_content(page_id).expect("page content");
    Content::decode(&bytes).expect("content decodes").operations
}

/// Operator names of one page, in drawing order.
pub fn page_operators(doc: &Document, page_id: ObjectId) -> Vec<String> {
    page_operations(doc, page_id)
        .into_iter()
        .map(|op| op.operator)
        .collect()
}

/// `/Label` of every page, in page order.
pub fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_object(id)
                .and_then(Object::as_dict)
                .and_then(|d| d.get(b"Label"))
                .and_then(Object::as_str)
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .unwrap_or_default()
        })
        .collect()
}
