use lopdf::content::{Content, Operation};
use lopdf::{Object, dictionary};

use super::document;
use crate::domain::errors::TransformError;
use crate::domain::options::{ToolOptions, WatermarkOptions, WatermarkText};
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

const FONT_NAME: &str = "FolioWmF";
const GSTATE_NAME: &str = "FolioWmGs";
/// Distance kept from the page edge, in points.
const MARGIN: f32 = 36.0;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Draw the watermark text on every page.
///
/// Timestamp text must already be resolved (`ToolOptions::resolved`); an
/// unresolved timestamp is rendered as an empty string.
pub fn watermark(
    files: &[InputFile],
    options: &ToolOptions,
) -> Result<Vec<OutputFile>, TransformError> {
    let ToolOptions::Watermark(opts) = options else {
        return Err(TransformError::options_mismatch(ToolId::Watermark));
    };
    let text = match &opts.text {
        WatermarkText::Literal(text) => text.as_str(),
        WatermarkText::Timestamp => "",
    };
    let encoded = win_ansi(text)?;

    files
        .iter()
        .map(|file| {
            let mut doc = document::load_with_pages(file)?;

            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            });
            let gs_id = doc.add_object(dictionary! {
                "Type" => "ExtGState",
                "ca" => Object::from(opts.opacity),
                "CA" => Object::from(opts.opacity),
            });

            for page_id in doc.get_pages().into_values() {
                let (x, y) = placement(document::effective_box(&doc, page_id), text, opts);
                document::add_page_resource(&mut doc, page_id, "Font", FONT_NAME, font_id)?;
                document::add_page_resource(&mut doc, page_id, "ExtGState", GSTATE_NAME, gs_id)?;
                let content = stamp(&encoded, x, y, opts).encode()?;
                document::overlay_page_content(&mut doc, page_id, content)?;
            }

            let name = format!("{}_watermarked.pdf", file.stem());
            Ok(OutputFile::pdf(name, document::save(doc)?))
        })
        .collect()
}

/// Lower-left corner of the text for the configured position.
fn placement([llx, lly, urx, ury]: [f32; 4], text: &str, opts: &WatermarkOptions) -> (f32, f32) {
    let text_width = text.chars().count() as f32 * opts.font_size * AVG_GLYPH_WIDTH;
    let free_x = (urx - llx - 2.0 * MARGIN - text_width).max(0.0);
    let free_y = (ury - lly - 2.0 * MARGIN - opts.font_size).max(0.0);
    let (ax, ay) = opts.position.anchor();
    (llx + MARGIN + free_x * ax, lly + MARGIN + free_y * ay)
}

/// Helvetica is drawn with WinAnsiEncoding; text outside that set is refused.
fn win_ansi(text: &str) -> Result<Vec<u8>, TransformError> {
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    if unmappable {
        return Err(TransformError::Invalid(format!(
            "watermark text {text:?} has characters the standard font cannot draw"
        )));
    }
    Ok(bytes.into_owned())
}

fn stamp(text: &[u8], x: f32, y: f32, opts: &WatermarkOptions) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(GSTATE_NAME.as_bytes().to_vec())]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_NAME.as_bytes().to_vec()), Object::from(opts.font_size)],
            ),
            Operation::new(
                "rg",
                vec![
                    Object::from(opts.gray),
                    Object::from(opts.gray),
                    Object::from(opts.gray),
                ],
            ),
            Operation::new("Td", vec![Object::from(x), Object::from(y)]),
            Operation::new("Tj", vec![Object::string_literal(text.to_vec())]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::WatermarkPosition;
    use crate::transform::fixtures::{self, open};

    fn opts(text: &str) -> WatermarkOptions {
        WatermarkOptions {
            text: WatermarkText::Literal(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn text_is_drawn_on_every_page() {
        let outputs = watermark(
            &[fixtures::pdf_file("memo.pdf", 2)],
            &ToolOptions::Watermark(opts("DRAFT")),
        )
        .unwrap();
        assert_eq!(outputs[0].filename, "memo_watermarked.pdf");

        let doc = open(&outputs[0].bytes);
        for page_id in doc.get_pages().into_values() {
            assert_eq!(
                fixtures::page_operators(&doc, page_id),
                vec![
                    "q", "BT", "Tf", "Td", "Tj", "ET", "Q", // page
                    "q", "gs", "BT", "Tf", "rg", "Td", "Tj", "ET", "Q", // watermark
                ]
            );
            let shown: Vec<Vec<u8>> = fixtures::page_operations(&doc, page_id)
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| op.operands[0].as_str().ok().map(<[u8]>::to_vec))
                .collect();
            assert_eq!(shown.last().unwrap(), b"DRAFT");

            let resources = document::inherited_attribute(&doc, page_id, b"Resources")
                .and_then(|r| r.as_dict().ok())
                .unwrap();
            let fonts = resources.get(b"Font").and_then(Object::as_dict).unwrap();
            // the page's own font is kept next to the watermark font
            assert!(fonts.has(b"F1"));
            assert!(fonts.has(FONT_NAME.as_bytes()));
        }
    }

    #[test]
    fn page_graphics_state_does_not_reach_the_stamp() {
        let input = InputFile::new(
            "shifted.pdf",
            fixtures::pdf_with_content("1 0 0 1 200 200 cm 0 0 m 10 10 l S"),
        );
        let outputs = watermark(&[input], &ToolOptions::Watermark(opts("DRAFT"))).unwrap();

        let doc = open(&outputs[0].bytes);
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let ops = fixtures::page_operators(&doc, page_id);
        assert_eq!(ops[..6], ["q", "cm", "m", "l", "S", "Q"]);

        let mut depth = 0i32;
        for op in &ops {
            match op.as_str() {
                "q" => depth += 1,
                "Q" => depth -= 1,
                _ => {}
            }
            assert!(depth >= 0, "unbalanced Q in {ops:?}");
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn latin_text_is_win_ansi_encoded() {
        let outputs = watermark(
            &[fixtures::pdf_file("menu.pdf", 1)],
            &ToolOptions::Watermark(opts("Café")),
        )
        .unwrap();

        let doc = open(&outputs[0].bytes);
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let tj = fixtures::page_operations(&doc, page_id)
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .last()
            .unwrap();
        assert_eq!(tj.operands[0].as_str().unwrap(), b"Caf\xe9");

        let resources = document::inherited_attribute(&doc, page_id, b"Resources")
            .and_then(|r| r.as_dict().ok())
            .unwrap();
        let font_id = resources
            .get(b"Font")
            .and_then(Object::as_dict)
            .and_then(|fonts| fonts.get(FONT_NAME.as_bytes()))
            .and_then(Object::as_reference)
            .unwrap();
        let font = doc.get_dictionary(font_id).unwrap();
        assert_eq!(font.get(b"Encoding").and_then(Object::as_name).unwrap(), b"WinAnsiEncoding");
    }

    #[test]
    fn text_outside_win_ansi_is_refused() {
        let err = watermark(
            &[fixtures::pdf_file("memo.pdf", 1)],
            &ToolOptions::Watermark(opts("日本")),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Invalid(_)));
    }

    #[test]
    fn centered_text_sits_in_the_middle() {
        let o = opts("ABCD");
        // 4 glyphs * 48pt * 0.5 = 96pt wide
        let (x, y) = placement([0.0, 0.0, 612.0, 792.0], "ABCD", &o);
        assert!((x - (612.0 - 96.0) / 2.0).abs() < 0.01);
        assert!((y - (792.0 - 48.0) / 2.0).abs() < 0.01);
    }

    #[test]
    fn corners_respect_the_margin() {
        let o = WatermarkOptions {
            position: WatermarkPosition::BottomLeft,
            ..opts("X")
        };
        assert_eq!(placement([0.0, 0.0, 612.0, 792.0], "X", &o), (36.0, 36.0));

        let o = WatermarkOptions {
            position: WatermarkPosition::TopRight,
            ..opts("X")
        };
        let (x, y) = placement([0.0, 0.0, 612.0, 792.0], "X", &o);
        assert!((x - (612.0 - 36.0 - 24.0)).abs() < 0.01);
        assert!((y - (792.0 - 36.0 - 48.0)).abs() < 0.01);
    }

    #[test]
    fn oversized_text_is_pinned_to_the_margin() {
        let o = opts(&"W".repeat(200));
        let (x, _) = placement([0.0, 0.0, 612.0, 792.0], &"W".repeat(200), &o);
        assert_eq!(x, MARGIN);
    }
}
