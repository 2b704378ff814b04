use super::document;
use super::page_spec::parse_page_spec;
use crate::domain::errors::TransformError;
use crate::domain::options::ToolOptions;
use crate::domain::outcome::OutputFile;
use crate::domain::request::InputFile;
use crate::domain::tool::ToolId;

/// Copy the selected pages of each input into a new document.
pub fn extract(files: &[InputFile], options: &ToolOptions) -> Result<Vec<OutputFile>, TransformError> {
    let ToolOptions::Extract(opts) = options else {
        return Err(TransformError::options_mismatch(ToolId::Extract));
    };

    files
        .iter()
        .map(|file| {
            let mut doc = document::load_with_pages(file)?;
            let selected = parse_page_spec(&opts.pages, document::page_count(&doc));
            if selected.is_empty() {
                return Err(TransformError::Invalid(format!(
                    "no pages of {} match \"{}\"",
                    file.name, opts.pages
                )));
            }

            let keep: Vec<u32> = selected.iter().map(|&index| index as u32 + 1).collect();
            document::keep_pages(&mut doc, &keep);

            let name = format!("extracted_{}", file.name);
            Ok(OutputFile::pdf(name, document::save(doc)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::ExtractOptions;
    use crate::transform::fixtures::{open, page_labels, pdf_file};

    fn opts(pages: &str) -> ToolOptions {
        ToolOptions::Extract(ExtractOptions {
            pages: pages.to_string(),
        })
    }

    #[test]
    fn extracts_ascending_unique_pages() {
        let outputs = extract(&[pdf_file("report.pdf", 6)], &opts("5,2-3,2")).unwrap();
        assert_eq!(outputs[0].filename, "extracted_report.pdf");
        assert_eq!(
            page_labels(&open(&outputs[0].bytes)),
            vec!["page 2", "page 3", "page 5"]
        );
    }

    #[test]
    fn out_of_range_pages_are_ignored() {
        let outputs = extract(&[pdf_file("report.pdf", 3)], &opts("0,3,99")).unwrap();
        assert_eq!(page_labels(&open(&outputs[0].bytes)), vec!["page 3"]);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let err = extract(&[pdf_file("report.pdf", 3)], &opts("8-9")).unwrap_err();
        assert_eq!(err.to_string(), "no pages of report.pdf match \"8-9\"");
    }
}
