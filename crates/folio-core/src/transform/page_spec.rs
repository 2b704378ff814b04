use std::collections::BTreeSet;

/// Parse a page-spec string like "1,3-5" into sorted, deduplicated,
/// 0-indexed page numbers.
///
/// Input is 1-indexed (user-facing). Pages outside `1..=page_count` and
/// tokens that are not numbers are dropped, never reported. A reversed range
/// ("5-3") is read as "3-5".
pub fn parse_page_spec(spec: &str, page_count: usize) -> Vec<usize> {
    let mut pages = BTreeSet::new();

    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (start, end) = match part.split_once('-') {
            Some((start, end)) => {
                let (Ok(start), Ok(end)) = (start.trim().parse::<usize>(), end.trim().parse::<usize>())
                else {
                    continue;
                };
                (start.min(end), start.max(end))
            }
            None => match part.parse::<usize>() {
                Ok(page) => (page, page),
                Err(_) => continue,
            },
        };

        let start = start.max(1);
        let end = end.min(page_count);
        for page in start..=end {
            pages.insert(page - 1); // convert to 0-indexed
        }
    }

    pages.into_iter().collect()
}
