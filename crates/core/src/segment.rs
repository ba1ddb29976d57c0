//! Splitting serialized markup into per-slide segments.

/// Literal marker that separates slides.
pub const SLIDE_SEPARATOR: &str = "<hr>";

/// Split serialized fragment markup into one segment per slide.
///
/// Splits on the exact, case-sensitive text `<hr>`; segments are not trimmed.
/// An empty input yields a single empty segment. Because the split is on the
/// serialized text, an `<hr>` nested anywhere (even inside a table cell) is
/// also treated as a slide break.
pub fn segment(fragment_html: &str) -> Vec<String> {
    fragment_html
        .split(SLIDE_SEPARATOR)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_separator_yields_input() {
        assert_eq!(segment("<h1>Title</h1><p>Body</p>"), vec!["<h1>Title</h1><p>Body</p>"]);
    }

    #[test]
    fn test_empty_input_yields_one_empty_segment() {
        assert_eq!(segment(""), vec![String::new()]);
    }

    #[test]
    fn test_k_separators_yield_k_plus_one_segments() {
        let segments = segment("a<hr>b<hr><hr>c");
        assert_eq!(segments, vec!["a", "b", "", "c"]);

        let segments = segment("<hr>");
        assert_eq!(segments, vec!["", ""]);
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let segments = segment("\n<h1>A</h1>\n<hr>\n<h1>B</h1>\n");
        assert_eq!(segments, vec!["\n<h1>A</h1>\n", "\n<h1>B</h1>\n"]);
    }

    #[test]
    fn test_separator_is_exact_and_case_sensitive() {
        assert_eq!(segment("a<HR>b").len(), 1);
        assert_eq!(segment("a<hr class=\"x\">b").len(), 1);
        assert_eq!(segment("a<hr/>b").len(), 1);
    }

    #[test]
    fn test_nested_separator_still_splits() {
        let segments = segment("<table><tr><td>x<hr>y</td></tr></table>");
        assert_eq!(segments.len(), 2);
    }
}
