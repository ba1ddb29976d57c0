//! Markup loading.
//!
//! Parses raw text into a queryable fragment using the html5ever tree builder,
//! which recovers from malformed input the same way a browser does when
//! assigning to an element's inner HTML.

use scraper::{ElementRef, Html};

/// A parsed, read-only markup fragment.
pub struct Fragment {
    html: Html,
}

impl std::fmt::Debug for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fragment")
            .field("inner_html", &self.inner_html())
            .finish()
    }
}

impl Fragment {
    /// Parse a markup string into a fragment. Never fails.
    pub fn load(text: &str) -> Self {
        Self {
            html: Html::parse_fragment(text),
        }
    }

    /// The element that holds the fragment's top-level nodes.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Serialized content of the fragment.
    pub fn inner_html(&self) -> String {
        self.root().inner_html()
    }

    /// True if at least one top-level node is an element.
    pub fn has_element_children(&self) -> bool {
        self.root().children().any(|node| node.value().is_element())
    }

    /// First descendant element with the given tag name, in document order.
    pub fn first_element(&self, tag: &str) -> Option<ElementRef<'_>> {
        let tag = tag.to_ascii_lowercase();
        find_first(self.root(), |el| el.value().name() == tag)
    }
}

/// Parse a markup string into a fragment.
pub fn load(text: &str) -> Fragment {
    Fragment::load(text)
}

/// Check whether text looks like HTML worth converting.
///
/// True iff the parsed fragment has at least one child element and its
/// serialized content is not blank.
pub fn is_plausible_html(text: &str) -> bool {
    let fragment = Fragment::load(text);
    fragment.has_element_children() && !fragment.inner_html().trim().is_empty()
}

/// Depth-first search below `root` for the first element matching `predicate`.
///
/// `root` itself is not considered. Stops at the first match.
pub fn find_first<'a, F>(root: ElementRef<'a>, mut predicate: F) -> Option<ElementRef<'a>>
where
    F: FnMut(&ElementRef<'a>) -> bool,
{
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| predicate(el))
}

/// Concatenated text of every text node below `element`.
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Direct child elements of `element` with one of the given tag names.
pub fn child_elements<'a>(
    element: ElementRef<'a>,
    tags: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| tags.iter().any(|tag| *tag == child.value().name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_tolerates_malformed_markup() {
        let fragment = load("<p>unclosed <b>bold");
        assert_eq!(fragment.inner_html(), "<p>unclosed <b>bold</b></p>");

        let fragment = load("");
        assert_eq!(fragment.inner_html(), "");
        assert!(!fragment.has_element_children());
    }

    #[test]
    fn test_void_elements_serialize_in_short_form() {
        let fragment = load("<h1>A</h1><hr/><h1>B</h1>");
        assert_eq!(fragment.inner_html(), "<h1>A</h1><hr><h1>B</h1>");
    }

    #[test]
    fn test_is_plausible_html() {
        assert!(is_plausible_html("<h1>Title</h1>"));
        assert!(is_plausible_html("  text <p>para</p>"));
        assert!(!is_plausible_html("just some text"));
        assert!(!is_plausible_html(""));
        assert!(!is_plausible_html("   \n  "));
    }

    #[test]
    fn test_first_element_is_case_insensitive_and_ordered() {
        let fragment = load("<div><P>first</P></div><p>second</p>");
        let p = fragment.first_element("p").unwrap();
        assert_eq!(text_content(p), "first");

        let h1 = load("<H1>Upper</H1>").first_element("H1").map(text_content);
        assert_eq!(h1.as_deref(), Some("Upper"));

        assert!(fragment.first_element("table").is_none());
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let fragment = load("<p> Hello <em>big</em> world </p>");
        let p = fragment.first_element("p").unwrap();
        assert_eq!(text_content(p), " Hello big world ");
    }

    #[test]
    fn test_child_elements_filters_by_tag() {
        let fragment = load("<ul><li>a</li><li>b</li></ul>");
        let ul = fragment.first_element("ul").unwrap();
        let items: Vec<String> = child_elements(ul, &["li"]).map(text_content).collect();
        assert_eq!(items, vec!["a", "b"]);
    }
}
