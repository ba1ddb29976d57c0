//! Content extraction from a single segment.
//!
//! Each recognized kind is looked up independently; only the first match in
//! document order is taken and everything else in the segment is ignored.

use crate::markup::{child_elements, text_content, Fragment};
use crate::types::ExtractedContent;
use scraper::ElementRef;

const HEADING_TAG: &str = "h1";
const BODY_TAG: &str = "p";
const IMAGE_TAG: &str = "img";
const TABLE_TAG: &str = "table";

const ROW_TAGS: &[&str] = &["tr"];
const CELL_TAGS: &[&str] = &["td", "th"];

/// Extract the recognized content of one segment.
pub fn extract(segment_html: &str) -> ExtractedContent {
    let fragment = Fragment::load(segment_html);

    let content = ExtractedContent {
        heading: fragment.first_element(HEADING_TAG).map(text_content),
        body: fragment.first_element(BODY_TAG).map(text_content),
        image_source: fragment
            .first_element(IMAGE_TAG)
            .map(|img| img.value().attr("src").unwrap_or_default().to_string()),
        table: fragment.first_element(TABLE_TAG).map(table_rows),
    };

    log::debug!(
        "Extracted heading={} body={} image={} table={}",
        content.heading.is_some(),
        content.body.is_some(),
        content.image_source.is_some(),
        content.table.as_ref().map_or(0, Vec::len)
    );

    content
}

/// Rows of a table in table order, each as its trimmed cell texts.
///
/// Header sections come first and footer sections last; body sections and
/// bare rows keep their document order. Rows of nested tables are excluded.
fn table_rows(table: ElementRef<'_>) -> Vec<Vec<String>> {
    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => body.push(child),
            "thead" => head.extend(child_elements(child, ROW_TAGS)),
            "tbody" => body.extend(child_elements(child, ROW_TAGS)),
            "tfoot" => foot.extend(child_elements(child, ROW_TAGS)),
            _ => {}
        }
    }

    head.into_iter()
        .chain(body)
        .chain(foot)
        .map(|row| {
            child_elements(row, CELL_TAGS)
                .map(|cell| text_content(cell).trim().to_string())
                .collect()
        })
        .collect()
}
