//! Fixed vertical-stack layout.
//!
//! Elements are stacked top to bottom in the order heading, body, image,
//! table. Each kind has a fixed horizontal placement and size, and advances
//! the cursor by a fixed amount regardless of how much content it holds.

use crate::error::{Error, Result};
use crate::types::{
    Border, ExtractedContent, Placement, ResolvedImage, SlideElement, TableStyle, TextStyle,
};

/// Vertical position of the first element.
pub const TOP_MARGIN: f64 = 0.5;

pub const HEADING_X: f64 = 0.5;
pub const HEADING_WIDTH: f64 = 9.0;
pub const HEADING_HEIGHT: f64 = 1.0;
pub const HEADING_ADVANCE: f64 = 1.5;
pub const HEADING_FONT_SIZE: f64 = 28.0;
pub const HEADING_COLOR: &str = "1E90FF";

pub const BODY_X: f64 = 0.5;
pub const BODY_WIDTH: f64 = 9.0;
pub const BODY_HEIGHT: f64 = 1.0;
pub const BODY_ADVANCE: f64 = 1.5;
pub const BODY_FONT_SIZE: f64 = 18.0;

pub const IMAGE_X: f64 = 1.0;
pub const IMAGE_WIDTH: f64 = 6.0;
pub const IMAGE_HEIGHT: f64 = 3.5;
pub const IMAGE_ADVANCE: f64 = 4.0;

pub const TABLE_X: f64 = 0.5;
pub const TABLE_WIDTH: f64 = 9.0;
pub const TABLE_ROW_HEIGHT: f64 = 0.4;
pub const TABLE_ADVANCE: f64 = 4.0;
pub const TABLE_BORDER_PT: f64 = 1.0;
pub const TABLE_BORDER_COLOR: &str = "000000";

/// Lay out the content of one slide.
///
/// The image element is emitted only when the content names an image and a
/// resolved payload is supplied.
///
/// # Errors
///
/// Returns [`Error::TableProcessing`] if a table has no rows or its first row
/// has no cells, since column widths are sized from the first row.
pub fn layout(
    content: &ExtractedContent,
    image: Option<ResolvedImage>,
) -> Result<Vec<SlideElement>> {
    let mut elements = Vec::with_capacity(4);
    let mut cursor = Cursor::new();

    if let Some(text) = &content.heading {
        elements.push(SlideElement::Heading {
            text: text.clone(),
            placement: Placement::new(
                HEADING_X,
                cursor.advance(HEADING_ADVANCE),
                HEADING_WIDTH,
                HEADING_HEIGHT,
            ),
            style: TextStyle {
                font_size: HEADING_FONT_SIZE,
                color: Some(HEADING_COLOR.to_string()),
                bold: true,
            },
        });
    }

    if let Some(text) = &content.body {
        elements.push(SlideElement::Body {
            text: text.clone(),
            placement: Placement::new(BODY_X, cursor.advance(BODY_ADVANCE), BODY_WIDTH, BODY_HEIGHT),
            style: TextStyle {
                font_size: BODY_FONT_SIZE,
                color: None,
                bold: false,
            },
        });
    }

    if let (Some(_), Some(image)) = (&content.image_source, image) {
        elements.push(SlideElement::Image {
            image,
            placement: Placement::new(
                IMAGE_X,
                cursor.advance(IMAGE_ADVANCE),
                IMAGE_WIDTH,
                IMAGE_HEIGHT,
            ),
        });
    }

    if let Some(rows) = &content.table {
        let column_widths = column_widths(rows)?;
        let height = TABLE_ROW_HEIGHT * rows.len() as f64;
        elements.push(SlideElement::Table {
            rows: rows.clone(),
            placement: Placement::new(TABLE_X, cursor.advance(TABLE_ADVANCE), TABLE_WIDTH, height),
            style: TableStyle {
                column_widths,
                border: Border {
                    width_pt: TABLE_BORDER_PT,
                    color: TABLE_BORDER_COLOR.to_string(),
                },
            },
        });
    }

    Ok(elements)
}

/// Running vertical position on a slide.
#[derive(Debug)]
struct Cursor {
    y: f64,
}

impl Cursor {
    fn new() -> Self {
        Self { y: TOP_MARGIN }
    }

    /// Current position; moves the cursor down by `by`.
    fn advance(&mut self, by: f64) -> f64 {
        let y = self.y;
        self.y += by;
        y
    }
}

/// Split the table width evenly over the columns of the first row.
///
/// Later rows with a different cell count are not accounted for.
fn column_widths(rows: &[Vec<String>]) -> Result<Vec<f64>> {
    let first = rows
        .first()
        .ok_or_else(|| Error::TableProcessing("table has no rows".to_string()))?;

    if first.is_empty() {
        return Err(Error::TableProcessing(
            "first table row has no cells".to_string(),
        ));
    }

    if rows.iter().any(|row| row.len() != first.len()) {
        log::warn!(
            "Table rows have differing cell counts; columns are sized from the first row ({})",
            first.len()
        );
    }

    let width = TABLE_WIDTH / first.len() as f64;
    Ok(vec![width; first.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementKind;

    fn image() -> ResolvedImage {
        ResolvedImage {
            source: "https://example.com/a.png".to_string(),
            media_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn cells(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn full_content() -> ExtractedContent {
        ExtractedContent {
            heading: Some("Title".to_string()),
            body: Some("Body".to_string()),
            image_source: Some("https://example.com/a.png".to_string()),
            table: Some(cells(&[&["1", "2"], &["3", "4"]])),
        }
    }

    #[test]
    fn test_heading_and_body_positions() {
        let content = ExtractedContent {
            heading: Some("Title".to_string()),
            body: Some("Body text".to_string()),
            ..Default::default()
        };
        let elements = layout(&content, None).unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].placement().y, 0.5);
        assert_eq!(elements[1].placement().y, 2.0);
        assert_eq!(elements[0].text(), Some("Title"));
        assert_eq!(elements[1].text(), Some("Body text"));
    }

    #[test]
    fn test_full_slide_order_and_offsets() {
        let elements = layout(&full_content(), Some(image())).unwrap();

        let kinds: Vec<ElementKind> = elements.iter().map(SlideElement::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Heading,
                ElementKind::Body,
                ElementKind::Image,
                ElementKind::Table
            ]
        );

        let ys: Vec<f64> = elements.iter().map(|e| e.placement().y).collect();
        assert_eq!(ys, vec![0.5, 2.0, 3.5, 7.5]);
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_content_yields_no_elements() {
        let elements = layout(&ExtractedContent::default(), None).unwrap();
        assert!(elements.is_empty());
    }

    #[test]
    fn test_image_needs_resolved_payload() {
        let content = ExtractedContent {
            image_source: Some("https://example.com/a.png".to_string()),
            ..Default::default()
        };
        assert!(layout(&content, None).unwrap().is_empty());

        let elements = layout(&content, Some(image())).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(*elements[0].placement(), Placement::new(1.0, 0.5, 6.0, 3.5));
    }

    #[test]
    fn test_table_moves_up_without_image() {
        let content = ExtractedContent {
            table: Some(cells(&[&["1", "2"]])),
            ..Default::default()
        };
        let elements = layout(&content, None).unwrap();
        assert_eq!(elements.len(), 1);

        match &elements[0] {
            SlideElement::Table {
                rows,
                placement,
                style,
            } => {
                assert_eq!(rows, &cells(&[&["1", "2"]]));
                assert_eq!(placement.y, 0.5);
                assert_eq!(placement.width, 9.0);
                assert_eq!(style.column_widths, vec![4.5, 4.5]);
                assert_eq!(style.border.color, "000000");
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_heading_style() {
        let content = ExtractedContent {
            heading: Some("Title".to_string()),
            ..Default::default()
        };
        let elements = layout(&content, None).unwrap();
        match &elements[0] {
            SlideElement::Heading { style, .. } => {
                assert_eq!(style.font_size, 28.0);
                assert_eq!(style.color.as_deref(), Some("1E90FF"));
                assert!(style.bold);
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn test_cursor_advances_past_every_kind() {
        let mut cursor = Cursor::new();
        let ys: Vec<f64> = [HEADING_ADVANCE, BODY_ADVANCE, IMAGE_ADVANCE, TABLE_ADVANCE]
            .into_iter()
            .map(|by| cursor.advance(by))
            .collect();
        assert_eq!(ys, vec![0.5, 2.0, 3.5, 7.5]);
        assert_eq!(cursor.y, 11.5);
    }

    #[test]
    fn test_columns_sized_from_first_row() {
        let rows = cells(&[&["a", "b", "c"], &["d"]]);
        assert_eq!(column_widths(&rows).unwrap(), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_table_without_rows_fails() {
        let content = ExtractedContent {
            table: Some(Vec::new()),
            ..Default::default()
        };
        assert!(matches!(
            layout(&content, None),
            Err(Error::TableProcessing(_))
        ));

        let content = ExtractedContent {
            table: Some(vec![Vec::new()]),
            ..Default::default()
        };
        assert!(matches!(
            layout(&content, None),
            Err(Error::TableProcessing(_))
        ));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let first = layout(&full_content(), Some(image())).unwrap();
        let second = layout(&full_content(), Some(image())).unwrap();
        assert_eq!(first, second);
    }
}
