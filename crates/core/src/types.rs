//! Domain types for representing a converted slide deck.
//!
//! All positions and sizes are in inches, font sizes in points.

use serde::{Deserialize, Serialize};

/// Content pulled out of one segment of markup.
///
/// At most one of each kind is kept; later occurrences are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Text content of the first `h1`, untrimmed.
    pub heading: Option<String>,

    /// Text content of the first `p`, untrimmed.
    pub body: Option<String>,

    /// `src` attribute of the first `img`.
    pub image_source: Option<String>,

    /// Row-major trimmed cell text of the first `table`.
    pub table: Option<Vec<Vec<String>>>,
}

impl ExtractedContent {
    /// True if none of the four recognized kinds were found.
    pub fn is_empty(&self) -> bool {
        self.heading.is_none()
            && self.body.is_none()
            && self.image_source.is_none()
            && self.table.is_none()
    }
}

/// An image payload that can be embedded directly into a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedImage {
    /// The reference the image was resolved from.
    pub source: String,

    /// MIME type of the payload, e.g. `image/png`.
    pub media_type: String,

    /// Decoded image bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl ResolvedImage {
    /// File extension to use when storing the payload as a package part.
    pub fn extension(&self) -> &'static str {
        match self.media_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpeg",
            "image/gif" => "gif",
            "image/bmp" | "image/x-ms-bmp" => "bmp",
            "image/tiff" => "tiff",
            "image/svg+xml" => "svg",
            "image/webp" => "webp",
            "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
            _ => "png",
        }
    }
}

/// Position and size of an element on a slide, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Create a new placement.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Character formatting for a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points.
    pub font_size: f64,

    /// Text color as `RRGGBB` hex, without a leading `#`.
    pub color: Option<String>,

    /// Whether the text is bold.
    pub bold: bool,
}

/// Cell border applied to every cell of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Line width in points.
    pub width_pt: f64,

    /// Line color as `RRGGBB` hex.
    pub color: String,
}

/// Formatting for a table element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    /// Width of each column in inches, sized from the first row.
    pub column_widths: Vec<f64>,

    pub border: Border,
}

/// The kind of a slide element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Heading,
    Body,
    Image,
    Table,
}

/// One positioned object on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlideElement {
    /// Title text from an `h1`.
    Heading {
        text: String,
        placement: Placement,
        style: TextStyle,
    },

    /// Paragraph text from a `p`.
    Body {
        text: String,
        placement: Placement,
        style: TextStyle,
    },

    /// A resolved `img`.
    Image {
        image: ResolvedImage,
        placement: Placement,
    },

    /// Cell grid from a `table`.
    Table {
        rows: Vec<Vec<String>>,
        placement: Placement,
        style: TableStyle,
    },
}

impl SlideElement {
    /// The kind of this element.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Heading { .. } => ElementKind::Heading,
            Self::Body { .. } => ElementKind::Body,
            Self::Image { .. } => ElementKind::Image,
            Self::Table { .. } => ElementKind::Table,
        }
    }

    /// Where this element sits on the slide.
    pub fn placement(&self) -> &Placement {
        match self {
            Self::Heading { placement, .. }
            | Self::Body { placement, .. }
            | Self::Image { placement, .. }
            | Self::Table { placement, .. } => placement,
        }
    }

    /// The text carried by a heading or body element.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Heading { text, .. } | Self::Body { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// All elements of a single slide, in stacking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDescription {
    /// 1-based slide number.
    pub number: usize,

    /// Elements ordered heading, body, image, table.
    pub elements: Vec<SlideElement>,
}

impl SlideDescription {
    /// Create a new slide with the given number and elements.
    pub fn new(number: usize, elements: Vec<SlideElement>) -> Self {
        Self { number, elements }
    }

    /// True if the slide has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the images on this slide.
    pub fn images(&self) -> impl Iterator<Item = &ResolvedImage> {
        self.elements.iter().filter_map(|e| match e {
            SlideElement::Image { image, .. } => Some(image),
            _ => None,
        })
    }
}

/// The complete ordered deck, one slide per input segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckModel {
    /// Slides in segment order.
    pub slides: Vec<SlideDescription>,
}

impl DeckModel {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: SlideDescription) {
        self.slides.push(slide);
    }

    /// Number of slides in the deck.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// True if the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Get all heading and body text from all slides, flattened.
    pub fn all_text(&self) -> Vec<&str> {
        self.slides
            .iter()
            .flat_map(|s| s.elements.iter().filter_map(SlideElement::text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(media_type: &str) -> ResolvedImage {
        ResolvedImage {
            source: "https://example.com/img".to_string(),
            media_type: media_type.to_string(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_extension_from_media_type() {
        assert_eq!(image("image/png").extension(), "png");
        assert_eq!(image("image/JPEG").extension(), "jpeg");
        assert_eq!(image("image/gif").extension(), "gif");
        assert_eq!(image("image/svg+xml").extension(), "svg");
        assert_eq!(image("application/octet-stream").extension(), "png");
    }

    #[test]
    fn test_extracted_content_is_empty() {
        assert!(ExtractedContent::default().is_empty());

        let content = ExtractedContent {
            table: Some(Vec::new()),
            ..Default::default()
        };
        assert!(!content.is_empty());
    }

    #[test]
    fn test_element_accessors() {
        let placement = Placement::new(0.5, 0.5, 9.0, 1.0);
        let heading = SlideElement::Heading {
            text: "Title".to_string(),
            placement,
            style: TextStyle {
                font_size: 28.0,
                color: None,
                bold: true,
            },
        };
        assert_eq!(heading.kind(), ElementKind::Heading);
        assert_eq!(heading.placement().y, 0.5);
        assert_eq!(heading.text(), Some("Title"));

        let picture = SlideElement::Image {
            image: image("image/png"),
            placement,
        };
        assert_eq!(picture.text(), None);
    }

    #[test]
    fn test_deck_serializes_without_image_bytes() {
        let mut deck = DeckModel::new();
        deck.add_slide(SlideDescription::new(
            1,
            vec![SlideElement::Image {
                image: image("image/png"),
                placement: Placement::new(1.0, 0.5, 6.0, 3.5),
            }],
        ));

        let json = serde_json::to_value(&deck).unwrap();
        let element = &json["slides"][0]["elements"][0];
        assert_eq!(element["kind"], "image");
        assert_eq!(element["image"]["media_type"], "image/png");
        assert!(element["image"].get("data").is_none());
    }
}
