//! Core slide model, markup segmentation, content extraction and layout
//! for converting HTML fragments into slide decks.
//!
//! Every `<hr>`-separated segment of the input becomes one slide. Within a
//! segment the first `h1`, `p`, `img` and `table` are stacked top to bottom
//! at fixed positions.

pub mod builder;
pub mod error;
pub mod extract;
pub mod layout;
pub mod markup;
pub mod resolve;
pub mod segment;
pub mod types;

pub use builder::{ConversionGuard, ConversionState, Converter, DeckBuilder, DeckOptions};
pub use error::{Error, Result};
pub use extract::extract;
pub use layout::layout;
pub use markup::{is_plausible_html, load, Fragment};
pub use resolve::{ImageResolver, InlineResolver};
pub use segment::segment;
pub use types::{
    Border, DeckModel, ElementKind, ExtractedContent, Placement, ResolvedImage,
    SlideDescription, SlideElement, TableStyle, TextStyle,
};
