//! PPTX (Office Open XML) backend for converted slide decks.
//!
//! Writes a [`deck_core::DeckModel`] as a .pptx ZIP package and reads the
//! text and objects of a package back for verification.

pub mod package;
pub mod parser;
pub mod writer;

pub use parser::{PptxParser, SlideSummary};
pub use writer::{PptxWriter, DEFAULT_FILE_NAME};
