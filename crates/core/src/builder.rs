//! Deck building.
//!
//! Runs segmentation, extraction, image resolution and layout over a whole
//! input and collects the slides in segment order. Any failure aborts the
//! whole build; no partial deck is returned.

use crate::error::{Error, Result};
use crate::extract::extract;
use crate::layout::layout;
use crate::markup::Fragment;
use crate::resolve::ImageResolver;
use crate::segment::segment;
use crate::types::{DeckModel, ExtractedContent, ResolvedImage, SlideDescription};
use futures::future::try_join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Options controlling how a deck is built.
#[derive(Debug, Clone, Default)]
pub struct DeckOptions {
    /// Resolve the images of all slides concurrently instead of one by one.
    concurrent_fetches: bool,
}

impl DeckOptions {
    /// Create options with the default sequential behaviour.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether images of different slides are resolved concurrently.
    pub fn with_concurrent_fetches(mut self, concurrent: bool) -> Self {
        self.concurrent_fetches = concurrent;
        self
    }

    /// Whether images are resolved concurrently.
    pub fn concurrent_fetches(&self) -> bool {
        self.concurrent_fetches
    }
}

/// Builds a [`DeckModel`] from raw HTML.
#[derive(Clone)]
pub struct DeckBuilder {
    resolver: Arc<dyn ImageResolver>,
    options: DeckOptions,
}

impl std::fmt::Debug for DeckBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckBuilder")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DeckBuilder {
    /// Create a builder that resolves images with `resolver`.
    pub fn new(resolver: Arc<dyn ImageResolver>) -> Self {
        Self {
            resolver,
            options: DeckOptions::default(),
        }
    }

    /// Set the build options.
    pub fn with_options(mut self, options: DeckOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the deck for `raw_html`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContent`] if the input has no serialized content, or the
    /// first resolver or table error hit while building any slide.
    pub async fn build(&self, raw_html: &str) -> Result<DeckModel> {
        let contents = prepare(raw_html)?;
        log::info!("Building deck with {} slide(s)", contents.len());

        let slides = if self.options.concurrent_fetches {
            self.build_concurrent(&contents).await?
        } else {
            self.build_sequential(&contents).await?
        };

        Ok(DeckModel { slides })
    }

    async fn build_sequential(&self, contents: &[ExtractedContent]) -> Result<Vec<SlideDescription>> {
        let mut slides = Vec::with_capacity(contents.len());
        for (index, content) in contents.iter().enumerate() {
            let image = self.resolve_image(content).await?;
            slides.push(layout_slide(index, content, image)?);
        }
        Ok(slides)
    }

    async fn build_concurrent(&self, contents: &[ExtractedContent]) -> Result<Vec<SlideDescription>> {
        let images = try_join_all(contents.iter().map(|c| self.resolve_image(c))).await?;

        contents
            .iter()
            .zip(images)
            .enumerate()
            .map(|(index, (content, image))| layout_slide(index, content, image))
            .collect()
    }

    async fn resolve_image(&self, content: &ExtractedContent) -> Result<Option<ResolvedImage>> {
        match &content.image_source {
            Some(source) => {
                log::debug!("Resolving image: {}", source);
                let image = self.resolver.resolve(source).await?;
                log::debug!("Resolved {} ({} bytes)", source, image.data.len());
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }
}

/// Load, validate, segment and extract the whole input.
///
/// Kept synchronous so no parsed fragment lives across an await point.
fn prepare(raw_html: &str) -> Result<Vec<ExtractedContent>> {
    let content = Fragment::load(raw_html).inner_html();
    if content.is_empty() {
        return Err(Error::EmptyContent);
    }

    Ok(segment(&content).iter().map(|s| extract(s)).collect())
}

fn layout_slide(
    index: usize,
    content: &ExtractedContent,
    image: Option<ResolvedImage>,
) -> Result<SlideDescription> {
    let elements = layout(content, image)?;
    log::debug!("Slide {}: {} element(s)", index + 1, elements.len());
    Ok(SlideDescription::new(index + 1, elements))
}

/// Shared "conversion in progress" flag.
///
/// Clones observe the same flag, so a caller can hold one to gate its own
/// controls while a [`Converter`] runs.
#[derive(Debug, Clone, Default)]
pub struct ConversionState {
    in_progress: Arc<AtomicBool>,
}

impl ConversionState {
    /// Create a new idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a conversion is currently running.
    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Mark a conversion as started.
    ///
    /// The flag is cleared when the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConversionInProgress`] if a conversion is already running.
    pub fn begin(&self) -> Result<ConversionGuard> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ConversionInProgress)?;

        Ok(ConversionGuard {
            in_progress: Arc::clone(&self.in_progress),
        })
    }
}

/// Clears the in-progress flag on drop.
#[derive(Debug)]
pub struct ConversionGuard {
    in_progress: Arc<AtomicBool>,
}

impl Drop for ConversionGuard {
    fn drop(&mut self) {
        self.in_progress.store(false, Ordering::Release);
    }
}

/// Top-level entry point: one conversion at a time, one error message out.
#[derive(Debug, Clone)]
pub struct Converter {
    builder: DeckBuilder,
    state: ConversionState,
}

impl Converter {
    /// Create a converter with its own conversion state.
    pub fn new(builder: DeckBuilder) -> Self {
        Self::with_state(builder, ConversionState::new())
    }

    /// Create a converter that reports progress through `state`.
    pub fn with_state(builder: DeckBuilder, state: ConversionState) -> Self {
        Self { builder, state }
    }

    /// The conversion state this converter reports through.
    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    /// Convert `raw_html` into a deck.
    ///
    /// # Errors
    ///
    /// [`Error::ConversionInProgress`] if another conversion is running;
    /// any build failure is returned as [`Error::ConversionAborted`].
    pub async fn convert(&self, raw_html: &str) -> Result<DeckModel> {
        let _guard = self.state.begin()?;

        match self.builder.build(raw_html).await {
            Ok(deck) => {
                log::info!("Converted {} slide(s)", deck.len());
                Ok(deck)
            }
            Err(e) => {
                log::error!("Conversion failed: {}", e);
                Err(e.into_aborted())
            }
        }
    }
}
