//! Splitting a deck into one presentation per slide, and assembling one
//! presentation out of slide ranges of several decks.

use super::builder::PresentationBuilder;
use super::document::PmlDocument;
use super::settings::PresentationBuilderSettings;
use crate::error::{Result, SlidekitError};
use rayon::prelude::*;
use tracing::{debug, info};

/// A range of slides taken from one source deck.
#[derive(Debug, Clone, Copy)]
pub struct SlideSource<'a> {
    pub document: &'a PmlDocument,
    /// Zero-based index of the first slide.
    pub start: usize,
    /// `None` takes every slide from `start` on.
    pub count: Option<usize>,
    /// Also copy every master of the deck, used or not.
    pub keep_master: bool,
}

impl<'a> SlideSource<'a> {
    /// Every slide of `document`.
    pub fn all(document: &'a PmlDocument) -> Self {
        Self {
            document,
            start: 0,
            count: None,
            keep_master: false,
        }
    }

    pub fn range(document: &'a PmlDocument, start: usize, count: usize) -> Self {
        Self {
            document,
            start,
            count: Some(count),
            keep_master: false,
        }
    }

    pub fn keep_master(mut self, keep: bool) -> Self {
        self.keep_master = keep;
        self
    }
}

/// One single-slide presentation produced by publishing.
#[derive(Debug, Clone)]
pub struct PublishedSlide {
    /// One-based position in the source deck.
    pub index: usize,
    pub file_name: String,
    pub title: Option<String>,
    pub document: PmlDocument,
}

/// Lazy iterator over the published slides of one deck. Each item is built
/// when requested; a failure on one slide does not stop the next.
pub struct SlidePublisher<'a> {
    source: &'a PmlDocument,
    base_name: String,
    settings: PresentationBuilderSettings,
    slides: std::vec::IntoIter<(usize, String)>,
    pending_error: Option<SlidekitError>,
}

impl<'a> Iterator for SlidePublisher<'a> {
    type Item = Result<PublishedSlide>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }
        let (index, slide) = self.slides.next()?;
        Some(publish_one(
            self.source,
            &slide,
            index,
            &self.base_name,
            &self.settings,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let extra = usize::from(self.pending_error.is_some());
        let (low, high) = self.slides.size_hint();
        (low + extra, high.map(|h| h + extra))
    }
}

pub fn publish_slides<'a>(source: &'a PmlDocument, base_name: &str) -> SlidePublisher<'a> {
    publish_slides_with_settings(source, base_name, PresentationBuilderSettings::default())
}

pub fn publish_slides_with_settings<'a>(
    source: &'a PmlDocument,
    base_name: &str,
    settings: PresentationBuilderSettings,
) -> SlidePublisher<'a> {
    let (slides, pending_error) = match source.slide_parts() {
        Ok(parts) => (parts, None),
        Err(err) => (Vec::new(), Some(err)),
    };
    SlidePublisher {
        source,
        base_name: base_name.to_string(),
        settings,
        slides: slides
            .into_iter()
            .enumerate()
            .map(|(i, slide)| (i + 1, slide))
            .collect::<Vec<_>>()
            .into_iter(),
        pending_error,
    }
}

/// Publishes every slide on the rayon pool. Results keep slide order.
pub fn publish_slides_parallel(
    source: &PmlDocument,
    base_name: &str,
    settings: &PresentationBuilderSettings,
) -> Result<Vec<Result<PublishedSlide>>> {
    let slides = source.slide_parts()?;
    info!(slides = slides.len(), "publishing in parallel");
    Ok(slides
        .par_iter()
        .enumerate()
        .map(|(i, slide)| publish_one(source, slide, i + 1, base_name, settings))
        .collect())
}

fn publish_one(
    source: &PmlDocument,
    slide: &str,
    index: usize,
    base_name: &str,
    settings: &PresentationBuilderSettings,
) -> Result<PublishedSlide> {
    let mut builder = PresentationBuilder::new(settings.clone())?;
    builder.add_slide_part(source, slide)?;
    let title = source.slide_title(slide)?;

    let file_name = format!(
        "{}_{:0width$}.pptx",
        base_name,
        index,
        width = settings.publish_number_width
    );
    let mut document = builder.finish()?.with_file_name(file_name.clone());
    if let Some(title) = &title {
        document.package_mut().set_title(title)?;
    }
    debug!(slide, file = %file_name, "published slide");

    Ok(PublishedSlide {
        index,
        file_name,
        title,
        document,
    })
}

/// Concatenates the given slide ranges into one new presentation.
pub fn build_presentation(sources: &[SlideSource<'_>]) -> Result<PmlDocument> {
    build_presentation_with_settings(sources, PresentationBuilderSettings::default())
}

pub fn build_presentation_with_settings(
    sources: &[SlideSource<'_>],
    settings: PresentationBuilderSettings,
) -> Result<PmlDocument> {
    let mut builder = PresentationBuilder::new(settings)?;
    for source in sources {
        if source.keep_master {
            builder.append_masters(source.document)?;
        }
        builder.append_slides(source.document, source.start, source.count)?;
    }
    builder.finish()
}
