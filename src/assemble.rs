//! Slide assembly for the legacy parser.
//!
//! Record walking produces two views of the same text: a per-slide bucket
//! map (filled when text atoms occur inside `RT_Slide` containers) and a
//! flat global list (everything, in order of occurrence). Assembly prefers
//! the structured buckets and falls back to a heuristic regrouping of the
//! flat list when no bucket was populated. The choice between the two
//! paths is made here, in one place, not during parsing.

use crate::model::Slide;
use std::collections::BTreeMap;

/// Tunables for the heuristic assembly path.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Maximum number of body entries per heuristic slide before a new
    /// slide is started. Purely heuristic; six matches how much text a
    /// typical bullet slide carries.
    pub max_texts_per_slide: usize,
    /// Titles are only inferred from strings shorter than this.
    pub max_title_len: usize,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            max_texts_per_slide: 6,
            max_title_len: 100,
        }
    }
}

/// Assemble slides from walker output.
///
/// Prefers the structured per-slide buckets; falls back to heuristic
/// grouping of the flat text list. Returns at least one slide (a
/// diagnostic one when nothing survived filtering).
pub fn assemble_slides(
    slide_texts: &BTreeMap<u32, Vec<String>>,
    texts: &[String],
    options: &AssembleOptions,
) -> Vec<Slide> {
    let slides = if slide_texts.values().any(|bucket| !bucket.is_empty()) {
        from_buckets(slide_texts)
    } else {
        from_flat_list(texts, options)
    };

    if slides.is_empty() {
        vec![crate::model::Presentation::no_content_slide()]
    } else {
        slides
    }
}

/// Structured path: one slide per bucket, in ascending bucket order. The
/// first string of a bucket becomes the title, the rest the body.
fn from_buckets(slide_texts: &BTreeMap<u32, Vec<String>>) -> Vec<Slide> {
    let mut slides = Vec::new();
    for bucket in slide_texts.values() {
        if bucket.is_empty() {
            continue;
        }
        let mut slide = Slide::new(slides.len() as u32 + 1);
        slide.title = bucket[0].clone();
        slide.text_content.extend(bucket[1..].iter().cloned());
        slides.push(slide);
    }
    slides
}

/// Heuristic path: deduplicate the flat list (case-insensitive, first
/// occurrence wins), then group greedily. A short string becomes the title
/// of the current slide when it has none, everything else is body text, and
/// the slide is flushed once it holds `max_texts_per_slide` entries.
fn from_flat_list(texts: &[String], options: &AssembleOptions) -> Vec<Slide> {
    let deduped = dedup_case_insensitive(texts);

    let mut slides: Vec<Slide> = Vec::new();
    let mut current = Slide::new(1);
    let mut has_title = false;

    for text in deduped {
        if !has_title && text.chars().count() < options.max_title_len {
            current.title = text;
            has_title = true;
            continue;
        }

        current.text_content.push(text);
        if current.text_content.len() >= options.max_texts_per_slide {
            slides.push(std::mem::replace(
                &mut current,
                Slide::new(slides.len() as u32 + 2),
            ));
            has_title = false;
        }
    }

    if has_title || !current.text_content.is_empty() {
        slides.push(current);
    }
    slides
}

/// Order-preserving case-insensitive deduplication.
fn dedup_case_insensitive(texts: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(texts.len());
    for text in texts {
        if seen.insert(text.to_lowercase()) {
            out.push(text.clone());
        }
    }
    out
}
