//! The normalized presentation record.
//!
//! Both parsers emit the same [`Presentation`] shape regardless of the
//! source format. The record is immutable once built and does not reference
//! the source bytes; its JSON serialization (snake_case field names) is the
//! stable wire format consumed by exporters.

use crate::media::Media;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Legacy binary format (OLE compound file)
    Ppt,
    /// Office Open XML format (ZIP container)
    Pptx,
}

/// Document metadata collected from property streams or `docProps/*` parts.
///
/// Every textual field is optional; counts default to zero. `total_slides`
/// and `total_words` are recomputed after slide assembly so they always
/// agree with the slide list, whatever the source claimed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub last_modified_by: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub revision: Option<String>,
    pub category: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub application: Option<String>,
    pub app_version: Option<String>,
    pub company: Option<String>,
    pub manager: Option<String>,
    pub template: Option<String>,
    pub presentation_format: Option<String>,
    #[serde(default)]
    pub total_slides: u32,
    #[serde(default)]
    pub total_words: u32,
    #[serde(default)]
    pub total_paragraphs: u32,
}

/// Top-left corner of a shape in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// Extent of a shape in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i64,
    pub height: i64,
}

/// A shape on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Placeholder role (`title`, `body`, …) or `"Shape"` when the shape
    /// carries no placeholder information.
    #[serde(rename = "type")]
    pub shape_type: String,
    /// Concatenated text runs of the shape.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

/// A table extracted from a slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: usize,
    pub columns: usize,
    /// Cell text as `cells[row][column]`.
    pub cells: Vec<Vec<String>>,
}

/// A theme definition (PPTX only).
///
/// Color entries follow `"{role}: #RRGGBB"`; font entries follow
/// `"Major: {typeface}"` / `"Minor: {typeface}"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
}

/// A single slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based position; always `index + 1` within the presentation.
    pub slide_number: u32,
    /// Title text, `"Slide {n}"` when the source had none.
    pub title: String,
    /// Body paragraphs in document order, title excluded.
    pub text_content: Vec<String>,
    /// Speaker notes joined by newline, slide-number placeholders removed.
    pub notes: String,
    pub shapes: Vec<Shape>,
    pub images: Vec<Media>,
    pub tables: Vec<Table>,
}

impl Slide {
    /// Create an empty slide at the given 1-based position.
    pub fn new(slide_number: u32) -> Self {
        Self {
            slide_number,
            ..Self::default()
        }
    }
}

/// The root record produced by either parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Opaque identifier, unique per extraction.
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: FileType,
    /// Timestamp taken when extraction finished.
    pub extracted_at: DateTime<Utc>,
    pub metadata: Metadata,
    /// Always non-empty; degenerate inputs yield a diagnostic slide.
    pub slides: Vec<Slide>,
    pub media: Vec<Media>,
    pub themes: Vec<Theme>,
    pub master_slides: Vec<String>,
    pub custom_properties: BTreeMap<String, String>,
}

impl Presentation {
    /// Create an empty presentation skeleton for the given source file.
    pub fn new(file_name: &str, file_size: u64, file_type: FileType) -> Self {
        Self {
            id: generate_id(),
            file_name: file_name.to_string(),
            file_size,
            file_type,
            extracted_at: Utc::now(),
            metadata: Metadata::default(),
            slides: Vec::new(),
            media: Vec::new(),
            themes: Vec::new(),
            master_slides: Vec::new(),
            custom_properties: BTreeMap::new(),
        }
    }

    /// Build the diagnostic presentation for an unrecoverable failure.
    ///
    /// The single slide carries the title `"Error"` and the
    /// `custom_properties.error` entry holds the human-readable message.
    pub fn error(file_name: &str, file_size: u64, file_type: FileType, message: &str) -> Self {
        let mut pres = Self::new(file_name, file_size, file_type);
        let mut slide = Slide::new(1);
        slide.title = "Error".to_string();
        slide.text_content.push(message.to_string());
        pres.slides.push(slide);
        pres.custom_properties
            .insert("error".to_string(), message.to_string());
        pres.finalize();
        pres
    }

    /// The diagnostic slide emitted when parsing succeeded but nothing
    /// textual survived filtering.
    pub fn no_content_slide() -> Slide {
        let mut slide = Slide::new(1);
        slide.title = "No Content Found".to_string();
        slide
            .text_content
            .push("Could not extract text from this presentation.".to_string());
        slide
    }

    /// Seal the record: renumber slides, fill empty titles and recompute
    /// the slide and word totals.
    pub fn finalize(&mut self) {
        if self.slides.is_empty() {
            self.slides.push(Self::no_content_slide());
        }
        for (index, slide) in self.slides.iter_mut().enumerate() {
            slide.slide_number = index as u32 + 1;
            if slide.title.trim().is_empty() {
                slide.title = format!("Slide {}", slide.slide_number);
            }
        }
        self.metadata.total_slides = self.slides.len() as u32;
        self.metadata.total_words = count_words(&self.slides);
        self.extracted_at = Utc::now();
    }
}

/// Count whitespace-separated tokens over all slide titles and body text.
pub fn count_words(slides: &[Slide]) -> u32 {
    slides
        .iter()
        .map(|slide| {
            let title_words = slide.title.split_whitespace().count();
            let content_words: usize = slide
                .text_content
                .iter()
                .map(|text| text.split_whitespace().count())
                .sum();
            (title_words + content_words) as u32
        })
        .sum()
}

/// Generate a random RFC 4122 v4 identifier.
fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let mut out = String::with_capacity(36);
    for (i, byte) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
