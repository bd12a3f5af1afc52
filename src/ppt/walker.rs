//! Recursive record walking.
//!
//! The `PowerPoint Document` stream is a flat sequence of records whose
//! container records nest recursively. The walker traverses that structure
//! with an explicit state record threaded through the recursion: the
//! current-slide counter, the text accumulators and the collected media all
//! live on [`WalkState`], never in captured closure state.
//!
//! Damaged length fields are recovered from by re-synchronizing one byte at
//! a time; recursion depth and per-level record counts are capped so the
//! walk terminates on any input.

use super::atoms;
use super::consts::RT_SLIDE;
use super::record::{HEADER_SIZE, RecordHeader};
use crate::media::Media;
use std::collections::BTreeMap;

/// Maximum container nesting depth.
pub const MAX_DEPTH: usize = 50;

/// Maximum records dispatched per nesting level.
pub const MAX_RECORDS_PER_LEVEL: usize = 100_000;

/// Maximum plausible single-record body length (100 MB).
pub const MAX_RECORD_LEN: u32 = 100 * 1024 * 1024;

/// Accumulator threaded through the record walk.
#[derive(Debug, Default)]
pub struct WalkState {
    /// Every accepted text, in order of occurrence
    pub texts: Vec<String>,
    /// Accepted texts keyed by the slide container they occurred in
    pub slide_texts: BTreeMap<u32, Vec<String>>,
    /// Collected blips, in order of first encounter
    pub media: Vec<Media>,
    /// Slide dimensions rendered as `"{W} x {H} inches"`
    pub presentation_format: Option<String>,
    /// Current slide container ordinal; 0 before the first slide
    pub current_slide: u32,
    /// How many slide containers enclose the cursor right now; text is
    /// bucketed per slide only while this is non-zero
    pub slide_depth: u32,
    /// Running blip index used for synthesized media names
    pub blip_count: usize,
}

impl WalkState {
    /// The bucket key for text at the current position, when inside a
    /// slide container.
    pub fn slide_bucket(&self) -> Option<u32> {
        (self.slide_depth > 0).then_some(self.current_slide)
    }
}

/// Walk a record stream from its start.
pub fn walk(data: &[u8], state: &mut WalkState) {
    walk_region(data, 0, state);
}

fn walk_region(data: &[u8], depth: usize, state: &mut WalkState) {
    let mut pos = 0usize;
    let mut records = 0usize;

    while pos + HEADER_SIZE <= data.len() {
        let Some(header) = RecordHeader::parse(&data[pos..]) else {
            break;
        };

        let remaining = data.len() - pos - HEADER_SIZE;
        let length = header.length as usize;
        if header.length > MAX_RECORD_LEN || length > remaining {
            // Implausible length: assume the header read was garbage and
            // re-synchronize one byte further on.
            pos += 1;
            continue;
        }

        records += 1;
        if records > MAX_RECORDS_PER_LEVEL {
            log::warn!("record cap reached at depth {}, stopping level", depth);
            break;
        }

        let body = &data[pos + HEADER_SIZE..pos + HEADER_SIZE + length];

        let entering_slide = header.record_type == RT_SLIDE;
        if entering_slide {
            // Entering a slide container: texts decoded inside it belong
            // to this slide.
            state.current_slide += 1;
            state.slide_depth += 1;
        }

        if header.is_container() {
            if depth < MAX_DEPTH {
                walk_region(body, depth + 1, state);
            } else {
                log::debug!("recursion depth cap reached, skipping container body");
            }
        } else {
            atoms::decode_atom(&header, body, state);
        }

        if entering_slide {
            state.slide_depth -= 1;
        }

        pos += HEADER_SIZE + length;
    }
}
