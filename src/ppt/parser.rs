//! Legacy `.ppt` parsing.
//!
//! Opens the OLE container, walks the `PowerPoint Document` stream (and the
//! `Pictures` stream, which stores blips outside the document stream),
//! decodes the two metadata property sets and assembles slides. Every
//! failure degrades: a file that is not even a compound file is scanned for
//! loose UTF-16 text, and the worst case is a presentation whose single
//! slide says that nothing was found. This function does not fail.

use super::walker::{self, WalkState};
use crate::assemble::{AssembleOptions, assemble_slides};
use crate::model::{FileType, Presentation};
use crate::ole::{CompoundFile, propset};
use crate::text::{is_valid_text, sanitize};
use chrono::{DateTime, Utc};

/// Stream holding the record stream of the presentation.
const DOCUMENT_STREAM: &str = "PowerPoint Document";

/// Stream holding picture payloads referenced from the document stream.
const PICTURES_STREAM: &str = "Pictures";

const SUMMARY_STREAM: &str = "\u{5}SummaryInformation";
const DOC_SUMMARY_STREAM: &str = "\u{5}DocumentSummaryInformation";

/// Minimum length for strings recovered by the loose binary scan.
const MIN_SCAN_RUN: usize = 4;

/// Upper bound on strings recovered by the loose binary scan.
const MAX_SCAN_TEXTS: usize = 1000;

/// Parse a legacy PowerPoint file. Total: always returns a presentation.
pub fn parse(
    data: &[u8],
    file_name: &str,
    file_size: u64,
    modified: Option<DateTime<Utc>>,
) -> Presentation {
    let mut pres = Presentation::new(file_name, file_size, FileType::Ppt);
    let mut state = WalkState::default();

    match CompoundFile::open(data) {
        Ok(mut cfb) => {
            match cfb.open_stream(DOCUMENT_STREAM) {
                Ok(document) => walker::walk(&document, &mut state),
                Err(err) => {
                    log::warn!("no document stream ({}), scanning raw bytes", err);
                    scan_loose_text(data, &mut state);
                }
            }

            if let Some(pictures) = cfb.find(PICTURES_STREAM) {
                walker::walk(&pictures, &mut state);
            }

            if let Some(stream) = cfb.find(SUMMARY_STREAM) {
                let props = propset::parse_property_set(&stream);
                propset::apply_summary_information(&mut pres.metadata, &props);
            }
            if let Some(stream) = cfb.find(DOC_SUMMARY_STREAM) {
                let props = propset::parse_property_set(&stream);
                propset::apply_document_summary(&mut pres.metadata, &props);
            }
        }
        Err(err) => {
            log::warn!("not a compound file ({}), scanning raw bytes", err);
            scan_loose_text(data, &mut state);
        }
    }

    if pres.metadata.modified.is_none() {
        pres.metadata.modified = modified.map(|m| m.to_rfc3339());
    }
    pres.metadata.presentation_format = state.presentation_format.take();
    pres.media = std::mem::take(&mut state.media);
    pres.slides = assemble_slides(
        &state.slide_texts,
        &state.texts,
        &AssembleOptions::default(),
    );
    pres.finalize();
    pres
}

/// Best-effort recovery scan for inputs without a readable record stream.
///
/// Looks for runs of printable UTF-16LE code units at both byte alignments;
/// whatever survives the normal text filters feeds the heuristic assembler.
fn scan_loose_text(data: &[u8], state: &mut WalkState) {
    for offset in 0..2usize {
        if offset >= data.len() {
            break;
        }
        scan_aligned(&data[offset..], state);
        if state.texts.len() >= MAX_SCAN_TEXTS {
            break;
        }
    }
}

fn scan_aligned(data: &[u8], state: &mut WalkState) {
    let mut run = String::new();

    for chunk in data.chunks_exact(2) {
        let unit = u16::from_le_bytes([chunk[0], chunk[1]]);
        match printable_unit(unit) {
            Some(c) => run.push(c),
            None => {
                flush_run(&mut run, state);
                if state.texts.len() >= MAX_SCAN_TEXTS {
                    return;
                }
            }
        }
    }
    flush_run(&mut run, state);
}

fn flush_run(run: &mut String, state: &mut WalkState) {
    if run.chars().count() >= MIN_SCAN_RUN {
        let text = sanitize(run);
        if is_valid_text(&text) {
            state.texts.push(text);
        }
    }
    run.clear();
}

/// A code unit that could plausibly be part of visible text: ASCII
/// printable, Latin-1/Latin-Extended, Greek or Cyrillic.
fn printable_unit(unit: u16) -> Option<char> {
    match unit {
        0x0020..=0x007E | 0x00A0..=0x024F | 0x0370..=0x03FF | 0x0400..=0x04FF => {
            char::from_u32(unit as u32)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_noise_yields_diagnostic_presentation() {
        let noise: Vec<u8> = (0u32..4096).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
        let pres = parse(&noise, "noise.ppt", noise.len() as u64, None);
        assert!(!pres.slides.is_empty());
        assert_eq!(pres.metadata.total_slides as usize, pres.slides.len());
    }

    #[test]
    fn test_empty_input_yields_diagnostic_presentation() {
        let pres = parse(b"", "empty.ppt", 0, None);
        assert_eq!(pres.slides.len(), 1);
        assert_eq!(pres.slides[0].title, "No Content Found");
    }

    #[test]
    fn test_loose_scan_recovers_embedded_strings() {
        // UTF-16LE text buried in zero padding, at an odd byte offset.
        let mut data = vec![0u8; 33];
        for unit in "Quarterly business review".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 32]);

        let mut state = WalkState::default();
        scan_loose_text(&data, &mut state);
        assert!(
            state
                .texts
                .iter()
                .any(|t| t == "Quarterly business review")
        );
    }

    #[test]
    fn test_modified_fallback_applies() {
        let stamp = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let pres = parse(b"", "empty.ppt", 0, Some(stamp));
        assert_eq!(
            pres.metadata.modified.as_deref(),
            Some("2024-05-01T12:00:00+00:00")
        );
    }
}
