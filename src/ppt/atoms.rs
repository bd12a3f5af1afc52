//! Leaf-record decoding.
//!
//! Atom bodies carry the actual content: text in one of two encodings,
//! image payloads behind a uid prefix, and the document atom with the
//! slide dimensions. Decoded text goes through sanitization and the
//! acceptance predicate before it reaches the accumulators; a rejected
//! string is silently dropped and the walk continues.

use super::consts::*;
use super::walker::WalkState;
use crate::media::Media;
use crate::ole::codepage::{decode_utf16le, decode_win1252};
use crate::ppt::record::RecordHeader;
use crate::text::{is_valid_text, sanitize};
use zerocopy::{FromBytes, I32, LE};

/// EMUs per inch, the unit slide dimensions are stored in.
const EMU_PER_INCH: f64 = 914_400.0;

/// Blip payloads at or below this size are leftovers of damaged records,
/// not images.
const MIN_BLIP_PAYLOAD: usize = 100;

/// uid prefix length for raster blips (JPEG, PNG).
const RASTER_UID_LEN: usize = 17;

/// uid prefix length for metafile blips (EMF, WMF, PICT, DIB, TIFF).
const METAFILE_UID_LEN: usize = 16;

/// Decode a single non-container record into the walk state.
pub fn decode_atom(header: &RecordHeader, body: &[u8], state: &mut WalkState) {
    match header.record_type {
        RT_TEXT_CHARS_ATOM => push_text(state, decode_utf16le(body)),
        RT_TEXT_BYTES_ATOM => push_text(state, decode_win1252(body)),
        RT_CSTRING => push_text(state, decode_utf16le(body)),
        // Carries the text type of the following atom; nothing to keep.
        RT_TEXT_HEADER_ATOM => {}
        RT_DOCUMENT_ATOM => decode_document_atom(body, state),
        ART_BLIP_JPEG | ART_BLIP_JPEG2 => push_blip(state, body, RASTER_UID_LEN, "jpg"),
        ART_BLIP_PNG => push_blip(state, body, RASTER_UID_LEN, "png"),
        ART_BLIP_EMF => push_blip(state, body, METAFILE_UID_LEN, "emf"),
        ART_BLIP_WMF => push_blip(state, body, METAFILE_UID_LEN, "wmf"),
        ART_BLIP_PICT => push_blip(state, body, METAFILE_UID_LEN, "pict"),
        ART_BLIP_DIB => push_blip(state, body, METAFILE_UID_LEN, "bmp"),
        ART_BLIP_TIFF => push_blip(state, body, METAFILE_UID_LEN, "tiff"),
        _ => {}
    }
}

/// Sanitize, validate and record a decoded string.
fn push_text(state: &mut WalkState, raw: String) {
    let text = sanitize(&raw);
    if !is_valid_text(&text) {
        return;
    }

    if let Some(bucket) = state.slide_bucket() {
        state.slide_texts.entry(bucket).or_default().push(text.clone());
    }
    state.texts.push(text);
}

/// Decode the document atom: the first two int32s are the slide extent in
/// EMUs. The remaining fields (notes size, persist refs, flags) are not
/// needed here.
fn decode_document_atom(body: &[u8], state: &mut WalkState) {
    if body.len() < 8 {
        return;
    }
    let width = read_i32(body, 0);
    let height = read_i32(body, 4);
    if width <= 0 || height <= 0 {
        return;
    }

    let width_in = width as f64 / EMU_PER_INCH;
    let height_in = height as f64 / EMU_PER_INCH;
    state.presentation_format = Some(format!("{:.1} x {:.1} inches", width_in, height_in));
}

/// Record a blip payload after stripping the uid prefix.
fn push_blip(state: &mut WalkState, body: &[u8], uid_len: usize, extension: &str) {
    if body.len() <= uid_len {
        return;
    }
    let payload = &body[uid_len..];
    if payload.len() <= MIN_BLIP_PAYLOAD {
        log::debug!("ignoring {}-byte blip payload", payload.len());
        return;
    }

    state.blip_count += 1;
    let name = format!("image_{}.{}", state.blip_count, extension);
    state.media.push(Media::blip(&name, extension, payload));
}

#[inline]
fn read_i32(data: &[u8], offset: usize) -> i32 {
    data.get(offset..offset + 4)
        .and_then(|b| I32::<LE>::read_from_bytes(b).ok())
        .map(|v| v.get())
        .unwrap_or(0)
}
