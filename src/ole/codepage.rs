//! Character decoding for legacy streams.
//!
//! Legacy PowerPoint text comes in exactly two encodings: UTF-16LE and
//! Windows-1252. Both decoders treat a NUL as an early terminator, which is
//! how Office writes fixed-size buffers.

use encoding_rs::WINDOWS_1252;

/// Decode Windows-1252 bytes to a String.
///
/// Bytes 0x00–0x7F and 0xA0–0xFF map to the same code points; 0x80–0x9F map
/// through the Windows-1252 extension table (€, ‚, ƒ, „, …). Decoding stops
/// at the first NUL byte.
pub fn decode_win1252(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let (decoded, _, _) = WINDOWS_1252.decode(&bytes[..end]);
    decoded.into_owned()
}

/// Decode UTF-16LE bytes to a String.
///
/// Incomplete trailing code units are dropped; decoding stops at the first
/// NUL code unit; invalid sequences are replaced lossily.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .take_while(|&unit| unit != 0)
        .collect();

    String::from_utf16_lossy(&units)
}
