//! OLE property-set decoding.
//!
//! `\x05SummaryInformation` and `\x05DocumentSummaryInformation` streams
//! serialize metadata as FMTID-scoped tables of typed values. Only the
//! types legacy PowerPoint actually writes for the fields of interest are
//! decoded (`VT_I4`, `VT_LPSTR`, `VT_LPWSTR`); anything else is skipped.
//! A decoding error on a single property discards that property only, and
//! the decoder always returns whatever it managed to read.
//!
//! The two streams use the *same numeric property ids for different
//! fields* (id 4 is the author in one and the slide count in the other),
//! so each stream gets its own mapping table.

use super::codepage::{decode_utf16le, decode_win1252};
use super::consts::{VT_I4, VT_LPSTR, VT_LPWSTR};
use crate::model::Metadata;
use std::collections::HashMap;
use zerocopy::{FromBytes, I32, LE, U32};

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// 32-bit signed integer (`VT_I4`)
    I4(i32),
    /// String (`VT_LPSTR` decoded as Windows-1252, `VT_LPWSTR` as UTF-16LE)
    Text(String),
}

/// Upper bound on property-set count; larger values mean a damaged stream.
const MAX_PROPERTY_SETS: u32 = 100;

/// Upper bound on properties within one section.
const MAX_PROPERTIES: u32 = 1000;

/// Decode the first property set of a property stream.
///
/// Returns an id → value map; empty when the stream header is implausible.
pub fn parse_property_set(data: &[u8]) -> HashMap<u32, PropertyValue> {
    let mut properties = HashMap::new();

    // Header: ByteOrder(2) Version(2) OSVersion(4) CLSID(16), then the
    // number of property sets.
    let Some(num_sets) = read_u32(data, 24) else {
        return properties;
    };
    if num_sets == 0 || num_sets > MAX_PROPERTY_SETS {
        log::debug!("property stream claims {} sets, ignoring", num_sets);
        return properties;
    }

    // First set: FMTID (16 bytes) then the section offset.
    let Some(section_start) = read_u32(data, 44).map(|v| v as usize) else {
        return properties;
    };
    let Some(num_props) = read_u32(data, section_start + 4) else {
        return properties;
    };
    let num_props = num_props.min(MAX_PROPERTIES);

    for i in 0..num_props as usize {
        let pair_offset = section_start + 8 + i * 8;
        let Some(prop_id) = read_u32(data, pair_offset) else {
            break;
        };
        let Some(value_offset) = read_u32(data, pair_offset + 4).map(|v| v as usize) else {
            break;
        };

        if let Some(value) = parse_property_value(data, section_start + value_offset) {
            properties.insert(prop_id, value);
        }
    }

    properties
}

/// Decode a single typed value at the given absolute offset.
fn parse_property_value(data: &[u8], offset: usize) -> Option<PropertyValue> {
    let prop_type = read_u32(data, offset)?;

    match prop_type {
        VT_I4 => {
            let bytes = data.get(offset + 4..offset + 8)?;
            let value = I32::<LE>::read_from_bytes(bytes).ok()?.get();
            Some(PropertyValue::I4(value))
        }
        VT_LPSTR => {
            let len = read_u32(data, offset + 4)? as usize;
            let bytes = data.get(offset + 8..offset + 8 + len)?;
            let text = decode_win1252(bytes);
            if text.is_empty() {
                None
            } else {
                Some(PropertyValue::Text(text))
            }
        }
        VT_LPWSTR => {
            let chars = read_u32(data, offset + 4)? as usize;
            let bytes = data.get(offset + 8..offset + 8 + chars.checked_mul(2)?)?;
            let text = decode_utf16le(bytes);
            if text.is_empty() {
                None
            } else {
                Some(PropertyValue::Text(text))
            }
        }
        _ => None,
    }
}

/// Apply SummaryInformation properties to the metadata record.
pub fn apply_summary_information(metadata: &mut Metadata, props: &HashMap<u32, PropertyValue>) {
    set_text(&mut metadata.title, props, 2);
    set_text(&mut metadata.subject, props, 3);
    set_text(&mut metadata.creator, props, 4);
    set_text(&mut metadata.keywords, props, 5);
    set_text(&mut metadata.description, props, 6);
    set_text(&mut metadata.last_modified_by, props, 8);
    set_text(&mut metadata.revision, props, 9);
    set_text(&mut metadata.application, props, 18);
}

/// Apply DocumentSummaryInformation properties to the metadata record.
pub fn apply_document_summary(metadata: &mut Metadata, props: &HashMap<u32, PropertyValue>) {
    set_text(&mut metadata.category, props, 2);
    set_text(&mut metadata.manager, props, 14);
    set_text(&mut metadata.company, props, 15);

    if let Some(PropertyValue::I4(count)) = props.get(&4) {
        metadata.total_slides = (*count).max(0) as u32;
    }
    if let Some(PropertyValue::I4(count)) = props.get(&6) {
        metadata.total_paragraphs = (*count).max(0) as u32;
    }
    if let Some(PropertyValue::I4(count)) = props.get(&7) {
        metadata.total_words = (*count).max(0) as u32;
    }
}

fn set_text(field: &mut Option<String>, props: &HashMap<u32, PropertyValue>, id: u32) {
    if let Some(PropertyValue::Text(text)) = props.get(&id) {
        *field = Some(text.clone());
    }
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    U32::<LE>::read_from_bytes(bytes).ok().map(|v| v.get())
}
