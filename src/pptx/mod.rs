//! Office Open XML (.pptx) parsing.
//!
//! A .pptx file is a ZIP archive of XML parts. Each part of interest has
//! its own decoder; all of them match elements by local name so namespace
//! prefix choices made by the producing application do not matter.

/// Entry point for .pptx extraction
pub mod parser;

/// docProps metadata parts (core, app, custom)
pub mod metadata;

/// Slide and notes-slide parts
pub mod slide;

/// Theme and slide-master parts
pub mod theme;

pub use parser::parse;

use quick_xml::events::BytesStart;

/// Read an attribute by local name, ignoring any namespace prefix.
pub(crate) fn get_attr(element: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == local {
            return Some(unescape_xml(&String::from_utf8_lossy(&attr.value)));
        }
    }
    None
}

/// Resolve the predefined entities and numeric character references.
///
/// Malformed references are kept verbatim rather than dropped.
pub(crate) fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            Some(semi) if semi <= 12 => {
                let entity = &tail[1..semi];
                match resolve_entity(entity) {
                    Some(c) => out.push(c),
                    None => out.push_str(&tail[..=semi]),
                }
                rest = &tail[semi + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = if let Some(hex) = code.strip_prefix('x').or(code.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                code.parse::<u32>().ok()?
            };
            char::from_u32(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_predefined_entities() {
        assert_eq!(unescape_xml("R&amp;D &lt;2025&gt;"), "R&D <2025>");
        assert_eq!(unescape_xml("no entities"), "no entities");
    }

    #[test]
    fn test_unescape_numeric_references() {
        assert_eq!(unescape_xml("&#8364; and &#x20AC;"), "€ and €");
    }

    #[test]
    fn test_unescape_keeps_malformed_references() {
        assert_eq!(unescape_xml("a & b"), "a & b");
        assert_eq!(unescape_xml("&bogus;"), "&bogus;");
        assert_eq!(unescape_xml("trailing &"), "trailing &");
    }
}
