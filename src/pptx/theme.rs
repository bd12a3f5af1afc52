//! Theme and slide-master part decoding.

use crate::error::{Error, Result};
use crate::model::Theme;
use crate::pptx::get_attr;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Color-scheme slots in the order they appear in a theme part.
const COLOR_ROLES: &[&[u8]] = &[
    b"dk1", b"lt1", b"dk2", b"lt2", b"accent1", b"accent2", b"accent3", b"accent4", b"accent5",
    b"accent6", b"hlink", b"folHlink",
];

/// Parse a `ppt/theme/themeN.xml` part.
///
/// Colors are rendered as `"{role}: #RRGGBB"`; fonts as
/// `"Major: {typeface}"` / `"Minor: {typeface}"`.
pub fn parse_theme_xml(xml: &[u8]) -> Result<Theme> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut theme = Theme::default();
    let mut current_role: Option<String> = None;
    let mut font_slot: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = e.local_name();
                let local = local.as_ref();

                if local == b"theme" && theme.name.is_empty() {
                    if let Some(name) = get_attr(&e, b"name") {
                        theme.name = name;
                    }
                } else if COLOR_ROLES.contains(&local) {
                    current_role = Some(String::from_utf8_lossy(local).into_owned());
                } else if local == b"srgbClr" {
                    if let Some(role) = &current_role {
                        if let Some(value) = get_attr(&e, b"val") {
                            theme
                                .colors
                                .push(format!("{}: #{}", role, value.to_uppercase()));
                            current_role = None;
                        }
                    }
                } else if local == b"sysClr" {
                    if let Some(role) = &current_role {
                        if let Some(value) = get_attr(&e, b"lastClr") {
                            theme
                                .colors
                                .push(format!("{}: #{}", role, value.to_uppercase()));
                            current_role = None;
                        }
                    }
                } else if local == b"majorFont" {
                    font_slot = Some("Major");
                } else if local == b"minorFont" {
                    font_slot = Some("Minor");
                } else if local == b"latin" {
                    if let Some(slot) = font_slot.take() {
                        if let Some(typeface) = get_attr(&e, b"typeface") {
                            theme.fonts.push(format!("{}: {}", slot, typeface));
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if COLOR_ROLES.contains(&e.local_name().as_ref()) {
                    current_role = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(theme)
}

/// Read the display name of a `ppt/slideMasters/slideMasterN.xml` part.
///
/// The name lives on the `cSld` element; masters written without one get a
/// synthesized name from the caller.
pub fn parse_master_name(xml: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"cSld" {
                    return Ok(get_attr(&e, b"name").filter(|n| !n.is_empty()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME_XML: &str = r#"<?xml version="1.0"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:accent1><a:srgbClr val="4472c4"/></a:accent1>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#;

    #[test]
    fn test_theme_name_colors_fonts() {
        let theme = parse_theme_xml(THEME_XML.as_bytes()).unwrap();
        assert_eq!(theme.name, "Office Theme");
        assert_eq!(
            theme.colors,
            vec!["dk1: #000000", "lt1: #FFFFFF", "accent1: #4472C4"]
        );
        assert_eq!(theme.fonts, vec!["Major: Calibri Light", "Minor: Calibri"]);
    }

    #[test]
    fn test_master_name() {
        let xml = br#"<p:sldMaster xmlns:p="x"><p:cSld name="Main Master"/></p:sldMaster>"#;
        assert_eq!(
            parse_master_name(xml).unwrap().as_deref(),
            Some("Main Master")
        );
        assert_eq!(parse_master_name(b"<p:sldMaster/>").unwrap(), None);
    }
}
