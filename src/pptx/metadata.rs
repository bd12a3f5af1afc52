//! docProps metadata parts.
//!
//! `core.xml` carries Dublin-Core metadata, `app.xml` the application
//! statistics and `custom.xml` user-defined name/value properties.

use crate::error::{Error, Result};
use crate::model::Metadata;
use crate::pptx::{get_attr, unescape_xml};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;

/// Parse `docProps/core.xml` into the metadata record.
///
/// Elements are matched by local name, the same as every other part
/// decoder, so the producer's choice of namespace prefix does not matter.
/// The local names are unambiguous within a core-properties part.
pub fn parse_core_xml(xml: &[u8], metadata: &mut Metadata) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let field = match e.local_name().as_ref() {
                    b"title" => Some(&mut metadata.title),
                    b"subject" => Some(&mut metadata.subject),
                    b"creator" => Some(&mut metadata.creator),
                    b"keywords" => Some(&mut metadata.keywords),
                    b"description" => Some(&mut metadata.description),
                    b"lastModifiedBy" => Some(&mut metadata.last_modified_by),
                    b"revision" => Some(&mut metadata.revision),
                    b"category" => Some(&mut metadata.category),
                    b"created" => Some(&mut metadata.created),
                    b"modified" => Some(&mut metadata.modified),
                    _ => None,
                };
                if let Some(field) = field {
                    if let Some(text) = read_text_element(&mut reader)? {
                        *field = Some(text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(())
}

/// Parse `docProps/app.xml` into the metadata record.
pub fn parse_app_xml(xml: &[u8], metadata: &mut Metadata) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"Application" => metadata.application = read_text_element(&mut reader)?,
                b"AppVersion" => metadata.app_version = read_text_element(&mut reader)?,
                b"Company" => metadata.company = read_text_element(&mut reader)?,
                b"Manager" => metadata.manager = read_text_element(&mut reader)?,
                b"Template" => metadata.template = read_text_element(&mut reader)?,
                b"PresentationFormat" => {
                    metadata.presentation_format = read_text_element(&mut reader)?;
                }
                b"Slides" => {
                    metadata.total_slides = read_count_element(&mut reader)?;
                }
                b"Words" => {
                    metadata.total_words = read_count_element(&mut reader)?;
                }
                b"Paragraphs" => {
                    metadata.total_paragraphs = read_count_element(&mut reader)?;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(())
}

/// Parse `docProps/custom.xml` into a name → value map.
///
/// Each `<property name="…">` wraps one typed `vt:*` value element; the
/// value is taken as the property's first text node.
pub fn parse_custom_xml(xml: &[u8]) -> Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut properties = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"property" {
                    current = get_attr(&e, b"name");
                    value.clear();
                }
            }
            Ok(Event::Text(e)) if current.is_some() => {
                value.push_str(&unescape_xml(&String::from_utf8_lossy(e.as_ref())));
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"property" {
                    if let Some(name) = current.take() {
                        properties.insert(name, value.clone());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(properties)
}

/// Read the text content of the element whose start tag was just consumed.
fn read_text_element(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut text: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let chunk = unescape_xml(&String::from_utf8_lossy(e.as_ref()));
                match &mut text {
                    Some(existing) => existing.push_str(&chunk),
                    None => text = Some(chunk),
                }
            }
            Ok(Event::End(_)) | Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }
    Ok(text.filter(|t| !t.trim().is_empty()))
}

/// Read an element's text content as a count, defaulting to zero.
fn read_count_element(reader: &mut Reader<&[u8]>) -> Result<u32> {
    Ok(read_text_element(reader)?
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_properties() {
        let xml = br#"<?xml version="1.0"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
    xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/">
  <dc:title>Annual Report</dc:title>
  <dc:creator>Alice</dc:creator>
  <cp:lastModifiedBy>Bob</cp:lastModifiedBy>
  <dcterms:created>2024-01-15T09:30:00Z</dcterms:created>
  <cp:revision>7</cp:revision>
</cp:coreProperties>"#;

        let mut metadata = Metadata::default();
        parse_core_xml(xml, &mut metadata).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Annual Report"));
        assert_eq!(metadata.creator.as_deref(), Some("Alice"));
        assert_eq!(metadata.last_modified_by.as_deref(), Some("Bob"));
        assert_eq!(metadata.created.as_deref(), Some("2024-01-15T09:30:00Z"));
        assert_eq!(metadata.revision.as_deref(), Some("7"));
    }

    #[test]
    fn test_app_properties_and_counts() {
        let xml = br#"<?xml version="1.0"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
  <Application>Microsoft Office PowerPoint</Application>
  <AppVersion>16.0000</AppVersion>
  <Company>Acme Corp</Company>
  <PresentationFormat>Widescreen</PresentationFormat>
  <Slides>14</Slides>
  <Words>321</Words>
  <Paragraphs>58</Paragraphs>
</Properties>"#;

        let mut metadata = Metadata::default();
        parse_app_xml(xml, &mut metadata).unwrap();
        assert_eq!(
            metadata.application.as_deref(),
            Some("Microsoft Office PowerPoint")
        );
        assert_eq!(metadata.presentation_format.as_deref(), Some("Widescreen"));
        assert_eq!(metadata.total_slides, 14);
        assert_eq!(metadata.total_words, 321);
        assert_eq!(metadata.total_paragraphs, 58);
    }

    #[test]
    fn test_custom_properties() {
        let xml = br#"<?xml version="1.0"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties"
    xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="2" name="Project">
    <vt:lpwstr>Longan</vt:lpwstr>
  </property>
  <property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="3" name="Reviewed">
    <vt:bool>true</vt:bool>
  </property>
</Properties>"#;

        let props = parse_custom_xml(xml).unwrap();
        assert_eq!(props.get("Project").map(String::as_str), Some("Longan"));
        assert_eq!(props.get("Reviewed").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_core_properties_ignore_prefix_choice() {
        // Same part written with non-standard prefixes.
        let xml = br#"<?xml version="1.0"?>
<meta:coreProperties xmlns:meta="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
    xmlns:dublin="http://purl.org/dc/elements/1.1/" xmlns:terms="http://purl.org/dc/terms/">
  <dublin:title>Annual Report</dublin:title>
  <dublin:creator>Alice</dublin:creator>
  <terms:modified>2024-02-01T00:00:00Z</terms:modified>
</meta:coreProperties>"#;

        let mut metadata = Metadata::default();
        parse_core_xml(xml, &mut metadata).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Annual Report"));
        assert_eq!(metadata.creator.as_deref(), Some("Alice"));
        assert_eq!(metadata.modified.as_deref(), Some("2024-02-01T00:00:00Z"));
    }

    #[test]
    fn test_missing_fields_stay_none() {
        let mut metadata = Metadata::default();
        parse_core_xml(b"<cp:coreProperties/>", &mut metadata).unwrap();
        assert!(metadata.title.is_none());
        assert_eq!(metadata.total_slides, 0);
    }
}
