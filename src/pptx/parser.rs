//! Modern `.pptx` parsing.
//!
//! The file is a ZIP archive of XML parts; a fixed set of parts is read and
//! everything else ignored. A missing part degrades to an empty output, a
//! part that fails to parse is skipped with a log line, and only a broken
//! archive aborts (into a diagnostic presentation, never an error).

use super::{metadata, slide, theme};
use crate::error::Result;
use crate::media::Media;
use crate::model::{FileType, Presentation};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Parse a PowerPoint OOXML file. Total: always returns a presentation.
pub fn parse(
    data: &[u8],
    file_name: &str,
    file_size: u64,
    modified: Option<DateTime<Utc>>,
) -> Presentation {
    match parse_archive(data, file_name, file_size, modified) {
        Ok(pres) => pres,
        Err(err) => {
            log::warn!("unrecoverable .pptx failure: {}", err);
            Presentation::error(file_name, file_size, FileType::Pptx, &err.to_string())
        }
    }
}

fn parse_archive(
    data: &[u8],
    file_name: &str,
    file_size: u64,
    modified: Option<DateTime<Utc>>,
) -> Result<Presentation> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let names: Vec<String> = archive.file_names().map(String::from).collect();

    let mut pres = Presentation::new(file_name, file_size, FileType::Pptx);

    // Metadata parts; each is optional and skipped when unparsable.
    if let Some(xml) = read_part(&mut archive, "docProps/core.xml") {
        if let Err(err) = metadata::parse_core_xml(&xml, &mut pres.metadata) {
            log::warn!("skipping docProps/core.xml: {}", err);
        }
    }
    if let Some(xml) = read_part(&mut archive, "docProps/app.xml") {
        if let Err(err) = metadata::parse_app_xml(&xml, &mut pres.metadata) {
            log::warn!("skipping docProps/app.xml: {}", err);
        }
    }
    if let Some(xml) = read_part(&mut archive, "docProps/custom.xml") {
        match metadata::parse_custom_xml(&xml) {
            Ok(props) => pres.custom_properties = props,
            Err(err) => log::warn!("skipping docProps/custom.xml: {}", err),
        }
    }
    if pres.metadata.modified.is_none() {
        pres.metadata.modified = modified.map(|m| m.to_rfc3339());
    }

    // Slides, in numeric part order, with their paired notes parts.
    let mut slides = BTreeMap::new();
    for (number, part) in numbered_parts(&names, "ppt/slides/slide") {
        if let Some(xml) = read_part(&mut archive, &part) {
            match slide::parse_slide_xml(&xml) {
                Ok(content) => {
                    slides.insert(number, slide::build_slide(content));
                }
                Err(err) => log::warn!("skipping {}: {}", part, err),
            }
        }
    }
    for (number, part) in numbered_parts(&names, "ppt/notesSlides/notesSlide") {
        if let Some(xml) = read_part(&mut archive, &part) {
            match slide::parse_notes_xml(&xml) {
                Ok(notes) => {
                    if let Some(slide) = slides.get_mut(&number) {
                        slide.notes = notes;
                    }
                }
                Err(err) => log::warn!("skipping {}: {}", part, err),
            }
        }
    }
    pres.slides = slides.into_values().collect();

    // Themes and master names.
    for (_, part) in numbered_parts(&names, "ppt/theme/theme") {
        if let Some(xml) = read_part(&mut archive, &part) {
            match theme::parse_theme_xml(&xml) {
                Ok(theme) => pres.themes.push(theme),
                Err(err) => log::warn!("skipping {}: {}", part, err),
            }
        }
    }
    for (number, part) in numbered_parts(&names, "ppt/slideMasters/slideMaster") {
        if let Some(xml) = read_part(&mut archive, &part) {
            let name = theme::parse_master_name(&xml).ok().flatten();
            pres.master_slides
                .push(name.unwrap_or_else(|| format!("Slide Master {}", number)));
        }
    }

    // Binary media, in archive order.
    for name in &names {
        if let Some(base_name) = name.strip_prefix("ppt/media/") {
            if base_name.is_empty() {
                continue;
            }
            if let Some(bytes) = read_part(&mut archive, name) {
                let extension = base_name.rsplit('.').next().filter(|e| *e != base_name);
                pres.media.push(Media::from_bytes(
                    base_name,
                    extension.unwrap_or(""),
                    &bytes,
                ));
            }
        }
    }

    pres.finalize();
    Ok(pres)
}

/// Read one archive entry fully, mapping absence to `None`.
fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Option<Vec<u8>> {
    let mut file = archive.by_name(name).ok()?;
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes).ok()?;
    Some(bytes)
}

/// Collect part names of the form `{prefix}{n}.xml`, ordered by `n`.
///
/// Numeric ordering matters: `slide10.xml` follows `slide9.xml`, which
/// lexicographic ordering would get wrong.
fn numbered_parts(names: &[String], prefix: &str) -> Vec<(u32, String)> {
    let mut parts: Vec<(u32, String)> = names
        .iter()
        .filter_map(|name| {
            let number = name
                .strip_prefix(prefix)?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.clone()))
        })
        .collect();
    parts.sort_by_key(|(number, _)| *number);
    parts
}
