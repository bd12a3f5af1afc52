//! Format dispatch.
//!
//! One total entry point per format plus a dispatcher keyed on the file
//! extension. Every path returns a presentation; the worst outcome for
//! any input is a diagnostic slide, never a panic or an error.

use crate::model::{FileType, Presentation};
use chrono::{DateTime, Utc};

/// Parse a legacy `.ppt` file. Never fails.
pub fn parse_ppt(
    data: &[u8],
    file_name: &str,
    file_size: u64,
    modified: Option<DateTime<Utc>>,
) -> Presentation {
    crate::ppt::parse(data, file_name, file_size, modified)
}

/// Parse a `.pptx` file. Never fails.
pub fn parse_pptx(
    data: &[u8],
    file_name: &str,
    file_size: u64,
    modified: Option<DateTime<Utc>>,
) -> Presentation {
    crate::pptx::parse(data, file_name, file_size, modified)
}

/// Parse a presentation, choosing the parser by file extension
/// (case-insensitive). Unknown extensions yield a diagnostic presentation.
pub fn extract(
    data: &[u8],
    file_name: &str,
    file_size: u64,
    modified: Option<DateTime<Utc>>,
) -> Presentation {
    let lowered = file_name.to_ascii_lowercase();
    if lowered.ends_with(".pptx") {
        parse_pptx(data, file_name, file_size, modified)
    } else if lowered.ends_with(".ppt") {
        parse_ppt(data, file_name, file_size, modified)
    } else {
        log::warn!("unsupported extension on {}", file_name);
        Presentation::error(
            file_name,
            file_size,
            FileType::Pptx,
            "Unsupported file type: expected .ppt or .pptx",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    // ---- fixture builders -------------------------------------------------

    /// Build a minimal compound file holding the given root-level streams.
    ///
    /// Uses 512-byte sectors, one FAT sector, one directory sector and a
    /// zero mini-stream cutoff so every stream reads through the FAT.
    fn build_cfb(streams: &[(&str, &[u8])]) -> Vec<u8> {
        assert!(streams.len() <= 3, "one directory sector holds 4 entries");

        let sector = 512usize;
        let mut stream_sectors: Vec<(u32, usize)> = Vec::new(); // (start, count)
        let mut next_sector = 2u32; // 0 = FAT, 1 = directory
        for (_, data) in streams {
            let count = data.len().div_ceil(sector).max(1);
            stream_sectors.push((next_sector, count));
            next_sector += count as u32;
        }
        let total_sectors = next_sector as usize;

        // Header
        let mut out = vec![0u8; sector];
        out[0..8].copy_from_slice(b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1");
        out[0x1A..0x1C].copy_from_slice(&3u16.to_le_bytes()); // DLL version
        out[0x1C..0x1E].copy_from_slice(&0xFFFEu16.to_le_bytes()); // byte order
        out[0x1E..0x20].copy_from_slice(&9u16.to_le_bytes()); // sector shift
        out[0x20..0x22].copy_from_slice(&6u16.to_le_bytes()); // mini sector shift
        out[0x2C..0x30].copy_from_slice(&1u32.to_le_bytes()); // FAT sector count
        out[0x30..0x34].copy_from_slice(&1u32.to_le_bytes()); // first dir sector
        // Mini cutoff 0: everything reads via the regular FAT.
        out[0x38..0x3C].copy_from_slice(&0u32.to_le_bytes());
        out[0x3C..0x40].copy_from_slice(&0xFFFFFFFEu32.to_le_bytes()); // first MiniFAT
        out[0x44..0x48].copy_from_slice(&0xFFFFFFFEu32.to_le_bytes()); // first DIFAT
        out[0x4C..0x50].copy_from_slice(&0u32.to_le_bytes()); // FAT sector 0
        for i in 1..109 {
            let offset = 0x4C + i * 4;
            out[offset..offset + 4].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        }

        // FAT sector: sector 0 = FAT marker, sector 1 = end of dir chain,
        // stream sectors chain consecutively.
        let mut fat = vec![0xFFFFFFFFu32; sector / 4];
        fat[0] = 0xFFFFFFFD;
        fat[1] = 0xFFFFFFFE;
        for &(start, count) in &stream_sectors {
            for i in 0..count {
                let id = start as usize + i;
                fat[id] = if i + 1 == count {
                    0xFFFFFFFE
                } else {
                    (id + 1) as u32
                };
            }
        }
        for entry in &fat {
            out.extend_from_slice(&entry.to_le_bytes());
        }

        // Directory sector: root + stream entries chained as siblings.
        let mut dir = Vec::new();
        dir.extend_from_slice(&dir_entry(
            "Root Entry",
            5,
            0xFFFFFFFF,
            0xFFFFFFFF,
            if streams.is_empty() { 0xFFFFFFFF } else { 1 },
            0xFFFFFFFE,
            0,
        ));
        for (i, ((name, data), &(start, _))) in streams.iter().zip(&stream_sectors).enumerate() {
            let right = if i + 1 < streams.len() {
                (i + 2) as u32
            } else {
                0xFFFFFFFF
            };
            dir.extend_from_slice(&dir_entry(
                name,
                2,
                0xFFFFFFFF,
                right,
                0xFFFFFFFF,
                start,
                data.len() as u64,
            ));
        }
        dir.resize(sector, 0);
        out.extend_from_slice(&dir);

        // Stream sectors
        for ((_, data), &(_, count)) in streams.iter().zip(&stream_sectors) {
            let mut padded = data.to_vec();
            padded.resize(count * sector, 0);
            out.extend_from_slice(&padded);
        }

        assert_eq!(out.len(), (total_sectors + 1) * sector);
        out
    }

    fn dir_entry(
        name: &str,
        entry_type: u8,
        left: u32,
        right: u32,
        child: u32,
        start_sector: u32,
        size: u64,
    ) -> [u8; 128] {
        let mut out = [0u8; 128];
        let units: Vec<u16> = name.encode_utf16().collect();
        for (i, unit) in units.iter().take(31).enumerate() {
            out[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        let name_len = (units.len().min(31) as u16 + 1) * 2;
        out[64..66].copy_from_slice(&name_len.to_le_bytes());
        out[66] = entry_type;
        out[67] = 1;
        out[68..72].copy_from_slice(&left.to_le_bytes());
        out[72..76].copy_from_slice(&right.to_le_bytes());
        out[76..80].copy_from_slice(&child.to_le_bytes());
        out[116..120].copy_from_slice(&start_sector.to_le_bytes());
        out[120..128].copy_from_slice(&size.to_le_bytes());
        out
    }

    fn ppt_record(version: u16, record_type: u16, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + body.len());
        out.extend_from_slice(&(version & 0xF).to_le_bytes());
        out.extend_from_slice(&record_type.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    /// Build an in-memory .pptx archive from (part name, content) pairs.
    fn build_pptx(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for (name, content) in parts {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn slide_xml(title: &str, body: &str) -> String {
        format!(
            r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
  <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
    <p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>
  <p:sp><p:nvSpPr><p:nvPr><p:ph type="body"/></p:nvPr></p:nvSpPr>
    <p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#,
            title, body
        )
    }

    // ---- scenarios --------------------------------------------------------

    #[test]
    fn scenario_pptx_single_slide() {
        let slide = slide_xml("Hello", "World");
        let data = build_pptx(&[("ppt/slides/slide1.xml", slide.as_bytes())]);
        let pres = extract(&data, "hello.pptx", data.len() as u64, None);

        assert_eq!(pres.slides.len(), 1);
        assert_eq!(pres.slides[0].slide_number, 1);
        assert_eq!(pres.slides[0].title, "Hello");
        assert_eq!(pres.slides[0].text_content, vec!["World"]);
        assert_eq!(pres.metadata.total_slides, 1);
        assert_eq!(pres.metadata.total_words, 2);
    }

    #[test]
    fn scenario_pptx_notes_filter_numeric_placeholder() {
        let notes = r#"<p:notes><p:sp><p:txBody>
            <a:p><a:r><a:t>Speak softly</a:t></a:r></a:p>
            <a:p><a:r><a:t>42</a:t></a:r></a:p>
        </p:txBody></p:sp></p:notes>"#;
        let slides: Vec<String> = (1..=3).map(|i| slide_xml(&format!("Slide {}", i), "x")).collect();
        let data = build_pptx(&[
            ("ppt/slides/slide1.xml", slides[0].as_bytes()),
            ("ppt/slides/slide2.xml", slides[1].as_bytes()),
            ("ppt/slides/slide3.xml", slides[2].as_bytes()),
            ("ppt/notesSlides/notesSlide2.xml", notes.as_bytes()),
        ]);
        let pres = extract(&data, "deck.pptx", data.len() as u64, None);

        assert_eq!(pres.slides.len(), 3);
        assert_eq!(pres.slides[1].notes, "Speak softly");
        assert_eq!(pres.slides[0].notes, "");
    }

    #[test]
    fn scenario_pptx_media_roundtrip() {
        let payload = b"\x89PNG\r\n\x1a\n";
        let data = build_pptx(&[("ppt/media/image1.png", payload.as_slice())]);
        let pres = extract(&data, "deck.pptx", data.len() as u64, None);

        assert_eq!(pres.media.len(), 1);
        let media = &pres.media[0];
        assert_eq!(media.name, "image1.png");
        assert_eq!(media.extension, "png");
        assert_eq!(media.size, payload.len());
        let decoded = {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(media.data.as_deref().unwrap())
                .unwrap()
        };
        assert_eq!(decoded, payload);
    }

    #[test]
    fn scenario_ppt_text_atoms() {
        let mut document = ppt_record(0, crate::ppt::consts::RT_TEXT_CHARS_ATOM, &utf16("Agenda"));
        document.extend(ppt_record(
            0,
            crate::ppt::consts::RT_TEXT_BYTES_ATOM,
            b"Q3 Results",
        ));
        let data = build_cfb(&[("PowerPoint Document", &document)]);
        let pres = extract(&data, "legacy.ppt", data.len() as u64, None);

        assert_eq!(pres.slides[0].title, "Agenda");
        assert!(pres.slides[0].text_content.contains(&"Q3 Results".to_string()));
    }

    #[test]
    fn scenario_ppt_summary_information_creator() {
        // Property stream: one VT_LPWSTR property with id 4 (creator).
        let mut value = 0x1Fu32.to_le_bytes().to_vec();
        let units: Vec<u16> = "Alice".encode_utf16().chain(std::iter::once(0)).collect();
        value.extend_from_slice(&(units.len() as u32).to_le_bytes());
        for unit in &units {
            value.extend_from_slice(&unit.to_le_bytes());
        }

        let mut propset = vec![0u8; 48];
        propset[0] = 0xFE;
        propset[1] = 0xFF;
        propset[24..28].copy_from_slice(&1u32.to_le_bytes());
        propset[44..48].copy_from_slice(&48u32.to_le_bytes());
        let section_len = (16 + value.len()) as u32;
        propset.extend_from_slice(&section_len.to_le_bytes());
        propset.extend_from_slice(&1u32.to_le_bytes());
        propset.extend_from_slice(&4u32.to_le_bytes());
        propset.extend_from_slice(&16u32.to_le_bytes());
        propset.extend_from_slice(&value);

        let document = ppt_record(0, crate::ppt::consts::RT_TEXT_CHARS_ATOM, &utf16("Welcome"));
        let data = build_cfb(&[
            ("PowerPoint Document", &document),
            ("\u{5}SummaryInformation", &propset),
        ]);
        let pres = extract(&data, "legacy.ppt", data.len() as u64, None);

        assert_eq!(pres.metadata.creator.as_deref(), Some("Alice"));
    }

    #[test]
    fn scenario_random_noise_is_survivable() {
        let noise: Vec<u8> = (0u32..8192)
            .map(|i| (i.wrapping_mul(2654435761).rotate_left(7) >> 5) as u8)
            .collect();
        let pres = extract(&noise, "noise.ppt", noise.len() as u64, None);

        assert!(!pres.slides.is_empty());
        assert_eq!(pres.metadata.total_slides as usize, pres.slides.len());
    }

    #[test]
    fn test_ppt_slide_containers_drive_slide_numbers() {
        let slide1 = ppt_record(
            0xF,
            crate::ppt::consts::RT_SLIDE,
            &ppt_record(0, crate::ppt::consts::RT_TEXT_CHARS_ATOM, &utf16("First slide title")),
        );
        let mut inner2 = ppt_record(
            0,
            crate::ppt::consts::RT_TEXT_CHARS_ATOM,
            &utf16("Second slide title"),
        );
        inner2.extend(ppt_record(
            0,
            crate::ppt::consts::RT_TEXT_CHARS_ATOM,
            &utf16("Body of the second slide"),
        ));
        let slide2 = ppt_record(0xF, crate::ppt::consts::RT_SLIDE, &inner2);

        let mut document = slide1;
        document.extend(slide2);
        let data = build_cfb(&[("PowerPoint Document", &document)]);
        let pres = extract(&data, "two.ppt", data.len() as u64, None);

        assert_eq!(pres.slides.len(), 2);
        assert_eq!(pres.slides[0].slide_number, 1);
        assert_eq!(pres.slides[0].title, "First slide title");
        assert_eq!(pres.slides[1].title, "Second slide title");
        assert_eq!(
            pres.slides[1].text_content,
            vec!["Body of the second slide"]
        );
    }

    #[test]
    fn test_ppt_blip_extraction_from_pictures_stream() {
        let mut blip_body = vec![0u8; 17];
        blip_body.extend(std::iter::repeat_n(0xA5u8, 300));
        let pictures = ppt_record(0, crate::ppt::consts::ART_BLIP_JPEG, &blip_body);
        let document = ppt_record(0, crate::ppt::consts::RT_TEXT_CHARS_ATOM, &utf16("Photos"));
        let data = build_cfb(&[
            ("PowerPoint Document", &document),
            ("Pictures", &pictures),
        ]);
        let pres = extract(&data, "pics.ppt", data.len() as u64, None);

        assert_eq!(pres.media.len(), 1);
        assert_eq!(pres.media[0].name, "image_1.jpg");
        assert_eq!(pres.media[0].size, 300);
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        let slide = slide_xml("Hello", "World");
        let data = build_pptx(&[("ppt/slides/slide1.xml", slide.as_bytes())]);
        let pres = extract(&data, "DECK.PPTX", data.len() as u64, None);
        assert_eq!(pres.slides[0].title, "Hello");
        assert_eq!(pres.file_type, crate::model::FileType::Pptx);
    }

    #[test]
    fn test_unknown_extension_is_diagnostic() {
        let pres = extract(b"whatever", "notes.txt", 8, None);
        assert_eq!(pres.slides[0].title, "Error");
    }

    #[test]
    fn test_parse_twice_is_stable_modulo_identity() {
        let slide = slide_xml("Hello", "World");
        let data = build_pptx(&[("ppt/slides/slide1.xml", slide.as_bytes())]);
        let mut first = extract(&data, "deck.pptx", data.len() as u64, None);
        let mut second = extract(&data, "deck.pptx", data.len() as u64, None);

        assert_ne!(first.id, second.id);
        first.id = String::new();
        second.id = String::new();
        first.extracted_at = second.extracted_at;
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_wire_format_field_names() {
        let slide = slide_xml("Hello", "World");
        let data = build_pptx(&[("ppt/slides/slide1.xml", slide.as_bytes())]);
        let pres = extract(&data, "deck.pptx", data.len() as u64, None);

        let json = serde_json::to_value(&pres).unwrap();
        assert_eq!(json["file_type"], "pptx");
        assert_eq!(json["slides"][0]["slide_number"], 1);
        assert_eq!(json["metadata"]["total_slides"], 1);
        assert!(json["extracted_at"].is_string());
    }

    // ---- properties -------------------------------------------------------

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_parse_ppt_is_total(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let pres = parse_ppt(&data, "fuzz.ppt", data.len() as u64, None);
            prop_assert!(!pres.slides.is_empty());
            for (i, slide) in pres.slides.iter().enumerate() {
                prop_assert_eq!(slide.slide_number as usize, i + 1);
            }
            prop_assert_eq!(pres.metadata.total_slides as usize, pres.slides.len());
        }

        #[test]
        fn prop_parse_pptx_is_total(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let pres = parse_pptx(&data, "fuzz.pptx", data.len() as u64, None);
            prop_assert!(!pres.slides.is_empty());
        }
    }
}
