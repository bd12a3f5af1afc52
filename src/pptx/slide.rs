//! Slide and notes-slide part decoding.
//!
//! Extracts, per slide: placeholder-typed shapes with their paragraphs and
//! transforms, tables, and picture relationship references. Notes parts
//! yield their paragraphs with slide-number placeholders removed.

use crate::error::{Error, Result};
use crate::media::Media;
use crate::model::{Position, Shape, Size, Slide, Table};
use crate::pptx::{get_attr, unescape_xml};
use crate::text::sanitize;
use quick_xml::Reader;
use quick_xml::events::Event;

/// One shape as it appears in the slide XML.
#[derive(Debug, Default)]
pub struct ParsedShape {
    /// Placeholder type attribute (`title`, `ctrTitle`, `body`, …)
    pub placeholder: Option<String>,
    /// Paragraph texts in document order
    pub paragraphs: Vec<String>,
    pub position: Option<Position>,
    pub size: Option<Size>,
}

/// Decoded content of one slide part.
#[derive(Debug, Default)]
pub struct SlideContent {
    pub shapes: Vec<ParsedShape>,
    pub tables: Vec<Table>,
    /// Relationship ids of embedded pictures (`rId3`, …)
    pub image_refs: Vec<String>,
}

/// Parse a `ppt/slides/slideN.xml` part.
pub fn parse_slide_xml(xml: &[u8]) -> Result<SlideContent> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut content = SlideContent::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sp" => content.shapes.push(parse_shape(&mut reader)?),
                b"tbl" => content.tables.push(parse_table(&mut reader)?),
                b"pic" => {
                    if let Some(rid) = parse_picture(&mut reader)? {
                        content.image_refs.push(rid);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(content)
}

/// Consume one `sp` element and collect its placeholder type, transform
/// and paragraphs.
fn parse_shape(reader: &mut Reader<&[u8]>) -> Result<ParsedShape> {
    let mut shape = ParsedShape::default();
    let mut depth = 1usize;
    let mut paragraph = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                match e.local_name().as_ref() {
                    b"sp" => depth += 1,
                    b"p" => {
                        in_paragraph = true;
                        paragraph.clear();
                    }
                    b"t" => in_text = true,
                    b"ph" => shape.placeholder = get_attr(&e, b"type").or(shape.placeholder.take()),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"ph" => shape.placeholder = get_attr(&e, b"type").or(shape.placeholder.take()),
                b"off" if shape.position.is_none() => {
                    shape.position = parse_point(&e).map(|(x, y)| Position { x, y });
                }
                b"ext" if shape.size.is_none() => {
                    shape.size = parse_extent(&e).map(|(width, height)| Size { width, height });
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                paragraph.push_str(&unescape_xml(&String::from_utf8_lossy(e.as_ref())));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sp" => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                b"t" => in_text = false,
                b"p" if in_paragraph => {
                    in_paragraph = false;
                    let text = sanitize(&paragraph);
                    if !text.is_empty() {
                        shape.paragraphs.push(text);
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(shape)
}

/// Consume one `tbl` element into a cell matrix.
fn parse_table(reader: &mut Reader<&[u8]>) -> Result<Table> {
    let mut cells: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_cell = false;
    let mut in_text = false;
    let mut depth = 1usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => depth += 1,
                b"tr" => row = Vec::new(),
                b"tc" => {
                    in_cell = true;
                    cell.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_cell && in_text => {
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(&unescape_xml(&String::from_utf8_lossy(e.as_ref())));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"tbl" => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                b"t" => in_text = false,
                b"tc" => {
                    in_cell = false;
                    row.push(sanitize(&cell));
                }
                b"tr" => cells.push(std::mem::take(&mut row)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    let columns = cells.first().map(Vec::len).unwrap_or(0);
    Ok(Table {
        rows: cells.len(),
        columns,
        cells,
    })
}

/// Consume one `pic` element and return the blip relationship id.
fn parse_picture(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut rid = None;
    let mut depth = 1usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"pic" {
                    depth += 1;
                } else if e.local_name().as_ref() == b"blip" && rid.is_none() {
                    rid = get_attr(&e, b"embed");
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"blip" && rid.is_none() {
                    rid = get_attr(&e, b"embed");
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"pic" => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(rid)
}

/// Parse a `ppt/notesSlides/notesSlideN.xml` part into the joined note
/// text. Paragraphs that are nothing but digits are slide-number
/// placeholders and are dropped.
pub fn parse_notes_xml(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut paragraphs = Vec::new();
    let mut paragraph = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    paragraph.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_paragraph && in_text => {
                paragraph.push_str(&unescape_xml(&String::from_utf8_lossy(e.as_ref())));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" if in_paragraph => {
                    in_paragraph = false;
                    let text = sanitize(&paragraph);
                    if !text.is_empty() && !text.chars().all(|c| c.is_ascii_digit()) {
                        paragraphs.push(text);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Assemble a [`Slide`] from parsed slide content.
///
/// The title is the first `title`/`ctrTitle` placeholder shape; without
/// one, the first paragraph in the slide stands in. Title text never
/// repeats in the body content.
pub fn build_slide(content: SlideContent) -> Slide {
    let mut slide = Slide::new(0);

    let title_shape = content.shapes.iter().position(|shape| {
        matches!(shape.placeholder.as_deref(), Some("title") | Some("ctrTitle"))
            && !shape.paragraphs.is_empty()
    });

    match title_shape {
        Some(index) => {
            slide.title = content.shapes[index].paragraphs.join(" ");
            for (i, shape) in content.shapes.iter().enumerate() {
                if i != index {
                    slide.text_content.extend(shape.paragraphs.iter().cloned());
                }
            }
        }
        None => {
            let mut paragraphs = content
                .shapes
                .iter()
                .flat_map(|shape| shape.paragraphs.iter().cloned());
            slide.title = paragraphs.next().unwrap_or_default();
            slide.text_content.extend(paragraphs);
        }
    }

    slide.shapes = content
        .shapes
        .into_iter()
        .map(|shape| Shape {
            shape_type: shape
                .placeholder
                .unwrap_or_else(|| "Shape".to_string()),
            text: shape.paragraphs.join("\n"),
            position: shape.position,
            size: shape.size,
        })
        .collect();

    slide.images = content
        .image_refs
        .iter()
        .map(|rid| Media::reference(&format!("Image reference: {}", rid), ""))
        .collect();

    slide.tables = content.tables;
    slide
}

fn parse_point(e: &quick_xml::events::BytesStart<'_>) -> Option<(i64, i64)> {
    let x = get_attr(e, b"x")?.parse().ok()?;
    let y = get_attr(e, b"y")?.parse().ok()?;
    Some((x, y))
}

fn parse_extent(e: &quick_xml::events::BytesStart<'_>) -> Option<(i64, i64)> {
    let cx = get_attr(e, b"cx")?.parse().ok()?;
    let cy = get_attr(e, b"cy")?.parse().ok()?;
    Some((cx, cy))
}
