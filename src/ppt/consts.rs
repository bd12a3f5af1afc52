//! Record types of the legacy PowerPoint binary stream.
//!
//! Values follow the `[MS-PPT]` and `[MS-ODRAW]` record-type tables. Only
//! the records this parser reacts to are named; everything else is either
//! recursed into (when marked as a container) or skipped.

// Document-level containers
pub const RT_DOCUMENT: u16 = 0x03E8;
pub const RT_SLIDE: u16 = 0x03EE;
pub const RT_NOTES: u16 = 0x03F0;
pub const RT_ENVIRONMENT: u16 = 0x03F2;
pub const RT_MAIN_MASTER: u16 = 0x03F8;
pub const RT_LIST: u16 = 0x07D0;
pub const RT_FONT_COLLECTION: u16 = 0x07D5;
pub const RT_HEADERS_FOOTERS: u16 = 0x0FD9;
pub const RT_SLIDE_LIST_WITH_TEXT: u16 = 0x0FF0;
pub const RT_PROG_TAGS: u16 = 0x1388;

// Drawing containers
pub const RT_DRAWING_GROUP: u16 = 0x040B;
pub const RT_DRAWING: u16 = 0x040C;

// Atoms
pub const RT_DOCUMENT_ATOM: u16 = 0x03E9;
pub const RT_TEXT_HEADER_ATOM: u16 = 0x0F9F;
pub const RT_TEXT_CHARS_ATOM: u16 = 0x0FA0;
pub const RT_TEXT_BYTES_ATOM: u16 = 0x0FA8;
pub const RT_CSTRING: u16 = 0x0FBA;

// OfficeArt containers
pub const ART_DGG_CONTAINER: u16 = 0xF000;
pub const ART_BSTORE_CONTAINER: u16 = 0xF001;
pub const ART_DG_CONTAINER: u16 = 0xF002;
pub const ART_SPGR_CONTAINER: u16 = 0xF003;
pub const ART_SP_CONTAINER: u16 = 0xF004;
pub const ART_CLIENT_TEXTBOX: u16 = 0xF00D;

// OfficeArt blip atoms
pub const ART_BLIP_EMF: u16 = 0xF01A;
pub const ART_BLIP_WMF: u16 = 0xF01B;
pub const ART_BLIP_PICT: u16 = 0xF01C;
pub const ART_BLIP_JPEG: u16 = 0xF01D;
pub const ART_BLIP_PNG: u16 = 0xF01E;
pub const ART_BLIP_DIB: u16 = 0xF01F;
pub const ART_BLIP_TIFF: u16 = 0xF029;
pub const ART_BLIP_JPEG2: u16 = 0xF02A;

/// Whether a record type is a known container whose body holds further
/// records. Containers are also recognized structurally via the 0xF
/// version nibble; this list covers the containers that predate that
/// convention.
pub fn is_container_type(record_type: u16) -> bool {
    matches!(
        record_type,
        RT_DOCUMENT
            | RT_SLIDE
            | RT_NOTES
            | RT_ENVIRONMENT
            | RT_MAIN_MASTER
            | RT_LIST
            | RT_FONT_COLLECTION
            | RT_HEADERS_FOOTERS
            | RT_SLIDE_LIST_WITH_TEXT
            | RT_PROG_TAGS
            | RT_DRAWING_GROUP
            | RT_DRAWING
            | ART_DGG_CONTAINER
            | ART_BSTORE_CONTAINER
            | ART_DG_CONTAINER
            | ART_SPGR_CONTAINER
            | ART_SP_CONTAINER
            | ART_CLIENT_TEXTBOX
    )
}
