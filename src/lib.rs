//! Longan - structured content extraction from PowerPoint presentations
//!
//! This library parses both generations of the PowerPoint file format and
//! produces one normalized, serializable presentation record from either:
//!
//! - **Legacy .ppt**: an OLE compound file holding a recursive binary
//!   record stream (`ole` + `ppt` modules)
//! - **Modern .pptx**: a ZIP archive of XML parts (`pptx` module)
//!
//! Extraction covers slide text and titles, speaker notes, shapes, tables,
//! embedded media, document metadata, themes and custom properties. The
//! parsers are total: any input (truncated, corrupt, or random bytes)
//! produces a [`Presentation`], falling back to diagnostic slides when
//! nothing can be recovered.
//!
//! # Example
//!
//! ```no_run
//! use longan::extract;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("quarterly.pptx")?;
//! let pres = extract(&bytes, "quarterly.pptx", bytes.len() as u64, None);
//!
//! for slide in &pres.slides {
//!     println!("{}: {}", slide.slide_number, slide.title);
//!     for line in &slide.text_content {
//!         println!("  {}", line);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - format-specific entry points
//!
//! ```no_run
//! use longan::{parse_ppt, parse_pptx};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("legacy.ppt")?;
//! let pres = parse_ppt(&bytes, "legacy.ppt", bytes.len() as u64, None);
//! println!("{} slides, {} words", pres.metadata.total_slides, pres.metadata.total_words);
//! # Ok(())
//! # }
//! ```

/// Slide assembly from accumulated text
pub mod assemble;

/// Error types
pub mod error;

/// Format dispatch and parse entry points
pub mod extract;

/// Embedded media representation
pub mod media;

/// The normalized presentation record
pub mod model;

/// OLE compound-file container support
pub mod ole;

/// Legacy .ppt binary format parsing
pub mod ppt;

/// Modern .pptx (OOXML) parsing
pub mod pptx;

/// Text sanitization and garbage filtering
pub mod text;

// Re-export the public surface for convenience
pub use error::{Error, Result};
pub use extract::{extract, parse_ppt, parse_pptx};
pub use media::{Media, MediaType};
pub use model::{FileType, Metadata, Presentation, Shape, Slide, Table, Theme};
