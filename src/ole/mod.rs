//! OLE Compound File Binary container support.
//!
//! Legacy PowerPoint files are OLE compound files; this module exposes the
//! container reader, the legacy text decoders and the property-set decoder
//! shared by the `.ppt` parser.

/// Constants for the CFB format and property types
pub mod consts;

/// Character decoding (Windows-1252, UTF-16LE)
pub mod codepage;

/// Compound-file reader
mod file;

/// Property-set decoding for metadata streams
pub mod propset;

pub use file::{CompoundFile, DirectoryEntry, OleError, is_ole_file};
