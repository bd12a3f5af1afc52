/// Magic bytes at the start of every OLE compound file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Minimal size of an empty compound file with 512-byte sectors
pub const MINIMAL_CFB_SIZE: usize = 1536;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

// Sector IDs
/// End of a virtual stream chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE;
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF;

// Directory entry IDs
/// Unallocated directory entry
pub const NOSTREAM: u32 = 0xFFFFFFFF;

// Object types in storage
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

// Property value types used by the property-set decoder
pub const VT_I4: u32 = 0x0003;
pub const VT_LPSTR: u32 = 0x001E;
pub const VT_LPWSTR: u32 = 0x001F;
