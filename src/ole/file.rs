//! OLE Compound File Binary (CFB) reader.
//!
//! A compound file is a small FAT-like filesystem: a header, a file
//! allocation table, a directory of named entries and sector chains holding
//! stream data. Small streams live in a mini-stream with its own allocation
//! table. This reader parses the whole structure from an in-memory byte
//! slice and exposes streams by name; that flat lookup is all the legacy
//! PowerPoint format needs.

use super::consts::*;
use smallvec::SmallVec;
use thiserror::Error;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw OLE directory entry structure (128 bytes, on-disk layout).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    /// Left sibling SID
    sid_left: U32<LE>,
    /// Right sibling SID
    sid_right: U32<LE>,
    /// Child SID
    sid_child: U32<LE>,
    /// CLSID (16 bytes)
    clsid: [u8; 16],
    /// State bits
    state_bits: U32<LE>,
    /// Creation time (FILETIME)
    creation_time: U64<LE>,
    /// Modified time (FILETIME)
    modified_time: U64<LE>,
    /// Starting sector
    start_sector: U32<LE>,
    /// Stream size
    stream_size: U64<LE>,
}

/// A parsed directory entry (stream or storage).
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Entry name (UTF-16 decoded)
    pub name: String,
    /// Entry type (stream, storage, root)
    pub entry_type: u8,
    /// Left sibling in the directory tree
    pub sid_left: u32,
    /// Right sibling in the directory tree
    pub sid_right: u32,
    /// First child of this storage
    pub sid_child: u32,
    /// First sector of the stream
    pub start_sector: u32,
    /// Stream size in bytes
    pub size: u64,
    /// Whether the stream lives in the mini-stream
    pub is_minifat: bool,
}

/// Error types for CFB parsing.
#[derive(Error, Debug)]
pub enum OleError {
    /// The data does not begin with a compound-file header
    #[error("Not an OLE compound file")]
    NotOleFile,
    /// Header fields are inconsistent
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// Sector chains or directory entries are damaged
    #[error("Corrupted file: {0}")]
    Corrupted(String),
    /// No stream with the requested name exists
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
}

/// An OLE compound file over an in-memory byte slice.
pub struct CompoundFile<'a> {
    data: &'a [u8],
    sector_size: usize,
    mini_sector_size: usize,
    mini_stream_cutoff: u32,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    root: Option<DirectoryEntry>,
    dir_entries: Vec<Option<DirectoryEntry>>,
    ministream: Option<Vec<u8>>,
}

impl<'a> CompoundFile<'a> {
    /// Parse a compound file from a byte slice.
    ///
    /// Validates the header, loads the FAT and MiniFAT and parses the
    /// directory. Returns [`OleError::NotOleFile`] when the magic bytes are
    /// absent, so callers can fall through to degraded handling.
    pub fn open(data: &'a [u8]) -> Result<Self, OleError> {
        if data.len() < MINIMAL_CFB_SIZE || &data[0..8] != MAGIC {
            return Err(OleError::NotOleFile);
        }

        let header = &data[0..512];
        let dll_version = read_u16(header, 0x1A);
        let byte_order = read_u16(header, 0x1C);
        let sector_shift = read_u16(header, 0x1E);
        let mini_sector_shift = read_u16(header, 0x20);
        let first_dir_sector = read_u32(header, 0x30);
        let mini_stream_cutoff = read_u32(header, 0x38);
        let first_minifat_sector = read_u32(header, 0x3C);
        let num_minifat_sectors = read_u32(header, 0x40);
        let first_difat_sector = read_u32(header, 0x44);
        let num_difat_sectors = read_u32(header, 0x48);

        if byte_order != 0xFFFE {
            return Err(OleError::InvalidFormat("Invalid byte order".to_string()));
        }
        if !(7..=12).contains(&sector_shift) || mini_sector_shift > 12 {
            return Err(OleError::InvalidFormat("Invalid sector shift".to_string()));
        }

        let sector_size = 1usize << sector_shift;
        let mini_sector_size = 1usize << mini_sector_shift;

        if (dll_version == 3 && sector_size != 512) || (dll_version == 4 && sector_size != 4096) {
            return Err(OleError::InvalidFormat("Sector size mismatch".to_string()));
        }

        let mut cfb = CompoundFile {
            data,
            sector_size,
            mini_sector_size,
            mini_stream_cutoff,
            fat: Vec::new(),
            minifat: Vec::new(),
            root: None,
            dir_entries: Vec::new(),
            ministream: None,
        };

        cfb.load_fat(header, first_difat_sector, num_difat_sectors)?;
        cfb.load_directory(first_dir_sector)?;
        if num_minifat_sectors > 0 {
            cfb.load_minifat(first_minifat_sector)?;
        }

        Ok(cfb)
    }

    /// Load the file allocation table.
    ///
    /// The first 109 FAT sector indexes sit in the header; further indexes
    /// are chained through DIFAT sectors.
    fn load_fat(
        &mut self,
        header: &[u8],
        first_difat_sector: u32,
        num_difat_sectors: u32,
    ) -> Result<(), OleError> {
        let mut fat_sectors = Vec::new();
        for i in 0..109 {
            let sector = read_u32(header, 0x4C + i * 4);
            if sector == FREESECT || sector == ENDOFCHAIN {
                break;
            }
            fat_sectors.push(sector);
        }

        if num_difat_sectors > 0 {
            let entries_per_sector = (self.sector_size / 4) - 1;
            let mut difat_sector = first_difat_sector;

            for _ in 0..num_difat_sectors {
                let sector_data = self.read_sector(difat_sector)?;
                for i in 0..entries_per_sector {
                    let sector = read_u32(sector_data, i * 4);
                    if sector == FREESECT || sector == ENDOFCHAIN {
                        break;
                    }
                    fat_sectors.push(sector);
                }
                difat_sector = read_u32(sector_data, entries_per_sector * 4);
                if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                    break;
                }
            }
        }

        let entries_per_sector = self.sector_size / 4;
        self.fat = Vec::with_capacity(fat_sectors.len() * entries_per_sector);
        for &sector_id in &fat_sectors {
            let sector_data = self.read_sector(sector_id)?;
            for chunk in sector_data.chunks_exact(4) {
                self.fat.push(
                    U32::<LE>::read_from_bytes(chunk)
                        .map(|v| v.get())
                        .unwrap_or(0),
                );
            }
        }

        Ok(())
    }

    /// Load the MiniFAT used for streams below the cutoff size.
    fn load_minifat(&mut self, first_minifat_sector: u32) -> Result<(), OleError> {
        let minifat_data = self.read_chain(first_minifat_sector)?;
        self.minifat = minifat_data
            .chunks_exact(4)
            .map(|chunk| {
                U32::<LE>::read_from_bytes(chunk)
                    .map(|v| v.get())
                    .unwrap_or(0)
            })
            .collect();
        Ok(())
    }

    /// Load and parse the directory stream.
    fn load_directory(&mut self, first_dir_sector: u32) -> Result<(), OleError> {
        let dir_data = self.read_chain(first_dir_sector)?;
        let num_entries = dir_data.len() / DIRENTRY_SIZE;
        self.dir_entries = vec![None; num_entries];

        if num_entries == 0 {
            return Err(OleError::Corrupted("Empty directory".to_string()));
        }

        let root = self.parse_directory_entry(&dir_data[0..DIRENTRY_SIZE])?;
        let root_child = root.sid_child;
        self.root = Some(root);
        self.build_directory(root_child, &dir_data)?;
        Ok(())
    }

    /// Parse a single 128-byte directory entry.
    fn parse_directory_entry(&self, data: &[u8]) -> Result<DirectoryEntry, OleError> {
        let raw = RawDirectoryEntry::read_from_bytes(data)
            .map_err(|_| OleError::Corrupted("Truncated directory entry".to_string()))?;

        let name_len = raw.name_len.get() as usize;
        let name_bytes = &raw.name[0..name_len.saturating_sub(2).min(64)];
        let name = super::codepage::decode_utf16le(name_bytes);

        // 512-byte-sector files only use the low 32 bits of the size field.
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        let is_minifat = size < self.mini_stream_cutoff as u64 && raw.entry_type == STGTY_STREAM;

        Ok(DirectoryEntry {
            name,
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            start_sector: raw.start_sector.get(),
            size,
            is_minifat,
        })
    }

    /// Populate the directory table by iterative traversal from the root's
    /// first child. A visited set guards against sibling/child cycles in
    /// damaged files.
    fn build_directory(&mut self, root_sid: u32, dir_data: &[u8]) -> Result<(), OleError> {
        if root_sid == NOSTREAM {
            return Ok(());
        }

        let max_entries = dir_data.len() / DIRENTRY_SIZE;
        let mut visited = fixedbitset::FixedBitSet::with_capacity(max_entries);
        let mut queue = Vec::with_capacity(16);
        queue.push(root_sid);

        while let Some(sid) = queue.pop() {
            if sid == NOSTREAM {
                continue;
            }
            let index = sid as usize;
            if index >= max_entries {
                return Err(OleError::Corrupted(
                    "Invalid directory entry index".to_string(),
                ));
            }
            if visited.contains(index) {
                continue;
            }
            visited.insert(index);

            if self.dir_entries[index].is_none() {
                let offset = index * DIRENTRY_SIZE;
                let entry = self.parse_directory_entry(&dir_data[offset..offset + DIRENTRY_SIZE])?;
                for next in [entry.sid_child, entry.sid_right, entry.sid_left] {
                    if next != NOSTREAM {
                        queue.push(next);
                    }
                }
                self.dir_entries[index] = Some(entry);
            }
        }

        Ok(())
    }

    /// Borrow a single sector from the underlying slice.
    fn read_sector(&self, sector_id: u32) -> Result<&'a [u8], OleError> {
        let start = (sector_id as usize + 1) * self.sector_size;
        let end = start + self.sector_size;
        if end > self.data.len() {
            return Err(OleError::Corrupted("Sector out of bounds".to_string()));
        }
        Ok(&self.data[start..end])
    }

    /// Read a full sector chain by following the FAT.
    ///
    /// The chain length is capped at the FAT size, which also bounds
    /// looped chains in adversarial files.
    fn read_chain(&self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        if start_sector == ENDOFCHAIN {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        let mut sector = start_sector;
        let mut hops = 0usize;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.fat.len() || hops > self.fat.len() {
                return Err(OleError::Corrupted(
                    "Invalid sector chain in FAT".to_string(),
                ));
            }
            out.extend_from_slice(self.read_sector(sector)?);
            sector = self.fat[sector as usize];
            hops += 1;
        }

        Ok(out)
    }

    /// Read a stream stored in the mini-stream by following the MiniFAT.
    fn read_mini_chain(&mut self, start_sector: u32, size: u64) -> Result<Vec<u8>, OleError> {
        if self.ministream.is_none() {
            let root = self
                .root
                .as_ref()
                .ok_or_else(|| OleError::Corrupted("No root entry".to_string()))?;
            let ministream = self.read_chain(root.start_sector)?;
            self.ministream = Some(ministream);
        }
        let ministream = self.ministream.as_ref().unwrap();

        let mut out = Vec::with_capacity(size as usize);
        let mut sector = start_sector;
        let mut hops = 0usize;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.minifat.len() || hops > self.minifat.len() {
                return Err(OleError::Corrupted(
                    "Invalid sector chain in MiniFAT".to_string(),
                ));
            }
            let start = sector as usize * self.mini_sector_size;
            let end = start + self.mini_sector_size;
            if end > ministream.len() {
                return Err(OleError::Corrupted(
                    "Mini sector out of bounds".to_string(),
                ));
            }
            out.extend_from_slice(&ministream[start..end]);
            sector = self.minifat[sector as usize];
            hops += 1;
        }

        out.truncate(size as usize);
        Ok(out)
    }

    /// Open a root-level stream by name and return its contents.
    ///
    /// Name comparison is case-insensitive, matching how Office treats
    /// directory entries.
    pub fn open_stream(&mut self, name: &str) -> Result<Vec<u8>, OleError> {
        let (is_minifat, start_sector, size) = {
            let entry = self.find_entry(name)?;
            if entry.entry_type != STGTY_STREAM {
                return Err(OleError::StreamNotFound(name.to_string()));
            }
            (entry.is_minifat, entry.start_sector, entry.size)
        };

        if is_minifat {
            self.read_mini_chain(start_sector, size)
        } else {
            let mut data = self.read_chain(start_sector)?;
            data.truncate(size as usize);
            Ok(data)
        }
    }

    /// Open a stream, mapping absence to `None`.
    pub fn find(&mut self, name: &str) -> Option<Vec<u8>> {
        self.open_stream(name).ok()
    }

    /// Whether a root-level stream with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.find_entry(name).is_ok()
    }

    /// Find a directory entry by name under the root storage.
    ///
    /// Directory entries form a tree that is nominally ordered, but files
    /// in the wild break the ordering; a full traversal with a small work
    /// queue handles both.
    fn find_entry(&self, name: &str) -> Result<&DirectoryEntry, OleError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| OleError::StreamNotFound(name.to_string()))?;

        let mut queue = SmallVec::<[u32; 32]>::new();
        queue.push(root.sid_child);

        while let Some(sid) = queue.pop() {
            if sid == NOSTREAM || sid as usize >= self.dir_entries.len() {
                continue;
            }
            if let Some(entry) = self.dir_entries[sid as usize].as_ref() {
                if entry.name.eq_ignore_ascii_case(name) {
                    return Ok(entry);
                }
                if entry.sid_right != NOSTREAM {
                    queue.push(entry.sid_right);
                }
                if entry.sid_left != NOSTREAM {
                    queue.push(entry.sid_left);
                }
            }
        }

        Err(OleError::StreamNotFound(name.to_string()))
    }
}

/// Check whether data starts with the compound-file magic bytes.
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= 8 && &data[0..8] == MAGIC
}

#[inline]
fn read_u16(data: &[u8], offset: usize) -> u16 {
    data.get(offset..offset + 2)
        .and_then(|b| U16::<LE>::read_from_bytes(b).ok())
        .map(|v| v.get())
        .unwrap_or(0)
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    data.get(offset..offset + 4)
        .and_then(|b| U32::<LE>::read_from_bytes(b).ok())
        .map(|v| v.get())
        .unwrap_or(0)
}
