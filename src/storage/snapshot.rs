//! Snapshot files
//!
//! Encoding, loading and the atomic write protocol for the durable storage.
//!
//! ## Binary Format
//! ```text
//! ┌──────────┬──────────┬───────────────┬─────────────────┬──────────┐
//! │Magic (4) │Version(2)│ Entry Count(8)│ bincode payload │ CRC32 (4)│
//! └──────────┴──────────┴───────────────┴─────────────────┴──────────┘
//! ```
//! The CRC covers the payload only. JSON snapshots are a flat object with no
//! framing; `decode` tells the two apart by the magic bytes.
//!
//! ## Write Protocol
//! 1. Encode the full mapping into a temp file in the snapshot's directory
//! 2. Flush and data-sync the temp file
//! 3. Rename the temp file over the snapshot path
//! 4. Sync the directory so the rename survives a crash
//!
//! Steps 1-2 are [`SnapshotWriter::stage`], steps 3-4 are
//! [`StagedSnapshot::commit`].

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::SnapshotFormat;
use crate::error::{Result, SnapError};

/// Magic bytes at the start of a binary snapshot
pub const MAGIC: &[u8; 4] = b"SNKV";

/// Binary snapshot format version
pub const VERSION: u16 = 1;

/// Magic (4) + version (2) + entry count (8)
pub const HEADER_SIZE: usize = 14;

/// CRC32 footer
pub const FOOTER_SIZE: usize = 4;

/// In-memory form of a snapshot
pub type Mapping = HashMap<String, String>;

/// Step that makes a completed rename in a directory durable
pub type DirSync = fn(&Path) -> io::Result<()>;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a full mapping in the given format
pub fn encode(map: &Mapping, format: SnapshotFormat) -> Result<Vec<u8>> {
    match format {
        SnapshotFormat::Json => Ok(serde_json::to_vec(map)?),
        SnapshotFormat::Binary => {
            let payload = bincode::serialize(map)?;

            let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len() + FOOTER_SIZE);
            bytes.extend_from_slice(MAGIC);
            bytes.extend_from_slice(&VERSION.to_le_bytes());
            bytes.extend_from_slice(&(map.len() as u64).to_le_bytes());
            bytes.extend_from_slice(&payload);
            bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
            Ok(bytes)
        }
    }
}

/// Decode a snapshot, detecting the format from its first bytes
pub fn decode(bytes: &[u8]) -> Result<Mapping> {
    if bytes.starts_with(MAGIC) {
        decode_binary(bytes)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn decode_binary(bytes: &[u8]) -> Result<Mapping> {
    if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(SnapError::Snapshot(format!(
            "Truncated snapshot: {} bytes",
            bytes.len()
        )));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(SnapError::Snapshot(format!(
            "Unsupported snapshot version: {}",
            version
        )));
    }

    let mut count = [0u8; 8];
    count.copy_from_slice(&bytes[6..HEADER_SIZE]);
    let entry_count = u64::from_le_bytes(count);

    let footer_start = bytes.len() - FOOTER_SIZE;
    let payload = &bytes[HEADER_SIZE..footer_start];

    let mut crc = [0u8; 4];
    crc.copy_from_slice(&bytes[footer_start..]);
    let expected = u32::from_le_bytes(crc);
    let actual = crc32fast::hash(payload);
    if expected != actual {
        return Err(SnapError::Snapshot(format!(
            "Snapshot checksum mismatch: expected {:08x}, got {:08x}",
            expected, actual
        )));
    }

    let map: Mapping = bincode::deserialize(payload)?;
    if map.len() as u64 != entry_count {
        return Err(SnapError::Snapshot(format!(
            "Snapshot entry count mismatch: header says {}, payload has {}",
            entry_count,
            map.len()
        )));
    }

    Ok(map)
}

// =============================================================================
// Loading
// =============================================================================

/// Read and decode the snapshot at `path`
pub fn load(path: &Path) -> Result<Mapping> {
    let bytes = fs::read(path)?;
    decode(&bytes)
}

/// Read the snapshot at `path`, falling back to an empty mapping
///
/// A missing file is the normal first-run case. Anything else that stops the
/// file from loading is logged and also yields an empty mapping.
pub fn load_or_empty(path: &Path) -> Mapping {
    match load(path) {
        Ok(map) => {
            tracing::debug!("Loaded {} keys from snapshot {}", map.len(), path.display());
            map
        }
        Err(SnapError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("No snapshot at {}, starting empty", path.display());
            Mapping::new()
        }
        Err(e) => {
            tracing::warn!(
                "Snapshot {} is unreadable ({}), starting empty",
                path.display(),
                e
            );
            Mapping::new()
        }
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Writes full snapshots to one path, atomically
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    /// Snapshot file path
    path: PathBuf,

    /// Directory holding `path`; temp files go here so the rename stays on
    /// one filesystem
    dir: PathBuf,

    /// Encoding for new snapshots
    format: SnapshotFormat,

    /// Directory sync run after each rename
    dir_sync: DirSync,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        let path = path.into();
        let dir = parent_dir(&path);
        Self {
            path,
            dir,
            format,
            dir_sync: sync_dir,
        }
    }

    /// Replace the directory sync step
    pub fn with_dir_sync(mut self, dir_sync: DirSync) -> Self {
        self.dir_sync = dir_sync;
        self
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding for new snapshots
    pub fn format(&self) -> SnapshotFormat {
        self.format
    }

    /// Write `map` to a synced temp file next to the snapshot
    ///
    /// The snapshot itself is untouched until the result is committed.
    pub fn stage(&self, map: &Mapping) -> Result<StagedSnapshot> {
        let bytes = encode(map, self.format)?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(&bytes)?;
        temp.flush()?;
        temp.as_file().sync_data()?;

        Ok(StagedSnapshot {
            temp,
            target: self.path.clone(),
            dir: self.dir.clone(),
            dir_sync: self.dir_sync,
        })
    }

    /// Stage and commit in one go
    pub fn write(&self, map: &Mapping) -> Result<()> {
        self.stage(map)?.commit()
    }
}

/// A fully written, synced temp file waiting to replace the snapshot
///
/// Dropping it without calling `commit` deletes the temp file.
#[derive(Debug)]
pub struct StagedSnapshot {
    temp: NamedTempFile,
    target: PathBuf,
    dir: PathBuf,
    dir_sync: DirSync,
}

impl StagedSnapshot {
    /// Path of the temp file
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the temp file over the snapshot and make the rename durable
    ///
    /// A failed rename leaves the old snapshot in place and is returned as
    /// `Io`. Once the rename succeeds the new snapshot is the one on disk, so
    /// a failing directory sync comes back as `DirSync`.
    pub fn commit(self) -> Result<()> {
        self.temp.persist(&self.target)?;
        (self.dir_sync)(&self.dir).map_err(SnapError::DirSync)
    }
}

/// Directory containing `path` (`.` for a bare file name)
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Flush directory metadata so a completed rename is on stable storage
#[cfg(unix)]
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
