//! # Snapshot Store
//!
//! Persists one world's [`SeaLevelState`] as a single file.
//!
//! ## Guarantees
//!
//! 1. **Atomic replace**: a save writes a temp file, syncs it and renames it
//!    over the previous snapshot
//! 2. **Integrity**: the payload carries a CRC32; corruption is detected
//! 3. **Recovery**: [`SnapshotStore::restore_or_default`] never fails
//!
//! ## Format
//!
//! ```text
//! [4 bytes: magic "TSEA"]
//! [4 bytes: version]
//! [4 bytes: CRC32 of the compressed payload]
//! [N bytes: LZ4 payload, size-prepended]
//!
//! Payload:
//! [1+4 bytes: default level (present flag, i32)]
//! [1+4 bytes: current level]
//! [1 byte: last change]
//! [4 bytes: record count] then per record:
//!     [8 world][4 x][4 y][4 z][2 original][2 applied]
//! [4 bytes: region count] then per region:
//!     [8 world][4 x][4 z][4 level]
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use tracing::{info, warn};

use crate::cell::{CellKey, RegionKey, WorldId};
use crate::error::{SnapshotError, SnapshotResult};
use crate::material::Material;
use crate::state::{ChangeRecord, SeaChange, SeaLevelState, TrackedChanges};

/// Magic bytes identifying a snapshot file.
const SNAPSHOT_MAGIC: &[u8; 4] = b"TSEA";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

/// Header length: magic + version + checksum.
const HEADER_LEN: usize = 12;

/// File-backed store for one world's sea-level state.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store at an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store for `world` inside `dir`.
    #[must_use]
    pub fn for_world(dir: &Path, world: WorldId) -> Self {
        Self::new(dir.join(format!("world-{}.sea", world.0)))
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `state` to disk, replacing any previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the directory, temp file or rename
    /// fails. The previous snapshot is untouched in that case.
    pub fn save(&self, state: &SeaLevelState) -> SnapshotResult<()> {
        let bytes = encode(state);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let temp = self.path.with_extension("sea.tmp");
        {
            let mut file = File::create(&temp).map_err(io_error(&temp))?;
            file.write_all(&bytes).map_err(io_error(&temp))?;
            file.sync_all().map_err(io_error(&temp))?;
        }
        fs::rename(&temp, &self.path).map_err(io_error(&self.path))?;

        Ok(())
    }

    /// Reads the snapshot. `Ok(None)` means there is none yet.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the file exists but cannot be read or
    /// does not decode.
    pub fn load(&self) -> SnapshotResult<Option<SeaLevelState>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path)(e)),
        };
        decode(&bytes).map(Some)
    }

    /// Loads the snapshot, or a fresh state if it is missing or unusable.
    #[must_use]
    pub fn restore_or_default(&self) -> SeaLevelState {
        match self.load() {
            Ok(Some(state)) => {
                info!(
                    path = %self.path.display(),
                    default_level = ?state.default_level(),
                    current_level = ?state.current_level(),
                    last_change = state.last_change().name(),
                    tracked = state.tracked().len(),
                    regions = state.region_levels().len(),
                    "sea level restored"
                );
                state
            }
            Ok(None) => {
                info!(path = %self.path.display(), "no sea level snapshot, starting fresh");
                SeaLevelState::new()
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "sea level snapshot unusable, starting fresh");
                SeaLevelState::new()
            }
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SnapshotError + '_ {
    move |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Encodes a full snapshot file.
#[must_use]
pub fn encode(state: &SeaLevelState) -> Vec<u8> {
    let compressed = compress_prepend_size(&encode_payload(state));
    let checksum = crc32fast::hash(&compressed);

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&checksum.to_le_bytes());
    bytes.extend_from_slice(&compressed);
    bytes
}

/// Decodes a full snapshot file.
///
/// # Errors
///
/// Returns a [`SnapshotError`] describing the first problem found.
pub fn decode(bytes: &[u8]) -> SnapshotResult<SeaLevelState> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::Malformed);
    }
    if &bytes[0..4] != SNAPSHOT_MAGIC {
        return Err(SnapshotError::BadMagic);
    }

    let mut header = Reader::new(&bytes[4..HEADER_LEN]);
    let version = header.u32()?;
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    let stored = header.u32()?;

    let compressed = &bytes[HEADER_LEN..];
    let computed = crc32fast::hash(compressed);
    if stored != computed {
        return Err(SnapshotError::ChecksumMismatch { stored, computed });
    }

    let payload = decompress_size_prepended(compressed)
        .map_err(|e| SnapshotError::Decompress(e.to_string()))?;
    decode_payload(&payload)
}

fn encode_payload(state: &SeaLevelState) -> Vec<u8> {
    let tracked = state.tracked();
    let regions = state.region_levels();
    let mut buf = Vec::with_capacity(11 + 4 + tracked.len() * 24 + 4 + regions.len() * 20);

    put_level(&mut buf, state.default_level());
    put_level(&mut buf, state.current_level());
    buf.push(state.last_change() as u8);

    put_len(&mut buf, tracked.len());
    for record in tracked.iter() {
        let cell = record.location;
        buf.extend_from_slice(&cell.world.0.to_le_bytes());
        buf.extend_from_slice(&cell.x.to_le_bytes());
        buf.extend_from_slice(&cell.y.to_le_bytes());
        buf.extend_from_slice(&cell.z.to_le_bytes());
        buf.extend_from_slice(&record.original.id().to_le_bytes());
        buf.extend_from_slice(&record.applied.id().to_le_bytes());
    }

    put_len(&mut buf, regions.len());
    for (region, level) in regions {
        buf.extend_from_slice(&region.world.0.to_le_bytes());
        buf.extend_from_slice(&region.x.to_le_bytes());
        buf.extend_from_slice(&region.z.to_le_bytes());
        buf.extend_from_slice(&level.to_le_bytes());
    }

    buf
}

fn decode_payload(payload: &[u8]) -> SnapshotResult<SeaLevelState> {
    let mut reader = Reader::new(payload);

    let default_level = reader.level()?;
    let current_level = reader.level()?;
    let last_change = SeaChange::from_u8(reader.u8()?).ok_or(SnapshotError::Malformed)?;

    let record_count = reader.u32()?;
    let mut tracked = TrackedChanges::new();
    for _ in 0..record_count {
        let world = WorldId(reader.u64()?);
        let (x, y, z) = (reader.i32()?, reader.i32()?, reader.i32()?);
        let original = Material::new(reader.u16()?);
        let applied = Material::new(reader.u16()?);
        tracked.insert(ChangeRecord::new(CellKey::new(world, x, y, z), original, applied));
    }

    let region_count = reader.u32()?;
    let mut region_levels = BTreeMap::new();
    for _ in 0..region_count {
        let world = WorldId(reader.u64()?);
        let (x, z) = (reader.i32()?, reader.i32()?);
        region_levels.insert(RegionKey::new(world, x, z), reader.i32()?);
    }

    if !reader.is_exhausted() {
        return Err(SnapshotError::Malformed);
    }

    Ok(SeaLevelState::from_parts(
        default_level,
        current_level,
        last_change,
        tracked,
        region_levels,
    ))
}

fn put_level(buf: &mut Vec<u8>, level: Option<i32>) {
    buf.push(u8::from(level.is_some()));
    buf.extend_from_slice(&level.unwrap_or(0).to_le_bytes());
}

#[allow(clippy::cast_possible_truncation)]
fn put_len(buf: &mut Vec<u8>, len: usize) {
    buf.extend_from_slice(&(len as u32).to_le_bytes());
}

/// Bounds-checked little-endian cursor.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> SnapshotResult<[u8; N]> {
        let end = self.pos + N;
        let bytes = self
            .data
            .get(self.pos..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(SnapshotError::Malformed)?;
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> SnapshotResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> SnapshotResult<u16> {
        self.take().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> SnapshotResult<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> SnapshotResult<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn i32(&mut self) -> SnapshotResult<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn level(&mut self) -> SnapshotResult<Option<i32>> {
        let present = self.u8()?;
        let value = self.i32()?;
        match present {
            0 => Ok(None),
            1 => Ok(Some(value)),
            _ => Err(SnapshotError::Malformed),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }
}
