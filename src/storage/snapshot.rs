//! Snapshot Persistence
//!
//! The whole store is persisted as a single pretty-printed JSON object with
//! two members:
//!
//! ```text
//! { "store": { "<key>": "<value>", … }, "ttl": { "<key>": <deadline_ms>, … } }
//! ```
//!
//! Key order in the file follows hash-map iteration order, not insertion
//! order. Missing members are treated as empty on load.
//!
//! Saves serialize under the caller's exclusive store lock, write to a
//! temporary sibling file, and rename it over the target so a crash
//! mid-write never leaves a truncated database behind.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk shape of the database file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Key → value for every live entry.
    #[serde(default)]
    pub store: HashMap<String, String>,
    /// Key → absolute expiry deadline in milliseconds.
    #[serde(default)]
    pub ttl: HashMap<String, i64>,
}

/// Errors from loading or saving a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file exists but does not parse as a snapshot.
    #[error("snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serializes the given maps to `path`, pretty-printed, via a temporary
/// sibling file and an atomic rename.
pub fn save(
    path: &Path,
    store: &HashMap<String, String>,
    ttl: &HashMap<String, i64>,
) -> Result<(), SnapshotError> {
    let snapshot = SnapshotRef { store, ttl };
    let tmp = tmp_path(path);

    let file = File::create(&tmp)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Borrowed mirror of [`Snapshot`], so saving never clones the maps.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    store: &'a HashMap<String, String>,
    ttl: &'a HashMap<String, i64>,
}

/// Reads the snapshot at `path`. Returns `Ok(None)` when the file does not
/// exist; parse failures and other I/O problems surface as errors so the
/// caller can log them and start empty.
pub fn load(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snapshot = serde_json::from_reader(BufReader::new(file))?;
    Ok(Some(snapshot))
}
