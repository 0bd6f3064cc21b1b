//! Disk snapshot of the record tables.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{IdSequence, Station};

use super::error::StoreError;
use super::tables::{LineEntry, Tables};

/// On-disk layout of the tables.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotData {
    /// When the snapshot was written.
    saved_at: DateTime<Utc>,
    station_ids: IdSequence,
    line_ids: IdSequence,
    stations: Vec<Station>,
    lines: Vec<LineEntry>,
}

/// A JSON file holding every stored record.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load tables from the snapshot.
    ///
    /// Returns `Ok(None)` if the file doesn't exist yet. A file that exists
    /// but cannot be parsed, or whose records are inconsistent, is an error:
    /// silently starting empty would drop data on the next save.
    pub fn load(&self) -> Result<Option<Tables>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| StoreError::Snapshot {
            message: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let data: SnapshotData =
            serde_json::from_str(&contents).map_err(|e| StoreError::Snapshot {
                message: format!("failed to parse {}: {}", self.path.display(), e),
            })?;

        restore(data).map(Some)
    }

    /// Write the tables to the snapshot.
    ///
    /// Writes to a sibling temp file first and renames it into place, so a
    /// crash mid-write never leaves a truncated snapshot. Creates parent
    /// directories if they don't exist.
    pub fn save(&self, tables: &Tables) -> Result<(), StoreError> {
        let data = SnapshotData {
            saved_at: Utc::now(),
            station_ids: tables.station_ids.clone(),
            line_ids: tables.line_ids.clone(),
            stations: tables.stations.values().cloned().collect(),
            lines: tables.lines.values().cloned().collect(),
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Snapshot {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&data).map_err(|e| StoreError::Snapshot {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::Snapshot {
            message: format!("failed to write snapshot file: {}", e),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Snapshot {
            message: format!("failed to replace snapshot file: {}", e),
        })?;

        Ok(())
    }
}

/// Rebuild tables from snapshot data, checking cross-record invariants.
fn restore(data: SnapshotData) -> Result<Tables, StoreError> {
    let corrupt = |message: String| StoreError::Snapshot { message };

    let mut names = HashSet::new();
    let mut stations = BTreeMap::new();
    for station in data.stations {
        if station.id.0 >= data.station_ids.peek() {
            return Err(corrupt(format!("station id {} not yet issued", station.id)));
        }
        if !names.insert(station.name.clone()) {
            return Err(corrupt(format!("duplicate station name {}", station.name)));
        }
        let id = station.id;
        if stations.insert(id, station).is_some() {
            return Err(corrupt(format!("duplicate station id {}", id)));
        }
    }

    let mut line_names = HashSet::new();
    let mut lines = BTreeMap::new();
    for entry in data.lines {
        let id = entry.line.id;
        if id.0 >= data.line_ids.peek() {
            return Err(corrupt(format!("line id {} not yet issued", id)));
        }
        if !line_names.insert(entry.line.name().clone()) {
            return Err(corrupt(format!("duplicate line name {}", entry.line.name())));
        }
        let members = entry.stations.station_ids()?;
        if let Some(missing) = members.iter().find(|s| !stations.contains_key(*s)) {
            return Err(corrupt(format!("line {} references missing station {}", id, missing)));
        }
        if lines.insert(id, entry).is_some() {
            return Err(corrupt(format!("duplicate line id {}", id)));
        }
    }

    Ok(Tables {
        station_ids: data.station_ids,
        line_ids: data.line_ids,
        stations,
        lines,
    })
}
