//! Record storage for stations, lines and line sequences.
//!
//! All records live in one set of tables behind an async `RwLock`. Reads
//! share the lock; each mutation takes it exclusively, works on a copy of
//! the tables, persists the copy if a snapshot file is configured, and only
//! then commits it. That makes every operation all-or-nothing and keeps
//! concurrent edits of a line's chain from interleaving.

mod error;
mod snapshot;
mod tables;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{Line, LineId, LineSchedule, LineStation, Station, StationId};

pub use error::StoreError;
pub use snapshot::SnapshotFile;
pub use tables::{LineDetail, LineEntry, Tables};

/// Thread-safe handle to the record tables.
#[derive(Clone)]
pub struct SubwayStore {
    inner: Arc<RwLock<Tables>>,
    snapshot: Option<SnapshotFile>,
}

impl SubwayStore {
    /// Create an empty store that is not persisted.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tables::new())),
            snapshot: None,
        }
    }

    /// Open a store backed by a snapshot file.
    ///
    /// Loads the file if it exists, otherwise starts empty. Fails if the
    /// file exists but is unreadable or inconsistent.
    pub fn open(snapshot: SnapshotFile) -> Result<Self, StoreError> {
        let tables = match snapshot.load()? {
            Some(tables) => {
                info!(
                    path = %snapshot.path().display(),
                    stations = tables.stations.len(),
                    lines = tables.lines.len(),
                    "loaded snapshot"
                );
                tables
            }
            None => {
                info!(path = %snapshot.path().display(), "no snapshot found, starting empty");
                Tables::new()
            }
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(tables)),
            snapshot: Some(snapshot),
        })
    }

    /// Apply `op` atomically.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;

        if let Some(snapshot) = &self.snapshot {
            snapshot.save(&next)?;
        }

        *guard = next;
        Ok(out)
    }

    // Stations

    pub async fn create_station(&self, name: &str) -> Result<Station, StoreError> {
        self.mutate(|t| t.create_station(name)).await
    }

    pub async fn stations(&self) -> Vec<Station> {
        self.inner.read().await.stations()
    }

    /// Delete a station, detaching it from every line first.
    pub async fn delete_station(&self, id: StationId) -> Result<Station, StoreError> {
        self.mutate(|t| t.delete_station(id)).await
    }

    // Lines

    pub async fn create_line(&self, schedule: LineSchedule) -> Result<Line, StoreError> {
        let now = Utc::now();
        self.mutate(|t| t.create_line(schedule, now)).await
    }

    pub async fn lines(&self) -> Result<Vec<LineDetail>, StoreError> {
        self.inner.read().await.lines()
    }

    pub async fn line(&self, id: LineId) -> Result<LineDetail, StoreError> {
        self.inner.read().await.line(id)
    }

    pub async fn update_line(
        &self,
        id: LineId,
        schedule: LineSchedule,
    ) -> Result<Line, StoreError> {
        let now = Utc::now();
        self.mutate(|t| t.update_line(id, schedule, now)).await
    }

    /// Delete a line and its station sequence.
    pub async fn delete_line(&self, id: LineId) -> Result<Line, StoreError> {
        self.mutate(|t| t.delete_line(id)).await
    }

    // Line stations

    pub async fn add_line_station(
        &self,
        line: LineId,
        station: StationId,
        pre: Option<StationId>,
        distance: u32,
        duration: u32,
    ) -> Result<LineStation, StoreError> {
        self.mutate(|t| t.add_line_station(line, station, pre, distance, duration))
            .await
    }

    pub async fn line_stations(&self, line: LineId) -> Result<Vec<LineStation>, StoreError> {
        self.inner.read().await.line_stations(line)
    }

    pub async fn remove_line_station(
        &self,
        line: LineId,
        station: StationId,
    ) -> Result<LineStation, StoreError> {
        self.mutate(|t| t.remove_line_station(line, station)).await
    }
}
