//! In-memory record tables and the operations on them.
//!
//! `Tables` is plain synchronous data; `SubwayStore` wraps it with locking
//! and persistence. Every operation validates before it mutates, and the
//! store additionally applies mutations to a copy, so a failed call never
//! leaves partial changes behind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    IdSequence, Line, LineId, LineSchedule, LineSequence, LineStation, Name, SequenceError,
    Station, StationId,
};

use super::error::StoreError;

/// A line together with its ordered stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntry {
    pub line: Line,
    pub stations: LineSequence,
}

/// A line with its member stations resolved, head first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDetail {
    pub line: Line,
    pub stations: Vec<Station>,
}

/// All stored records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub(super) station_ids: IdSequence,
    pub(super) line_ids: IdSequence,
    pub(super) stations: BTreeMap<StationId, Station>,
    pub(super) lines: BTreeMap<LineId, LineEntry>,
}

impl Tables {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    // Stations

    /// Add a station with a fresh id.
    pub fn create_station(&mut self, name: &str) -> Result<Station, StoreError> {
        let name = Name::parse("station", name)?;
        if self.stations.values().any(|s| s.name == name) {
            return Err(StoreError::DuplicateStationName(name.to_string()));
        }

        let id = StationId(self.station_ids.next_id());
        let station = Station::new(id, name);
        self.stations.insert(id, station.clone());
        debug!(station = %id, name = %station.name, "station created");
        Ok(station)
    }

    /// All stations, ordered by id.
    pub fn stations(&self) -> Vec<Station> {
        self.stations.values().cloned().collect()
    }

    pub fn station(&self, id: StationId) -> Result<&Station, StoreError> {
        self.stations.get(&id).ok_or(StoreError::StationNotFound(id))
    }

    /// Delete a station and detach it from every line it belongs to.
    pub fn delete_station(&mut self, id: StationId) -> Result<Station, StoreError> {
        self.station(id)?;

        for (line_id, entry) in self.lines.iter_mut() {
            if entry.stations.contains(id) {
                entry.stations.remove(id)?;
                debug!(line = %line_id, station = %id, "station detached by cascade");
            }
        }

        let station = self
            .stations
            .remove(&id)
            .ok_or(StoreError::StationNotFound(id))?;
        debug!(station = %id, "station deleted");
        Ok(station)
    }

    // Lines

    fn ensure_line_name_free(&self, name: &Name, except: Option<LineId>) -> Result<(), StoreError> {
        let taken = self
            .lines
            .values()
            .any(|e| Some(e.line.id) != except && e.line.name() == name);
        if taken {
            return Err(StoreError::DuplicateLineName(name.to_string()));
        }
        Ok(())
    }

    /// Add a line with a fresh id and no stations.
    pub fn create_line(
        &mut self,
        schedule: LineSchedule,
        now: DateTime<Utc>,
    ) -> Result<Line, StoreError> {
        self.ensure_line_name_free(&schedule.name, None)?;

        let id = LineId(self.line_ids.next_id());
        let line = Line::new(id, schedule, now);
        self.lines.insert(
            id,
            LineEntry {
                line: line.clone(),
                stations: LineSequence::new(),
            },
        );
        debug!(line = %id, name = %line.name(), "line created");
        Ok(line)
    }

    fn entry(&self, id: LineId) -> Result<&LineEntry, StoreError> {
        self.lines.get(&id).ok_or(StoreError::LineNotFound(id))
    }

    fn entry_mut(&mut self, id: LineId) -> Result<&mut LineEntry, StoreError> {
        self.lines.get_mut(&id).ok_or(StoreError::LineNotFound(id))
    }

    /// Resolve a line's sequence into station records.
    fn detail(&self, entry: &LineEntry) -> Result<LineDetail, StoreError> {
        let stations = entry
            .stations
            .station_ids()?
            .into_iter()
            .map(|id| self.station(id).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LineDetail {
            line: entry.line.clone(),
            stations,
        })
    }

    /// All lines with their stations, ordered by id.
    pub fn lines(&self) -> Result<Vec<LineDetail>, StoreError> {
        self.lines.values().map(|e| self.detail(e)).collect()
    }

    pub fn line(&self, id: LineId) -> Result<LineDetail, StoreError> {
        self.detail(self.entry(id)?)
    }

    /// Replace a line's schedule. Its stations are kept.
    pub fn update_line(
        &mut self,
        id: LineId,
        schedule: LineSchedule,
        now: DateTime<Utc>,
    ) -> Result<Line, StoreError> {
        self.entry(id)?;
        self.ensure_line_name_free(&schedule.name, Some(id))?;

        let entry = self.entry_mut(id)?;
        entry.line.update(schedule, now);
        debug!(line = %id, "line updated");
        Ok(entry.line.clone())
    }

    /// Delete a line together with its station sequence.
    pub fn delete_line(&mut self, id: LineId) -> Result<Line, StoreError> {
        let entry = self.lines.remove(&id).ok_or(StoreError::LineNotFound(id))?;
        debug!(line = %id, detached = entry.stations.len(), "line deleted");
        Ok(entry.line)
    }

    // Line stations

    /// Attach `station` to a line directly after `pre`.
    pub fn add_line_station(
        &mut self,
        line_id: LineId,
        station: StationId,
        pre: Option<StationId>,
        distance: u32,
        duration: u32,
    ) -> Result<LineStation, StoreError> {
        let empty = self.entry(line_id)?.stations.is_empty();
        self.station(station)?;
        // On an empty line `pre` becomes the implicit head, so it must be a
        // real station. Otherwise membership in the sequence decides.
        if let Some(pre) = pre
            && empty
        {
            self.station(pre)?;
        }

        let sequence = &mut self.entry_mut(line_id)?.stations;
        sequence.insert_after(station, pre, distance, duration)?;

        let added = sequence
            .traverse()?
            .into_iter()
            .find(|e| e.station_id == station)
            .ok_or(SequenceError::NotInLine(station))?;
        debug!(line = %line_id, station = %station, pre = ?pre, "station attached");
        Ok(added)
    }

    /// A line's entries, head first.
    pub fn line_stations(&self, line_id: LineId) -> Result<Vec<LineStation>, StoreError> {
        Ok(self.entry(line_id)?.stations.traverse()?)
    }

    /// Detach `station` from a line, closing the gap.
    pub fn remove_line_station(
        &mut self,
        line_id: LineId,
        station: StationId,
    ) -> Result<LineStation, StoreError> {
        let removed = self.entry_mut(line_id)?.stations.remove(station)?;
        debug!(line = %line_id, station = %station, "station detached");
        Ok(removed)
    }
}
