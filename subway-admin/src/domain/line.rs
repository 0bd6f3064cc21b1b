//! Line records and their operating schedule.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::ids::LineId;
use super::name::Name;

/// The user-editable attributes of a line.
///
/// Construction validates every field, so a `LineSchedule` held by the
/// store is always well formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSchedule {
    pub name: Name,

    /// First departure of the day.
    pub start_time: NaiveTime,

    /// Last departure of the day. May be earlier than `start_time` for
    /// lines running past midnight.
    pub end_time: NaiveTime,

    /// Minutes between consecutive departures.
    pub interval_mins: u32,

    /// Display color, e.g. `bg-red-800`.
    pub background_color: String,
}

impl LineSchedule {
    /// Validate and build a schedule.
    pub fn new(
        name: &str,
        start_time: NaiveTime,
        end_time: NaiveTime,
        interval_mins: u32,
        background_color: &str,
    ) -> Result<Self, DomainError> {
        let name = Name::parse("line", name)?;

        if interval_mins == 0 {
            return Err(DomainError::ZeroInterval);
        }

        let background_color = background_color.trim();
        if background_color.is_empty() {
            return Err(DomainError::BlankColor);
        }

        Ok(Self {
            name,
            start_time,
            end_time,
            interval_mins,
            background_color: background_color.to_string(),
        })
    }
}

/// A subway route with its schedule and audit timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub schedule: LineSchedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Line {
    /// Create a line; both timestamps are set to `now`.
    pub fn new(id: LineId, schedule: LineSchedule, now: DateTime<Utc>) -> Self {
        Self {
            id,
            schedule,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the schedule and bump `updated_at`.
    pub fn update(&mut self, schedule: LineSchedule, now: DateTime<Utc>) {
        self.schedule = schedule;
        self.updated_at = now;
    }

    pub fn name(&self) -> &Name {
        &self.schedule.name
    }
}
