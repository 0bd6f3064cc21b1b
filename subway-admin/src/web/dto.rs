//! Data transfer objects for web requests and responses.
//!
//! Field names are camelCase on the wire. Numeric request fields accept
//! either JSON numbers or numeric strings, since form-style clients send
//! every value as a string.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{DomainError, LineId, LineSchedule, LineStation, Station, StationId};
use crate::store::LineDetail;

/// Request to create a station.
#[derive(Debug, Deserialize)]
pub struct StationCreateRequest {
    pub name: String,
}

/// A station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationResponse {
    pub id: StationId,
    pub name: String,
}

/// Request to create or update a line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub name: String,

    /// First departure, `HH:MM` or `HH:MM:SS`
    #[serde(deserialize_with = "time_of_day")]
    pub start_time: NaiveTime,

    /// Last departure, `HH:MM` or `HH:MM:SS`
    #[serde(deserialize_with = "time_of_day")]
    pub end_time: NaiveTime,

    /// Minutes between departures
    #[serde(deserialize_with = "number_or_string")]
    pub interval_time: u32,

    /// Display color class (e.g., "bg-red-800")
    pub background_color: String,
}

impl LineRequest {
    /// Validate into a domain schedule.
    pub fn into_schedule(self) -> Result<LineSchedule, DomainError> {
        LineSchedule::new(
            &self.name,
            self.start_time,
            self.end_time,
            self.interval_time,
            &self.background_color,
        )
    }
}

/// A line with its stations in sequence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    pub id: LineId,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_time: u32,
    pub background_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Member stations, head first
    pub stations: Vec<StationResponse>,
}

/// Request to attach a station to a line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStationCreateRequest {
    /// Station to attach
    #[serde(deserialize_with = "number_or_string")]
    pub station_id: u64,

    /// Station it should follow; absent, null or empty for the head
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub pre_station_id: Option<u64>,

    /// Distance from the predecessor
    #[serde(deserialize_with = "number_or_string")]
    pub distance: u32,

    /// Travel time from the predecessor in minutes
    #[serde(deserialize_with = "number_or_string")]
    pub duration: u32,
}

/// One entry of a line's station sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStationResponse {
    pub station_id: StationId,
    pub pre_station_id: Option<StationId>,
    pub distance: u32,
    pub duration: u32,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl From<&Station> for StationResponse {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id,
            name: station.name.to_string(),
        }
    }
}

impl From<&LineDetail> for LineResponse {
    fn from(detail: &LineDetail) -> Self {
        let line = &detail.line;
        Self {
            id: line.id,
            name: line.schedule.name.to_string(),
            start_time: line.schedule.start_time,
            end_time: line.schedule.end_time,
            interval_time: line.schedule.interval_mins,
            background_color: line.schedule.background_color.clone(),
            created_at: line.created_at,
            updated_at: line.updated_at,
            stations: detail.stations.iter().map(StationResponse::from).collect(),
        }
    }
}

impl From<&LineStation> for LineStationResponse {
    fn from(entry: &LineStation) -> Self {
        Self {
            station_id: entry.station_id,
            pre_station_id: entry.pre_station_id,
            distance: entry.distance,
            duration: entry.duration,
        }
    }
}

// Lenient field parsing

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

fn parse_number<T, E>(raw: NumberOrString) -> Result<Option<T>, E>
where
    T: TryFrom<u64> + FromStr,
    <T as FromStr>::Err: Display,
    E: serde::de::Error,
{
    match raw {
        NumberOrString::Number(n) => T::try_from(n)
            .map(Some)
            .map_err(|_| E::custom(format!("number out of range: {n}"))),
        NumberOrString::Text(s) if s.trim().is_empty() => Ok(None),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| E::custom(format!("invalid number {s:?}: {e}"))),
    }
}

fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
    <T as FromStr>::Err: Display,
{
    let raw = NumberOrString::deserialize(deserializer)?;
    parse_number::<T, D::Error>(raw)?
        .ok_or_else(|| D::Error::custom("expected a number, got an empty string"))
}

fn optional_number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
    <T as FromStr>::Err: Display,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(raw) => parse_number(raw),
        None => Ok(None),
    }
}

fn time_of_day<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| D::Error::custom(format!("invalid time {s:?}: {e}")))
}
