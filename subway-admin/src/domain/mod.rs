//! Domain types for the subway admin service.
//!
//! This module contains the records the service manages (stations, lines)
//! and the ordered station sequence kept for each line. Types validate their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod error;
mod ids;
mod line;
mod name;
mod sequence;
mod station;

pub use error::DomainError;
pub use ids::{IdSequence, LineId, StationId};
pub use line::{Line, LineSchedule};
pub use name::Name;
pub use sequence::{LineSequence, LineStation, SequenceError};
pub use station::Station;
