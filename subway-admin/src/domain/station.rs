//! Station records.

use serde::{Deserialize, Serialize};

use super::ids::StationId;
use super::name::Name;

/// A named stop. Names are unique across all stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: Name,
}

impl Station {
    /// Create a station record.
    pub fn new(id: StationId, name: Name) -> Self {
        Self { id, name }
    }
}
