//! Ordered station membership of a single line.
//!
//! A line's stations form a singly-linked chain: every entry names the
//! station it follows (`pre_station_id`), and exactly one entry, the head,
//! follows nobody. The chain is stored as an arena of links keyed by station
//! id with both predecessor and successor ids, so insertion and removal are
//! O(1) and never hold references into the map.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ids::StationId;

/// Errors from line sequence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// The predecessor is not part of this line, or is the station itself
    #[error("station {0} cannot be used as a predecessor on this line")]
    InvalidReference(StationId),

    /// The station already has an entry on this line
    #[error("station {0} is already on this line")]
    AlreadyInLine(StationId),

    /// The station has no entry on this line
    #[error("station {0} is not on this line")]
    NotInLine(StationId),

    /// The stored chain has a cycle, a detached fragment or bad back-links
    #[error("line sequence is corrupt: {0}")]
    BrokenChain(&'static str),
}

/// One entry of a line's sequence, as seen from outside.
///
/// `distance` and `duration` describe the stretch from `pre_station_id` to
/// `station_id`; both are zero for the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStation {
    pub station_id: StationId,
    pub pre_station_id: Option<StationId>,
    pub distance: u32,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Link {
    pre: Option<StationId>,
    next: Option<StationId>,
    distance: u32,
    duration: u32,
}

/// The ordered stations of one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineStation>", into = "Vec<LineStation>")]
pub struct LineSequence {
    head: Option<StationId>,
    links: HashMap<StationId, Link>,
}

impl LineSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stations on the line.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Check whether a station is on the line.
    pub fn contains(&self, station: StationId) -> bool {
        self.links.contains_key(&station)
    }

    /// The first station, if any.
    pub fn head(&self) -> Option<StationId> {
        self.head
    }

    /// Insert `station` directly after `pre`.
    ///
    /// - `pre = None` makes `station` the new head. If the line already had a
    ///   head, that station now follows `station` and takes over `distance`
    ///   and `duration`, since they describe the stretch between the two.
    /// - `pre = Some(p)` on an empty line first attaches `p` as the head.
    /// - Otherwise `p` must be on the line; its former successor now follows
    ///   `station` and keeps its own distance and duration.
    ///
    /// On error the sequence is left untouched.
    pub fn insert_after(
        &mut self,
        station: StationId,
        pre: Option<StationId>,
        distance: u32,
        duration: u32,
    ) -> Result<(), SequenceError> {
        if self.contains(station) {
            return Err(SequenceError::AlreadyInLine(station));
        }
        if pre == Some(station) {
            return Err(SequenceError::InvalidReference(station));
        }

        let Some(pre) = pre else {
            self.push_front(station, distance, duration);
            return Ok(());
        };

        if self.is_empty() {
            self.push_front(pre, 0, 0);
        }

        let Some(pre_link) = self.links.get_mut(&pre) else {
            return Err(SequenceError::InvalidReference(pre));
        };
        let next = pre_link.next.replace(station);

        if let Some(next) = next
            && let Some(next_link) = self.links.get_mut(&next)
        {
            next_link.pre = Some(station);
        }

        self.links.insert(
            station,
            Link {
                pre: Some(pre),
                next,
                distance,
                duration,
            },
        );
        Ok(())
    }

    /// Make `station` the head. Any current head follows it over the given
    /// stretch.
    fn push_front(&mut self, station: StationId, distance: u32, duration: u32) {
        let old_head = self.head.replace(station);

        if let Some(old_head) = old_head
            && let Some(link) = self.links.get_mut(&old_head)
        {
            link.pre = Some(station);
            link.distance = distance;
            link.duration = duration;
        }

        self.links.insert(
            station,
            Link {
                pre: None,
                next: old_head,
                distance: 0,
                duration: 0,
            },
        );
    }

    /// Remove `station` and close the gap it leaves.
    ///
    /// The successor is relinked to the removed station's predecessor. If the
    /// head was removed, the successor becomes the head with a zero stretch;
    /// otherwise the successor's stretch grows by the removed one.
    ///
    /// Returns the removed entry.
    pub fn remove(&mut self, station: StationId) -> Result<LineStation, SequenceError> {
        let link = self
            .links
            .get(&station)
            .cloned()
            .ok_or(SequenceError::NotInLine(station))?;

        // Check both neighbours before touching anything.
        if link.pre.is_some_and(|p| !self.links.contains_key(&p)) {
            return Err(SequenceError::BrokenChain("predecessor missing"));
        }
        if link.next.is_some_and(|n| !self.links.contains_key(&n)) {
            return Err(SequenceError::BrokenChain("successor missing"));
        }

        self.links.remove(&station);

        match link.pre {
            Some(pre) => {
                if let Some(pre_link) = self.links.get_mut(&pre) {
                    pre_link.next = link.next;
                }
            }
            None => self.head = link.next,
        }

        if let Some(next) = link.next
            && let Some(next_link) = self.links.get_mut(&next)
        {
            next_link.pre = link.pre;
            if link.pre.is_some() {
                next_link.distance = next_link.distance.saturating_add(link.distance);
                next_link.duration = next_link.duration.saturating_add(link.duration);
            } else {
                next_link.distance = 0;
                next_link.duration = 0;
            }
        }

        Ok(LineStation {
            station_id: station,
            pre_station_id: link.pre,
            distance: link.distance,
            duration: link.duration,
        })
    }

    /// Walk the chain from head to tail.
    ///
    /// Fails if the walk revisits a station, if a back-link disagrees with the
    /// walk, or if some entries are not reachable from the head.
    pub fn traverse(&self) -> Result<Vec<LineStation>, SequenceError> {
        let mut ordered = Vec::with_capacity(self.links.len());
        let mut visited = HashSet::with_capacity(self.links.len());
        let mut expected_pre = None;
        let mut cursor = self.head;

        while let Some(id) = cursor {
            if !visited.insert(id) {
                return Err(SequenceError::BrokenChain("cycle detected"));
            }
            let link = self
                .links
                .get(&id)
                .ok_or(SequenceError::BrokenChain("dangling successor"))?;
            if link.pre != expected_pre {
                return Err(SequenceError::BrokenChain("predecessor mismatch"));
            }

            ordered.push(LineStation {
                station_id: id,
                pre_station_id: link.pre,
                distance: link.distance,
                duration: link.duration,
            });

            expected_pre = Some(id);
            cursor = link.next;
        }

        if ordered.len() != self.links.len() {
            return Err(SequenceError::BrokenChain("entries unreachable from head"));
        }

        Ok(ordered)
    }

    /// Station ids from head to tail.
    pub fn station_ids(&self) -> Result<Vec<StationId>, SequenceError> {
        Ok(self.traverse()?.into_iter().map(|e| e.station_id).collect())
    }

    /// Rebuild a sequence from its entries, in any order.
    pub fn from_entries(entries: Vec<LineStation>) -> Result<Self, SequenceError> {
        let mut head = None;
        let mut links: HashMap<StationId, Link> = HashMap::with_capacity(entries.len());

        for entry in &entries {
            let link = Link {
                pre: entry.pre_station_id,
                next: None,
                distance: entry.distance,
                duration: entry.duration,
            };
            if links.insert(entry.station_id, link).is_some() {
                return Err(SequenceError::AlreadyInLine(entry.station_id));
            }
            if entry.pre_station_id.is_none() && head.replace(entry.station_id).is_some() {
                return Err(SequenceError::BrokenChain("more than one head"));
            }
        }

        for entry in &entries {
            let Some(pre) = entry.pre_station_id else {
                continue;
            };
            let pre_link = links
                .get_mut(&pre)
                .ok_or(SequenceError::InvalidReference(pre))?;
            if pre_link.next.replace(entry.station_id).is_some() {
                return Err(SequenceError::BrokenChain("station has two successors"));
            }
        }

        let sequence = Self { head, links };
        sequence.traverse()?;
        Ok(sequence)
    }
}

impl TryFrom<Vec<LineStation>> for LineSequence {
    type Error = SequenceError;

    fn try_from(entries: Vec<LineStation>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<LineSequence> for Vec<LineStation> {
    fn from(sequence: LineSequence) -> Self {
        // A corrupt chain is written out unordered and rejected on load.
        sequence.traverse().unwrap_or_else(|_| {
            sequence
                .links
                .iter()
                .map(|(id, link)| LineStation {
                    station_id: *id,
                    pre_station_id: link.pre,
                    distance: link.distance,
                    duration: link.duration,
                })
                .collect()
        })
    }
}
