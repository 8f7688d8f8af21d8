//! Candidate pairs and resolved groups.

use serde::Serialize;

use crate::RecordKey;

/// An unordered pair of distinct records, stored by record-set position with
/// `left < right`.
///
/// Positions follow canonical key order (see [`crate::RecordSet`]), so the
/// position ordering is the key ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidatePair {
    left: usize,
    right: usize,
}

impl CandidatePair {
    /// Orders the two positions; returns `None` for a self-pair.
    pub fn new(a: usize, b: usize) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { left: a, right: b }),
            std::cmp::Ordering::Greater => Some(Self { left: b, right: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn left(self) -> usize {
        self.left
    }

    pub fn right(self) -> usize {
        self.right
    }
}

/// One resolved entity: the sorted, deduplicated keys of its member records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Group {
    members: Vec<RecordKey>,
}

impl Group {
    pub fn new(mut members: Vec<RecordKey>) -> Self {
        members.sort();
        members.dedup();
        Self { members }
    }

    pub fn members(&self) -> &[RecordKey] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.members.binary_search(key).is_ok()
    }

    /// Smallest member key; groups are listed in this order.
    pub fn first(&self) -> Option<&RecordKey> {
        self.members.first()
    }
}
