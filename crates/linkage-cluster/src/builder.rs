//! Grouping matched pairs into entities.
//!
//! All match sets feed one [`ClusterBuilder`]; every record starts as its own
//! group and each matched pair merges two groups. The resulting partition is the
//! set of connected components of the match graph, so it depends neither on the
//! order pairs arrive in nor on how often a pair repeats.

use tracing::debug;

use linkage_model::{CandidatePair, Group, RecordKey, RecordSet, SingletonPolicy};

use crate::error::{ClusterError, Result};
use crate::union_find::UnionFind;

/// Counters collected while merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterStats {
    /// Matched pairs received, duplicates included.
    pub edges: usize,
    /// Pairs that merged two distinct groups.
    pub unions: usize,
    /// Pairs whose records were already grouped.
    pub redundant: usize,
}

/// Groups produced by a [`ClusterBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    pub groups: Vec<Group>,
    pub stats: ClusterStats,
    /// Records left unmatched, whether or not they were reported.
    pub singletons: usize,
}

pub struct ClusterBuilder<'a> {
    records: &'a RecordSet,
    sets: UnionFind,
    stats: ClusterStats,
}

impl<'a> ClusterBuilder<'a> {
    pub fn new(records: &'a RecordSet) -> Self {
        Self {
            records,
            sets: UnionFind::new(records.len()),
            stats: ClusterStats::default(),
        }
    }

    pub fn stats(&self) -> ClusterStats {
        self.stats
    }

    /// Adds a matched pair by record position. Returns true if it merged two groups.
    ///
    /// # Errors
    ///
    /// Fails when either position is outside the record set.
    pub fn add_pair(&mut self, pair: CandidatePair) -> Result<bool> {
        let len = self.records.len();
        if pair.right() >= len {
            return Err(ClusterError::PositionOutOfRange {
                position: pair.right(),
                len,
            });
        }
        self.stats.edges += 1;
        let merged = self.sets.union(pair.left(), pair.right());
        if merged {
            self.stats.unions += 1;
        } else {
            self.stats.redundant += 1;
        }
        Ok(merged)
    }

    /// Adds a matched pair by key. A key paired with itself is ignored.
    ///
    /// # Errors
    ///
    /// Fails when either key is not in the record set.
    pub fn add_match(&mut self, a: &RecordKey, b: &RecordKey) -> Result<bool> {
        let left = self.position(a)?;
        let right = self.position(b)?;
        match CandidatePair::new(left, right) {
            Some(pair) => self.add_pair(pair),
            None => Ok(false),
        }
    }

    pub fn add_pairs<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = CandidatePair>,
    {
        for pair in pairs {
            self.add_pair(pair)?;
        }
        Ok(())
    }

    fn position(&self, key: &RecordKey) -> Result<usize> {
        self.records
            .position(key)
            .ok_or_else(|| ClusterError::UnknownKey {
                key: key.to_string(),
            })
    }

    /// Resolves the partition. Groups come out ordered by their smallest key.
    pub fn build(mut self, policy: SingletonPolicy) -> Clustering {
        let len = self.records.len();
        let mut slot_of_root: Vec<Option<usize>> = vec![None; len];
        let mut members: Vec<Vec<usize>> = Vec::new();
        // Positions are visited in key order, so each group's first member is
        // its smallest key and groups are created in output order.
        for position in 0..len {
            let root = self.sets.find(position);
            let slot = *slot_of_root[root].get_or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[slot].push(position);
        }

        let singletons = members.iter().filter(|m| m.len() == 1).count();
        let groups: Vec<Group> = members
            .into_iter()
            .filter(|m| policy == SingletonPolicy::Include || m.len() > 1)
            .map(|positions| {
                Group::new(
                    positions
                        .into_iter()
                        .filter_map(|p| self.records.get(p).map(|r| r.key.clone()))
                        .collect(),
                )
            })
            .collect();

        debug!(
            records = len,
            edges = self.stats.edges,
            unions = self.stats.unions,
            redundant = self.stats.redundant,
            groups = groups.len(),
            singletons,
            "built clusters"
        );
        Clustering {
            groups,
            stats: self.stats,
            singletons,
        }
    }
}

/// Clusters a complete edge list in one pass.
pub fn cluster<I>(records: &RecordSet, pairs: I, policy: SingletonPolicy) -> Result<Clustering>
where
    I: IntoIterator<Item = CandidatePair>,
{
    let mut builder = ClusterBuilder::new(records);
    builder.add_pairs(pairs)?;
    Ok(builder.build(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage_model::ContactRecord;

    fn key(value: &str) -> RecordKey {
        RecordKey::new(value).unwrap()
    }

    fn records(keys: &[&str]) -> RecordSet {
        RecordSet::new(keys.iter().map(|k| ContactRecord::new(key(k))).collect()).unwrap()
    }

    fn member_lists(clustering: &Clustering) -> Vec<Vec<&str>> {
        clustering
            .groups
            .iter()
            .map(|g| g.members().iter().map(RecordKey::as_str).collect())
            .collect()
    }

    #[test]
    fn chained_matches_form_one_group() {
        let set = records(&["a", "b", "c", "d"]);
        let mut builder = ClusterBuilder::new(&set);
        assert!(builder.add_match(&key("a"), &key("b")).unwrap());
        assert!(builder.add_match(&key("c"), &key("b")).unwrap());
        let clustering = builder.build(SingletonPolicy::Include);
        assert_eq!(member_lists(&clustering), vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(clustering.singletons, 1);
    }

    #[test]
    fn merging_two_existing_groups() {
        // a-b and c-d grow separately, then b-c links them.
        let set = records(&["a", "b", "c", "d", "e"]);
        let mut builder = ClusterBuilder::new(&set);
        builder.add_match(&key("a"), &key("b")).unwrap();
        builder.add_match(&key("d"), &key("c")).unwrap();
        builder.add_match(&key("b"), &key("c")).unwrap();
        let clustering = builder.build(SingletonPolicy::Exclude);
        assert_eq!(member_lists(&clustering), vec![vec!["a", "b", "c", "d"]]);
        assert_eq!(clustering.stats.unions, 3);
    }

    #[test]
    fn duplicate_pairs_union_once() {
        let set = records(&["a", "b"]);
        let mut builder = ClusterBuilder::new(&set);
        assert!(builder.add_match(&key("a"), &key("b")).unwrap());
        assert!(!builder.add_match(&key("b"), &key("a")).unwrap());
        assert!(!builder.add_match(&key("a"), &key("a")).unwrap());
        assert_eq!(
            builder.stats(),
            ClusterStats {
                edges: 2,
                unions: 1,
                redundant: 1
            }
        );
    }

    #[test]
    fn singleton_policy_controls_reporting() {
        let set = records(&["a", "b", "c"]);
        let pairs = [CandidatePair::new(0, 2).unwrap()];
        let included = cluster(&set, pairs, SingletonPolicy::Include).unwrap();
        assert_eq!(member_lists(&included), vec![vec!["a", "c"], vec!["b"]]);
        let excluded = cluster(&set, pairs, SingletonPolicy::Exclude).unwrap();
        assert_eq!(member_lists(&excluded), vec![vec!["a", "c"]]);
        assert_eq!(excluded.singletons, 1);
    }

    #[test]
    fn unknown_references_are_errors() {
        let set = records(&["a", "b"]);
        let mut builder = ClusterBuilder::new(&set);
        assert_eq!(
            builder.add_match(&key("a"), &key("zz")),
            Err(ClusterError::UnknownKey {
                key: "zz".to_string()
            })
        );
        assert!(matches!(
            builder.add_pair(CandidatePair::new(0, 2).unwrap()),
            Err(ClusterError::PositionOutOfRange { position: 2, len: 2 })
        ));
        assert_eq!(builder.stats().edges, 0);
    }

    #[test]
    fn empty_record_set_has_no_groups() {
        let set = RecordSet::default();
        let clustering = cluster(&set, Vec::new(), SingletonPolicy::Include).unwrap();
        assert!(clustering.groups.is_empty());
    }
}
