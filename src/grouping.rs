//! # Grouping Aggregator
//! Group-by with per-group distinct counts and frequency tables.
//!
//! [`aggregate`] returns groups in first-seen order; [`rank`] applies the
//! caller's comparator and only then the optional size cap. Sorting is
//! stable, so groups that compare equal keep their first-seen order.
//!
//! A row without the key column is not dropped: it lands in the group keyed
//! by `""`. Distinct sets and tallies treat a missing value the same way.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{AnalyticsError, Result};
use crate::record::{collection_has_field, Record};

/// Which columns to group on and what to collect per group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub key: String,
    pub distinct: Vec<String>,
    pub tallies: Vec<String>,
}

impl GroupSpec {
    pub fn by(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            distinct: Vec::new(),
            tallies: Vec::new(),
        }
    }

    /// Also count distinct values of `field` per group.
    pub fn distinct(mut self, field: impl Into<String>) -> Self {
        self.distinct.push(field.into());
        self
    }

    /// Also build a value → occurrences table of `field` per group.
    pub fn tally(mut self, field: impl Into<String>) -> Self {
        self.tallies.push(field.into());
        self
    }

}

/// One output row per distinct key value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAggregate {
    pub key: String,
    pub count: usize,
    /// Field → number of distinct values seen in this group.
    pub distinct: BTreeMap<String, usize>,
    /// Field → (value → occurrences). Unordered; consumers sort if they care.
    pub tallies: BTreeMap<String, HashMap<String, usize>>,
}

impl GroupAggregate {
    /// Cardinality of a distinct-value field, `0` if it was not requested.
    pub fn distinct_count(&self, field: &str) -> usize {
        self.distinct.get(field).copied().unwrap_or(0)
    }

    /// Frequency table of `field`; empty if it was not requested.
    pub fn tally(&self, field: &str) -> HashMap<String, usize> {
        self.tallies.get(field).cloned().unwrap_or_default()
    }

    /// Occurrences of `value` in the tally of `field`.
    pub fn tally_of(&self, field: &str, value: &str) -> usize {
        self.tallies
            .get(field)
            .and_then(|t| t.get(value))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug)]
struct Accumulator {
    count: usize,
    distinct: Vec<HashSet<String>>,
    tallies: Vec<HashMap<String, usize>>,
}

impl Accumulator {
    fn new(spec: &GroupSpec) -> Self {
        Self {
            count: 0,
            distinct: vec![HashSet::new(); spec.distinct.len()],
            tallies: vec![HashMap::new(); spec.tallies.len()],
        }
    }

    fn add(&mut self, spec: &GroupSpec, record: &Record) {
        self.count += 1;
        for (set, field) in self.distinct.iter_mut().zip(&spec.distinct) {
            set.insert(record.key(field).to_string());
        }
        for (table, field) in self.tallies.iter_mut().zip(&spec.tallies) {
            *table.entry(record.key(field).to_string()).or_default() += 1;
        }
    }

    fn finish(self, spec: &GroupSpec, key: String) -> GroupAggregate {
        GroupAggregate {
            key,
            count: self.count,
            distinct: spec
                .distinct
                .iter()
                .cloned()
                .zip(self.distinct.into_iter().map(|s| s.len()))
                .collect(),
            tallies: spec.tallies.iter().cloned().zip(self.tallies).collect(),
        }
    }
}

/// Group `records` per `spec`, in first-seen key order.
///
/// Fails only if a non-empty collection has no column named `spec.key`.
/// Values of absent distinct/tally columns read as `""`.
pub fn aggregate(records: &[Record], spec: &GroupSpec) -> Result<Vec<GroupAggregate>> {
    if !collection_has_field(records, &spec.key) {
        return Err(AnalyticsError::UnknownField {
            field: spec.key.clone(),
            purpose: "grouping",
        });
    }

    Ok(partition(records, |r| r.key(&spec.key))
        .into_iter()
        .map(|(key, members)| {
            let mut acc = Accumulator::new(spec);
            for r in members {
                acc.add(spec, r);
            }
            acc.finish(spec, key)
        })
        .collect())
}

/// Split `records` by `key_of`, keeping groups in first-seen order.
///
/// Never fails: whatever `key_of` returns for a row is that row's group.
pub fn partition<'a, F>(records: &'a [Record], mut key_of: F) -> Vec<(String, Vec<&'a Record>)>
where
    F: FnMut(&'a Record) -> &'a str,
{
    let mut order: Vec<(String, Vec<&'a Record>)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for record in records {
        let key = key_of(record);
        let slot = *index.entry(key).or_insert_with(|| {
            order.push((key.to_string(), Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(record);
    }

    order
}

/// Stable sort by `cmp`, then keep at most `limit` groups.
pub fn rank<T, F>(mut items: Vec<T>, cmp: F, limit: Option<usize>) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    items.sort_by(cmp);
    if let Some(n) = limit {
        items.truncate(n);
    }
    items
}

/// Largest count first, then the larger distinct count of `secondary`.
pub fn by_count_then_distinct(
    secondary: &str,
) -> impl Fn(&GroupAggregate, &GroupAggregate) -> Ordering + '_ {
    move |a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.distinct_count(secondary).cmp(&a.distinct_count(secondary)))
    }
}
