//! First-occurrence grouping of records by a classification key.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::data::Record;
use crate::types::RowIndex;

/// Record ids bucketed by key; keys and members both keep input order.
pub type Groups<K> = IndexMap<K, Vec<RowIndex>>;

/// Bucket `records` by `key_fn`, skipping records whose key is `None`.
///
/// Keys appear in the order they are first seen and each bucket lists row
/// indices in input order.
pub fn group_by<'a, K, I, F>(records: I, key_fn: F) -> Groups<K>
where
    K: Hash + Eq,
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&Record) -> Option<K>,
{
    let mut groups: Groups<K> = IndexMap::new();
    for record in records {
        if let Some(key) = key_fn(record) {
            groups.entry(key).or_default().push(record.row);
        }
    }
    groups
}
