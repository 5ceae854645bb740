//! CQL `map` value: typed key/value association.
//!
//! Storage is a `BTreeMap` keyed by the total value order, so traversal is
//! ascending and stable while no mutation happens. Setting an existing key
//! (by the equality contract, not identity) replaces its value in place.

use crate::error::{Error, Result};
use crate::types::CqlType;
use crate::values::CqlValue;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A typed map value. Keys and values are validated at insertion; NULL is
/// rejected on either side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Map {
    ty: Arc<CqlType>,
    entries: BTreeMap<CqlValue, CqlValue>,
    #[serde(skip)]
    cached_hash: Cell<Option<u64>>,
}

impl Map {
    /// Creates an empty map with the given key and value types.
    pub fn new(key: Arc<CqlType>, value: Arc<CqlType>) -> Self {
        Self {
            ty: CqlType::map_of(key, value),
            entries: BTreeMap::new(),
            cached_hash: Cell::new(None),
        }
    }

    /// Creates an empty map from a full `map<...>` descriptor, sharing it.
    pub fn with_type(ty: Arc<CqlType>) -> Result<Self> {
        match &*ty {
            CqlType::Map(_, _) => Ok(Self {
                ty,
                entries: BTreeMap::new(),
                cached_hash: Cell::new(None),
            }),
            other => Err(Error::invalid_argument(format!(
                "expected a map type, {} given",
                other
            ))),
        }
    }

    /// The `map<key, value>` descriptor of this value.
    pub fn data_type(&self) -> &Arc<CqlType> {
        &self.ty
    }

    pub fn key_type(&self) -> &Arc<CqlType> {
        match &*self.ty {
            CqlType::Map(key, _) => key,
            _ => unreachable!("map value holds a non-map descriptor"),
        }
    }

    pub fn value_type(&self) -> &Arc<CqlType> {
        match &*self.ty {
            CqlType::Map(_, value) => value,
            _ => unreachable!("map value holds a non-map descriptor"),
        }
    }

    /// Inserts or replaces the entry for `key`. A key that compares equal to
    /// an existing entry overwrites its value rather than duplicating it.
    pub fn set(&mut self, key: CqlValue, value: CqlValue) -> Result<()> {
        if key.is_null() {
            return Err(Error::invalid_argument(
                "Invalid key: null is not supported inside maps",
            ));
        }
        if value.is_null() {
            return Err(Error::invalid_argument(
                "Invalid value: null is not supported inside maps",
            ));
        }
        key.check_type(self.key_type())?;
        value.check_type(self.value_type())?;
        self.touch();
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &CqlValue) -> Option<&CqlValue> {
        self.entries.get(key)
    }

    pub fn has(&self, key: &CqlValue) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes the entry for `key`, returning its value if present.
    pub fn remove(&mut self, key: &CqlValue) -> Option<CqlValue> {
        self.touch();
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CqlValue, &CqlValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CqlValue> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &CqlValue> {
        self.entries.values()
    }

    fn touch(&mut self) {
        self.cached_hash.set(None);
    }

    fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.entries.len().hash(&mut hasher);
        for (key, value) in &self.entries {
            key.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        hasher.finish()
    }

    pub(crate) fn cached_hash(&self) -> u64 {
        match self.cached_hash.get() {
            Some(h) => h,
            None => {
                let h = self.compute_hash();
                self.cached_hash.set(Some(h));
                h
            }
        }
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Map {}

impl PartialOrd for Map {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Map {
    /// Fewer entries sort first; equal sizes compare entry by entry in
    /// ascending traversal order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.entries
            .len()
            .cmp(&other.entries.len())
            .then_with(|| self.entries.iter().cmp(other.entries.iter()))
    }
}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::numeric::Int;

    fn varchar_int_map() -> Map {
        Map::new(Arc::new(CqlType::Varchar), Arc::new(CqlType::Int))
    }

    fn int(v: i64) -> CqlValue {
        CqlValue::Int(Int::new(v).unwrap())
    }

    fn key(s: &str) -> CqlValue {
        CqlValue::Varchar(s.into())
    }

    #[test]
    fn test_set_get_has_remove() {
        let mut map = varchar_int_map();
        map.set(key("a"), int(1)).unwrap();
        assert!(map.has(&key("a")));
        assert_eq!(map.get(&key("a")), Some(&int(1)));
        assert_eq!(map.remove(&key("a")), Some(int(1)));
        assert!(!map.has(&key("a")));
    }

    #[test]
    fn test_equal_key_overwrites() {
        let mut map = varchar_int_map();
        map.set(key("k"), int(1)).unwrap();
        map.set(key("k"), int(2)).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&key("k")), Some(&int(2)));
    }

    #[test]
    fn test_null_rejection() {
        let mut map = varchar_int_map();
        let err = map.set(CqlValue::Null, int(1)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("Invalid key: null is not supported inside maps".into())
        );
        let err = map.set(key("k"), CqlValue::Null).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("Invalid value: null is not supported inside maps".into())
        );
    }

    #[test]
    fn test_type_validation_both_sides() {
        let mut map = varchar_int_map();
        assert!(map.set(int(1), int(2)).is_err());
        assert!(map.set(key("k"), key("v")).is_err());
    }

    #[test]
    fn test_iteration_is_ascending_and_stable() {
        let mut map = varchar_int_map();
        map.set(key("b"), int(2)).unwrap();
        map.set(key("a"), int(1)).unwrap();
        map.set(key("c"), int(3)).unwrap();

        let first: Vec<_> = map.keys().cloned().collect();
        let second: Vec<_> = map.keys().cloned().collect();
        assert_eq!(first, vec![key("a"), key("b"), key("c")]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_remove_current_entry_between_iterations() {
        let mut map = varchar_int_map();
        map.set(key("a"), int(1)).unwrap();
        map.set(key("b"), int(2)).unwrap();
        map.set(key("c"), int(3)).unwrap();

        // Walk to the middle entry, end the borrow, delete it, then resume
        // from the following key: the remaining traversal must skip the dead
        // entry and see every live one.
        let current = map.keys().nth(1).cloned().unwrap();
        map.remove(&current);
        let rest: Vec<_> = map.keys().cloned().collect();
        assert_eq!(rest, vec![key("a"), key("c")]);
    }

    #[test]
    fn test_hash_cache() {
        let mut map = varchar_int_map();
        map.set(key("a"), int(1)).unwrap();
        let h1 = map.cached_hash();
        assert_eq!(map.cached_hash(), h1);
        map.set(key("a"), int(2)).unwrap();
        assert_ne!(map.cached_hash(), h1);
    }
}
