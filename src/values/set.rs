//! CQL `set` value: the map contract with unit payloads, exposed as a
//! sequence of distinct members in ascending order.

use crate::error::{Error, Result};
use crate::types::CqlType;
use crate::values::CqlValue;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A typed set value. Membership, add and remove follow the value equality
/// contract, not identity; NULL members are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Set {
    ty: Arc<CqlType>,
    values: BTreeSet<CqlValue>,
    #[serde(skip)]
    cached_hash: Cell<Option<u64>>,
}

impl Set {
    /// Creates an empty set of the given element type.
    pub fn new(element: Arc<CqlType>) -> Self {
        Self {
            ty: CqlType::set_of(element),
            values: BTreeSet::new(),
            cached_hash: Cell::new(None),
        }
    }

    /// Creates an empty set from a full `set<...>` descriptor, sharing it.
    pub fn with_type(ty: Arc<CqlType>) -> Result<Self> {
        match &*ty {
            CqlType::Set(_) => Ok(Self {
                ty,
                values: BTreeSet::new(),
                cached_hash: Cell::new(None),
            }),
            other => Err(Error::invalid_argument(format!(
                "expected a set type, {} given",
                other
            ))),
        }
    }

    /// The `set<element>` descriptor of this value.
    pub fn data_type(&self) -> &Arc<CqlType> {
        &self.ty
    }

    pub fn element_type(&self) -> &Arc<CqlType> {
        match &*self.ty {
            CqlType::Set(element) => element,
            _ => unreachable!("set value holds a non-set descriptor"),
        }
    }

    /// Adds a member after validating it. Returns `false` if an equal member
    /// was already present.
    pub fn add(&mut self, value: CqlValue) -> Result<bool> {
        if value.is_null() {
            return Err(Error::invalid_argument(
                "Invalid value: null is not supported inside sets",
            ));
        }
        value.check_type(self.element_type())?;
        self.touch();
        Ok(self.values.insert(value))
    }

    pub fn has(&self, value: &CqlValue) -> bool {
        self.values.contains(value)
    }

    /// Removes the member equal to `value`, if present.
    pub fn remove(&mut self, value: &CqlValue) -> bool {
        self.touch();
        self.values.remove(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &CqlValue> {
        self.values.iter()
    }

    fn touch(&mut self) {
        self.cached_hash.set(None);
    }

    fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.values.len().hash(&mut hasher);
        for value in &self.values {
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

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Set {}

impl PartialOrd for Set {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Set {
    /// Fewer members sort first; equal sizes compare member by member in
    /// ascending order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.values
            .len()
            .cmp(&other.values.len())
            .then_with(|| self.values.iter().cmp(other.values.iter()))
    }
}

impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::numeric::Int;

    fn int(v: i64) -> CqlValue {
        CqlValue::Int(Int::new(v).unwrap())
    }

    fn int_set() -> Set {
        Set::new(Arc::new(CqlType::Int))
    }

    #[test]
    fn test_membership_by_equality() {
        let mut set = int_set();
        assert!(set.add(int(1)).unwrap());
        assert!(!set.add(int(1)).unwrap());
        assert_eq!(set.len(), 1);
        assert!(set.has(&int(1)));
        assert!(set.remove(&int(1)));
        assert!(!set.remove(&int(1)));
    }

    #[test]
    fn test_rejects_null_and_mismatch() {
        let mut set = int_set();
        assert!(matches!(
            set.add(CqlValue::Null),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            set.add(CqlValue::Varchar("x".into())),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ascending_iteration() {
        let mut set = int_set();
        set.add(int(3)).unwrap();
        set.add(int(1)).unwrap();
        set.add(int(2)).unwrap();
        let members: Vec<_> = set.iter().cloned().collect();
        assert_eq!(members, vec![int(1), int(2), int(3)]);
    }

    #[test]
    fn test_hash_cache_tracks_mutation() {
        let mut set = int_set();
        set.add(int(1)).unwrap();
        let h1 = set.cached_hash();
        set.add(int(2)).unwrap();
        assert_ne!(set.cached_hash(), h1);
        set.remove(&int(2));
        assert_eq!(set.cached_hash(), h1);
    }
}
