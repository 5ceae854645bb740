//! Ordered CQL `list` value: duplicates allowed, insertion order preserved.

use crate::error::{Error, Result};
use crate::types::CqlType;
use crate::values::CqlValue;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A typed list value. Every insertion is validated against the declared
/// element type before it lands; NULL children are rejected outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    ty: Arc<CqlType>,
    values: Vec<CqlValue>,
    #[serde(skip)]
    cached_hash: Cell<Option<u64>>,
}

impl List {
    /// Creates an empty list of the given element type.
    pub fn new(element: Arc<CqlType>) -> Self {
        Self {
            ty: CqlType::list_of(element),
            values: Vec::new(),
            cached_hash: Cell::new(None),
        }
    }

    /// Creates an empty list from a full `list<...>` descriptor, sharing it.
    pub fn with_type(ty: Arc<CqlType>) -> Result<Self> {
        match &*ty {
            CqlType::List(_) => Ok(Self {
                ty,
                values: Vec::new(),
                cached_hash: Cell::new(None),
            }),
            other => Err(Error::invalid_argument(format!(
                "expected a list type, {} given",
                other
            ))),
        }
    }

    /// The `list<element>` descriptor of this value.
    pub fn data_type(&self) -> &Arc<CqlType> {
        &self.ty
    }

    /// The declared element type.
    pub fn element_type(&self) -> &Arc<CqlType> {
        match &*self.ty {
            CqlType::List(element) => element,
            _ => unreachable!("list value holds a non-list descriptor"),
        }
    }

    /// Appends one element after validating it.
    pub fn add(&mut self, value: CqlValue) -> Result<()> {
        self.check(&value)?;
        self.touch();
        self.values.push(value);
        Ok(())
    }

    /// Appends several elements, all-or-nothing: every element is validated
    /// before any of them is appended.
    pub fn add_all(&mut self, values: Vec<CqlValue>) -> Result<()> {
        for value in &values {
            self.check(value)?;
        }
        self.touch();
        self.values.extend(values);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&CqlValue> {
        self.values.get(index)
    }

    /// Position of the first element equal to `value`, by the value equality
    /// contract.
    pub fn find(&self, value: &CqlValue) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    /// Removes and returns the element at `index`.
    pub fn remove(&mut self, index: usize) -> Result<CqlValue> {
        if index >= self.values.len() {
            return Err(Error::invalid_argument("Index out of bounds"));
        }
        self.touch();
        Ok(self.values.remove(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CqlValue> {
        self.values.iter()
    }

    fn check(&self, value: &CqlValue) -> Result<()> {
        if value.is_null() {
            return Err(Error::invalid_argument(
                "Invalid value: null is not supported inside collections",
            ));
        }
        value.check_type(self.element_type())
    }

    /// The single cache-invalidation point; every mutating method goes
    /// through here before changing the payload.
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

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for List {}

impl PartialOrd for List {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for List {
    /// Shorter list sorts first; equal lengths compare element by element in
    /// insertion order, short-circuiting on the first difference.
    fn cmp(&self, other: &Self) -> Ordering {
        self.values
            .len()
            .cmp(&other.values.len())
            .then_with(|| self.values.cmp(&other.values))
    }
}

impl Hash for List {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::numeric::Int;

    fn int_list() -> List {
        List::new(Arc::new(CqlType::Int))
    }

    fn int(v: i64) -> CqlValue {
        CqlValue::Int(Int::new(v).unwrap())
    }

    #[test]
    fn test_add_and_get() {
        let mut list = int_list();
        list.add(int(1)).unwrap();
        list.add(int(2)).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some(&int(1)));
        assert_eq!(list.find(&int(2)), Some(1));
        assert_eq!(list.find(&int(3)), None);
    }

    #[test]
    fn test_rejects_type_mismatch() {
        let mut list = int_list();
        let err = list.add(CqlValue::Varchar("hello".into())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(list.is_empty());
    }

    #[test]
    fn test_rejects_null() {
        let mut list = int_list();
        let err = list.add(CqlValue::Null).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument(
                "Invalid value: null is not supported inside collections".into()
            )
        );
    }

    #[test]
    fn test_add_all_is_all_or_nothing() {
        let mut list = int_list();
        let err = list
            .add_all(vec![int(1), CqlValue::Varchar("x".into()), int(3)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(list.is_empty());

        list.add_all(vec![int(1), int(2)]).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut list = int_list();
        list.add_all(vec![int(1), int(2), int(3)]).unwrap();
        assert_eq!(list.remove(1).unwrap(), int(2));
        assert_eq!(list.len(), 2);
        assert!(list.remove(5).is_err());
    }

    #[test]
    fn test_hash_cache_invalidation() {
        let mut list = int_list();
        list.add(int(1)).unwrap();
        let first = list.cached_hash();
        assert_eq!(list.cached_hash(), first);
        list.add(int(2)).unwrap();
        let second = list.cached_hash();
        assert_ne!(first, second);
        list.remove(1).unwrap();
        assert_eq!(list.cached_hash(), first);
    }

    #[test]
    fn test_ordering_by_length_then_elements() {
        let mut a = int_list();
        a.add_all(vec![int(1), int(2)]).unwrap();
        let mut b = int_list();
        b.add_all(vec![int(9)]).unwrap();
        // Shorter sorts first even though its element is larger.
        assert!(b < a);
        let mut c = int_list();
        c.add_all(vec![int(1), int(3)]).unwrap();
        assert!(a < c);
    }
}
