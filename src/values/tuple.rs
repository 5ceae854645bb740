//! CQL `tuple` value: fixed arity, positionally typed, NULL-tolerant slots.
//!
//! A slot can be *unset* (never assigned, or wire-NULL on decode) or hold an
//! explicit value, which may itself be NULL. The two are observably
//! different only through iteration helpers; `get` reports both as absent.

use crate::error::{Error, Result};
use crate::types::CqlType;
use crate::values::CqlValue;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A typed tuple value. Arity is fixed by the descriptor at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuple {
    ty: Arc<CqlType>,
    values: Vec<Option<CqlValue>>,
    #[serde(skip)]
    cached_hash: Cell<Option<u64>>,
}

impl Tuple {
    /// Creates an all-unset tuple from a `tuple<...>` descriptor.
    pub fn new(ty: Arc<CqlType>) -> Result<Self> {
        let arity = match &*ty {
            CqlType::Tuple(elements) => elements.len(),
            other => {
                return Err(Error::invalid_argument(format!(
                    "expected a tuple type, {} given",
                    other
                )))
            }
        };
        Ok(Self {
            ty,
            values: vec![None; arity],
            cached_hash: Cell::new(None),
        })
    }

    /// The `tuple<...>` descriptor of this value.
    pub fn data_type(&self) -> &Arc<CqlType> {
        &self.ty
    }

    fn element_types(&self) -> &[Arc<CqlType>] {
        match &*self.ty {
            CqlType::Tuple(elements) => elements,
            _ => unreachable!("tuple value holds a non-tuple descriptor"),
        }
    }

    /// Number of slots, fixed for the lifetime of the value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Assigns a slot after validating the value against its positional
    /// type. NULL is tolerated for tuple slots.
    pub fn set(&mut self, index: usize, value: CqlValue) -> Result<()> {
        if index >= self.values.len() {
            return Err(Error::invalid_argument("Index out of bounds"));
        }
        if !value.is_null() {
            value.check_type(&self.element_types()[index])?;
        }
        self.touch();
        self.values[index] = Some(value);
        Ok(())
    }

    /// Reads a slot. `Ok(None)` means the slot is unset; out-of-bounds
    /// indexes are an error, not an absence.
    pub fn get(&self, index: usize) -> Result<Option<&CqlValue>> {
        if index >= self.values.len() {
            return Err(Error::invalid_argument("Index out of bounds"));
        }
        Ok(self.values[index].as_ref())
    }

    /// Slots in positional order; unset slots yield `None`.
    pub fn iter(&self) -> impl Iterator<Item = Option<&CqlValue>> {
        self.values.iter().map(|slot| slot.as_ref())
    }

    /// Slots in positional order with unset slots materialized as NULL.
    /// Always yields exactly `len()` entries.
    pub fn to_values(&self) -> Vec<CqlValue> {
        self.values
            .iter()
            .map(|slot| slot.clone().unwrap_or(CqlValue::Null))
            .collect()
    }

    fn touch(&mut self) {
        self.cached_hash.set(None);
    }

    fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.values.len().hash(&mut hasher);
        for slot in &self.values {
            // Unset hashes like NULL; the distinction is iteration-only.
            slot.as_ref().unwrap_or(&CqlValue::Null).hash(&mut hasher);
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

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Tuple {}

impl PartialOrd for Tuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tuple {
    /// Lower arity sorts first; equal arities compare slot by slot in
    /// positional order, unset comparing as NULL.
    fn cmp(&self, other: &Self) -> Ordering {
        self.values.len().cmp(&other.values.len()).then_with(|| {
            for (a, b) in self.values.iter().zip(other.values.iter()) {
                let ord = a
                    .as_ref()
                    .unwrap_or(&CqlValue::Null)
                    .cmp(b.as_ref().unwrap_or(&CqlValue::Null));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        })
    }
}

impl Hash for Tuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash());
    }
}
