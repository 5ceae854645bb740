//! CQL user-defined type value: named fields in declared order.
//!
//! Iteration follows the *type's* field declaration order, never assignment
//! order. As with tuples, a field can be unset or hold an explicit NULL.

use crate::error::{Error, Result};
use crate::types::{CqlType, UdtType};
use crate::values::CqlValue;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A typed UDT value. Field slots parallel the declared fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTypeValue {
    ty: Arc<CqlType>,
    values: Vec<Option<CqlValue>>,
    #[serde(skip)]
    cached_hash: Cell<Option<u64>>,
}

impl UserTypeValue {
    /// Creates an all-unset value from a user-defined type descriptor.
    pub fn new(ty: Arc<CqlType>) -> Result<Self> {
        let field_count = match &*ty {
            CqlType::UserDefined(udt) => udt.field_count(),
            other => {
                return Err(Error::invalid_argument(format!(
                    "expected a user type, {} given",
                    other
                )))
            }
        };
        Ok(Self {
            ty,
            values: vec![None; field_count],
            cached_hash: Cell::new(None),
        })
    }

    /// The user-defined type descriptor of this value.
    pub fn data_type(&self) -> &Arc<CqlType> {
        &self.ty
    }

    pub fn udt_type(&self) -> &UdtType {
        match &*self.ty {
            CqlType::UserDefined(udt) => udt,
            _ => unreachable!("udt value holds a non-udt descriptor"),
        }
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Assigns a declared field after validating the value against its type.
    /// NULL is tolerated for UDT fields.
    pub fn set(&mut self, name: &str, value: CqlValue) -> Result<()> {
        let (index, field_type) = self
            .udt_type()
            .field(name)
            .map(|(index, ty)| (index, Arc::clone(ty)))
            .ok_or_else(|| Error::invalid_argument(format!("Invalid name '{}'", name)))?;
        if !value.is_null() {
            value.check_type(&field_type)?;
        }
        self.touch();
        self.values[index] = Some(value);
        Ok(())
    }

    /// Reads a declared field. `Ok(None)` means the field is unset;
    /// undeclared names are an error.
    pub fn get(&self, name: &str) -> Result<Option<&CqlValue>> {
        let (index, _) = self
            .udt_type()
            .field(name)
            .ok_or_else(|| Error::invalid_argument(format!("Invalid name '{}'", name)))?;
        Ok(self.values[index].as_ref())
    }

    /// Fields in declared order; unset fields yield `None`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&CqlValue>)> {
        self.udt_type()
            .fields()
            .iter()
            .zip(self.values.iter())
            .map(|((name, _), slot)| (name.as_str(), slot.as_ref()))
    }

    /// Fields in declared order with unset fields materialized as NULL.
    pub fn to_values(&self) -> Vec<(String, CqlValue)> {
        self.udt_type()
            .fields()
            .iter()
            .zip(self.values.iter())
            .map(|((name, _), slot)| {
                (name.clone(), slot.clone().unwrap_or(CqlValue::Null))
            })
            .collect()
    }

    fn touch(&mut self) {
        self.cached_hash.set(None);
    }

    fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.values.len().hash(&mut hasher);
        for ((name, _), slot) in self.udt_type().fields().iter().zip(self.values.iter()) {
            name.hash(&mut hasher);
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

impl PartialEq for UserTypeValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UserTypeValue {}

impl PartialOrd for UserTypeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UserTypeValue {
    /// Fewer fields sort first; equal sizes compare field by field in the
    /// declared order, unset comparing as NULL.
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

impl Hash for UserTypeValue {
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

    fn address_type() -> Arc<CqlType> {
        CqlType::user_defined(vec![
            ("street".to_string(), Arc::new(CqlType::Varchar)),
            ("zip".to_string(), Arc::new(CqlType::Int)),
        ])
    }

    #[test]
    fn test_set_and_get_by_name() {
        let mut value = UserTypeValue::new(address_type()).unwrap();
        value.set("zip", int(12345)).unwrap();
        assert_eq!(value.get("zip").unwrap(), Some(&int(12345)));
        assert_eq!(value.get("street").unwrap(), None);
    }

    #[test]
    fn test_undeclared_name_is_invalid() {
        let mut value = UserTypeValue::new(address_type()).unwrap();
        let err = value.set("city", int(1)).unwrap_err();
        assert_eq!(err, Error::InvalidArgument("Invalid name 'city'".into()));
        assert!(value.get("city").is_err());
    }

    #[test]
    fn test_field_type_validation() {
        let mut value = UserTypeValue::new(address_type()).unwrap();
        assert!(value.set("zip", CqlValue::Varchar("x".into())).is_err());
        // NULL is tolerated for UDT fields.
        value.set("zip", CqlValue::Null).unwrap();
        assert_eq!(value.get("zip").unwrap(), Some(&CqlValue::Null));
    }

    #[test]
    fn test_iteration_follows_declared_order() {
        let mut value = UserTypeValue::new(address_type()).unwrap();
        // Assign in reverse of declaration order.
        value.set("zip", int(99)).unwrap();
        value.set("street", CqlValue::Varchar("Main st".into())).unwrap();

        let names: Vec<_> = value.iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["street", "zip"]);
        assert_eq!(
            value.to_values(),
            vec![
                ("street".to_string(), CqlValue::Varchar("Main st".into())),
                ("zip".to_string(), int(99)),
            ]
        );
    }

    #[test]
    fn test_hash_cache_invalidation() {
        let mut value = UserTypeValue::new(address_type()).unwrap();
        let h0 = value.cached_hash();
        value.set("zip", int(1)).unwrap();
        assert_ne!(value.cached_hash(), h0);
    }
}
