//! Type Descriptor algebra for CQL types.
//!
//! [`CqlType`] is a closed description of a CQL type: a scalar tag, a
//! structural composition (list/set/map/tuple/user-defined type) or a custom
//! class name. Descriptors are immutable once built and shared through
//! [`Arc`]: every value of a given declared type points at the same
//! descriptor, and "derive" operations such as [`UdtType::with_name`] return
//! a new descriptor that shares its sub-descriptors instead of mutating in
//! place.
//!
//! Equality is structural, with one exception inherited from CQL itself:
//! `ascii`, `varchar` and `text` name the same string type and compare (and
//! hash) as equal.
//!
//! The [`Display`] rendering is the canonical CQL form (`list<int>`,
//! `map<varchar, int>`, `frozen<ks.udt_name>`) used by the schema metadata
//! collaborator for function and aggregate signature lookup.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Description of a CQL type: scalar tag or structural composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CqlType {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Smallint,
    Tinyint,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    Inet,
    Date,
    Time,
    Duration,

    /// Server-side custom type, identified by its Java class name.
    Custom(String),

    List(Arc<CqlType>),
    Set(Arc<CqlType>),
    Map(Arc<CqlType>, Arc<CqlType>),
    Tuple(Vec<Arc<CqlType>>),
    UserDefined(UdtType),
}

/// A user-defined type: optional keyspace/name plus declared fields in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdtType {
    keyspace: Option<String>,
    name: Option<String>,
    fields: Vec<(String, Arc<CqlType>)>,
}

impl CqlType {
    /// Builds a `list<element>` descriptor.
    pub fn list_of(element: Arc<CqlType>) -> Arc<CqlType> {
        Arc::new(CqlType::List(element))
    }

    /// Builds a `set<element>` descriptor.
    pub fn set_of(element: Arc<CqlType>) -> Arc<CqlType> {
        Arc::new(CqlType::Set(element))
    }

    /// Builds a `map<key, value>` descriptor.
    pub fn map_of(key: Arc<CqlType>, value: Arc<CqlType>) -> Arc<CqlType> {
        Arc::new(CqlType::Map(key, value))
    }

    /// Builds a `tuple<...>` descriptor from its positional element types.
    pub fn tuple_of(elements: Vec<Arc<CqlType>>) -> Arc<CqlType> {
        Arc::new(CqlType::Tuple(elements))
    }

    /// Builds an anonymous user-defined type descriptor from named fields.
    pub fn user_defined(fields: Vec<(String, Arc<CqlType>)>) -> Arc<CqlType> {
        Arc::new(CqlType::UserDefined(UdtType::new(fields)))
    }

    /// True for scalar tags (including custom), false for compositions.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            CqlType::List(_)
                | CqlType::Set(_)
                | CqlType::Map(_, _)
                | CqlType::Tuple(_)
                | CqlType::UserDefined(_)
        )
    }

    /// Looks up a scalar type by its CQL name.
    ///
    /// `text` is accepted as an alias for `varchar`. Composite names
    /// (`list<...>` and friends) are not parsed here; the schema collaborator
    /// builds those structurally.
    pub fn from_name(name: &str) -> Result<CqlType> {
        match name {
            "ascii" => Ok(CqlType::Ascii),
            "bigint" => Ok(CqlType::Bigint),
            "blob" => Ok(CqlType::Blob),
            "boolean" => Ok(CqlType::Boolean),
            "counter" => Ok(CqlType::Counter),
            "decimal" => Ok(CqlType::Decimal),
            "double" => Ok(CqlType::Double),
            "float" => Ok(CqlType::Float),
            "int" => Ok(CqlType::Int),
            "smallint" => Ok(CqlType::Smallint),
            "tinyint" => Ok(CqlType::Tinyint),
            "timestamp" => Ok(CqlType::Timestamp),
            "uuid" => Ok(CqlType::Uuid),
            "varchar" | "text" => Ok(CqlType::Varchar),
            "varint" => Ok(CqlType::Varint),
            "timeuuid" => Ok(CqlType::Timeuuid),
            "inet" => Ok(CqlType::Inet),
            "date" => Ok(CqlType::Date),
            "time" => Ok(CqlType::Time),
            "duration" => Ok(CqlType::Duration),
            _ => Err(Error::invalid_argument(format!(
                "Unsupported type '{}'",
                name
            ))),
        }
    }

    /// Canonical CQL name of this type, e.g. `map<varchar, int>`.
    pub fn cql_name(&self) -> String {
        self.to_string()
    }

    /// Comparison tag. `Ascii` and `Varchar` share a tag so the two hash and
    /// compare as the same scalar.
    fn tag(&self) -> u8 {
        match self {
            CqlType::Ascii | CqlType::Varchar => 0,
            CqlType::Bigint => 1,
            CqlType::Blob => 2,
            CqlType::Boolean => 3,
            CqlType::Counter => 4,
            CqlType::Decimal => 5,
            CqlType::Double => 6,
            CqlType::Float => 7,
            CqlType::Int => 8,
            CqlType::Smallint => 9,
            CqlType::Tinyint => 10,
            CqlType::Timestamp => 11,
            CqlType::Uuid => 12,
            CqlType::Varint => 13,
            CqlType::Timeuuid => 14,
            CqlType::Inet => 15,
            CqlType::Date => 16,
            CqlType::Time => 17,
            CqlType::Duration => 18,
            CqlType::Custom(_) => 19,
            CqlType::List(_) => 20,
            CqlType::Set(_) => 21,
            CqlType::Map(_, _) => 22,
            CqlType::Tuple(_) => 23,
            CqlType::UserDefined(_) => 24,
        }
    }
}

impl PartialEq for CqlType {
    fn eq(&self, other: &Self) -> bool {
        if self.tag() != other.tag() {
            return false;
        }
        match (self, other) {
            (CqlType::Custom(a), CqlType::Custom(b)) => a == b,
            (CqlType::List(a), CqlType::List(b)) | (CqlType::Set(a), CqlType::Set(b)) => a == b,
            (CqlType::Map(ak, av), CqlType::Map(bk, bv)) => ak == bk && av == bv,
            (CqlType::Tuple(a), CqlType::Tuple(b)) => a == b,
            (CqlType::UserDefined(a), CqlType::UserDefined(b)) => a == b,
            // Same scalar tag.
            _ => true,
        }
    }
}

impl Eq for CqlType {}

impl Hash for CqlType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            CqlType::Custom(class) => class.hash(state),
            CqlType::List(e) | CqlType::Set(e) => e.hash(state),
            CqlType::Map(k, v) => {
                k.hash(state);
                v.hash(state);
            }
            CqlType::Tuple(elements) => elements.hash(state),
            CqlType::UserDefined(udt) => {
                udt.keyspace.hash(state);
                udt.name.hash(state);
                udt.fields.hash(state);
            }
            _ => {}
        }
    }
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlType::Ascii => write!(f, "ascii"),
            CqlType::Bigint => write!(f, "bigint"),
            CqlType::Blob => write!(f, "blob"),
            CqlType::Boolean => write!(f, "boolean"),
            CqlType::Counter => write!(f, "counter"),
            CqlType::Decimal => write!(f, "decimal"),
            CqlType::Double => write!(f, "double"),
            CqlType::Float => write!(f, "float"),
            CqlType::Int => write!(f, "int"),
            CqlType::Smallint => write!(f, "smallint"),
            CqlType::Tinyint => write!(f, "tinyint"),
            CqlType::Timestamp => write!(f, "timestamp"),
            CqlType::Uuid => write!(f, "uuid"),
            CqlType::Varchar => write!(f, "varchar"),
            CqlType::Varint => write!(f, "varint"),
            CqlType::Timeuuid => write!(f, "timeuuid"),
            CqlType::Inet => write!(f, "inet"),
            CqlType::Date => write!(f, "date"),
            CqlType::Time => write!(f, "time"),
            CqlType::Duration => write!(f, "duration"),
            CqlType::Custom(class) => write!(f, "'{}'", class),
            CqlType::List(e) => write!(f, "list<{}>", e),
            CqlType::Set(e) => write!(f, "set<{}>", e),
            CqlType::Map(k, v) => write!(f, "map<{}, {}>", k, v),
            CqlType::Tuple(elements) => {
                write!(f, "tuple<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ">")
            }
            CqlType::UserDefined(udt) => write!(f, "{}", udt),
        }
    }
}

impl UdtType {
    /// Creates an anonymous UDT descriptor from declared fields.
    pub fn new(fields: Vec<(String, Arc<CqlType>)>) -> Self {
        Self {
            keyspace: None,
            name: None,
            fields,
        }
    }

    /// Returns a new descriptor with the given type name, sharing the field
    /// sub-descriptors of this one.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            keyspace: self.keyspace.clone(),
            name: Some(name.into()),
            fields: self.fields.clone(),
        }
    }

    /// Returns a new descriptor with the given keyspace, sharing the field
    /// sub-descriptors of this one.
    pub fn with_keyspace(&self, keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: Some(keyspace.into()),
            name: self.name.clone(),
            fields: self.fields.clone(),
        }
    }

    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[(String, Arc<CqlType>)] {
        &self.fields
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Looks up a declared field by name, returning its position and type.
    pub fn field(&self, name: &str) -> Option<(usize, &Arc<CqlType>)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, (field_name, _))| field_name == name)
            .map(|(index, (_, ty))| (index, ty))
    }
}

impl fmt::Display for UdtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.keyspace, &self.name) {
            (Some(ks), Some(name)) => write!(f, "frozen<{}.{}>", ks, name),
            (None, Some(name)) => write!(f, "frozen<{}>", name),
            _ => {
                write!(f, "udt<")?;
                for (i, (name, ty)) in self.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}:{}", name, ty)?;
                }
                write!(f, ">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(ty: &CqlType) -> u64 {
        let mut hasher = DefaultHasher::new();
        ty.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_ascii_varchar_equivalence() {
        assert_eq!(CqlType::Ascii, CqlType::Varchar);
        assert_eq!(hash_of(&CqlType::Ascii), hash_of(&CqlType::Varchar));
        assert_eq!(
            *CqlType::list_of(Arc::new(CqlType::Ascii)),
            *CqlType::list_of(Arc::new(CqlType::Varchar))
        );
    }

    #[test]
    fn test_structural_equality() {
        let a = CqlType::map_of(Arc::new(CqlType::Varchar), Arc::new(CqlType::Int));
        let b = CqlType::map_of(Arc::new(CqlType::Varchar), Arc::new(CqlType::Int));
        let c = CqlType::map_of(Arc::new(CqlType::Int), Arc::new(CqlType::Int));
        assert_eq!(*a, *b);
        assert_ne!(*a, *c);
    }

    #[test]
    fn test_canonical_rendering() {
        assert_eq!(CqlType::list_of(Arc::new(CqlType::Int)).to_string(), "list<int>");
        assert_eq!(
            CqlType::map_of(Arc::new(CqlType::Varchar), Arc::new(CqlType::Int)).to_string(),
            "map<varchar, int>"
        );
        assert_eq!(
            CqlType::tuple_of(vec![Arc::new(CqlType::Int), Arc::new(CqlType::Varchar)])
                .to_string(),
            "tuple<int, varchar>"
        );
        assert_eq!(CqlType::Custom("org.apache.cassandra.db.marshal.BytesType".into()).to_string(),
            "'org.apache.cassandra.db.marshal.BytesType'");
    }

    #[test]
    fn test_udt_derivation_shares_fields() {
        let fields = vec![
            ("street".to_string(), Arc::new(CqlType::Varchar)),
            ("zip".to_string(), Arc::new(CqlType::Int)),
        ];
        let anon = UdtType::new(fields);
        let named = anon.with_name("address").with_keyspace("ks");

        // Prior fields are preserved and shared, not copied structurally.
        assert_eq!(anon.field_count(), named.field_count());
        assert!(Arc::ptr_eq(anon.field("zip").unwrap().1, named.field("zip").unwrap().1));
        assert_eq!(named.to_string(), "frozen<ks.address>");
        assert!(anon.to_string().starts_with("udt<"));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CqlType::from_name("varchar").unwrap(), CqlType::Varchar);
        assert_eq!(CqlType::from_name("text").unwrap(), CqlType::Varchar);
        assert_eq!(CqlType::from_name("timeuuid").unwrap(), CqlType::Timeuuid);
        assert!(CqlType::from_name("frob").is_err());
    }
}
