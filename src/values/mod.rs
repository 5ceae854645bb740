//! Value Object model: one host representation per CQL scalar type plus the
//! five container kinds.
//!
//! [`CqlValue`] is the tagged union that mirrors the [`CqlType`] descriptor
//! algebra. Every variant participates in a single total order and stable
//! hash, so any value — containers included — can serve as a map key or set
//! member. Values of different kinds compare by a fixed kind rank,
//! deterministic but arbitrary, rather than raising an error; this matches
//! host-language total-order expectations for sorting mixed collections.

pub mod list;
pub mod map;
pub mod numeric;
pub mod scalar;
pub mod set;
pub mod temporal;
pub mod tuple;
pub mod udt;

pub use list::List;
pub use map::Map;
pub use numeric::{Bigint, Decimal, Double, Float, Int, Smallint, Tinyint, Varint};
pub use scalar::{Blob, Inet, Timeuuid};
pub use set::Set;
pub use temporal::{Date, Duration, Time, Timestamp};
pub use tuple::Tuple;
pub use udt::UserTypeValue;

use crate::error::{Error, Result};
use crate::types::CqlType;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// A decoded or constructed CQL value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CqlValue {
    Null,
    Boolean(bool),
    Tinyint(Tinyint),
    Smallint(Smallint),
    Int(Int),
    Bigint(Bigint),
    Counter(Bigint),
    Varint(Varint),
    Float(Float),
    Double(Double),
    Decimal(Decimal),
    Ascii(String),
    Varchar(String),
    Blob(Blob),
    Uuid(Uuid),
    Timeuuid(Timeuuid),
    Inet(Inet),
    Date(Date),
    Time(Time),
    Timestamp(Timestamp),
    Duration(Duration),
    /// Raw payload of a server-side custom type, carried opaquely.
    Custom(Bytes),
    List(List),
    Set(Set),
    Map(Map),
    Tuple(Tuple),
    UserType(UserTypeValue),
}

impl CqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CqlValue::Null)
    }

    /// The type descriptor of this value. Containers share their stored
    /// descriptor; scalars allocate their tag on demand.
    pub fn type_of(&self) -> Arc<CqlType> {
        match self {
            CqlValue::Null => Arc::new(CqlType::Custom("null".into())),
            CqlValue::Boolean(_) => Arc::new(CqlType::Boolean),
            CqlValue::Tinyint(_) => Arc::new(CqlType::Tinyint),
            CqlValue::Smallint(_) => Arc::new(CqlType::Smallint),
            CqlValue::Int(_) => Arc::new(CqlType::Int),
            CqlValue::Bigint(_) => Arc::new(CqlType::Bigint),
            CqlValue::Counter(_) => Arc::new(CqlType::Counter),
            CqlValue::Varint(_) => Arc::new(CqlType::Varint),
            CqlValue::Float(_) => Arc::new(CqlType::Float),
            CqlValue::Double(_) => Arc::new(CqlType::Double),
            CqlValue::Decimal(_) => Arc::new(CqlType::Decimal),
            CqlValue::Ascii(_) => Arc::new(CqlType::Ascii),
            CqlValue::Varchar(_) => Arc::new(CqlType::Varchar),
            CqlValue::Blob(_) => Arc::new(CqlType::Blob),
            CqlValue::Uuid(_) => Arc::new(CqlType::Uuid),
            CqlValue::Timeuuid(_) => Arc::new(CqlType::Timeuuid),
            CqlValue::Inet(_) => Arc::new(CqlType::Inet),
            CqlValue::Date(_) => Arc::new(CqlType::Date),
            CqlValue::Time(_) => Arc::new(CqlType::Time),
            CqlValue::Timestamp(_) => Arc::new(CqlType::Timestamp),
            CqlValue::Duration(_) => Arc::new(CqlType::Duration),
            CqlValue::Custom(_) => Arc::new(CqlType::Custom(String::new())),
            CqlValue::List(v) => Arc::clone(v.data_type()),
            CqlValue::Set(v) => Arc::clone(v.data_type()),
            CqlValue::Map(v) => Arc::clone(v.data_type()),
            CqlValue::Tuple(v) => Arc::clone(v.data_type()),
            CqlValue::UserType(v) => Arc::clone(v.data_type()),
        }
    }

    /// Validates this value against an expected type descriptor: scalars
    /// must scalar-match (ascii/varchar interchangeable, counter columns
    /// accept bigint payloads), containers must carry a structurally equal
    /// descriptor. NULL is acceptable for any target type at this level;
    /// container insertion paths reject it separately where the slot
    /// disallows it.
    pub fn check_type(&self, expected: &CqlType) -> Result<()> {
        if self.is_null() {
            return Ok(());
        }
        if matches!(
            (self, expected),
            (CqlValue::Custom(_), CqlType::Custom(_))
                | (CqlValue::Bigint(_), CqlType::Counter)
                | (CqlValue::Counter(_), CqlType::Bigint)
        ) {
            return Ok(());
        }
        let actual = self.type_of();
        if *actual == *expected {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "expected a value of type {}, a value of type {} given",
                expected, actual
            )))
        }
    }

    /// Fixed rank used to order values of different kinds deterministically.
    /// `ascii` and `varchar` share a rank and compare by payload.
    fn kind_rank(&self) -> u8 {
        match self {
            CqlValue::Null => 0,
            CqlValue::Boolean(_) => 1,
            CqlValue::Tinyint(_) => 2,
            CqlValue::Smallint(_) => 3,
            CqlValue::Int(_) => 4,
            CqlValue::Bigint(_) => 5,
            CqlValue::Counter(_) => 6,
            CqlValue::Varint(_) => 7,
            CqlValue::Float(_) => 8,
            CqlValue::Double(_) => 9,
            CqlValue::Decimal(_) => 10,
            CqlValue::Ascii(_) | CqlValue::Varchar(_) => 11,
            CqlValue::Blob(_) => 12,
            CqlValue::Uuid(_) => 13,
            CqlValue::Timeuuid(_) => 14,
            CqlValue::Inet(_) => 15,
            CqlValue::Date(_) => 16,
            CqlValue::Time(_) => 17,
            CqlValue::Timestamp(_) => 18,
            CqlValue::Duration(_) => 19,
            CqlValue::Custom(_) => 20,
            CqlValue::List(_) => 21,
            CqlValue::Set(_) => 22,
            CqlValue::Map(_) => 23,
            CqlValue::Tuple(_) => 24,
            CqlValue::UserType(_) => 25,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            CqlValue::Ascii(s) | CqlValue::Varchar(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for CqlValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CqlValue {}

impl PartialOrd for CqlValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CqlValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CqlValue::*;

        if let (Some(a), Some(b)) = (self.as_text(), other.as_text()) {
            return a.cmp(b);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Tinyint(a), Tinyint(b)) => a.cmp(b),
            (Smallint(a), Smallint(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Bigint(a), Bigint(b)) | (Counter(a), Counter(b)) => a.cmp(b),
            (Varint(a), Varint(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.cmp(b),
            (Double(a), Double(b)) => a.cmp(b),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (Blob(a), Blob(b)) => a.cmp(b),
            (Uuid(a), Uuid(b)) => a.cmp(b),
            (Timeuuid(a), Timeuuid(b)) => a.cmp(b),
            (Inet(a), Inet(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Duration(a), Duration(b)) => a.cmp(b),
            (Custom(a), Custom(b)) => a.cmp(b),
            (List(a), List(b)) => a.cmp(b),
            (Set(a), Set(b)) => a.cmp(b),
            (Map(a), Map(b)) => a.cmp(b),
            (Tuple(a), Tuple(b)) => a.cmp(b),
            (UserType(a), UserType(b)) => a.cmp(b),
            // Different kinds: deterministic, arbitrary direction.
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl Hash for CqlValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use CqlValue::*;

        self.kind_rank().hash(state);
        match self {
            Null => {}
            Boolean(b) => b.hash(state),
            Tinyint(v) => v.hash(state),
            Smallint(v) => v.hash(state),
            Int(v) => v.hash(state),
            Bigint(v) | Counter(v) => v.hash(state),
            Varint(v) => v.hash(state),
            Float(v) => v.hash(state),
            Double(v) => v.hash(state),
            Decimal(v) => v.hash(state),
            Ascii(s) | Varchar(s) => s.hash(state),
            Blob(v) => v.hash(state),
            Uuid(v) => v.hash(state),
            Timeuuid(v) => v.hash(state),
            Inet(v) => v.hash(state),
            Date(v) => v.hash(state),
            Time(v) => v.hash(state),
            Timestamp(v) => v.hash(state),
            Duration(v) => v.hash(state),
            Custom(b) => b.hash(state),
            List(v) => v.hash(state),
            Set(v) => v.hash(state),
            Map(v) => v.hash(state),
            Tuple(v) => v.hash(state),
            UserType(v) => v.hash(state),
        }
    }
}

impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlValue::Null => write!(f, "null"),
            CqlValue::Boolean(b) => write!(f, "{}", b),
            CqlValue::Tinyint(v) => write!(f, "{}", v),
            CqlValue::Smallint(v) => write!(f, "{}", v),
            CqlValue::Int(v) => write!(f, "{}", v),
            CqlValue::Bigint(v) | CqlValue::Counter(v) => write!(f, "{}", v),
            CqlValue::Varint(v) => write!(f, "{}", v),
            CqlValue::Float(v) => write!(f, "{}", v),
            CqlValue::Double(v) => write!(f, "{}", v),
            CqlValue::Decimal(v) => write!(f, "{}", v),
            CqlValue::Ascii(s) | CqlValue::Varchar(s) => write!(f, "{}", s),
            CqlValue::Blob(v) => write!(f, "{}", v),
            CqlValue::Uuid(v) => write!(f, "{}", v),
            CqlValue::Timeuuid(v) => write!(f, "{}", v),
            CqlValue::Inet(v) => write!(f, "{}", v),
            CqlValue::Date(v) => write!(f, "{}", v),
            CqlValue::Time(v) => write!(f, "{}", v),
            CqlValue::Timestamp(v) => write!(f, "{}", v),
            CqlValue::Duration(v) => write!(f, "{}", v),
            CqlValue::Custom(bytes) => {
                write!(f, "0x")?;
                for byte in bytes.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            CqlValue::List(v) => {
                write!(f, "[")?;
                for (i, value) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            CqlValue::Set(v) => {
                write!(f, "{{")?;
                for (i, value) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "}}")
            }
            CqlValue::Map(v) => {
                write!(f, "{{")?;
                for (i, (key, value)) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            CqlValue::Tuple(v) => {
                write!(f, "(")?;
                for (i, slot) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match slot {
                        Some(value) => write!(f, "{}", value)?,
                        None => write!(f, "null")?,
                    }
                }
                write!(f, ")")
            }
            CqlValue::UserType(v) => {
                write!(f, "{{")?;
                for (i, (name, slot)) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match slot {
                        Some(value) => write!(f, "{}: {}", name, value)?,
                        None => write!(f, "{}: null", name)?,
                    }
                }
                write!(f, "}}")
            }
        }
    }
}
