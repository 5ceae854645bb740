//! # cql-values
//!
//! CQL value and type marshalling layer for Cassandra-style wire protocols.
//!
//! This crate provides the client-side data layer between application code and
//! the native protocol: a type descriptor algebra, one host representation per
//! CQL type, an overflow-checked numeric kernel, and the wire marshaller that
//! turns raw value bodies into validated value objects and back.
//!
//! ## Type Descriptors
//!
//! [`CqlType`] describes column types, scalar and composite alike:
//! - Scalars: `int`, `varchar`, `timestamp`, `uuid`, and the rest
//! - `List`/`Set`/`Map`: element and key/value types, shared via `Arc`
//! - `Tuple`: positional element types with fixed arity
//! - `UserDefined`: named fields in declared order
//!
//! ## Value Objects
//!
//! [`CqlValue`] is the tagged union mirroring the descriptor algebra. Every
//! value participates in a single total order and stable hash, so containers
//! can serve as map keys and set members. Collection types validate every
//! insertion against their descriptor and reject NULL where the protocol does.
//!
//! ## Example Usage
//!
//! ```rust
//! use cql_values::{marshal, CqlType, CqlValue, Int};
//! use std::sync::Arc;
//!
//! let ty = Arc::new(CqlType::Int);
//! let value = marshal::decode(Some(&[0, 0, 0, 42]), &ty).unwrap();
//! assert_eq!(value, CqlValue::Int(Int::new(42).unwrap()));
//!
//! // Wire NULL decodes to the dedicated NULL value.
//! assert_eq!(marshal::decode(None, &ty).unwrap(), CqlValue::Null);
//! ```

pub mod error;
pub mod marshal;
pub mod types;
pub mod values;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use types::{CqlType, UdtType};
pub use values::{
    Bigint, Blob, CqlValue, Date, Decimal, Double, Duration, Float, Inet, Int, List, Map, Set,
    Smallint, Time, Timestamp, Timeuuid, Tinyint, Tuple, UserTypeValue, Varint,
};
