//! Shared error types for the value and type marshalling layer.
//!
//! Every fallible operation in this crate surfaces one of the variants below;
//! there is no silent recovery. A hidden truncation or implicit overflow in a
//! database client is a correctness bug, so range violations, malformed wire
//! data and type mismatches all propagate to the caller.

use thiserror::Error;

/// Main error type for the marshalling layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Wrong host kind, wrong type against a descriptor, out-of-bounds
    /// tuple/collection index, or an undeclared UDT field name. The message
    /// always describes the expected type in human-readable form.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Numeric value outside a type's representable domain: construction out
    /// of range, arithmetic overflow, negation of a minimum fixed-width
    /// value, square root of a negative number, or a narrowing conversion
    /// that does not fit.
    #[error("Range error: {0}")]
    RangeError(String),

    /// Division or modulo by zero. Kept distinct from [`Error::RangeError`]
    /// so callers can special-case it.
    #[error("Divide by zero: {0}")]
    DivideByZero(String),

    /// Malformed or truncated wire data. Fatal for the current value: the
    /// whole decode aborts, never returning a partially populated container.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Creates an InvalidArgument error with a message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a RangeError with a message.
    pub fn range(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Creates a DivideByZero error with a message.
    pub fn divide_by_zero(msg: impl Into<String>) -> Self {
        Self::DivideByZero(msg.into())
    }

    /// Creates a Decode error with a message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::invalid_argument("expected an int").to_string(),
            "Invalid argument: expected an int"
        );
        assert_eq!(
            Error::range("Sum is out of range").to_string(),
            "Range error: Sum is out of range"
        );
        assert_eq!(
            Error::divide_by_zero("Cannot divide by zero").to_string(),
            "Divide by zero: Cannot divide by zero"
        );
        assert_eq!(
            Error::decode("unexpected end of data").to_string(),
            "Decode error: unexpected end of data"
        );
    }
}
