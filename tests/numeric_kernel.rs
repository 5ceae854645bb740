//! Integration tests for the numeric kernel
//!
//! Tests cover:
//! - Domain validation and range error wording per fixed-width type
//! - Overflow-checked arithmetic across the operation set
//! - Divide/modulo by zero as a distinct error kind
//! - Arbitrary-precision varint and decimal behavior
//! - Narrowing conversions between kernel types

use cql_values::{Bigint, Decimal, Double, Error, Float, Int, Smallint, Tinyint, Varint};

/// Each width rejects the first value outside its domain and names the
/// bounds in the message.
#[test]
fn test_domain_bounds_per_width() {
    assert_eq!(
        Tinyint::new(128).unwrap_err(),
        Error::RangeError("value must be between -128 and 127, 128 given".into())
    );
    assert_eq!(
        Smallint::new(-32_769).unwrap_err(),
        Error::RangeError("value must be between -32768 and 32767, -32769 given".into())
    );
    assert_eq!(
        Int::new(2_147_483_648).unwrap_err(),
        Error::RangeError(
            "value must be between -2147483648 and 2147483647, 2147483648 given".into()
        )
    );
    assert_eq!(Bigint::new(i64::MIN).unwrap(), Bigint::MIN);
    assert_eq!(Bigint::new(i64::MAX).unwrap(), Bigint::MAX);
}

/// Arithmetic at the domain edges reports overflow instead of wrapping.
#[test]
fn test_overflow_reported_not_wrapped() {
    let one = Int::new(1).unwrap();
    assert_eq!(
        Int::MAX.add(one).unwrap_err(),
        Error::RangeError("Sum is out of range".into())
    );
    assert_eq!(
        Int::MIN.sub(one).unwrap_err(),
        Error::RangeError("Difference is out of range".into())
    );
    let big = Bigint::new(i64::MAX / 2 + 1).unwrap();
    let two = Bigint::new(2).unwrap();
    assert_eq!(
        big.mul(two).unwrap_err(),
        Error::RangeError("Product is out of range".into())
    );
    // MIN / -1 overflows even though the divisor is non-zero.
    let minus_one = Int::new(-1).unwrap();
    assert_eq!(
        Int::MIN.div(minus_one).unwrap_err(),
        Error::RangeError("Quotient is out of range".into())
    );
}

/// Division and modulo by zero are their own error kind, never a range
/// error.
#[test]
fn test_zero_divisors() {
    let seven = Smallint::new(7).unwrap();
    let zero = Smallint::new(0).unwrap();
    assert_eq!(
        seven.div(zero).unwrap_err(),
        Error::DivideByZero("Cannot divide by zero".into())
    );
    assert_eq!(
        seven.rem(zero).unwrap_err(),
        Error::DivideByZero("Cannot modulo by zero".into())
    );
    assert_eq!(
        Varint::new(1).div(&Varint::new(0)).unwrap_err(),
        Error::DivideByZero("Cannot divide by zero".into())
    );
    let one: Decimal = "1".parse().unwrap();
    let zero: Decimal = "0.0".parse().unwrap();
    assert!(matches!(one.div(&zero), Err(Error::DivideByZero(_))));
    assert!(matches!(
        Double::new(1.0).div(Double::new(0.0)),
        Err(Error::DivideByZero(_))
    ));
}

/// Negation and absolute value fail only for the minimum value.
#[test]
fn test_negation_edges() {
    assert_eq!(Int::new(-5).unwrap().neg().unwrap(), Int::new(5).unwrap());
    assert_eq!(
        Int::MIN.neg().unwrap_err(),
        Error::RangeError("Value doesn't exist".into())
    );
    assert_eq!(
        Int::MIN.abs().unwrap_err(),
        Error::RangeError("Value doesn't exist".into())
    );
}

/// Square roots truncate and reject negative operands.
#[test]
fn test_square_roots() {
    assert_eq!(Int::new(26).unwrap().sqrt().unwrap(), Int::new(5).unwrap());
    assert_eq!(
        Int::new(-4).unwrap().sqrt().unwrap_err(),
        Error::RangeError("Cannot take a square root of a negative number".into())
    );
    let nine: Varint = "9".parse().unwrap();
    assert_eq!(nine.sqrt().unwrap(), Varint::new(3));
}

/// Varint arithmetic never overflows; narrowing to i64 fails past the
/// host range.
#[test]
fn test_varint_precision() {
    let max = Varint::new(i64::MAX);
    let beyond = max.add(&Varint::new(1));
    assert_eq!(beyond.to_string(), "9223372036854775808");
    assert_eq!(
        beyond.to_i64().unwrap_err(),
        Error::RangeError("Value is too big".into())
    );
    assert_eq!(beyond.sub(&Varint::new(1)).to_i64().unwrap(), i64::MAX);
}

/// Decimal equality normalizes scale; parts expose the wire decomposition.
#[test]
fn test_decimal_scale() {
    let a: Decimal = "10.00".parse().unwrap();
    let b: Decimal = "10".parse().unwrap();
    assert_eq!(a, b);

    let (unscaled, scale) = "123.45".parse::<Decimal>().unwrap().into_parts();
    assert_eq!(unscaled.to_string(), "12345");
    assert_eq!(scale, 2);
    assert_eq!(Decimal::from_parts(unscaled, scale).to_string(), "123.45");
}

/// String constructors distinguish malformed input from out-of-range
/// input.
#[test]
fn test_string_constructors() {
    assert_eq!("  42 ".parse::<Int>().unwrap(), Int::new(42).unwrap());
    assert!(matches!(
        "9999999999".parse::<Int>(),
        Err(Error::RangeError(_))
    ));
    assert_eq!(
        "four".parse::<Int>().unwrap_err(),
        Error::InvalidArgument("Invalid integer value \"four\"".into())
    );
    assert!(matches!(
        "1.5.2".parse::<Decimal>(),
        Err(Error::InvalidArgument(_))
    ));
}

/// Conversions between kernel widths go through the i64/f64 bridges and
/// enforce the target domain.
#[test]
fn test_narrowing_bridges() {
    let wide = Bigint::new(300).unwrap();
    assert!(matches!(
        Tinyint::new(wide.value()),
        Err(Error::RangeError(_))
    ));
    assert_eq!(Smallint::new(wide.value()).unwrap().value(), 300);

    // Float construction from doubles guards the single-precision range.
    assert!(Float::from_f64(f64::MAX).is_err());
    assert!(Float::from_f64(f64::INFINITY).is_ok());
    assert_eq!(Int::from_f64(-2.99).unwrap().value(), -2);

    // Fractions truncate toward zero on integer narrowing.
    let d: Decimal = "-7.9".parse().unwrap();
    assert_eq!(d.to_i64().unwrap(), -7);
}
