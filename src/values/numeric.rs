//! Numeric Kernel: overflow-checked fixed-width integers and
//! arbitrary-precision integer/decimal arithmetic.
//!
//! The four fixed-width types ([`Tinyint`], [`Smallint`], [`Int`],
//! [`Bigint`]) validate every constructor input against their domain and
//! surface arithmetic overflow as [`Error::RangeError`] instead of wrapping.
//! Arithmetic is only defined between two values of the same concrete type;
//! cross-type promotion does not exist, which the operand signatures enforce
//! at compile time.
//!
//! [`Varint`] and [`Decimal`] delegate to `num-bigint` / `bigdecimal` and
//! only fail on zero divisors, negative square roots, malformed input
//! strings, and narrowing conversions that do not fit.

use crate::error::{Error, Result};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{Signed, ToPrimitive, Zero};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

macro_rules! fixed_width_numeric {
    ($(#[$doc:meta])* $name:ident, $prim:ty) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name($prim);

        impl $name {
            /// Minimum representable value.
            pub const MIN: $name = $name(<$prim>::MIN);
            /// Maximum representable value.
            pub const MAX: $name = $name(<$prim>::MAX);

            /// Constructs from a host integer, failing with a range error if
            /// the value does not fit this type's domain.
            pub fn new(value: i64) -> Result<Self> {
                if value < <$prim>::MIN as i64 || value > <$prim>::MAX as i64 {
                    return Err(Error::range(format!(
                        "value must be between {} and {}, {} given",
                        <$prim>::MIN,
                        <$prim>::MAX,
                        value
                    )));
                }
                Ok(Self(value as $prim))
            }

            /// Constructs from a host float. The fractional part is
            /// truncated, matching host integer-cast semantics.
            pub fn from_f64(value: f64) -> Result<Self> {
                let truncated = value.trunc();
                if !truncated.is_finite()
                    || truncated < <$prim>::MIN as f64
                    || truncated > <$prim>::MAX as f64
                {
                    return Err(Error::range(format!(
                        "value must be between {} and {}, {} given",
                        <$prim>::MIN,
                        <$prim>::MAX,
                        value
                    )));
                }
                Ok(Self(truncated as $prim))
            }

            /// The raw payload widened to i64.
            pub fn value(&self) -> i64 {
                self.0 as i64
            }

            /// Conversion to a host double. Always representable.
            pub fn to_f64(&self) -> f64 {
                self.0 as f64
            }

            pub fn add(&self, addend: $name) -> Result<Self> {
                self.0
                    .checked_add(addend.0)
                    .map(Self)
                    .ok_or_else(|| Error::range("Sum is out of range"))
            }

            pub fn sub(&self, subtrahend: $name) -> Result<Self> {
                self.0
                    .checked_sub(subtrahend.0)
                    .map(Self)
                    .ok_or_else(|| Error::range("Difference is out of range"))
            }

            pub fn mul(&self, multiplier: $name) -> Result<Self> {
                self.0
                    .checked_mul(multiplier.0)
                    .map(Self)
                    .ok_or_else(|| Error::range("Product is out of range"))
            }

            pub fn div(&self, divisor: $name) -> Result<Self> {
                if divisor.0 == 0 {
                    return Err(Error::divide_by_zero("Cannot divide by zero"));
                }
                // MIN / -1 is the one non-zero divisor that still overflows.
                self.0
                    .checked_div(divisor.0)
                    .map(Self)
                    .ok_or_else(|| Error::range("Quotient is out of range"))
            }

            pub fn rem(&self, divisor: $name) -> Result<Self> {
                if divisor.0 == 0 {
                    return Err(Error::divide_by_zero("Cannot modulo by zero"));
                }
                self.0
                    .checked_rem(divisor.0)
                    .map(Self)
                    .ok_or_else(|| Error::range("Remainder is out of range"))
            }

            /// Negation. The minimum value has no representable negation.
            pub fn neg(&self) -> Result<Self> {
                self.0
                    .checked_neg()
                    .map(Self)
                    .ok_or_else(|| Error::range("Value doesn't exist"))
            }

            /// Absolute value. The minimum value has no representable
            /// absolute value.
            pub fn abs(&self) -> Result<Self> {
                self.0
                    .checked_abs()
                    .map(Self)
                    .ok_or_else(|| Error::range("Value doesn't exist"))
            }

            /// Integer square root, truncated. Exact for the full domain;
            /// a float round trip would drift past 2^53.
            pub fn sqrt(&self) -> Result<Self> {
                if self.0 < 0 {
                    return Err(Error::range(
                        "Cannot take a square root of a negative number",
                    ));
                }
                Ok(Self(Roots::sqrt(&self.0)))
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().parse::<i64>() {
                    Ok(value) => Self::new(value),
                    Err(e)
                        if matches!(
                            e.kind(),
                            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                        ) =>
                    {
                        Err(Error::range(format!(
                            "value must be between {} and {}, {} given",
                            <$prim>::MIN,
                            <$prim>::MAX,
                            s
                        )))
                    }
                    Err(_) => Err(Error::invalid_argument(format!(
                        "Invalid integer value \"{}\"",
                        s
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

fixed_width_numeric!(
    /// CQL `tinyint`: 8-bit signed integer in [-128, 127].
    Tinyint,
    i8
);
fixed_width_numeric!(
    /// CQL `smallint`: 16-bit signed integer.
    Smallint,
    i16
);
fixed_width_numeric!(
    /// CQL `int`: 32-bit signed integer.
    Int,
    i32
);
fixed_width_numeric!(
    /// CQL `bigint`: 64-bit signed integer. Also the payload of `counter`
    /// columns.
    Bigint,
    i64
);

/// CQL `varint`: arbitrary-precision signed integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Varint(BigInt);

impl Varint {
    pub fn new(value: i64) -> Self {
        Self(BigInt::from(value))
    }

    pub fn from_bigint(value: BigInt) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &BigInt {
        &self.0
    }

    pub fn add(&self, addend: &Varint) -> Varint {
        Self(&self.0 + &addend.0)
    }

    pub fn sub(&self, subtrahend: &Varint) -> Varint {
        Self(&self.0 - &subtrahend.0)
    }

    pub fn mul(&self, multiplier: &Varint) -> Varint {
        Self(&self.0 * &multiplier.0)
    }

    pub fn div(&self, divisor: &Varint) -> Result<Varint> {
        if divisor.0.is_zero() {
            return Err(Error::divide_by_zero("Cannot divide by zero"));
        }
        Ok(Self(&self.0 / &divisor.0))
    }

    pub fn rem(&self, divisor: &Varint) -> Result<Varint> {
        if divisor.0.is_zero() {
            return Err(Error::divide_by_zero("Cannot modulo by zero"));
        }
        Ok(Self(&self.0 % &divisor.0))
    }

    pub fn neg(&self) -> Varint {
        Self(-&self.0)
    }

    pub fn abs(&self) -> Varint {
        Self(self.0.abs())
    }

    /// Integer square root, truncated.
    pub fn sqrt(&self) -> Result<Varint> {
        if self.0.is_negative() {
            return Err(Error::range(
                "Cannot take a square root of a negative number",
            ));
        }
        Ok(Self(self.0.sqrt()))
    }

    /// Narrowing conversion to a host integer.
    pub fn to_i64(&self) -> Result<i64> {
        self.0
            .to_i64()
            .ok_or_else(|| Error::range("Value is too big"))
    }

    /// Conversion to a host double; fails when the magnitude exceeds the
    /// double's finite range.
    pub fn to_f64(&self) -> Result<f64> {
        match self.0.to_f64() {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(Error::range("Value is too big")),
        }
    }
}

impl FromStr for Varint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<BigInt>()
            .map(Self)
            .map_err(|_| Error::invalid_argument(format!("Invalid integer value \"{}\"", s)))
    }
}

impl fmt::Display for Varint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CQL `decimal`: arbitrary-precision decimal, an (unscaled varint, scale)
/// pair. Equality and ordering normalize scale before comparing, so
/// `1.10 == 1.1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Decimal(BigDecimal);

impl Decimal {
    /// Builds from an unscaled integer and a scale, mirroring the wire
    /// representation.
    pub fn from_parts(unscaled: BigInt, scale: i64) -> Self {
        Self(BigDecimal::new(unscaled, scale))
    }

    pub fn from_f64(value: f64) -> Result<Self> {
        BigDecimal::try_from(value)
            .map(Self)
            .map_err(|_| Error::invalid_argument(format!("Invalid decimal value \"{}\"", value)))
    }

    pub fn inner(&self) -> &BigDecimal {
        &self.0
    }

    /// The (unscaled integer, scale) pair of this decimal.
    pub fn into_parts(&self) -> (BigInt, i64) {
        self.0.as_bigint_and_exponent()
    }

    pub fn add(&self, addend: &Decimal) -> Decimal {
        Self(&self.0 + &addend.0)
    }

    pub fn sub(&self, subtrahend: &Decimal) -> Decimal {
        Self(&self.0 - &subtrahend.0)
    }

    pub fn mul(&self, multiplier: &Decimal) -> Decimal {
        Self(&self.0 * &multiplier.0)
    }

    pub fn div(&self, divisor: &Decimal) -> Result<Decimal> {
        if divisor.0.is_zero() {
            return Err(Error::divide_by_zero("Cannot divide by zero"));
        }
        Ok(Self(&self.0 / &divisor.0))
    }

    pub fn rem(&self, divisor: &Decimal) -> Result<Decimal> {
        if divisor.0.is_zero() {
            return Err(Error::divide_by_zero("Cannot modulo by zero"));
        }
        Ok(Self(&self.0 % &divisor.0))
    }

    pub fn neg(&self) -> Decimal {
        Self(-&self.0)
    }

    pub fn abs(&self) -> Decimal {
        Self(self.0.abs())
    }

    pub fn sqrt(&self) -> Result<Decimal> {
        self.0
            .sqrt()
            .map(Self)
            .ok_or_else(|| Error::range("Cannot take a square root of a negative number"))
    }

    /// Narrowing conversion to a host integer, truncating the fraction.
    pub fn to_i64(&self) -> Result<i64> {
        self.0
            .with_scale(0)
            .to_i64()
            .ok_or_else(|| Error::range("Value is too big"))
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self.0.to_f64() {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(Error::range("Value is too big")),
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<BigDecimal>()
            .map(Self)
            .map_err(|_| Error::invalid_argument(format!("Invalid decimal value \"{}\"", s)))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! float_numeric {
    ($(#[$doc:meta])* $name:ident, $prim:ty) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(OrderedFloat<$prim>);

        impl $name {
            pub fn new(value: $prim) -> Self {
                Self(OrderedFloat(value))
            }

            pub fn value(&self) -> $prim {
                self.0.into_inner()
            }

            pub fn to_f64(&self) -> f64 {
                self.0.into_inner() as f64
            }

            /// Narrowing conversion to a host integer.
            pub fn to_i64(&self) -> Result<i64> {
                let truncated = self.0.into_inner().trunc();
                if !truncated.is_finite()
                    || truncated < i64::MIN as $prim
                    || truncated > i64::MAX as $prim
                {
                    return Err(Error::range("Value is too big"));
                }
                Ok(truncated as i64)
            }

            pub fn add(&self, addend: $name) -> $name {
                Self(self.0 + addend.0)
            }

            pub fn sub(&self, subtrahend: $name) -> $name {
                Self(self.0 - subtrahend.0)
            }

            pub fn mul(&self, multiplier: $name) -> $name {
                Self(self.0 * multiplier.0)
            }

            pub fn div(&self, divisor: $name) -> Result<$name> {
                if divisor.value() == 0.0 {
                    return Err(Error::divide_by_zero("Cannot divide by zero"));
                }
                Ok(Self(self.0 / divisor.0))
            }

            pub fn rem(&self, divisor: $name) -> Result<$name> {
                if divisor.value() == 0.0 {
                    return Err(Error::divide_by_zero("Cannot modulo by zero"));
                }
                Ok(Self(self.0 % divisor.0))
            }

            pub fn neg(&self) -> $name {
                Self(-self.0)
            }

            pub fn abs(&self) -> $name {
                Self(OrderedFloat(self.0.into_inner().abs()))
            }

            pub fn sqrt(&self) -> Result<$name> {
                if self.0.into_inner() < 0.0 {
                    return Err(Error::range(
                        "Cannot take a square root of a negative number",
                    ));
                }
                Ok(Self(OrderedFloat(self.0.into_inner().sqrt())))
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                s.trim()
                    .parse::<$prim>()
                    .map(Self::new)
                    .map_err(|_| {
                        Error::invalid_argument(format!("Invalid float value \"{}\"", s))
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.into_inner())
            }
        }
    };
}

float_numeric!(
    /// CQL `float`: IEEE-754 single precision with a total order (NaN sorts
    /// after every finite value, so floats can serve as map keys).
    Float,
    f32
);
float_numeric!(
    /// CQL `double`: IEEE-754 double precision with a total order.
    Double,
    f64
);

impl Float {
    /// Constructs from a host double, failing when the finite magnitude
    /// exceeds the single-precision range.
    pub fn from_f64(value: f64) -> Result<Self> {
        let narrowed = value as f32;
        if value.is_finite() && narrowed.is_infinite() {
            return Err(Error::range(format!(
                "value must be between {} and {}, {} given",
                f32::MIN,
                f32::MAX,
                value
            )));
        }
        Ok(Self::new(narrowed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_domains() {
        assert_eq!(Tinyint::new(-128).unwrap().value(), -128);
        assert_eq!(Tinyint::new(127).unwrap().value(), 127);
        assert!(Tinyint::new(-129).is_err());
        assert!(Tinyint::new(128).is_err());

        assert_eq!(Smallint::new(-32768).unwrap().value(), -32768);
        assert!(Smallint::new(32768).is_err());
        assert_eq!(Int::new(i32::MAX as i64).unwrap().value(), i32::MAX as i64);
        assert!(Int::new(i32::MAX as i64 + 1).is_err());
        assert_eq!(Bigint::new(i64::MIN).unwrap().value(), i64::MIN);
    }

    #[test]
    fn test_range_error_names_bounds() {
        let err = Tinyint::new(300).unwrap_err();
        assert_eq!(
            err,
            Error::RangeError("value must be between -128 and 127, 300 given".into())
        );
    }

    #[test]
    fn test_overflow_checked_arithmetic() {
        let a = Tinyint::new(100).unwrap();
        let b = Tinyint::new(50).unwrap();
        assert!(matches!(a.add(b), Err(Error::RangeError(m)) if m == "Sum is out of range"));
        assert!(matches!(
            Tinyint::MIN.sub(Tinyint::new(1).unwrap()),
            Err(Error::RangeError(m)) if m == "Difference is out of range"
        ));
        assert!(matches!(
            a.mul(b),
            Err(Error::RangeError(m)) if m == "Product is out of range"
        ));
    }

    #[test]
    fn test_add_sub_round_trip() {
        let a = Smallint::new(1234).unwrap();
        let b = Smallint::new(567).unwrap();
        assert_eq!(a.add(b).unwrap().sub(b).unwrap(), a);
    }

    #[test]
    fn test_divide_by_zero_is_distinct() {
        let five = Tinyint::new(5).unwrap();
        let zero = Tinyint::new(0).unwrap();
        assert!(matches!(five.div(zero), Err(Error::DivideByZero(_))));
        assert!(matches!(five.rem(zero), Err(Error::DivideByZero(_))));
    }

    #[test]
    fn test_min_negation_does_not_exist() {
        assert!(matches!(
            Tinyint::MIN.neg(),
            Err(Error::RangeError(m)) if m == "Value doesn't exist"
        ));
        assert!(matches!(Tinyint::MIN.abs(), Err(Error::RangeError(_))));
        assert_eq!(Tinyint::new(-5).unwrap().abs().unwrap().value(), 5);
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(Int::new(16).unwrap().sqrt().unwrap().value(), 4);
        assert!(Int::new(-1).unwrap().sqrt().is_err());
    }

    #[test]
    fn test_sqrt_truncates_above_double_precision() {
        // 3037000499^2 - 1: its root must truncate down, not round up
        // through a double.
        let n = 3_037_000_499i64 * 3_037_000_499 - 1;
        assert_eq!(Bigint::new(n).unwrap().sqrt().unwrap().value(), 3_037_000_498);
        assert_eq!(
            Bigint::new(n + 1).unwrap().sqrt().unwrap().value(),
            3_037_000_499
        );
        assert_eq!(Bigint::MAX.sqrt().unwrap().value(), 3_037_000_499);
    }

    #[test]
    fn test_string_construction() {
        assert_eq!("42".parse::<Tinyint>().unwrap().value(), 42);
        assert!(matches!("1000".parse::<Tinyint>(), Err(Error::RangeError(_))));
        // A value that overflows i64 entirely still reports a range error.
        assert!(matches!(
            "99999999999999999999".parse::<Tinyint>(),
            Err(Error::RangeError(_))
        ));
        assert!(matches!(
            "pepperoni".parse::<Tinyint>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_f64_truncates() {
        assert_eq!(Int::from_f64(3.9).unwrap().value(), 3);
        assert_eq!(Int::from_f64(-3.9).unwrap().value(), -3);
        assert!(Tinyint::from_f64(1e10).is_err());
    }

    #[test]
    fn test_varint_arithmetic() {
        let big: Varint = "123456789012345678901234567890".parse().unwrap();
        let one = Varint::new(1);
        assert_eq!(
            big.add(&one).sub(&one).inner().to_string(),
            "123456789012345678901234567890"
        );
        assert!(big.to_i64().is_err());
        assert_eq!(Varint::new(144).sqrt().unwrap().inner().to_i64(), Some(12));
        assert!(Varint::new(-1).sqrt().is_err());
        assert!(matches!(
            one.div(&Varint::new(0)),
            Err(Error::DivideByZero(_))
        ));
        assert!("12abc".parse::<Varint>().is_err());
    }

    #[test]
    fn test_decimal_scale_normalization() {
        let a: Decimal = "1.10".parse().unwrap();
        let b: Decimal = "1.1".parse().unwrap();
        assert_eq!(a, b);
        let c: Decimal = "1.11".parse().unwrap();
        assert!(a < c);
    }

    #[test]
    fn test_decimal_parts_and_narrowing() {
        let d = Decimal::from_parts(BigInt::from(12345), 2);
        assert_eq!(d.to_string(), "123.45");
        assert_eq!(d.to_i64().unwrap(), 123);
        let huge: Decimal = "1e100".parse().unwrap();
        assert!(huge.to_i64().is_err());
        assert!("not-a-decimal".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_float_narrowing() {
        assert!(Float::from_f64(1e300).is_err());
        assert_eq!(Float::from_f64(1.5).unwrap().value(), 1.5f32);
        assert!(Double::new(f64::NAN).to_i64().is_err());
        assert_eq!(Double::new(7.9).to_i64().unwrap(), 7);
    }

    #[test]
    fn test_float_total_order() {
        let nan = Double::new(f64::NAN);
        assert_eq!(nan, nan);
        assert!(Double::new(1.0) < Double::new(2.0));
    }
}
