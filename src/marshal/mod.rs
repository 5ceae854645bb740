//! Wire marshaller: native-protocol value bodies to [`CqlValue`] and back.
//!
//! [`decode`] takes the raw body of a single column value (already framed by
//! the outer protocol layer) together with the column's type descriptor and
//! produces a fully validated value object. Any malformed payload aborts the
//! whole decode; there are no partial results. [`encode`] is the inverse and
//! produces the body bytes the server would accept.
//!
//! Layout summary: fixed-width scalars are big-endian two's complement,
//! `date` is an unsigned 32-bit day count centered on 2^31, `varint` and the
//! unscaled part of `decimal` are variable-length big-endian two's
//! complement, `duration` is three zigzag vints, and collections nest
//! `[int32 length][bytes]` frames.

pub mod reader;

use crate::error::{Error, Result};
use crate::types::CqlType;
use crate::values::{
    Bigint, Blob, CqlValue, Date, Decimal, Double, Duration, Float, Inet, Int, List, Map, Set,
    Smallint, Time, Timestamp, Timeuuid, Tinyint, Tuple, UserTypeValue, Varint,
};
use bytes::Bytes;
use num_bigint::BigInt;
use num_traits::Zero;
use reader::{write_vint, Reader};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

/// The wire value for `date` day zero (1970-01-01).
const DATE_EPOCH_OFFSET: i64 = 1 << 31;

/// Decodes one value body against its column type. `None` (wire NULL) maps
/// to [`CqlValue::Null`] for any type.
pub fn decode(raw: Option<&[u8]>, ty: &Arc<CqlType>) -> Result<CqlValue> {
    let bytes = match raw {
        None => return Ok(CqlValue::Null),
        Some(bytes) => bytes,
    };
    trace!(%ty, len = bytes.len(), "decoding value body");
    decode_bytes(bytes, ty)
}

/// Checks a constructed value against a column type without touching bytes.
pub fn validate(value: &CqlValue, ty: &CqlType) -> Result<()> {
    value.check_type(ty)
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        Error::decode(format!(
            "expected {} byte(s) for {}, {} given",
            N,
            what,
            bytes.len()
        ))
    })
}

fn signed_bigint(bytes: &[u8], what: &str) -> Result<BigInt> {
    if bytes.is_empty() {
        return Err(Error::decode(format!("empty {} payload", what)));
    }
    Ok(BigInt::from_signed_bytes_be(bytes))
}

fn decode_bytes(bytes: &[u8], ty: &Arc<CqlType>) -> Result<CqlValue> {
    match &**ty {
        CqlType::Ascii => {
            if !bytes.is_ascii() {
                return Err(Error::decode("non-ascii byte in ascii value"));
            }
            let s = String::from_utf8(bytes.to_vec()).expect("ascii is valid utf-8");
            Ok(CqlValue::Ascii(s))
        }
        CqlType::Varchar => String::from_utf8(bytes.to_vec())
            .map(CqlValue::Varchar)
            .map_err(|_| Error::decode("invalid utf-8 in varchar value")),
        CqlType::Boolean => Ok(CqlValue::Boolean(fixed::<1>(bytes, "boolean")?[0] != 0)),
        CqlType::Tinyint => {
            let v = fixed::<1>(bytes, "tinyint")?[0] as i8;
            Ok(CqlValue::Tinyint(Tinyint::new(v as i64)?))
        }
        CqlType::Smallint => {
            let v = i16::from_be_bytes(fixed(bytes, "smallint")?);
            Ok(CqlValue::Smallint(Smallint::new(v as i64)?))
        }
        CqlType::Int => {
            let v = i32::from_be_bytes(fixed(bytes, "int")?);
            Ok(CqlValue::Int(Int::new(v as i64)?))
        }
        CqlType::Bigint => {
            let v = i64::from_be_bytes(fixed(bytes, "bigint")?);
            Ok(CqlValue::Bigint(Bigint::new(v)?))
        }
        CqlType::Counter => {
            let v = i64::from_be_bytes(fixed(bytes, "counter")?);
            Ok(CqlValue::Counter(Bigint::new(v)?))
        }
        CqlType::Varint => Ok(CqlValue::Varint(Varint::from_bigint(signed_bigint(
            bytes, "varint",
        )?))),
        CqlType::Float => {
            let v = f32::from_be_bytes(fixed(bytes, "float")?);
            Ok(CqlValue::Float(Float::new(v)))
        }
        CqlType::Double => {
            let v = f64::from_be_bytes(fixed(bytes, "double")?);
            Ok(CqlValue::Double(Double::new(v)))
        }
        CqlType::Decimal => {
            let mut reader = Reader::new(bytes);
            let scale = reader.read_i32()?;
            let unscaled = signed_bigint(reader.read_exact(reader.remaining())?, "decimal")?;
            Ok(CqlValue::Decimal(Decimal::from_parts(
                unscaled,
                scale as i64,
            )))
        }
        CqlType::Blob => Ok(CqlValue::Blob(Blob::new(Bytes::copy_from_slice(bytes)))),
        CqlType::Uuid => Ok(CqlValue::Uuid(Uuid::from_bytes(fixed(bytes, "uuid")?))),
        CqlType::Timeuuid => {
            let uuid = Uuid::from_bytes(fixed(bytes, "timeuuid")?);
            Timeuuid::new(uuid)
                .map(CqlValue::Timeuuid)
                .map_err(|_| Error::decode("timeuuid value is not a version 1 uuid"))
        }
        CqlType::Inet => match bytes.len() {
            4 => Ok(CqlValue::Inet(Inet::new(IpAddr::V4(Ipv4Addr::from(
                fixed::<4>(bytes, "inet")?,
            ))))),
            16 => Ok(CqlValue::Inet(Inet::new(IpAddr::V6(Ipv6Addr::from(
                fixed::<16>(bytes, "inet")?,
            ))))),
            n => Err(Error::decode(format!(
                "expected 4 or 16 bytes for inet, {} given",
                n
            ))),
        },
        CqlType::Date => {
            let raw = u32::from_be_bytes(fixed(bytes, "date")?);
            Ok(CqlValue::Date(Date::new(
                (raw as i64 - DATE_EPOCH_OFFSET) as i32,
            )))
        }
        CqlType::Time => {
            let nanos = i64::from_be_bytes(fixed(bytes, "time")?);
            Time::new(nanos)
                .map(CqlValue::Time)
                .map_err(|_| Error::decode(format!("time value {} out of range", nanos)))
        }
        CqlType::Timestamp => {
            let millis = i64::from_be_bytes(fixed(bytes, "timestamp")?);
            Ok(CqlValue::Timestamp(Timestamp::new(millis)))
        }
        CqlType::Duration => {
            let mut reader = Reader::new(bytes);
            let months = narrow_i32(reader.read_vint()?, "duration months")?;
            let days = narrow_i32(reader.read_vint()?, "duration days")?;
            let nanos = reader.read_vint()?;
            reader.finish()?;
            Duration::new(months, days, nanos)
                .map(CqlValue::Duration)
                .map_err(|_| Error::decode("duration components carry mixed signs"))
        }
        CqlType::Custom(_) => Ok(CqlValue::Custom(Bytes::copy_from_slice(bytes))),
        CqlType::List(element) => {
            let mut reader = Reader::new(bytes);
            let count = element_count(&mut reader)?;
            let mut list = List::with_type(Arc::clone(ty))?;
            for _ in 0..count {
                let frame = require_element(reader.read_frame()?)?;
                list.add(decode_bytes(frame, element)?)?;
            }
            reader.finish()?;
            Ok(CqlValue::List(list))
        }
        CqlType::Set(element) => {
            let mut reader = Reader::new(bytes);
            let count = element_count(&mut reader)?;
            let mut set = Set::with_type(Arc::clone(ty))?;
            for _ in 0..count {
                let frame = require_element(reader.read_frame()?)?;
                set.add(decode_bytes(frame, element)?)?;
            }
            reader.finish()?;
            Ok(CqlValue::Set(set))
        }
        CqlType::Map(key_type, value_type) => {
            let mut reader = Reader::new(bytes);
            let count = element_count(&mut reader)?;
            let mut map = Map::with_type(Arc::clone(ty))?;
            for _ in 0..count {
                let key_frame = require_element(reader.read_frame()?)?;
                let key = decode_bytes(key_frame, key_type)?;
                let value_frame = require_element(reader.read_frame()?)?;
                let value = decode_bytes(value_frame, value_type)?;
                map.set(key, value)?;
            }
            reader.finish()?;
            Ok(CqlValue::Map(map))
        }
        CqlType::Tuple(elements) => {
            let mut reader = Reader::new(bytes);
            let mut tuple = Tuple::new(Arc::clone(ty))?;
            for (index, element) in elements.iter().enumerate() {
                // A short body leaves the trailing slots unset.
                if reader.is_empty() {
                    break;
                }
                if let Some(frame) = reader.read_frame()? {
                    tuple.set(index, decode_bytes(frame, element)?)?;
                }
            }
            reader.finish()?;
            Ok(CqlValue::Tuple(tuple))
        }
        CqlType::UserDefined(udt) => {
            let mut reader = Reader::new(bytes);
            let mut value = UserTypeValue::new(Arc::clone(ty))?;
            for (name, field_type) in udt.fields() {
                if reader.is_empty() {
                    break;
                }
                if let Some(frame) = reader.read_frame()? {
                    value.set(name, decode_bytes(frame, field_type)?)?;
                }
            }
            reader.finish()?;
            Ok(CqlValue::UserType(value))
        }
    }
}

fn narrow_i32(value: i64, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::decode(format!("{} {} out of range", what, value)))
}

fn element_count(reader: &mut Reader<'_>) -> Result<i32> {
    let count = reader.read_i32()?;
    if count < 0 {
        return Err(Error::decode(format!("invalid element count {}", count)));
    }
    Ok(count)
}

fn require_element(frame: Option<&[u8]>) -> Result<&[u8]> {
    frame.ok_or_else(|| Error::decode("null element inside a collection body"))
}

/// Encodes one value into the body bytes [`decode`] accepts. A top-level
/// NULL has no body; the caller writes the outer `-1` frame for it.
pub fn encode(value: &CqlValue) -> Result<Vec<u8>> {
    match value {
        CqlValue::Null => Err(Error::invalid_argument(
            "a null value has no body; encode it as a null frame",
        )),
        CqlValue::Boolean(b) => Ok(vec![*b as u8]),
        CqlValue::Tinyint(v) => Ok((v.value() as i8).to_be_bytes().to_vec()),
        CqlValue::Smallint(v) => Ok((v.value() as i16).to_be_bytes().to_vec()),
        CqlValue::Int(v) => Ok((v.value() as i32).to_be_bytes().to_vec()),
        CqlValue::Bigint(v) | CqlValue::Counter(v) => Ok(v.value().to_be_bytes().to_vec()),
        CqlValue::Varint(v) => Ok(signed_bytes(v.inner())),
        CqlValue::Float(v) => Ok(v.value().to_be_bytes().to_vec()),
        CqlValue::Double(v) => Ok(v.value().to_be_bytes().to_vec()),
        CqlValue::Decimal(v) => {
            let (unscaled, scale) = v.into_parts();
            let scale = i32::try_from(scale)
                .map_err(|_| Error::range("Decimal scale is out of range"))?;
            let mut buf = scale.to_be_bytes().to_vec();
            buf.extend_from_slice(&signed_bytes(&unscaled));
            Ok(buf)
        }
        CqlValue::Ascii(s) | CqlValue::Varchar(s) => Ok(s.as_bytes().to_vec()),
        CqlValue::Blob(b) => Ok(b.as_bytes().to_vec()),
        CqlValue::Uuid(u) => Ok(u.as_bytes().to_vec()),
        CqlValue::Timeuuid(t) => Ok(t.uuid().as_bytes().to_vec()),
        CqlValue::Inet(i) => Ok(i.to_bytes()),
        CqlValue::Date(d) => {
            Ok(((d.days() as i64 + DATE_EPOCH_OFFSET) as u32).to_be_bytes().to_vec())
        }
        CqlValue::Time(t) => Ok(t.nanos().to_be_bytes().to_vec()),
        CqlValue::Timestamp(ts) => Ok(ts.millis().to_be_bytes().to_vec()),
        CqlValue::Duration(d) => {
            let mut buf = Vec::new();
            write_vint(&mut buf, d.months() as i64);
            write_vint(&mut buf, d.days() as i64);
            write_vint(&mut buf, d.nanos());
            Ok(buf)
        }
        CqlValue::Custom(b) => Ok(b.to_vec()),
        CqlValue::List(list) => {
            let mut buf = count_prefix(list.len())?;
            for element in list.iter() {
                write_frame(&mut buf, &encode(element)?)?;
            }
            Ok(buf)
        }
        CqlValue::Set(set) => {
            let mut buf = count_prefix(set.len())?;
            for member in set.iter() {
                write_frame(&mut buf, &encode(member)?)?;
            }
            Ok(buf)
        }
        CqlValue::Map(map) => {
            let mut buf = count_prefix(map.len())?;
            for (key, value) in map.iter() {
                write_frame(&mut buf, &encode(key)?)?;
                write_frame(&mut buf, &encode(value)?)?;
            }
            Ok(buf)
        }
        CqlValue::Tuple(tuple) => {
            let mut buf = Vec::new();
            for slot in tuple.iter() {
                write_slot(&mut buf, slot)?;
            }
            Ok(buf)
        }
        CqlValue::UserType(udt) => {
            let mut buf = Vec::new();
            for (_, slot) in udt.iter() {
                write_slot(&mut buf, slot)?;
            }
            Ok(buf)
        }
    }
}

/// Two's-complement big-endian bytes; zero is the single byte `0x00`.
fn signed_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        vec![0]
    } else {
        value.to_signed_bytes_be()
    }
}

fn count_prefix(len: usize) -> Result<Vec<u8>> {
    let count =
        i32::try_from(len).map_err(|_| Error::range("Collection is too large to encode"))?;
    Ok(count.to_be_bytes().to_vec())
}

fn write_frame(buf: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
    let len =
        i32::try_from(payload.len()).map_err(|_| Error::range("Value is too large to encode"))?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(())
}

/// Unset slots and explicit NULLs both encode as a null frame.
fn write_slot(buf: &mut Vec<u8>, slot: Option<&CqlValue>) -> Result<()> {
    match slot {
        Some(value) if !value.is_null() => write_frame(buf, &encode(value)?),
        _ => {
            buf.extend_from_slice(&(-1i32).to_be_bytes());
            Ok(())
        }
    }
}
