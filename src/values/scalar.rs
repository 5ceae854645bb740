//! Scalar payload wrappers: blobs, inet addresses, and time-based UUIDs.

use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

/// CQL `blob`: an arbitrary byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Blob(Bytes);

impl Blob {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Parses the `0x...` hex rendering back into bytes.
    pub fn from_hex(s: &str) -> Result<Self> {
        fn nibble(b: u8) -> Option<u8> {
            match b {
                b'0'..=b'9' => Some(b - b'0'),
                b'a'..=b'f' => Some(b - b'a' + 10),
                b'A'..=b'F' => Some(b - b'A' + 10),
                _ => None,
            }
        }
        let hex = s.strip_prefix("0x").unwrap_or(s).as_bytes();
        if hex.len() % 2 != 0 {
            return Err(Error::invalid_argument(format!(
                "Invalid hex string \"{}\"",
                s
            )));
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for pair in hex.chunks(2) {
            let byte = nibble(pair[0])
                .zip(nibble(pair[1]))
                .map(|(hi, lo)| (hi << 4) | lo)
                .ok_or_else(|| {
                    Error::invalid_argument(format!("Invalid hex string \"{}\"", s))
                })?;
            bytes.push(byte);
        }
        Ok(Self(Bytes::from(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// CQL `inet`: an IPv4 or IPv6 address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Inet(IpAddr);

impl Inet {
    pub fn new(addr: IpAddr) -> Self {
        Self(addr)
    }

    pub fn addr(&self) -> IpAddr {
        self.0
    }

    /// Raw network-order address bytes, 4 for IPv4 or 16 for IPv6.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.0 {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }
}

impl FromStr for Inet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<IpAddr>().map(Self).map_err(|_| {
            Error::invalid_argument(format!("Invalid ip address \"{}\"", s))
        })
    }
}

impl fmt::Display for Inet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CQL `timeuuid`: a version-1 UUID carrying a 60-bit timestamp.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timeuuid(Uuid);

/// Offset between the UUID epoch (1582-10-15) and the Unix epoch, in 100 ns
/// ticks.
const UUID_EPOCH_OFFSET_TICKS: u64 = 0x01B2_1DD2_1381_4000;

impl Timeuuid {
    /// Wraps a UUID, rejecting anything that is not version 1.
    pub fn new(uuid: Uuid) -> Result<Self> {
        if uuid.get_version_num() != 1 {
            return Err(Error::invalid_argument(format!(
                "Not a timeuuid, version {} given",
                uuid.get_version_num()
            )));
        }
        Ok(Self(uuid))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// The embedded timestamp as seconds since the Unix epoch.
    pub fn time(&self) -> i64 {
        (self.ticks() / 10_000_000) as i64
    }

    /// The embedded timestamp as milliseconds since the Unix epoch.
    pub fn time_millis(&self) -> i64 {
        (self.ticks() / 10_000) as i64
    }

    /// 100 ns ticks since the Unix epoch, reassembled from the UUID's
    /// time_low/time_mid/time_hi fields.
    fn ticks(&self) -> u64 {
        let (time_low, time_mid, time_hi_and_version, _) = self.0.as_fields();
        let ticks = ((time_hi_and_version as u64 & 0x0FFF) << 48)
            | ((time_mid as u64) << 32)
            | time_low as u64;
        ticks.wrapping_sub(UUID_EPOCH_OFFSET_TICKS)
    }
}

impl FromStr for Timeuuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(s)
            .map_err(|_| Error::invalid_argument(format!("Invalid uuid \"{}\"", s)))?;
        Self::new(uuid)
    }
}

impl fmt::Display for Timeuuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
