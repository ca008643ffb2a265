// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Decoding of ABI-shaped JSON values.
//!
//! Decoded event params and contract reads arrive as JSON. Unsigned integers
//! may be JSON numbers, decimal strings or `0x` hex strings, since `uint256`
//! does not fit a JSON number.

use core::fmt;
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::types::address::Address;
use crate::types::id::RoleConstant;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {found}")]
pub struct DecodeError {
    pub expected: &'static str,
    pub found: String,
}

impl DecodeError {
    fn new(expected: &'static str, found: &Value) -> Self {
        Self { expected, found: found.to_string() }
    }
}

/// Parses an unsigned integer. `Ok(None)` means the value is a well-formed
/// integer wider than 128 bits.
fn parse_uint(v: &Value) -> Result<Option<u128>, DecodeError> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .map(|x| Some(x as u128))
            .ok_or_else(|| DecodeError::new("unsigned integer", v)),
        Value::String(s) => {
            if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                let trimmed = digits.trim_start_matches('0');
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(DecodeError::new("hex integer", v));
                }
                if trimmed.is_empty() {
                    return Ok(Some(0));
                }
                if trimmed.len() > 32 {
                    return Ok(None);
                }
                u128::from_str_radix(trimmed, 16)
                    .map(Some)
                    .map_err(|_| DecodeError::new("hex integer", v))
            } else {
                if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
                    return Err(DecodeError::new("decimal integer", v));
                }
                Ok(s.parse::<u128>().ok())
            }
        }
        _ => Err(DecodeError::new("unsigned integer", v)),
    }
}

pub fn decode_u64(v: &Value) -> Result<u64, DecodeError> {
    parse_uint(v)?
        .and_then(|x| u64::try_from(x).ok())
        .ok_or_else(|| DecodeError::new("64-bit unsigned integer", v))
}

/// Timestamps saturate: the `uint256` max "unbounded" sentinel becomes `u64::MAX`.
pub fn decode_timestamp(v: &Value) -> Result<u64, DecodeError> {
    Ok(match parse_uint(v)? {
        Some(x) => u64::try_from(x).unwrap_or(u64::MAX),
        None => u64::MAX,
    })
}

pub fn decode_amount(v: &Value) -> Result<TokenAmount, DecodeError> {
    parse_uint(v)?
        .map(TokenAmount)
        .ok_or_else(|| DecodeError::new("128-bit token amount", v))
}

/// Full-width `uint256`. Values wider than 256 bits are rejected.
pub fn decode_uint256(v: &Value) -> Result<Uint256, DecodeError> {
    let parsed = match v {
        Value::Number(n) => n.as_u64().map(BigUint::from),
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(d) if !d.is_empty() && d.chars().all(|c| c.is_ascii_hexdigit()) => {
                BigUint::parse_bytes(d.as_bytes(), 16)
            }
            Some(_) => None,
            None if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => BigUint::parse_bytes(s.as_bytes(), 10),
            None => None,
        },
        _ => None,
    };
    parsed
        .filter(|n| n.bits() <= Uint256::BITS)
        .map(Uint256)
        .ok_or_else(|| DecodeError::new("uint256", v))
}

pub fn decode_address(v: &Value) -> Result<Address, DecodeError> {
    v.as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DecodeError::new("address", v))
}

pub fn decode_role(v: &Value) -> Result<RoleConstant, DecodeError> {
    v.as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DecodeError::new("bytes32 role", v))
}

/// Token amount in base units. Serialised as a decimal string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(pub u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        decode_amount(&v).map_err(serde::de::Error::custom)
    }
}

/// Unsigned 256-bit integer, such as a registry project number. Serialised
/// as a decimal string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uint256(BigUint);

impl Uint256 {
    pub const BITS: u64 = 256;

    /// Big-endian, left-padded to 32 bytes.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let bytes = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }
}

impl From<u64> for Uint256 {
    fn from(x: u64) -> Self {
        Uint256(BigUint::from(x))
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Uint256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Uint256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        decode_uint256(&v).map_err(serde::de::Error::custom)
    }
}

/// Content pointer as stored on chain: `(protocol, pointer)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPtr {
    pub protocol: u64,
    pub pointer: String,
}

impl MetaPtr {
    /// Accepts `{protocol, pointer}` objects (event params) and
    /// `[protocol, pointer]` tuples (contract reads). `protocol` may be omitted.
    pub fn decode(v: &Value) -> Result<Self, DecodeError> {
        let (protocol, pointer) = match v {
            Value::Object(map) => (map.get("protocol"), map.get("pointer")),
            Value::Array(items) if items.len() == 2 => (items.first(), items.get(1)),
            _ => return Err(DecodeError::new("metadata pointer", v)),
        };
        let protocol = match protocol {
            Some(p) => decode_u64(p)?,
            None => 0,
        };
        let pointer = pointer
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::new("metadata pointer string", v))?;
        Ok(MetaPtr { protocol, pointer: pointer.to_string() })
    }

    pub fn is_empty(&self) -> bool {
        self.pointer.is_empty()
    }
}
