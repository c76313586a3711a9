//! Serde helpers for encoding curve points and scalars as hex strings.
//!
//! Grounded on the teacher's `crypto_serde` module, which does the same for
//! a generic `CurveGroup`; here it is specialized to the one fixed curve
//! Solidus uses, since on-wire JSON (demo tooling, ledger entries) wants a
//! stable hex form rather than raw bytes.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serializer};

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::curve::{decode_point, encode_point, Point, Scalar};

pub mod point {
    use super::*;

    pub fn serialize<S>(value: &Point, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(encode_point(value)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Point, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(DeError::custom)?;
        decode_point(&bytes).ok_or_else(|| DeError::custom("invalid curve point encoding"))
    }
}

pub mod scalar {
    use super::*;

    pub fn serialize<S>(value: &Scalar, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut buf = Vec::new();
        value
            .serialize_compressed(&mut buf)
            .map_err(|e| serde::ser::Error::custom(e.to_string()))?;
        serializer.serialize_str(&hex::encode(buf))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Scalar, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(DeError::custom)?;
        Scalar::deserialize_compressed(&bytes[..]).map_err(|e| DeError::custom(e.to_string()))
    }
}
