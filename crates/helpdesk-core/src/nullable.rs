//! Serde helper for patch fields that distinguish "absent" from `null`.
//!
//! Used as `#[serde(default, deserialize_with = "nullable::deserialize")]`
//! on an `Option<Option<T>>`: a missing key stays `None`, an explicit `null`
//! becomes `Some(None)`, and a value becomes `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}
