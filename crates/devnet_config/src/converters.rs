//! Utils for serialization and deserialization of config fields into simple types.
//! These conversions let the command line and the dumped config file (which hold only numbers,
//! strings and booleans) express these fields.
//!
//! # example
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::time::Duration;
//!
//! use devnet_config::converters::deserialize_milliseconds_to_duration;
//! use devnet_config::loading::load;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Clone, Deserialize, Debug, PartialEq)]
//! struct DurationConfig {
//!     #[serde(deserialize_with = "deserialize_milliseconds_to_duration")]
//!     dur: Duration,
//! }
//!
//! let dumped_config = BTreeMap::from([("dur".to_owned(), json!(1000))]);
//! let loaded_config = load::<DurationConfig>(&dumped_config).unwrap();
//! assert_eq!(loaded_config.dur.as_secs(), 1);
//! ```

use std::time::Duration;

use serde::ser::Error;
use serde::{Deserialize, Deserializer, Serializer};

/// Deserializes milliseconds to duration object.
pub fn deserialize_milliseconds_to_duration<'de, D>(de: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis: u64 = Deserialize::deserialize(de)?;
    Ok(Duration::from_millis(millis))
}

/// Serializes a duration as a whole number of milliseconds.
pub fn serialize_duration_as_milliseconds<S>(duration: &Duration, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let millis = u64::try_from(duration.as_millis()).map_err(S::Error::custom)?;
    ser.serialize_u64(millis)
}

/// Serializes a list of strings into a single space-separated string.
pub fn serialize_whitespace_separated<S>(list: &[String], ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_str(&list.join(" "))
}

/// Deserializes a whitespace-separated string into a list of strings. Blank input yields an empty
/// list.
pub fn deserialize_whitespace_separated<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: String = Deserialize::deserialize(de)?;
    Ok(raw.split_whitespace().map(str::to_owned).collect())
}
