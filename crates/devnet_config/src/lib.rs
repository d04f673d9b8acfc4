//! Configuration utilities for the devnet compiler components.
//!
//! A config struct is flattened into a map from dotted param paths to a description, a value and
//! a privacy marker:
//!
//! ```json
//! "conf1.conf2.param_name": {
//!     "description": "Param description.",
//!     "value": json_value,
//!     "privacy": "Public"
//! }
//! ```
//!
//! The map can be written to a JSON file ([`dumping::SerializeConfig::dump_to_file`]) and loaded
//! back into the typed config ([`loading::load_from_file`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod converters;
pub mod dumping;
pub mod loading;

/// Separates the names of nested config fields in a param path.
pub const FIELD_SEPARATOR: &str = ".";
/// Suffix of the flag that marks an optional param as `None`.
pub const IS_NONE_MARK: &str = "#is_none";

/// A dotted path to a config param, e.g. `resource_limits.max_cpu_time`.
pub type ParamPath = String;

/// Whether a param value may be printed and shared.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParamPrivacy {
    /// The value is a secret; it must not be logged.
    Private,
    /// The value can be shared freely.
    Public,
}

/// A single dumped config param.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SerializedParam {
    pub description: String,
    pub value: Value,
    pub privacy: ParamPrivacy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    ParseJson(#[from] serde_json::Error),
    #[error(
        "Param path '{param_path}' conflicts with a value already set at '{conflicting_path}'."
    )]
    ConflictingParamPath { param_path: ParamPath, conflicting_path: ParamPath },
    #[error("Param '{param_path}' has no 'value' field.")]
    MissingValue { param_path: ParamPath },
}
