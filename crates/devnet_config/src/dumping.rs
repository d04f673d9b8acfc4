//! Flattening typed configs into a [`ParamPath`] → [`SerializedParam`] map.
//!
//! An optional param is dumped as two entries: its value (or a placeholder default when `None`)
//! and a boolean `<name>.#is_none` flag telling the loader which of the two to use.

use std::collections::BTreeMap;
use std::path::Path;

use devnet_infra_utils::dumping::serialize_to_file;
use serde::Serialize;
use serde_json::json;

use crate::{ConfigError, ParamPath, ParamPrivacy, SerializedParam, FIELD_SEPARATOR, IS_NONE_MARK};

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub type ConfigDump = BTreeMap<ParamPath, SerializedParam>;

/// A config that can be flattened into a [`ConfigDump`].
pub trait SerializeConfig {
    fn dump(&self) -> ConfigDump;

    /// Writes [`SerializeConfig::dump`] to `file_path` as pretty JSON, creating parent
    /// directories as needed.
    fn dump_to_file(&self, file_path: &Path) -> Result<(), ConfigError> {
        Ok(serialize_to_file(&self.dump(), file_path)?)
    }
}

/// Nests a sub-config dump under `sub_config_name`, which must be the name of the field holding
/// the sub-config for the dump to load back.
pub fn prepend_sub_config_name(sub_config_dump: ConfigDump, sub_config_name: &str) -> ConfigDump {
    sub_config_dump
        .into_iter()
        .map(|(path, param)| (format!("{sub_config_name}{FIELD_SEPARATOR}{path}"), param))
        .collect()
}

pub fn ser_param<T: Serialize>(
    name: &str,
    value: &T,
    description: &str,
    privacy: ParamPrivacy,
) -> (ParamPath, SerializedParam) {
    let description = description.to_owned();
    (name.to_owned(), SerializedParam { description, value: json!(value), privacy })
}

/// Dumps `optional_param`, falling back to `default_value` as a placeholder, together with its
/// `#is_none` flag.
pub fn ser_optional_param<T: Serialize>(
    optional_param: &Option<T>,
    default_value: T,
    name: &str,
    description: &str,
    privacy: ParamPrivacy,
) -> ConfigDump {
    let is_none_flag = ser_param(
        &format!("{name}{FIELD_SEPARATOR}{IS_NONE_MARK}"),
        &optional_param.is_none(),
        "Flag for an optional field.",
        ParamPrivacy::Public,
    );
    let value = optional_param.as_ref().unwrap_or(&default_value);
    BTreeMap::from([is_none_flag, ser_param(name, value, description, privacy)])
}
