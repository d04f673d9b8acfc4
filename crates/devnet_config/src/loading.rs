//! Loads a typed config from a flattened param map, as produced by
//! [`SerializeConfig::dump`](crate::dumping::SerializeConfig::dump).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ConfigError, ParamPath, SerializedParam, FIELD_SEPARATOR, IS_NONE_MARK};

/// Deserializes a config from a map of flattened param paths to their values.
/// Params flagged with a true "#is_none" are deserialized to `None`.
pub fn load<T: DeserializeOwned>(
    config_dump: &BTreeMap<ParamPath, Value>,
) -> Result<T, ConfigError> {
    let mut nested = Value::Object(Map::new());
    let mut none_params = Vec::new();

    for (param_path, value) in config_dump {
        if let Some(optional_param) =
            param_path.strip_suffix(&format!("{FIELD_SEPARATOR}{IS_NONE_MARK}"))
        {
            if value == &Value::Bool(true) {
                none_params.push(optional_param);
            }
            continue;
        }
        insert_nested(&mut nested, param_path, value.clone())?;
    }

    for optional_param in none_params {
        insert_nested(&mut nested, optional_param, Value::Null)?;
    }

    Ok(serde_json::from_value(nested)?)
}

/// Keeps only the values of a dumped config map.
pub fn dumped_values(
    config_dump: &BTreeMap<ParamPath, SerializedParam>,
) -> BTreeMap<ParamPath, Value> {
    config_dump.iter().map(|(path, param)| (path.clone(), param.value.clone())).collect()
}

/// Reads a config file written by
/// [`SerializeConfig::dump_to_file`](crate::dumping::SerializeConfig::dump_to_file) and
/// deserializes it.
pub fn load_from_file<T: DeserializeOwned>(file_path: &Path) -> Result<T, ConfigError> {
    let reader = BufReader::new(File::open(file_path)?);
    let raw: BTreeMap<ParamPath, Value> = serde_json::from_reader(reader)?;
    let values = raw
        .into_iter()
        .map(|(param_path, mut param)| match param.get_mut("value") {
            Some(value) => Ok((param_path, value.take())),
            None => Err(ConfigError::MissingValue { param_path }),
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    load(&values)
}

fn insert_nested(root: &mut Value, param_path: &str, value: Value) -> Result<(), ConfigError> {
    let mut current = root;
    let mut traversed: Vec<&str> = Vec::new();
    let mut segments = param_path.split(FIELD_SEPARATOR).peekable();

    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else {
            return Err(ConfigError::ConflictingParamPath {
                param_path: param_path.to_owned(),
                conflicting_path: traversed.join(FIELD_SEPARATOR),
            });
        };
        traversed.push(segment);
        if segments.peek().is_none() {
            map.insert(segment.to_owned(), value);
            return Ok(());
        }
        current = map.entry(segment).or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(())
}
