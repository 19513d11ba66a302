//! Launch-command compilation from configuration settings
//!
//! Maps `clangd.*` settings onto command-line flags, in settings order:
//! `null` and `false` omit the flag entirely (the server's own default wins),
//! `true` emits a bare flag, strings and integers emit `--<arg>=<value>`.
//! The result always replaces any previously built command so repeated server
//! restarts cannot accumulate duplicate flags.

use crate::config::SETTING_PREFIX;
use crate::errors::ManagerError;
use serde_json::{Map, Value};

/// Settings whose flag is not the generic `--<key>` derivation
const SETTING_TO_ARGUMENT: &[(&str, &str)] = &[("number-workers", "-j")];

/// Returns the command argument for a `clangd.*` settings key
pub fn argument_for_setting(settings_key: &str) -> String {
    let key = settings_key
        .strip_prefix(SETTING_PREFIX)
        .unwrap_or(settings_key);
    SETTING_TO_ARGUMENT
        .iter()
        .find(|(setting, _)| *setting == key)
        .map(|(_, argument)| (*argument).to_string())
        .unwrap_or_else(|| format!("--{}", key))
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_i64() || number.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compile the full launch command from a base command and a settings snapshot.
///
/// The settings map iterates in configuration order; flags are appended in
/// that order after `base_command`. Value types outside {null, boolean,
/// string, integer} fail with [`ManagerError::UnsupportedValueType`] naming
/// the offending key.
pub fn compile(
    base_command: &[String],
    settings: &Map<String, Value>,
) -> Result<Vec<String>, ManagerError> {
    let mut command: Vec<String> = base_command.to_vec();
    for (settings_key, value) in settings {
        match value {
            // None and false: let the server use its own default.
            Value::Null | Value::Bool(false) => continue,
            Value::Bool(true) => command.push(argument_for_setting(settings_key)),
            Value::String(text) => {
                command.push(format!("{}={}", argument_for_setting(settings_key), text))
            }
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                command.push(format!("{}={}", argument_for_setting(settings_key), number))
            }
            unsupported => {
                return Err(ManagerError::UnsupportedValueType {
                    key: settings_key.clone(),
                    type_name: value_type_name(unsupported).to_string(),
                })
            }
        }
    }
    Ok(command)
}
