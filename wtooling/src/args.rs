//! JSON argument decoding for tool handlers.
//!
//! Tools receive their arguments as the raw JSON text the model produced.
//! [`parse_args`] decodes straight into a typed struct; the map helpers cover
//! handlers that only need one or two fields.
//!
//! ```rust
//! use serde::Deserialize;
//! use wtooling::{parse_args, parse_json_object, required_string};
//!
//! #[derive(Deserialize)]
//! struct WeatherArgs {
//!     city: String,
//! }
//!
//! let args: WeatherArgs = parse_args(r#"{"city":"Oslo"}"#).expect("typed args");
//! assert_eq!(args.city, "Oslo");
//!
//! let map = parse_json_object(r#"{"query":"rust"}"#).expect("object should parse");
//! assert_eq!(required_string(&map, "query").expect("present"), "rust");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_args<T: DeserializeOwned>(args_json: &str) -> Result<T, ToolError> {
    // Some models send an empty string for tools without parameters.
    let args_json = if args_json.trim().is_empty() {
        "{}"
    } else {
        args_json
    };

    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid arguments: {err}")))
}

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(ToString::to_string)
}

/// Serializes a handler's return value as the JSON text sent back to the model.
pub fn to_output<T: serde::Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string(value)
        .map_err(|err| ToolError::execution(format!("tool output is not serializable: {err}")))
}
