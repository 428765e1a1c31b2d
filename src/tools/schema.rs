//! Typed parameter lists for tools.
//!
//! A [`ToolSchema`] renders to the JSON schema advertised by `tools/list` and
//! checks call arguments before any provider work happens.

use serde_json::{json, Map, Value};

use crate::error::{Neo3Error, Result};

pub const NETWORK_PARAM: &str = "network";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    /// `true`/`false`, also accepting `0`/`1` as sent by many agent runtimes
    Flag,
    Array,
}

impl ParamKind {
    fn json_type(&self) -> Value {
        match self {
            ParamKind::String => json!("string"),
            ParamKind::Integer => json!("integer"),
            ParamKind::Flag => json!(["boolean", "integer"]),
            ParamKind::Array => json!("array"),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_u64() || value.is_i64(),
            ParamKind::Flag => {
                value.is_boolean() || matches!(value.as_u64(), Some(0) | Some(1))
            }
            ParamKind::Array => value.is_array(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ParamKind::String => "a string",
            ParamKind::Integer => "an integer",
            ParamKind::Flag => "a boolean or 0/1",
            ParamKind::Array => "an array",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub allowed: Vec<Value>,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        ParamSpec {
            name,
            kind,
            description,
            required: true,
            allowed: vec![],
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        ParamSpec {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    pub fn one_of(mut self, allowed: Vec<Value>) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    fn to_json(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".to_string(), self.kind.json_type());
        prop.insert("description".to_string(), json!(self.description));
        if !self.allowed.is_empty() {
            prop.insert("enum".to_string(), Value::Array(self.allowed.clone()));
        }
        if let Some(default) = &self.default {
            prop.insert("default".to_string(), default.clone());
        }
        Value::Object(prop)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    params: Vec<ParamSpec>,
}

impl ToolSchema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        ToolSchema { params }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// JSON schema including the shared `network` parameter.
    pub fn to_json_schema(&self, networks: &[&str], default_network: &str) -> Value {
        let mut properties = Map::new();
        let mut required = vec![];

        for param in &self.params {
            properties.insert(param.name.to_string(), param.to_json());
            if param.required {
                required.push(json!(param.name));
            }
        }

        properties.insert(
            NETWORK_PARAM.to_string(),
            json!({
                "type": "string",
                "description": "Neo network to query",
                "enum": networks,
                "default": default_network
            }),
        );

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// Checks presence, type and allowed values. `null` counts as absent.
    pub fn validate(&self, args: &Value) -> Result<ToolArgs> {
        let map = match args {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => {
                return Err(Neo3Error::validation(format!(
                    "Tool arguments must be an object, got {}",
                    other
                )))
            }
        };

        for param in &self.params {
            match map.get(param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(Neo3Error::validation(format!(
                            "Missing required parameter '{}'",
                            param.name
                        )));
                    }
                }
                Some(value) => {
                    if !param.kind.accepts(value) {
                        return Err(Neo3Error::validation(format!(
                            "Parameter '{}' must be {}, got {}",
                            param.name,
                            param.kind.name(),
                            value
                        )));
                    }
                    if !param.allowed.is_empty() && !param.allowed.contains(value) {
                        return Err(Neo3Error::validation(format!(
                            "Parameter '{}' must be one of {}, got {}",
                            param.name,
                            Value::Array(param.allowed.clone()),
                            value
                        )));
                    }
                }
            }
        }

        if let Some(network) = map.get(NETWORK_PARAM) {
            if !network.is_null() && !network.is_string() {
                return Err(Neo3Error::validation(format!(
                    "Parameter '{}' must be a string, got {}",
                    NETWORK_PARAM, network
                )));
            }
        }

        Ok(ToolArgs { values: map })
    }
}

/// Arguments that passed [`ToolSchema::validate`].
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.opt_str(name)
            .ok_or_else(|| Neo3Error::validation(format!("Missing required parameter '{}'", name)))
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn opt_u64(&self, name: &str) -> Result<Option<u64>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                Neo3Error::validation(format!(
                    "Parameter '{}' must be a non-negative integer, got {}",
                    name, value
                ))
            }),
        }
    }

    pub fn u32(&self, name: &str) -> Result<u32> {
        let value = self
            .opt_u64(name)?
            .ok_or_else(|| Neo3Error::validation(format!("Missing required parameter '{}'", name)))?;
        u32::try_from(value).map_err(|_| {
            Neo3Error::validation(format!("Parameter '{}' is out of range: {}", name, value))
        })
    }

    pub fn flag(&self, name: &str) -> bool {
        match self.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(v) => v.as_u64() == Some(1),
            None => false,
        }
    }

    pub fn array(&self, name: &str) -> &[Value] {
        self.get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
