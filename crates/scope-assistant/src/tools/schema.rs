//! Typed tool-parameter schemas.
//!
//! Each tool declares its arguments as [`ToolParam`] specs. The registry
//! renders them to the JSON-schema object form the backend consumes and
//! validates incoming argument bags against them before any tool runs.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Integer,
}

impl ParamKind {
    fn json_type(&self) -> &'static str {
        match self {
            ParamKind::Text => "string",
            ParamKind::Integer => "integer",
        }
    }
}

/// One declared tool argument.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ToolParam {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }
}

/// Render parameter specs as a JSON-schema object.
pub fn json_schema(params: &[ToolParam]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in params {
        properties.insert(
            param.name.to_string(),
            serde_json::json!({
                "type": param.kind.json_type(),
                "description": param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.to_string()));
        }
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Validate an argument bag against parameter specs, returning the coerced
/// bag on success or a user-facing validation message on failure.
///
/// Integers are accepted as JSON numbers or as numeric strings, since
/// backends are loose about numeric argument encoding. No tool runs on a
/// bag that fails validation.
pub fn validate_args(params: &[ToolParam], args: &Value) -> Result<Value, String> {
    let bag = match args {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => return Err("Tool arguments must be an object".to_string()),
    };

    let mut coerced = Map::new();
    for param in params {
        let value = match bag.get(param.name) {
            Some(v) if !v.is_null() => v,
            _ if param.required => {
                return Err(format!("Missing required argument '{}'", param.name));
            }
            _ => continue,
        };

        let value = match param.kind {
            ParamKind::Text => match value {
                Value::String(_) => value.clone(),
                other => Value::String(other.to_string()),
            },
            ParamKind::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => value.clone(),
                Value::Number(n) => {
                    // Backends sometimes send integral floats (42.0).
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    if f.fract() == 0.0 && f.is_finite() {
                        Value::from(f as i64)
                    } else {
                        return Err(format!(
                            "Argument '{}' must be a whole number",
                            param.name
                        ));
                    }
                }
                Value::String(s) => match s.trim().parse::<i64>() {
                    Ok(n) => Value::from(n),
                    Err(_) => {
                        return Err(format!("Argument '{}' must be an integer", param.name));
                    }
                },
                _ => return Err(format!("Argument '{}' must be an integer", param.name)),
            },
        };
        coerced.insert(param.name.to_string(), value);
    }

    Ok(Value::Object(coerced))
}
