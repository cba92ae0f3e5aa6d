//! Declarative component data
//!
//! Scene files describe components as JSON objects. These helpers pull typed
//! values out of them and turn a missing or malformed key into a
//! [`BehaviorError::Parse`] naming the component and the key.

use serde_json::Value;

use crate::ecs::BehaviorError;
use crate::foundation::math::Vec3;

/// Parse data handed to a component
pub type ParseData = serde_json::Map<String, Value>;

fn parse_error(component: &str, key: &str, problem: impl Into<String>) -> BehaviorError {
    BehaviorError::Parse {
        component: component.to_string(),
        key: key.to_string(),
        problem: problem.into(),
    }
}

fn require<'a>(data: &'a ParseData, key: &str, component: &str) -> Result<&'a Value, BehaviorError> {
    data.get(key).ok_or_else(|| parse_error(component, key, "is missing"))
}

fn as_f32(value: &Value) -> Option<f32> {
    value.as_f64().map(|v| v as f32)
}

/// Required string value
pub fn require_str<'a>(data: &'a ParseData, key: &str, component: &str) -> Result<&'a str, BehaviorError> {
    require(data, key, component)?
        .as_str()
        .ok_or_else(|| parse_error(component, key, "must be a string"))
}

/// Required boolean value
pub fn require_bool(data: &ParseData, key: &str, component: &str) -> Result<bool, BehaviorError> {
    require(data, key, component)?
        .as_bool()
        .ok_or_else(|| parse_error(component, key, "must be a boolean"))
}

/// Required numeric value
pub fn require_f32(data: &ParseData, key: &str, component: &str) -> Result<f32, BehaviorError> {
    as_f32(require(data, key, component)?).ok_or_else(|| parse_error(component, key, "must be a number"))
}

/// Required integer value
pub fn require_i64(data: &ParseData, key: &str, component: &str) -> Result<i64, BehaviorError> {
    require(data, key, component)?
        .as_i64()
        .ok_or_else(|| parse_error(component, key, "must be an integer"))
}

/// Required list of numbers
pub fn require_f32_list(data: &ParseData, key: &str, component: &str) -> Result<Vec<f32>, BehaviorError> {
    require(data, key, component)?
        .as_array()
        .ok_or_else(|| parse_error(component, key, "must be a list of numbers"))?
        .iter()
        .map(|item| as_f32(item).ok_or_else(|| parse_error(component, key, "must only contain numbers")))
        .collect()
}

/// Required vector, written either as `[x, y, z]` or `{"x": .., "y": .., "z": ..}`
pub fn require_vec3(data: &ParseData, key: &str, component: &str) -> Result<Vec3, BehaviorError> {
    let value = require(data, key, component)?;
    let invalid = || parse_error(component, key, "must be [x, y, z] or {x, y, z}");
    match value {
        Value::Array(items) if items.len() == 3 => {
            let x = as_f32(&items[0]).ok_or_else(invalid)?;
            let y = as_f32(&items[1]).ok_or_else(invalid)?;
            let z = as_f32(&items[2]).ok_or_else(invalid)?;
            Ok(Vec3::new(x, y, z))
        }
        Value::Object(fields) => {
            let axis = |name: &str| fields.get(name).and_then(as_f32).ok_or_else(invalid);
            Ok(Vec3::new(axis("x")?, axis("y")?, axis("z")?))
        }
        _ => Err(invalid()),
    }
}

/// Optional string; present with the wrong type is an error
pub fn optional_str<'a>(data: &'a ParseData, key: &str, component: &str) -> Result<Option<&'a str>, BehaviorError> {
    data.get(key).map_or(Ok(None), |_| require_str(data, key, component).map(Some))
}

/// Optional boolean; present with the wrong type is an error
pub fn optional_bool(data: &ParseData, key: &str, component: &str) -> Result<Option<bool>, BehaviorError> {
    data.get(key).map_or(Ok(None), |_| require_bool(data, key, component).map(Some))
}

/// Optional number; present with the wrong type is an error
pub fn optional_f32(data: &ParseData, key: &str, component: &str) -> Result<Option<f32>, BehaviorError> {
    data.get(key).map_or(Ok(None), |_| require_f32(data, key, component).map(Some))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn data(value: Value) -> ParseData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    #[test]
    fn test_required_values() {
        let d = data(json!({"name": "box", "is_trigger": true, "speed": 1.5, "args": [1, 2.5]}));

        assert_eq!(require_str(&d, "name", "c").unwrap(), "box");
        assert!(require_bool(&d, "is_trigger", "c").unwrap());
        assert_relative_eq!(require_f32(&d, "speed", "c").unwrap(), 1.5);
        assert_eq!(require_f32_list(&d, "args", "c").unwrap(), vec![1.0, 2.5]);
    }

    #[test]
    fn test_missing_and_mistyped_keys_name_the_key() {
        let d = data(json!({"is_trigger": "yes"}));

        let missing = require_str(&d, "name", "collider").unwrap_err();
        assert!(missing.to_string().contains("'name'"));
        assert!(missing.to_string().contains("collider"));

        let mistyped = require_bool(&d, "is_trigger", "collider").unwrap_err();
        assert!(mistyped.to_string().contains("boolean"));
    }

    #[test]
    fn test_vec3_accepts_list_and_object() {
        let d = data(json!({"a": [1, 2, 3], "b": {"x": 4, "y": 5, "z": 6}, "c": [1, 2]}));

        assert_relative_eq!(require_vec3(&d, "a", "c").unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(require_vec3(&d, "b", "c").unwrap(), Vec3::new(4.0, 5.0, 6.0));
        assert!(require_vec3(&d, "c", "c").is_err());
    }

    #[test]
    fn test_optional_values() {
        let d = data(json!({"enabled": false, "visible": 3}));

        assert_eq!(optional_bool(&d, "enabled", "c").unwrap(), Some(false));
        assert_eq!(optional_bool(&d, "missing", "c").unwrap(), None);
        assert!(optional_bool(&d, "visible", "c").is_err());
    }
}
