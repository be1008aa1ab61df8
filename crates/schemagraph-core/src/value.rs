//! Property values and value types
//!
//! Values are JSON values. `Value::Null` is the unset sentinel: it is never
//! stored, and assigning it removes the stored value instead.

use serde::{Deserialize, Serialize};
pub use serde_json::Value;

/// Whether `value` is the unset sentinel
pub fn is_unset(value: &Value) -> bool {
    value.is_null()
}

/// Value type a property may be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl DataType {
    /// Whether `value` is of this type. Integers are also numbers.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            DataType::Boolean => value.is_boolean(),
            DataType::Integer => value.is_i64() || value.is_u64(),
            DataType::Number => value.is_number(),
            DataType::String => value.is_string(),
            DataType::Array => value.is_array(),
            DataType::Object => value.is_object(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::String => "string",
            DataType::Array => "array",
            DataType::Object => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_is_a_number() {
        assert!(DataType::Integer.accepts(&json!(3)));
        assert!(!DataType::Integer.accepts(&json!(3.5)));
        assert!(DataType::Number.accepts(&json!(3)));
        assert!(DataType::Number.accepts(&json!(3.5)));
    }

    #[test]
    fn test_type_mismatches_rejected() {
        assert!(!DataType::String.accepts(&json!(1)));
        assert!(!DataType::Boolean.accepts(&json!("true")));
        assert!(DataType::Array.accepts(&json!([1, 2])));
        assert!(DataType::Object.accepts(&json!({"a": 1})));
    }

    #[test]
    fn test_null_is_unset() {
        assert!(is_unset(&Value::Null));
        assert!(!is_unset(&json!(0)));
    }

    #[test]
    fn test_data_type_serde_names() {
        let json = serde_json::to_string(&DataType::Integer).unwrap();
        assert_eq!(json, "\"integer\"");
        assert_eq!(DataType::Integer.name(), "integer");
    }
}
