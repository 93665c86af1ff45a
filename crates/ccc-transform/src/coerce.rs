//! Value coercion driven by field descriptors.

use ccc_model::{DataType, FieldDescriptor, Value};

use crate::error::{ImportError, Result};

/// Parses a trimmed string as i64, returning None for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Parses a trimmed string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Applies `descriptor` to one field value.
///
/// Missing values (`null` or `""`) take the declared `missingValue` and are
/// otherwise kept untouched. Everything else is coerced to the declared
/// data type.
pub fn apply_descriptor(field: &str, value: Value, descriptor: &FieldDescriptor) -> Result<Value> {
    if value.is_missing() {
        return Ok(descriptor.missing_value.clone().unwrap_or(value));
    }
    coerce(field, value, descriptor)
}

/// Converts a present value to the descriptor's data type.
pub fn coerce(field: &str, value: Value, descriptor: &FieldDescriptor) -> Result<Value> {
    let data_type = descriptor.data_type;
    let failed = |value: &Value| ImportError::FieldType {
        field: field.to_string(),
        data_type,
        value: value.to_string(),
    };
    match data_type {
        DataType::String => Ok(value),
        DataType::Int => match &value {
            Value::Int(_) => Ok(value),
            Value::String(text) => parse_i64(text).map(Value::Int).ok_or_else(|| failed(&value)),
            Value::Float(number) => float_to_int(*number)
                .map(Value::Int)
                .ok_or_else(|| failed(&value)),
            _ => Err(failed(&value)),
        },
        DataType::Float => match &value {
            Value::Float(_) => Ok(value),
            Value::Int(number) => Ok(Value::Float(*number as f64)),
            Value::String(text) => parse_f64(text)
                .map(Value::Float)
                .ok_or_else(|| failed(&value)),
            _ => Err(failed(&value)),
        },
        DataType::Dict => match value {
            Value::Dict(_) => Ok(value),
            other => {
                // dict fields without a key are rejected when the schema loads
                let key = descriptor.dict_key.as_deref().unwrap_or(field);
                Ok(Value::wrap(key, other))
            }
        },
    }
}

fn float_to_int(number: f64) -> Option<i64> {
    let in_range = number >= i64::MIN as f64 && number < i64::MAX as f64;
    (number.is_finite() && number.fract() == 0.0 && in_range).then_some(number as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> FieldDescriptor {
        FieldDescriptor::default().with_data_type(DataType::Int)
    }

    fn float() -> FieldDescriptor {
        FieldDescriptor::default().with_data_type(DataType::Float)
    }

    #[test]
    fn parses_integers_with_surrounding_space() {
        assert_eq!(coerce("age", Value::from(" 42 "), &int()).unwrap(), Value::Int(42));
        assert_eq!(coerce("age", Value::from("-7"), &int()).unwrap(), Value::Int(-7));
    }

    #[test]
    fn integer_fields_reject_fractions() {
        assert!(coerce("age", Value::from("4.5"), &int()).is_err());
        assert!(coerce("age", Value::Float(4.5), &int()).is_err());
        assert_eq!(coerce("age", Value::Float(4.0), &int()).unwrap(), Value::Int(4));
    }

    #[test]
    fn float_fields_accept_integers() {
        assert_eq!(
            coerce("purity", Value::from("0.75"), &float()).unwrap(),
            Value::Float(0.75)
        );
        assert_eq!(coerce("purity", Value::Int(1), &float()).unwrap(), Value::Float(1.0));
        assert!(coerce("purity", Value::Bool(true), &float()).is_err());
    }

    #[test]
    fn dict_fields_wrap_under_their_key() {
        let descriptor = FieldDescriptor::default().with_dict_key("code");
        assert_eq!(
            coerce("projects", Value::from("P1"), &descriptor).unwrap(),
            Value::wrap("code", Value::from("P1"))
        );
        let already = Value::wrap("code", Value::from("P1"));
        assert_eq!(coerce("projects", already.clone(), &descriptor).unwrap(), already);
    }

    #[test]
    fn string_fields_pass_through() {
        let descriptor = FieldDescriptor::default();
        assert_eq!(
            coerce("tissue", Value::from("lung"), &descriptor).unwrap(),
            Value::from("lung")
        );
    }

    #[test]
    fn missing_values_take_the_default_or_stay_empty() {
        let defaulted = int().with_missing_value(Value::Int(-1));
        assert_eq!(
            apply_descriptor("age", Value::from(""), &defaulted).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(apply_descriptor("age", Value::Null, &defaulted).unwrap(), Value::Int(-1));
        assert_eq!(
            apply_descriptor("age", Value::from(""), &int()).unwrap(),
            Value::from("")
        );
    }
}
