use serde_json::{Map, Number, Value};

use super::{record::Record, value::FieldValue};

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(flag) => FieldValue::Bool(flag),
            Value::Number(num) => number_to_field(&num),
            Value::String(text) => FieldValue::Text(text),
            Value::Array(items) => FieldValue::List(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(map) => FieldValue::Record(
                map.into_iter()
                    .map(|(key, value)| (key, FieldValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(flag) => Value::Bool(*flag),
            FieldValue::Integer(value) => Value::from(*value),
            // Non-finite floats have no JSON form.
            FieldValue::Number(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Record(record) => Value::Object(record_to_map(record)),
        }
    }
}

fn number_to_field(num: &Number) -> FieldValue {
    if let Some(value) = num.as_i64() {
        FieldValue::Integer(value)
    } else {
        FieldValue::Number(num.as_f64().unwrap_or_default())
    }
}

fn record_to_map(record: &Record) -> Map<String, Value> {
    record
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_json()))
        .collect()
}
