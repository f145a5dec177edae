use crate::value::{Map, Value};
pub use serde_json::Value as JsonValue;


impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            JsonValue::String(s) => Value::text(s),
            JsonValue::Array(seq) => Value::sequence(
                seq.iter().map(Value::from).collect::<Vec<_>>()
            ),
            JsonValue::Object(obj) => Value::mapping(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect::<Map>()
            ),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from(&json)
    }
}
