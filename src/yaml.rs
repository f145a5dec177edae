use crate::value::{Map, Value};
pub use serde_yaml::Value as YamlValue;


impl From<&YamlValue> for Value {
    fn from(yaml: &YamlValue) -> Self {
        match yaml {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Bool(*b),
            YamlValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            YamlValue::String(s) => Value::text(s),
            YamlValue::Sequence(seq) => Value::sequence(
                seq.iter().map(Value::from).collect::<Vec<_>>()
            ),
            YamlValue::Mapping(obj) => Value::mapping(
                obj.iter()
                    .filter_map(|(k, v)| mapping_key(k).map(|k| (k, Value::from(v))))
                    .collect::<Map>()
            ),
            YamlValue::Tagged(tagged) => Value::from(&tagged.value),
        }
    }
}

impl From<YamlValue> for Value {
    fn from(yaml: YamlValue) -> Self {
        Value::from(&yaml)
    }
}

// non-scalar keys cannot be named from a template
fn mapping_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
