use std::{collections::HashMap, fmt, sync::Arc};
use serde::Serialize;
use crate::error::ExecutionError;


/// Render data keyed by variable name.
pub type Map = HashMap<String, Value>;

/// A function bound in scope. Used as `{{#name}}body{{/name}}`, it
/// receives the rendered body and its result is written unescaped.
#[derive(Clone)]
pub struct Helper(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Helper {
    pub fn new<F>(fun: F) -> Self
    where F: Fn(&str) -> String + Send + Sync + 'static {
        Helper(Arc::new(fun))
    }

    pub fn call(&self, input: &str) -> String {
        (self.0)(input)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Helper {{...}}")
    }
}


/// Loosely-typed template data.
///
/// Sequences and mappings are reference counted, so pushing a value on
/// a scope or handing it to a partial does not copy the tree.
///
/// A name that cannot be found renders as the empty string and counts
/// as falsy; lookups never fail.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Sequence(Arc<Vec<Value>>),
    Mapping(Arc<Map>),
    Helper(Helper),
}

impl Value {
    pub fn text(t: &str) -> Value {
        Value::Text(t.to_owned())
    }

    pub fn sequence(sequence: Vec<Value>) -> Value {
        Value::Sequence(Arc::new(sequence))
    }

    pub fn mapping(mapping: Map) -> Value {
        Value::Mapping(Arc::new(mapping))
    }

    pub fn helper<F>(fun: F) -> Value
    where F: Fn(&str) -> String + Send + Sync + 'static {
        Value::Helper(Helper::new(fun))
    }

    /// Converts anything serializable, going through its JSON form.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Value, ExecutionError> {
        let json = serde_json::to_value(data)?;
        Ok(Value::from(&json))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(key),
            Value::Sequence(seq) => key.parse::<usize>().ok().and_then(|i| seq.get(i)),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Map> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Text(t) => !t.is_empty(),
            Value::Sequence(seq) => !seq.is_empty(),
            _ => true,
        }
    }

    /// Text written for `{{name}}`. Containers and helpers have none.
    pub fn to_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Text(t) => t.clone(),
            _ => String::new(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(t: &str) -> Self {
        Value::text(t)
    }
}

impl From<String> for Value {
    fn from(t: String) -> Self {
        Value::Text(t)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::mapping(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(seq: Vec<T>) -> Self {
        Value::sequence(seq.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
