use crate::value::Value;


/// Variables visible to an executing template, innermost frame last.
///
/// `a.b.c` resolves `a` in the innermost mapping frame that has it, then
/// walks `b` and `c` from there without falling back to outer frames.
/// `.` is the innermost frame itself.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    frames: Vec<Value>
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn push(&mut self, frame: Value) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.frames.pop()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        if path == "." {
            return self.frames.last();
        }
        let mut keys = path.split('.');
        let first = keys.next()?;
        let root = self.frames.iter()
            .rev()
            .find_map(|frame| frame.as_mapping().and_then(|map| map.get(first)))?;
        keys.try_fold(root, |value, key| value.get(key))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;

    fn frame(pairs: &[(&str, Value)]) -> Value {
        Value::mapping(
            pairs.iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<Map>()
        )
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut scope = Scope::new();
        scope.push(frame(&[("name", "Gandalf".into()), ("title", "Wizard".into())]));
        scope.push(frame(&[("name", "Saruman".into())]));
        assert_eq!(scope.get("name").map(Value::to_text), Some("Saruman".to_owned()));
        assert_eq!(scope.get("title").map(Value::to_text), Some("Wizard".to_owned()));
        scope.pop();
        assert_eq!(scope.get("name").map(Value::to_text), Some("Gandalf".to_owned()));
    }

    #[test]
    fn dotted_path_does_not_fall_back() {
        let mut scope = Scope::new();
        scope.push(frame(&[("location", frame(&[("name", "Shire".into())])), ("name", "outer".into())]));
        scope.push(frame(&[("entity", frame(&[]))]));
        assert_eq!(scope.get("location.name").map(Value::to_text), Some("Shire".to_owned()));
        assert!(scope.get("entity.name").is_none());
    }

    #[test]
    fn dot_is_innermost_frame() {
        let mut scope = Scope::new();
        scope.push(frame(&[]));
        scope.push(Value::from("tag"));
        assert_eq!(scope.get(".").map(Value::to_text), Some("tag".to_owned()));
    }

    #[test]
    fn miss_is_none() {
        let scope = Scope::new();
        assert!(scope.get("anything").is_none());
        assert!(scope.get(".").is_none());
    }
}
