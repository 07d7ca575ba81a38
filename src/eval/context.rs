use super::value::{Array, ArrayKey, Value};

/// Variables visible to `$name->path` expressions.
///
/// Lookups use dot notation: `get("user.address.city")` first tries the
/// whole string as a key of the root, then walks the nested arrays one
/// segment at a time. The context is never written to during evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    root: Array,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion at the root, for setting up a context before
    /// evaluation.
    pub fn with<K: Into<ArrayKey>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.root.insert(key, value.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.root.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |current, segment| {
            current.as_array()?.get(segment)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl From<Array> for Context {
    fn from(root: Array) -> Self {
        Self { root }
    }
}

// Objects become the root; any other JSON value is an empty context.
impl From<serde_json::Value> for Context {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(_) => match Value::from(json) {
                Value::Array(root) => Self { root },
                _ => Self::default(),
            },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn nested() -> Context {
        Context::from(json!({
            "name": "Dave",
            "nested": { "arrays": { "test": { "name": "deep" } } },
            "list": ["zero", "one"],
            "dotted.key": "literal"
        }))
    }

    #[test]
    fn test_get_top_level() {
        let context = nested();
        assert_eq!(context.get("name"), Some(&Value::from("Dave")));
        assert_eq!(context.get("missing"), None);
    }

    #[test]
    fn test_get_nested_path() {
        let context = nested();
        assert_eq!(
            context.get("nested.arrays.test.name"),
            Some(&Value::from("deep"))
        );
        assert_eq!(context.get("nested.arrays.nope"), None);
        assert_eq!(context.get("name.length"), None);
    }

    #[test]
    fn test_numeric_segments_address_int_keys() {
        assert_eq!(nested().get("list.1"), Some(&Value::from("one")));
    }

    #[test]
    fn test_literal_key_wins() {
        assert_eq!(nested().get("dotted.key"), Some(&Value::from("literal")));
    }

    #[test]
    fn test_builder() {
        let context = Context::new().with("city", "Anywhere").with("age", 42i64);
        assert_eq!(context.get("city"), Some(&Value::from("Anywhere")));
        assert_eq!(context.get("age"), Some(&Value::Int(42)));
        assert!(!context.is_empty());
    }

    #[test]
    fn test_non_object_json_is_empty() {
        assert!(Context::from(json!([1, 2])).is_empty());
    }

    #[test]
    fn test_context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Context>();
    }
}
