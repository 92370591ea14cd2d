//! Read-only preference passthrough contracts and baseline adapters.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde_json::Value;

/// Read-only view of the preferences the hosting page assigns a gadget.
///
/// Getters return `None` when the key is absent or holds a value of another
/// type; they never fail.
pub trait PrefsReader {
    /// Reads a string preference.
    fn string(&self, key: &str) -> Option<String>;

    /// Reads an integer preference.
    fn integer(&self, key: &str) -> Option<i64>;

    /// Reads a boolean preference.
    fn boolean(&self, key: &str) -> Option<bool>;

    /// Reads a list-of-strings preference.
    fn list(&self, key: &str) -> Option<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Preference reader with no backing store; every key is absent.
pub struct NoopPrefsReader;

impl PrefsReader for NoopPrefsReader {
    fn string(&self, _key: &str) -> Option<String> {
        None
    }

    fn integer(&self, _key: &str) -> Option<i64> {
        None
    }

    fn boolean(&self, _key: &str) -> Option<bool> {
        None
    }

    fn list(&self, _key: &str) -> Option<Vec<String>> {
        None
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory preference reader for non-browser targets and tests.
pub struct MemoryPrefsReader {
    inner: Rc<RefCell<HashMap<String, Value>>>,
}

impl MemoryPrefsReader {
    /// Assigns a preference value.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.inner.borrow_mut().insert(key.into(), value);
    }
}

impl PrefsReader for MemoryPrefsReader {
    fn string(&self, key: &str) -> Option<String> {
        match self.inner.borrow().get(key) {
            Some(Value::String(value)) => Some(value.clone()),
            _ => None,
        }
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.inner.borrow().get(key).and_then(Value::as_i64)
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        self.inner.borrow().get(key).and_then(Value::as_bool)
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        let inner = self.inner.borrow();
        let items = inner.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn memory_reader_returns_typed_values() {
        let prefs = MemoryPrefsReader::default();
        prefs.set("title", json!("Welcome"));
        prefs.set("rotation", json!(90));
        prefs.set("muted", json!(true));
        prefs.set("feeds", json!(["news", "weather"]));

        let reader: &dyn PrefsReader = &prefs;
        assert_eq!(reader.string("title"), Some("Welcome".to_string()));
        assert_eq!(reader.integer("rotation"), Some(90));
        assert_eq!(reader.boolean("muted"), Some(true));
        assert_eq!(
            reader.list("feeds"),
            Some(vec!["news".to_string(), "weather".to_string()])
        );
    }

    #[test]
    fn mistyped_or_missing_keys_are_absent() {
        let prefs = MemoryPrefsReader::default();
        prefs.set("rotation", json!("ninety"));

        let reader: &dyn PrefsReader = &prefs;
        assert_eq!(reader.integer("rotation"), None);
        assert_eq!(reader.string("missing"), None);
        assert_eq!(reader.list("missing"), None);
    }

    #[test]
    fn noop_reader_is_always_absent() {
        let reader: &dyn PrefsReader = &NoopPrefsReader;
        assert_eq!(reader.string("anything"), None);
        assert_eq!(reader.boolean("anything"), None);
    }
}
