//! The JSON value tree.

use std::fmt::{self, Write as _};

/// A parsed JSON value.
///
/// Object member order and duplicate keys are preserved exactly as they
/// appeared in the input; numbers keep their source literal so no precision
/// is lost between parsing and rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// A number, kept as its source literal
    Number(JsonNumber),
    /// A string value
    String(String),
    /// An array `[...]`
    Array(Vec<JsonValue>),
    /// An object `{...}`
    Object(JsonObject),
}

/// A JSON object with ordered, duplicate-preserving entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonObject {
    /// Key-value pairs in insertion order.
    pub entries: Vec<(String, JsonValue)>,
}

/// A number kept as its source literal.
///
/// The parser does not interpret numeric literals; this type carries the
/// exact text plus whether a fraction or exponent appeared, and converts on
/// demand.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonNumber {
    text: String,
    float: bool,
}

impl JsonNumber {
    pub fn from_literal(text: impl Into<String>, float: bool) -> Self {
        Self {
            text: text.into(),
            float,
        }
    }

    /// The source literal.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True iff the literal contained `.`, `e`, or `E`.
    pub fn is_float(&self) -> bool {
        self.float
    }

    /// Integer value, when the literal is integral and fits an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        if self.float {
            return None;
        }
        self.text.parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.text.parse().ok()
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl JsonValue {
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            JsonValue::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(JsonNumber::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(JsonNumber::as_f64)
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            JsonValue::Object(object) => Some(object),
            _ => None,
        }
    }

    /// First value for `key`, when this is an object.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Element or member count, when this is a container.
    pub fn len(&self) -> Option<usize> {
        match self {
            JsonValue::Array(items) => Some(items.len()),
            JsonValue::Object(object) => Some(object.len()),
            _ => None,
        }
    }
}

impl JsonObject {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: String, value: JsonValue) {
        self.entries.push((key, value));
    }

    /// First value for `key`. Duplicates keep every entry; lookups see the
    /// earliest.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, JsonValue)> {
        self.entries.iter()
    }
}

impl fmt::Display for JsonValue {
    /// Compact RFC 8259 rendering: no whitespace, minimal escapes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Null => f.write_str("null"),
            JsonValue::Bool(true) => f.write_str("true"),
            JsonValue::Bool(false) => f.write_str("false"),
            JsonValue::Number(number) => fmt::Display::fmt(number, f),
            JsonValue::String(text) => write_escaped(f, text),
            JsonValue::Array(items) => {
                f.write_str("[")?;
                for (k, item) in items.iter().enumerate() {
                    if k > 0 {
                        f.write_str(",")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
            JsonValue::Object(object) => {
                f.write_str("{")?;
                for (k, (key, value)) in object.entries.iter().enumerate() {
                    if k > 0 {
                        f.write_str(",")?;
                    }
                    write_escaped(f, key)?;
                    f.write_str(":")?;
                    fmt::Display::fmt(value, f)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000C}' => f.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_str("\"")
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    use super::JsonValue;

    impl Serialize for JsonValue {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                JsonValue::Null => serializer.serialize_unit(),
                JsonValue::Bool(value) => serializer.serialize_bool(*value),
                JsonValue::Number(number) => {
                    if let Some(i) = number.as_i64() {
                        serializer.serialize_i64(i)
                    } else if let Some(f) = number.as_f64() {
                        serializer.serialize_f64(f)
                    } else {
                        // Integral but wider than i64: keep the literal.
                        serializer.serialize_str(number.as_str())
                    }
                }
                JsonValue::String(text) => serializer.serialize_str(text),
                JsonValue::Array(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                JsonValue::Object(object) => {
                    let mut map = serializer.serialize_map(Some(object.entries.len()))?;
                    for (key, value) in &object.entries {
                        map.serialize_entry(key, value)?;
                    }
                    map.end()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_accessors() {
        let n = JsonNumber::from_literal("42", false);
        assert_eq!(n.as_i64(), Some(42));
        assert_eq!(n.as_f64(), Some(42.0));

        let f = JsonNumber::from_literal("2.5e1", true);
        assert_eq!(f.as_i64(), None);
        assert_eq!(f.as_f64(), Some(25.0));
    }

    #[test]
    fn object_lookup_sees_first_duplicate() {
        let mut object = JsonObject::new();
        object.insert("a".into(), JsonValue::Bool(true));
        object.insert("a".into(), JsonValue::Bool(false));
        assert_eq!(object.len(), 2);
        assert_eq!(object.get("a"), Some(&JsonValue::Bool(true)));
    }

    #[test]
    fn display_renders_compact_json() {
        let value = JsonValue::Array(vec![
            JsonValue::Null,
            JsonValue::Bool(false),
            JsonValue::Number(JsonNumber::from_literal("1.5", true)),
            JsonValue::String("hi".into()),
        ]);
        assert_eq!(value.to_string(), r#"[null,false,1.5,"hi"]"#);
    }

    #[test]
    fn display_escapes_strings() {
        let value = JsonValue::String("a\"b\\c\nd\u{0001}".into());
        assert_eq!(value.to_string(), "\"a\\\"b\\\\c\\nd\\u0001\"");
    }

    #[test]
    fn get_traverses_objects() {
        let mut inner = JsonObject::new();
        inner.insert("x".into(), JsonValue::Null);
        let mut outer = JsonObject::new();
        outer.insert("inner".into(), JsonValue::Object(inner));
        let value = JsonValue::Object(outer);
        assert!(value.get("inner").and_then(|v| v.get("x")).is_some());
        assert_eq!(value.len(), Some(1));
    }
}
