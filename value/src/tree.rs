//! The builder producing [`JsonValue`] trees.

use jsonriver_core::Build;

use crate::value::{JsonNumber, JsonObject, JsonValue};

/// Builds [`JsonValue`] trees. Stateless: every parser method is `&self`,
/// and all working state lives in the frames the parser owns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder;

/// An array or object under construction.
#[derive(Debug, Clone)]
pub enum TreeFrame {
    Array(Vec<JsonValue>),
    Object {
        entries: Vec<(String, JsonValue)>,
        /// Key waiting for its value.
        pending: Option<String>,
    },
}

impl Build for TreeBuilder {
    type Value = JsonValue;
    type Frame = TreeFrame;

    fn begin_array(&self) -> TreeFrame {
        TreeFrame::Array(Vec::new())
    }

    fn begin_object(&self) -> TreeFrame {
        TreeFrame::Object {
            entries: Vec::new(),
            pending: None,
        }
    }

    fn add_key(&self, frame: &mut TreeFrame, key: &str) {
        if let TreeFrame::Object { pending, .. } = frame {
            *pending = Some(key.to_owned());
        }
    }

    fn add_value(&self, frame: &mut TreeFrame, value: JsonValue) {
        match frame {
            TreeFrame::Array(items) => items.push(value),
            TreeFrame::Object { entries, pending } => {
                if let Some(key) = pending.take() {
                    entries.push((key, value));
                }
            }
        }
    }

    fn finish(&self, frame: TreeFrame) -> JsonValue {
        match frame {
            TreeFrame::Array(items) => JsonValue::Array(items),
            TreeFrame::Object { entries, .. } => JsonValue::Object(JsonObject { entries }),
        }
    }

    fn null(&self) -> JsonValue {
        JsonValue::Null
    }

    fn boolean(&self, value: bool) -> JsonValue {
        JsonValue::Bool(value)
    }

    fn string(&self, text: &str) -> JsonValue {
        JsonValue::String(text.to_owned())
    }

    fn number(&self, literal: &str, float: bool) -> JsonValue {
        JsonValue::Number(JsonNumber::from_literal(literal, float))
    }
}
