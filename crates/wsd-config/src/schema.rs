//! The table of recognized configuration keys, their shapes and defaults.
//!
//! Every key the loader reads and the serializer writes is listed once in [`SCHEMA`].
//! Normalization against this table is what makes loading permissive: a missing value
//! becomes the key's default, an integral float such as `512.0` is kept as the integer
//! it denotes, and only a value that cannot be represented at all (a string where a
//! count is expected, say) falls back to the default. Per-slot lists are padded to the
//! feature count before they reach the typed structs.

use serde_json::{Map, Number, Value};

/// Literal size used for slots that have neither a provider nor a pretrained table.
pub const DEFAULT_EMBEDDING_SIZE: usize = 300;

/// Accepted encoder architectures.
pub const ENCODER_TYPES: &[&str] = &["lstm", "transformer"];

/// Expected shape of a key's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Int,
    OptInt,
    Float,
    OptFloat,
    Bool,
    OptStr,
    Choice(&'static [&'static str]),
    /// One optional non-negative integer per slot; missing trailing slots get `fill`.
    SlotInts { fill: Option<u64> },
    /// One optional string per slot; missing trailing slots are absent.
    SlotStrs,
}

/// Default value of a key, in a form that can live in a `const` table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Int(u64),
    Float(f64),
    Bool(bool),
    Str(&'static str),
    /// Per-slot default: an empty list, padded by the shape's fill.
    Slots,
}

impl DefaultValue {
    fn to_json(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Int(v) => Value::from(v),
            DefaultValue::Float(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
            DefaultValue::Bool(v) => Value::Bool(v),
            DefaultValue::Str(v) => Value::String(v.to_string()),
            DefaultValue::Slots => Value::Array(Vec::new()),
        }
    }
}

/// One recognized document key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySpec {
    pub key: &'static str,
    pub shape: Shape,
    pub default: DefaultValue,
}

const fn spec(key: &'static str, shape: Shape, default: DefaultValue) -> KeySpec {
    KeySpec {
        key,
        shape,
        default,
    }
}

/// Every recognized document key, in serialization order.
pub const SCHEMA: &[KeySpec] = &[
    spec(
        "input_embeddings_size",
        Shape::SlotInts {
            fill: Some(DEFAULT_EMBEDDING_SIZE as u64),
        },
        DefaultValue::Slots,
    ),
    spec("input_elmo_path", Shape::SlotStrs, DefaultValue::Slots),
    spec("input_bert_path", Shape::SlotStrs, DefaultValue::Slots),
    spec("input_flair_path", Shape::SlotStrs, DefaultValue::Slots),
    spec("input_word_dropout_rate", Shape::OptFloat, DefaultValue::Null),
    spec(
        "input_resize",
        Shape::SlotInts { fill: None },
        DefaultValue::Slots,
    ),
    spec("input_apply_linear", Shape::Bool, DefaultValue::Bool(false)),
    spec("input_linear_size", Shape::OptInt, DefaultValue::Null),
    spec("input_dropout_rate", Shape::OptFloat, DefaultValue::Null),
    spec(
        "encoder_type",
        Shape::Choice(ENCODER_TYPES),
        DefaultValue::Str("lstm"),
    ),
    spec("encoder_lstm_hidden_size", Shape::Int, DefaultValue::Int(1000)),
    spec("encoder_lstm_layers", Shape::Int, DefaultValue::Int(1)),
    spec("encoder_lstm_dropout", Shape::Float, DefaultValue::Float(0.5)),
    spec("encoder_transformer_hidden_size", Shape::Int, DefaultValue::Int(512)),
    spec("encoder_transformer_layers", Shape::Int, DefaultValue::Int(6)),
    spec("encoder_transformer_heads", Shape::Int, DefaultValue::Int(8)),
    spec("encoder_transformer_dropout", Shape::Float, DefaultValue::Float(0.1)),
    spec(
        "encoder_transformer_positional_encoding",
        Shape::Bool,
        DefaultValue::Bool(true),
    ),
    spec(
        "encoder_transformer_scale_embeddings",
        Shape::Bool,
        DefaultValue::Bool(true),
    ),
    spec(
        "decoder_translation_transformer_hidden_size",
        Shape::Int,
        DefaultValue::Int(512),
    ),
    spec(
        "decoder_translation_transformer_layers",
        Shape::Int,
        DefaultValue::Int(6),
    ),
    spec(
        "decoder_translation_transformer_heads",
        Shape::Int,
        DefaultValue::Int(8),
    ),
    spec(
        "decoder_translation_transformer_dropout",
        Shape::Float,
        DefaultValue::Float(0.1),
    ),
    spec(
        "decoder_translation_scale_embeddings",
        Shape::Bool,
        DefaultValue::Bool(true),
    ),
    spec(
        "decoder_translation_share_embeddings",
        Shape::Bool,
        DefaultValue::Bool(false),
    ),
    spec(
        "decoder_translation_share_encoder_embeddings",
        Shape::Bool,
        DefaultValue::Bool(false),
    ),
    spec(
        "decoder_translation_tokenizer_bert",
        Shape::OptStr,
        DefaultValue::Null,
    ),
];

/// Look up a key's entry.
pub fn key_spec(key: &str) -> Option<&'static KeySpec> {
    SCHEMA.iter().find(|s| s.key == key)
}

/// A non-negative integer, written either as `512` or as an integral float `512.0`.
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u64::MAX as f64)
            .map(|v| v as u64)
    })
}

impl Shape {
    /// The value as stored for this scalar shape, or `None` if it cannot be represented.
    fn conform(self, value: &Value) -> Option<Value> {
        match self {
            Shape::Int => as_count(value).map(Value::from),
            Shape::OptInt if value.is_null() => Some(Value::Null),
            Shape::OptInt => as_count(value).map(Value::from),
            Shape::Float => value.is_number().then(|| value.clone()),
            Shape::OptFloat => (value.is_null() || value.is_number()).then(|| value.clone()),
            Shape::Bool => value.is_boolean().then(|| value.clone()),
            Shape::OptStr => (value.is_null() || value.is_string()).then(|| value.clone()),
            Shape::Choice(options) => value
                .as_str()
                .is_some_and(|s| options.contains(&s))
                .then(|| value.clone()),
            Shape::SlotInts { .. } | Shape::SlotStrs => None,
        }
    }

    /// Like [`Shape::conform`], for a single element of a per-slot list.
    fn conform_slot(self, value: &Value) -> Option<Value> {
        match self {
            Shape::SlotInts { .. } if value.is_null() => Some(Value::Null),
            Shape::SlotInts { .. } => as_count(value).map(Value::from),
            Shape::SlotStrs => (value.is_null() || value.is_string()).then(|| value.clone()),
            _ => None,
        }
    }

    fn slot_fill(self) -> Value {
        match self {
            Shape::SlotInts { fill: Some(v) } => Value::from(v),
            _ => Value::Null,
        }
    }
}

impl KeySpec {
    /// True for keys holding one value per feature slot.
    pub fn is_per_slot(&self) -> bool {
        matches!(self.shape, Shape::SlotInts { .. } | Shape::SlotStrs)
    }

    /// The default as a JSON value; per-slot keys give an empty list.
    pub fn default_json(&self) -> Value {
        self.default.to_json()
    }

    /// Produce the value to store for this key from the raw document entry.
    ///
    /// Never fails: a value the shape cannot represent is replaced by the default.
    /// Per-slot values are expanded to a list of at least `slots` entries.
    pub fn normalize(&self, raw: Option<&Value>, slots: usize) -> Value {
        if self.is_per_slot() {
            return Value::Array(self.normalize_slots(raw, slots));
        }
        match raw {
            Some(value) => self.shape.conform(value).unwrap_or_else(|| {
                log::warn!(
                    "Ignoring '{}' = {}: expected {:?}, using default",
                    self.key,
                    value,
                    self.shape
                );
                self.default_json()
            }),
            None => self.default_json(),
        }
    }

    fn normalize_slots(&self, raw: Option<&Value>, slots: usize) -> Vec<Value> {
        let mut values = match raw {
            None | Some(Value::Null) => match self.default_json() {
                Value::Array(values) => values,
                _ => Vec::new(),
            },
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.shape.conform_slot(item).unwrap_or_else(|| {
                        log::warn!(
                            "Ignoring '{}'[{}] = {}: expected {:?}",
                            self.key,
                            i,
                            item,
                            self.shape
                        );
                        Value::Null
                    })
                })
                .collect(),
            Some(value) => match self.shape.conform_slot(value) {
                Some(conformed) => vec![conformed],
                None => {
                    log::warn!(
                        "Ignoring '{}' = {}: expected {:?}, using default",
                        self.key,
                        value,
                        self.shape
                    );
                    Vec::new()
                }
            },
        };
        crate::slots::pad_slots(&mut values, slots, self.shape.slot_fill());
        values
    }
}

/// Normalize a whole document against [`SCHEMA`]. Unknown keys are dropped.
pub fn normalize_document(doc: &Map<String, Value>, slots: usize) -> Map<String, Value> {
    for key in doc.keys().filter(|k| key_spec(k).is_none()) {
        log::debug!("Ignoring unknown configuration key '{}'", key);
    }
    SCHEMA
        .iter()
        .map(|spec| (spec.key.to_string(), spec.normalize(doc.get(spec.key), slots)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_schema_keys_are_unique() {
        let keys: HashSet<&str> = SCHEMA.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), SCHEMA.len());
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let doc = normalize_document(&Map::new(), 2);

        assert_eq!(doc["encoder_type"], json!("lstm"));
        assert_eq!(doc["encoder_lstm_hidden_size"], json!(1000));
        assert_eq!(doc["encoder_lstm_dropout"], json!(0.5));
        assert_eq!(doc["input_apply_linear"], json!(false));
        assert_eq!(doc["input_embeddings_size"], json!([300, 300]));
        assert_eq!(doc["input_elmo_path"], json!([null, null]));
        assert_eq!(doc["input_resize"], json!([null, null]));
        assert_eq!(doc["decoder_translation_tokenizer_bert"], Value::Null);
    }

    #[test]
    fn test_scalar_slot_value_becomes_first_slot() {
        let spec = key_spec("input_elmo_path").unwrap();
        let value = spec.normalize(Some(&json!("en-elmo")), 3);
        assert_eq!(value, json!(["en-elmo", null, null]));
    }

    #[test]
    fn test_slot_list_padded_with_fill() {
        let spec = key_spec("input_embeddings_size").unwrap();
        let value = spec.normalize(Some(&json!([64])), 3);
        assert_eq!(value, json!([64, 300, 300]));
    }

    #[test]
    fn test_bad_slot_element_becomes_null() {
        let spec = key_spec("input_embeddings_size").unwrap();
        let value = spec.normalize(Some(&json!([64, "wide"])), 2);
        assert_eq!(value, json!([64, null]));
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let doc = json!({
            "encoder_lstm_layers": "two",
            "encoder_type": "gru",
            "encoder_transformer_positional_encoding": 1,
            "input_dropout_rate": 0.3,
        });
        let doc = normalize_document(doc.as_object().unwrap(), 1);

        assert_eq!(doc["encoder_lstm_layers"], json!(1));
        assert_eq!(doc["encoder_type"], json!("lstm"));
        assert_eq!(doc["encoder_transformer_positional_encoding"], json!(true));
        assert_eq!(doc["input_dropout_rate"], json!(0.3));
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let doc = json!({ "learning_rate": 0.001 });
        let doc = normalize_document(doc.as_object().unwrap(), 1);
        assert!(!doc.contains_key("learning_rate"));
        assert_eq!(doc.len(), SCHEMA.len());
    }

    #[test]
    fn test_integral_float_kept_for_count() {
        let doc = json!({
            "encoder_lstm_hidden_size": 512.0,
            "input_linear_size": 64.0,
            "input_embeddings_size": [128.0, 2.5, -3],
            "input_resize": 32.0,
        });
        let doc = normalize_document(doc.as_object().unwrap(), 3);

        assert_eq!(doc["encoder_lstm_hidden_size"], json!(512));
        assert_eq!(doc["input_linear_size"], json!(64));
        assert_eq!(doc["input_embeddings_size"], json!([128, null, null]));
        assert_eq!(doc["input_resize"], json!([32, null, null]));
    }

    #[test]
    fn test_fractional_or_negative_count_falls_back() {
        let doc = json!({ "encoder_lstm_layers": 1.5, "encoder_transformer_heads": -8 });
        let doc = normalize_document(doc.as_object().unwrap(), 1);

        assert_eq!(doc["encoder_lstm_layers"], json!(1));
        assert_eq!(doc["encoder_transformer_heads"], json!(8));
    }

    #[test]
    fn test_integer_accepted_for_float() {
        let spec = key_spec("encoder_lstm_dropout").unwrap();
        assert_eq!(spec.normalize(Some(&json!(0)), 1), json!(0));
    }
}
