//! Typed hyperparameter groups. Field names map one-to-one onto document keys.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoder architecture selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderType {
    #[default]
    Lstm,
    Transformer,
}

impl fmt::Display for EncoderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderType::Lstm => write!(f, "lstm"),
            EncoderType::Transformer => write!(f, "transformer"),
        }
    }
}

/// Input layer: per-slot embedding sources plus the shared projection settings.
///
/// The per-slot lists are only writable through [`crate::ModelConfig`], which keeps
/// embedding sizes consistent with provider assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(rename = "input_embeddings_size")]
    pub(crate) embeddings_size: Vec<Option<usize>>,
    #[serde(rename = "input_elmo_path")]
    pub(crate) elmo_path: Vec<Option<String>>,
    #[serde(rename = "input_bert_path")]
    pub(crate) bert_path: Vec<Option<String>>,
    #[serde(rename = "input_flair_path")]
    pub(crate) flair_path: Vec<Option<String>>,
    #[serde(rename = "input_resize")]
    pub(crate) resize: Vec<Option<usize>>,

    #[serde(rename = "input_word_dropout_rate")]
    pub word_dropout_rate: Option<f64>,
    #[serde(rename = "input_apply_linear")]
    pub apply_linear: bool,
    #[serde(rename = "input_linear_size")]
    pub linear_size: Option<usize>,
    #[serde(rename = "input_dropout_rate")]
    pub dropout_rate: Option<f64>,
}

impl InputConfig {
    /// Effective embedding size per slot. `None` means a contextual provider
    /// determines it at model construction.
    pub fn embeddings_size(&self) -> &[Option<usize>] {
        &self.embeddings_size
    }

    pub fn elmo_path(&self) -> &[Option<String>] {
        &self.elmo_path
    }

    pub fn bert_path(&self) -> &[Option<String>] {
        &self.bert_path
    }

    pub fn flair_path(&self) -> &[Option<String>] {
        &self.flair_path
    }

    pub fn resize(&self) -> &[Option<usize>] {
        &self.resize
    }

    /// True if any contextual provider is assigned to `slot`.
    pub fn is_dynamic(&self, slot: usize) -> bool {
        [&self.elmo_path, &self.bert_path, &self.flair_path]
            .iter()
            .any(|paths| matches!(paths.get(slot), Some(Some(_))))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmParams {
    #[serde(rename = "encoder_lstm_hidden_size")]
    pub hidden_size: usize,
    #[serde(rename = "encoder_lstm_layers")]
    pub layers: usize,
    #[serde(rename = "encoder_lstm_dropout")]
    pub dropout: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerEncoderParams {
    #[serde(rename = "encoder_transformer_hidden_size")]
    pub hidden_size: usize,
    #[serde(rename = "encoder_transformer_layers")]
    pub layers: usize,
    #[serde(rename = "encoder_transformer_heads")]
    pub heads: usize,
    #[serde(rename = "encoder_transformer_dropout")]
    pub dropout: f64,
    #[serde(rename = "encoder_transformer_positional_encoding")]
    pub positional_encoding: bool,
    #[serde(rename = "encoder_transformer_scale_embeddings")]
    pub scale_embeddings: bool,
}

/// Encoder settings. Both architectures' parameters are kept so a document
/// survives a round-trip regardless of which one is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub encoder_type: EncoderType,
    #[serde(flatten)]
    pub lstm: LstmParams,
    #[serde(flatten)]
    pub transformer: TransformerEncoderParams,
    /// Filled in by model construction once the encoder exists; not persisted.
    #[serde(skip)]
    pub output_size: Option<usize>,
}

/// The parameters of the selected encoder architecture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveEncoder<'a> {
    Lstm(&'a LstmParams),
    Transformer(&'a TransformerEncoderParams),
}

impl EncoderConfig {
    pub fn active(&self) -> ActiveEncoder<'_> {
        match self.encoder_type {
            EncoderType::Lstm => ActiveEncoder::Lstm(&self.lstm),
            EncoderType::Transformer => ActiveEncoder::Transformer(&self.transformer),
        }
    }

    pub fn hidden_size(&self) -> usize {
        match self.active() {
            ActiveEncoder::Lstm(p) => p.hidden_size,
            ActiveEncoder::Transformer(p) => p.hidden_size,
        }
    }
}

/// Translation decoder (transformer only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(rename = "decoder_translation_transformer_hidden_size")]
    pub hidden_size: usize,
    #[serde(rename = "decoder_translation_transformer_layers")]
    pub layers: usize,
    #[serde(rename = "decoder_translation_transformer_heads")]
    pub heads: usize,
    #[serde(rename = "decoder_translation_transformer_dropout")]
    pub dropout: f64,
    #[serde(rename = "decoder_translation_scale_embeddings")]
    pub scale_embeddings: bool,
    /// Tie the decoder's input and output embeddings.
    #[serde(rename = "decoder_translation_share_embeddings")]
    pub share_embeddings: bool,
    /// Reuse the encoder's input embeddings in the decoder.
    #[serde(rename = "decoder_translation_share_encoder_embeddings")]
    pub share_encoder_embeddings: bool,
    /// BERT tokenizer used to segment translation targets.
    #[serde(rename = "decoder_translation_tokenizer_bert")]
    pub tokenizer_bert: Option<String>,
}

/// Every persisted hyperparameter, laid out flat in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    #[serde(flatten)]
    pub input: InputConfig,
    #[serde(flatten)]
    pub encoder: EncoderConfig,
    #[serde(flatten)]
    pub decoder: DecoderConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalize_document;
    use serde_json::{Map, Value};

    fn defaults(slots: usize) -> ModelParams {
        serde_json::from_value(Value::Object(normalize_document(&Map::new(), slots))).unwrap()
    }

    #[test]
    fn test_defaults_deserialize() {
        let params = defaults(2);

        assert_eq!(params.encoder.encoder_type, EncoderType::Lstm);
        assert_eq!(params.encoder.lstm.hidden_size, 1000);
        assert_eq!(params.encoder.lstm.layers, 1);
        assert_eq!(params.encoder.lstm.dropout, 0.5);
        assert_eq!(params.encoder.transformer.heads, 8);
        assert!(params.encoder.transformer.positional_encoding);
        assert_eq!(params.encoder.output_size, None);
        assert_eq!(params.decoder.hidden_size, 512);
        assert!(!params.decoder.share_encoder_embeddings);
        assert_eq!(params.decoder.tokenizer_bert, None);
        assert_eq!(params.input.embeddings_size(), &[Some(300), Some(300)]);
        assert_eq!(params.input.word_dropout_rate, None);
        assert!(!params.input.apply_linear);
    }

    #[test]
    fn test_active_encoder_follows_type() {
        let mut params = defaults(1);
        assert!(matches!(params.encoder.active(), ActiveEncoder::Lstm(_)));
        assert_eq!(params.encoder.hidden_size(), 1000);

        params.encoder.encoder_type = EncoderType::Transformer;
        match params.encoder.active() {
            ActiveEncoder::Transformer(p) => assert_eq!(p.layers, 6),
            other => panic!("expected transformer, got {:?}", other),
        }
        assert_eq!(params.encoder.hidden_size(), 512);
    }

    #[test]
    fn test_is_dynamic_checks_all_providers() {
        let mut params = defaults(3);
        params.input.bert_path[1] = Some("bert-base-cased".to_string());
        params.input.flair_path[2] = Some("news-forward".to_string());

        assert!(!params.input.is_dynamic(0));
        assert!(params.input.is_dynamic(1));
        assert!(params.input.is_dynamic(2));
        assert!(!params.input.is_dynamic(7));
    }

    #[test]
    fn test_encoder_type_display() {
        assert_eq!(EncoderType::Transformer.to_string(), "transformer");
        assert_eq!(EncoderType::Lstm.to_string(), "lstm");
    }
}
