//! The live model configuration: loading, embedding-size resolution and serialization.

use crate::catalog::FeatureCatalog;
use crate::error::{ConfigError, ConfigResult};
use crate::params::{ActiveEncoder, DecoderConfig, EncoderConfig, InputConfig, ModelParams};
use crate::schema::{normalize_document, DEFAULT_EMBEDDING_SIZE};
use crate::slots::{pad_slots, SlotValues};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Hyperparameters of a WSD model, bound to the feature catalog they were resolved
/// against.
///
/// Per-slot embedding sizes follow a fixed priority:
///
/// 1. a contextual provider (ELMo, BERT or Flair) on the slot leaves the size
///    unresolved (`None`),
/// 2. otherwise a pretrained table in the catalog sets the size to its width,
/// 3. otherwise the configured literal (default 300) is kept.
///
/// Conflicting settings are not errors; the lower-priority value is discarded.
#[derive(Clone)]
pub struct ModelConfig {
    catalog: Arc<dyn FeatureCatalog>,
    params: ModelParams,
}

impl ModelConfig {
    /// A configuration holding every default, resolved against `catalog`.
    pub fn new(catalog: Arc<dyn FeatureCatalog>) -> ConfigResult<Self> {
        let params = Self::params_from_document(&Map::new(), catalog.feature_count())?;
        let mut config = Self { catalog, params };
        config.resolve();
        Ok(config)
    }

    /// Read a JSON document from `path` and load it against `catalog`.
    pub fn from_file(
        catalog: Arc<dyn FeatureCatalog>,
        path: impl AsRef<Path>,
    ) -> ConfigResult<Self> {
        let mut config = Self::new(catalog)?;
        config.load_from_file(path)?;
        Ok(config)
    }

    /// Build from an in-memory document, defaulting every absent key.
    pub fn from_document(catalog: Arc<dyn FeatureCatalog>, doc: &Value) -> ConfigResult<Self> {
        let mut config = Self::new(catalog)?;
        config.load_from_document(doc)?;
        Ok(config)
    }

    /// Replace all settings with the contents of the JSON file at `path`.
    ///
    /// The file is closed before the document is applied, on success and failure alike.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let doc: Value = {
            let file = File::open(path)?;
            serde_json::from_reader(BufReader::new(file)).map_err(json_error)?
        };
        log::info!("Loading model configuration from {:?}", path);
        self.load_from_document(&doc)
    }

    /// Replace all settings with the contents of `doc`.
    ///
    /// Absent keys take their defaults and ill-typed values are ignored with a warning.
    /// Only a non-object document is rejected.
    pub fn load_from_document(&mut self, doc: &Value) -> ConfigResult<()> {
        let map = doc
            .as_object()
            .ok_or_else(|| ConfigError::NotAnObject(json_kind(doc).to_string()))?;
        self.params = Self::params_from_document(map, self.catalog.feature_count())?;
        self.resolve();
        Ok(())
    }

    fn params_from_document(doc: &Map<String, Value>, slots: usize) -> ConfigResult<ModelParams> {
        let normalized = normalize_document(doc, slots);
        Ok(serde_json::from_value(Value::Object(normalized))?)
    }

    /// Assign ELMo models per slot and re-resolve embedding sizes.
    pub fn set_elmo_path(&mut self, paths: impl Into<SlotValues<String>>) {
        self.params.input.elmo_path = paths.into().into_slots(self.slot_count());
        self.resolve();
    }

    /// Assign BERT models per slot and re-resolve embedding sizes.
    pub fn set_bert_path(&mut self, paths: impl Into<SlotValues<String>>) {
        self.params.input.bert_path = paths.into().into_slots(self.slot_count());
        self.resolve();
    }

    /// Assign Flair models per slot and re-resolve embedding sizes.
    pub fn set_flair_path(&mut self, paths: impl Into<SlotValues<String>>) {
        self.params.input.flair_path = paths.into().into_slots(self.slot_count());
        self.resolve();
    }

    /// Record the encoder's output width once the model has been built.
    pub fn set_encoder_output_size(&mut self, size: usize) {
        self.params.encoder.output_size = Some(size);
    }

    /// Recompute every slot's embedding size from providers, catalog and literals.
    ///
    /// Runs after every provider or document change. Call it directly if the catalog
    /// was still being filled when this configuration was loaded.
    pub fn resolve(&mut self) {
        let slots = self.slot_count();
        let input = &mut self.params.input;

        pad_slots(&mut input.embeddings_size, slots, Some(DEFAULT_EMBEDDING_SIZE));
        pad_slots(&mut input.elmo_path, slots, None);
        pad_slots(&mut input.bert_path, slots, None);
        pad_slots(&mut input.flair_path, slots, None);
        pad_slots(&mut input.resize, slots, None);

        for slot in 0..slots {
            let resolved = if input.is_dynamic(slot) {
                None
            } else if let Some(dim) = self.catalog.embedding_dim(slot) {
                Some(dim)
            } else {
                Some(input.embeddings_size[slot].unwrap_or(DEFAULT_EMBEDDING_SIZE))
            };
            if input.embeddings_size[slot] != resolved {
                log::debug!(
                    "Input slot {}: embedding size {:?} -> {:?}",
                    slot,
                    input.embeddings_size[slot],
                    resolved
                );
                input.embeddings_size[slot] = resolved;
            }
        }
    }

    /// The live configuration as a flat document with exactly the schema's keys.
    pub fn to_document(&self) -> ConfigResult<Map<String, Value>> {
        match serde_json::to_value(&self.params)? {
            Value::Object(map) => Ok(map),
            other => Err(ConfigError::NotAnObject(json_kind(&other).to_string())),
        }
    }

    /// Write [`Self::to_document`] to `path` as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, &self.to_document()?).map_err(json_error)?;
        writer.flush()?;
        Ok(())
    }

    pub fn slot_count(&self) -> usize {
        self.catalog.feature_count()
    }

    pub fn catalog(&self) -> &Arc<dyn FeatureCatalog> {
        &self.catalog
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn input(&self) -> &InputConfig {
        &self.params.input
    }

    pub fn encoder(&self) -> &EncoderConfig {
        &self.params.encoder
    }

    pub fn decoder(&self) -> &DecoderConfig {
        &self.params.decoder
    }
}

/// Read/write failures surfaced through serde_json are I/O errors, everything else is parse.
fn json_error(e: serde_json::Error) -> ConfigError {
    if e.is_io() {
        ConfigError::Io(e.into())
    } else {
        ConfigError::Parse(e)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("slots", &self.slot_count())
            .field("params", &self.params)
            .finish()
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModelConfig {{ slots: {}, embeddings: {:?}, encoder: {} x{} (hidden {}) }}",
            self.slot_count(),
            self.params.input.embeddings_size,
            self.params.encoder.encoder_type,
            match self.params.encoder.active() {
                ActiveEncoder::Lstm(p) => p.layers,
                ActiveEncoder::Transformer(p) => p.layers,
            },
            self.params.encoder.hidden_size()
        )
    }
}
