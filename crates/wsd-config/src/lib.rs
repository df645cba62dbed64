//! Hyperparameter schema for word sense disambiguation models.
//!
//! A [`ModelConfig`] is loaded from a flat JSON document, with every absent key
//! taking its default, and is resolved against a [`FeatureCatalog`] that describes
//! the model's input feature slots. Resolution decides each slot's embedding size
//! from contextual providers, pretrained tables and configured literals.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wsd_config::{InMemoryCatalog, ModelConfig};
//!
//! let catalog = Arc::new(InMemoryCatalog::new(3));
//! let mut config = ModelConfig::from_file(catalog, "model_config.json")?;
//! config.set_bert_path("bert-base-multilingual-cased");
//! config.save_to_file("model_config.json")?;
//! # Ok::<(), wsd_config::ConfigError>(())
//! ```

pub mod catalog;
pub mod error;
pub mod model_config;
pub mod params;
pub mod schema;
pub mod slots;

pub use catalog::{FeatureCatalog, InMemoryCatalog};
pub use error::{ConfigError, ConfigResult};
pub use model_config::ModelConfig;
pub use params::{
    ActiveEncoder, DecoderConfig, EncoderConfig, EncoderType, InputConfig, LstmParams,
    ModelParams, TransformerEncoderParams,
};
pub use schema::{KeySpec, Shape, DEFAULT_EMBEDDING_SIZE, SCHEMA};
pub use slots::SlotValues;
