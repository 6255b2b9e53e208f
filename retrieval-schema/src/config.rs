//! Configuration for the [`SchemaValidator`](crate::SchemaValidator).

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Policy knobs layered on top of the structural checks.
///
/// The defaults add nothing: every optional relationship in the model stays
/// optional. Collaborators that need stricter invariants turn them on here.
///
/// Deserializing goes through [`SchemaConfigBuilder::build`], so a config
/// file is held to the same checks as code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchemaConfig")]
pub struct SchemaConfig {
    /// When set, every embedding must have exactly this many components.
    pub embedding_dimensions: Option<usize>,
    /// When set, queries asking for more results than this are rejected.
    pub max_top_k: Option<usize>,
    /// Require `metadata.document_id` on chunks inside documents and results.
    pub require_chunk_owner: bool,
    /// Reject `chat_metadata` on metadata whose source is not `"chat"`.
    pub enforce_chat_source: bool,
}

impl SchemaConfig {
    /// Create a new builder for constructing a [`SchemaConfig`].
    pub fn builder() -> SchemaConfigBuilder {
        SchemaConfigBuilder::default()
    }
}

/// Wire form of [`SchemaConfig`]. Missing keys take their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSchemaConfig {
    embedding_dimensions: Option<usize>,
    max_top_k: Option<usize>,
    require_chunk_owner: bool,
    enforce_chat_source: bool,
}

impl TryFrom<RawSchemaConfig> for SchemaConfig {
    type Error = ValidationError;

    fn try_from(raw: RawSchemaConfig) -> Result<Self> {
        let mut builder = SchemaConfig::builder()
            .require_chunk_owner(raw.require_chunk_owner)
            .enforce_chat_source(raw.enforce_chat_source);
        if let Some(dimensions) = raw.embedding_dimensions {
            builder = builder.embedding_dimensions(dimensions);
        }
        if let Some(max) = raw.max_top_k {
            builder = builder.max_top_k(max);
        }
        builder.build()
    }
}

/// Builder for constructing a validated [`SchemaConfig`].
#[derive(Debug, Clone, Default)]
pub struct SchemaConfigBuilder {
    config: SchemaConfig,
}

impl SchemaConfigBuilder {
    /// Fix the embedding length every checked vector must have.
    pub fn embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.config.embedding_dimensions = Some(dimensions);
        self
    }

    /// Cap the `top_k` a query may ask for.
    pub fn max_top_k(mut self, max: usize) -> Self {
        self.config.max_top_k = Some(max);
        self
    }

    /// Require every chunk to name its owning document.
    pub fn require_chunk_owner(mut self, required: bool) -> Self {
        self.config.require_chunk_owner = required;
        self
    }

    /// Only allow `chat_metadata` on chat-sourced metadata.
    pub fn enforce_chat_source(mut self, enforce: bool) -> Self {
        self.config.enforce_chat_source = enforce;
        self
    }

    /// Build the [`SchemaConfig`], validating that parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Config`] if:
    /// - `embedding_dimensions == 0`
    /// - `max_top_k == 0`
    pub fn build(self) -> Result<SchemaConfig> {
        if self.config.embedding_dimensions == Some(0) {
            return Err(ValidationError::Config(
                "embedding_dimensions must be greater than zero".to_string(),
            ));
        }
        if self.config.max_top_k == Some(0) {
            return Err(ValidationError::Config("max_top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
