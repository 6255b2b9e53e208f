//! Structural validation beyond what deserialization already enforces.
//!
//! Deserialization covers required fields, primitive shapes and the closed
//! [`Source`](crate::Source) set. [`Validate`] adds the checks JSON cannot
//! express on its own: finite numbers, non-empty embeddings, and one
//! embedding dimensionality per document or response.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::SchemaConfig;
use crate::document::{Document, DocumentChunk, DocumentChunkWithScore, DocumentWithChunks};
use crate::error::{FieldViolation, Result, ValidationError};
use crate::filter::DocumentMetadataFilter;
use crate::metadata::{ChatMetadata, DocumentChunkMetadata, DocumentMetadata};
use crate::query::{Query, QueryResult, QueryWithEmbedding};
use crate::validator::SchemaValidator;

/// Types that can report structural problems with their own fields.
pub trait Validate {
    /// Return every violation found under `path`, applying the policy in
    /// `config` on top of the structural checks. Empty means valid.
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation>;

    /// Structural checks only.
    fn validate(&self, path: &str) -> Vec<FieldViolation> {
        self.validate_with(&SchemaConfig::default(), path)
    }
}

impl Validate for ChatMetadata {
    fn validate_with(&self, _config: &SchemaConfig, _path: &str) -> Vec<FieldViolation> {
        Vec::new()
    }
}

impl Validate for DocumentMetadataFilter {
    fn validate_with(&self, _config: &SchemaConfig, _path: &str) -> Vec<FieldViolation> {
        Vec::new()
    }
}

impl Validate for DocumentMetadata {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        if config.enforce_chat_source && !self.chat_metadata_is_consistent() {
            return vec![FieldViolation::new(
                format!("{path}.chat_metadata"),
                format!("only allowed when source is \"chat\", got \"{}\"", self.source),
            )];
        }
        Vec::new()
    }
}

impl Validate for DocumentChunkMetadata {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        // Flattened on the wire, so the base fields share this path.
        self.base.validate_with(config, path)
    }
}

impl Validate for Document {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        self.metadata.validate_with(config, &format!("{path}.metadata"))
    }
}

impl Validate for DocumentChunk {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        let mut errors = self.metadata.validate_with(config, &format!("{path}.metadata"));
        if let Some(embedding) = &self.embedding {
            errors.extend(check_embedding(config, embedding, &format!("{path}.embedding")));
        }
        errors
    }
}

impl Validate for DocumentChunkWithScore {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        let mut errors = self.chunk.validate_with(config, path);
        if !self.score.is_finite() {
            errors.push(FieldViolation::new(format!("{path}.score"), "must be a finite number"));
        }
        errors
    }
}

impl Validate for DocumentWithChunks {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        let mut errors = self.document.validate_with(config, path);
        for (i, chunk) in self.chunks.iter().enumerate() {
            errors.extend(chunk.validate_with(config, &format!("{path}.chunks[{i}]")));
        }
        errors.extend(check_uniform_dimensions(
            self.chunks.iter().map(|c| c.embedding.as_deref()),
            &format!("{path}.chunks"),
        ));

        if config.require_chunk_owner {
            match self.document.id.as_deref() {
                None if !self.chunks.is_empty() => errors.push(FieldViolation::new(
                    format!("{path}.id"),
                    "is required when chunks must reference their owner",
                )),
                None => {}
                Some(owner) => {
                    for (i, chunk) in self.chunks.iter().enumerate() {
                        let message = match chunk.metadata.document_id.as_deref() {
                            None => "is required".to_string(),
                            Some(id) if id != owner => {
                                format!("expected \"{owner}\", got \"{id}\"")
                            }
                            Some(_) => continue,
                        };
                        errors.push(FieldViolation::new(
                            format!("{path}.chunks[{i}].metadata.document_id"),
                            message,
                        ));
                    }
                }
            }
        }
        errors
    }
}

impl Validate for Query {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        match config.max_top_k {
            Some(max) if self.top_k > max => vec![FieldViolation::new(
                format!("{path}.top_k"),
                format!("must be at most {max}, got {}", self.top_k),
            )],
            _ => Vec::new(),
        }
    }
}

impl Validate for QueryWithEmbedding {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        let mut errors = self.query.validate_with(config, path);
        errors.extend(check_embedding(config, &self.embedding, &format!("{path}.embedding")));
        errors
    }
}

impl Validate for QueryResult {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        let mut errors = Vec::new();
        for (i, result) in self.results.iter().enumerate() {
            let result_path = format!("{path}.results[{i}]");
            errors.extend(result.validate_with(config, &result_path));
            if config.require_chunk_owner && result.chunk.metadata.document_id.is_none() {
                errors.push(FieldViolation::new(
                    format!("{result_path}.metadata.document_id"),
                    "is required",
                ));
            }
        }
        errors.extend(check_uniform_dimensions(
            self.results.iter().map(|r| r.chunk.embedding.as_deref()),
            &format!("{path}.results"),
        ));
        errors
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate_with(&self, config: &SchemaConfig, path: &str) -> Vec<FieldViolation> {
        self.iter()
            .enumerate()
            .flat_map(|(i, item)| item.validate_with(config, &format!("{path}[{i}]")))
            .collect()
    }
}

fn check_embedding(
    config: &SchemaConfig,
    embedding: &[f64],
    path: &str,
) -> Vec<FieldViolation> {
    if embedding.is_empty() {
        return vec![FieldViolation::new(path, "must not be empty")];
    }
    let mut errors: Vec<FieldViolation> = embedding
        .iter()
        .enumerate()
        .filter(|(_, component)| !component.is_finite())
        .map(|(i, _)| FieldViolation::new(format!("{path}[{i}]"), "must be a finite number"))
        .collect();
    if let Some(dims) = config.embedding_dimensions {
        if embedding.len() != dims {
            errors.push(FieldViolation::new(
                path,
                format!("expected {dims} dimensions, got {}", embedding.len()),
            ));
        }
    }
    errors
}

/// Flag every embedding whose length differs from the first one seen.
fn check_uniform_dimensions<'a>(
    embeddings: impl Iterator<Item = Option<&'a [f64]>>,
    path: &str,
) -> Vec<FieldViolation> {
    let mut expected = None;
    let mut errors = Vec::new();
    for (i, embedding) in embeddings.enumerate() {
        let Some(embedding) = embedding else { continue };
        match expected {
            None => expected = Some(embedding.len()),
            Some(dims) if dims != embedding.len() => errors.push(FieldViolation::new(
                format!("{path}[{i}].embedding"),
                format!("expected {dims} dimensions, got {}", embedding.len()),
            )),
            Some(_) => {}
        }
    }
    errors
}

/// Last segment of the type's path, e.g. `QueryResult`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Deserialize and validate a model value from a JSON document.
///
/// Shorthand for [`SchemaValidator::parse`] with the default config.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] when the JSON does not have the
/// declared shape, and [`ValidationError::Invalid`] when it does but fails
/// the structural checks.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    SchemaValidator::default().parse(json)
}

/// Like [`from_json`], starting from an already-parsed JSON value.
///
/// # Errors
///
/// Same as [`from_json`].
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    SchemaValidator::default().parse_value(value)
}

/// Serialize a model value to JSON. Absent optional fields are omitted.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] if `serde_json` rejects the value.
pub fn to_json<T>(value: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(value)
        .map_err(|source| ValidationError::Malformed { type_name: short_type_name::<T>(), source })
}
