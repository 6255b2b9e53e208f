//! Config-aware checking of inbound payloads and outbound query responses.
//!
//! # Example
//!
//! ```rust,ignore
//! use retrieval_schema::{Query, QueryResult, SchemaConfig, SchemaValidator};
//!
//! let validator = SchemaValidator::new(SchemaConfig::builder().max_top_k(50).build()?);
//! let query: Query = validator.parse(request_body)?;
//! let result: QueryResult = store.query(&query).await?;
//! validator.check_result(&query, &result)?;
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SchemaConfig;
use crate::document::DocumentWithChunks;
use crate::error::{FieldViolation, Result, ValidationError};
use crate::query::{Query, QueryResult, QueryWithEmbedding};
use crate::validate::{Validate, short_type_name};

/// Applies a [`SchemaConfig`] to model values.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    config: SchemaConfig,
}

impl SchemaValidator {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Deserialize `json` and run every check for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] for shape errors and
    /// [`ValidationError::Invalid`] for structural or policy violations.
    pub fn parse<T>(&self, json: &str) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let type_name = short_type_name::<T>();
        let value: T = serde_json::from_str(json).map_err(|source| {
            warn!(type_name, error = %source, "rejected malformed payload");
            ValidationError::Malformed { type_name, source }
        })?;
        self.check(&value)?;
        Ok(value)
    }

    /// Like [`parse`](Self::parse), starting from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn parse_value<T>(&self, value: Value) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let type_name = short_type_name::<T>();
        let value: T = serde_json::from_value(value).map_err(|source| {
            warn!(type_name, error = %source, "rejected malformed payload");
            ValidationError::Malformed { type_name, source }
        })?;
        self.check(&value)?;
        Ok(value)
    }

    /// Run the structural and policy checks for an already-built value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] listing every violation.
    pub fn check<T: Validate>(&self, value: &T) -> Result<()> {
        let type_name = short_type_name::<T>();
        finish(type_name, value.validate_with(&self.config, type_name))
    }

    pub fn check_query(&self, query: &Query) -> Result<()> {
        self.check(query)
    }

    pub fn check_query_with_embedding(&self, query: &QueryWithEmbedding) -> Result<()> {
        self.check(query)
    }

    pub fn check_document(&self, document: &DocumentWithChunks) -> Result<()> {
        self.check(document)
    }

    /// Check that `result` is a valid response to `query`.
    ///
    /// A valid response echoes the query text, holds at most `top_k`
    /// results, only holds chunks that satisfy the query's filter, and is
    /// ranked best first.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] listing every violation.
    pub fn check_result(&self, query: &Query, result: &QueryResult) -> Result<()> {
        let type_name = short_type_name::<QueryResult>();
        finish(type_name, self.result_violations(query, result, type_name))
    }

    /// Like [`check_result`](Self::check_result), and also require every
    /// returned embedding to match the query embedding's length.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] listing every violation.
    pub fn check_exchange(&self, query: &QueryWithEmbedding, result: &QueryResult) -> Result<()> {
        let type_name = short_type_name::<QueryResult>();
        let mut violations = self.result_violations(&query.query, result, type_name);
        let dims = query.embedding.len();
        for (i, scored) in result.results.iter().enumerate() {
            if let Some(len) = scored.chunk.dimensions() {
                if len != dims {
                    violations.push(FieldViolation::new(
                        format!("{type_name}.results[{i}].embedding"),
                        format!("expected {dims} dimensions to match the query, got {len}"),
                    ));
                }
            }
        }
        finish(type_name, violations)
    }

    fn result_violations(
        &self,
        query: &Query,
        result: &QueryResult,
        path: &str,
    ) -> Vec<FieldViolation> {
        let mut violations = result.validate_with(&self.config, path);

        if result.query != query.query {
            violations.push(FieldViolation::new(
                format!("{path}.query"),
                format!("expected \"{}\", got \"{}\"", query.query, result.query),
            ));
        }
        if result.results.len() > query.top_k {
            violations.push(FieldViolation::new(
                format!("{path}.results"),
                format!("expected at most {} results, got {}", query.top_k, result.results.len()),
            ));
        }
        if let Some(filter) = &query.filter {
            for (i, scored) in result.results.iter().enumerate() {
                if !filter.matches(&scored.chunk.metadata) {
                    violations.push(FieldViolation::new(
                        format!("{path}.results[{i}].metadata"),
                        "does not satisfy the query filter",
                    ));
                }
            }
        }
        for (i, pair) in result.results.windows(2).enumerate() {
            if pair[0].score < pair[1].score {
                violations.push(FieldViolation::new(
                    format!("{path}.results[{}].score", i + 1),
                    format!("{} ranks above the preceding score {}", pair[1].score, pair[0].score),
                ));
            }
        }
        violations
    }
}

fn finish(type_name: &'static str, violations: Vec<FieldViolation>) -> Result<()> {
    if violations.is_empty() {
        debug!(type_name, "validated");
        return Ok(());
    }
    warn!(type_name, violations = violations.len(), first = %violations[0], "validation failed");
    Err(ValidationError::Invalid { type_name, violations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentChunk, DocumentChunkWithScore};
    use crate::filter::DocumentMetadataFilter;
    use crate::metadata::{DocumentMetadata, Source};

    fn scored(source: Source, created_at: &str, score: f64) -> DocumentChunkWithScore {
        let metadata = DocumentMetadata::from_source(source).with_created_at(created_at);
        DocumentChunkWithScore::new(DocumentChunk::new("text", metadata.into()), score)
    }

    fn revenue_query() -> Query {
        Query::new("revenue 2023")
            .with_filter(
                DocumentMetadataFilter::new()
                    .with_source(Source::File)
                    .with_start_date("2023-01-01")
                    .with_end_date("2023-12-31"),
            )
            .with_top_k(2)
    }

    #[test]
    fn accepts_a_conforming_response() {
        let result = QueryResult::new(
            "revenue 2023",
            vec![scored(Source::File, "2023-03-01", 0.9), scored(Source::File, "2023-11-30", 0.4)],
        );
        SchemaValidator::default().check_result(&revenue_query(), &result).unwrap();
    }

    #[test]
    fn rejects_too_many_results() {
        let result = QueryResult::new(
            "revenue 2023",
            vec![
                scored(Source::File, "2023-03-01", 0.9),
                scored(Source::File, "2023-04-01", 0.8),
                scored(Source::File, "2023-05-01", 0.7),
            ],
        );
        let err = SchemaValidator::default().check_result(&revenue_query(), &result).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].path, "QueryResult.results");
    }

    #[test]
    fn rejects_results_outside_the_filter() {
        let result = QueryResult::new(
            "revenue 2023",
            vec![scored(Source::Email, "2023-03-01", 0.9), scored(Source::File, "2022-03-01", 0.4)],
        );
        let err = SchemaValidator::default().check_result(&revenue_query(), &result).unwrap_err();
        let paths: Vec<_> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["QueryResult.results[0].metadata", "QueryResult.results[1].metadata"]
        );
    }

    #[test]
    fn rejects_unranked_and_mismatched_echo() {
        let result = QueryResult::new(
            "revenue",
            vec![scored(Source::File, "2023-03-01", 0.2), scored(Source::File, "2023-04-01", 0.8)],
        );
        let err = SchemaValidator::default().check_result(&revenue_query(), &result).unwrap_err();
        let paths: Vec<_> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["QueryResult.query", "QueryResult.results[1].score"]);
    }

    #[test]
    fn exchange_requires_matching_dimensions() {
        let query = QueryWithEmbedding::new(Query::new("q"), vec![0.1, 0.2, 0.3]);
        let mut hit = scored(Source::File, "2023-01-01", 0.5);
        hit.chunk.embedding = Some(vec![0.1, 0.2]);
        let result = QueryResult::new("q", vec![hit]);
        let validator = SchemaValidator::default();
        assert!(validator.check_result(&query.query, &result).is_ok());
        let err = validator.check_exchange(&query, &result).unwrap_err();
        assert_eq!(err.violations()[0].path, "QueryResult.results[0].embedding");
    }

    #[test]
    fn parse_applies_policy() {
        let validator =
            SchemaValidator::new(SchemaConfig::builder().max_top_k(10).build().unwrap());
        assert!(validator.parse::<Query>(r#"{"query":"x","top_k":10}"#).is_ok());
        let err = validator.parse::<Query>(r#"{"query":"x","top_k":11}"#).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { type_name: "Query", .. }));
        let err = validator.parse::<Query>(r#"{"top_k":1}"#).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { type_name: "Query", .. }));
    }
}
