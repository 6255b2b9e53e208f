//! # retrieval-schema
//!
//! The data model shared by a document ingestion pipeline and a retrieval
//! pipeline: documents, their chunks and embeddings, provenance metadata,
//! metadata filters, and query/result envelopes.
//!
//! Ingestion splits a [`Document`] into [`DocumentChunk`]s and attaches
//! embeddings; retrieval takes a [`QueryWithEmbedding`] and answers with a
//! [`QueryResult`] of [`DocumentChunkWithScore`]s. This crate defines only the
//! shapes they exchange. Embedding, storage, and scoring live elsewhere.
//!
//! ## Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`metadata`] | [`Source`], [`ChatMetadata`], [`DocumentMetadata`], [`DocumentChunkMetadata`] |
//! | [`document`] | [`Document`], [`DocumentChunk`], [`DocumentChunkWithScore`], [`DocumentWithChunks`] |
//! | [`filter`] | [`DocumentMetadataFilter`] and its reference evaluation |
//! | [`query`] | [`Query`], [`QueryWithEmbedding`], [`QueryResult`] |
//! | [`validate`] | The [`Validate`] trait and JSON entry points |
//! | [`validator`] | [`SchemaValidator`], including response conformance |
//! | [`config`] | [`SchemaConfig`] policy knobs |
//!
//! ## Wire format
//!
//! Every type (de)serializes with serde using the snake_case field names
//! above. Absent optional fields are omitted and read back as `None`.
//! "Extends" relationships (chunk metadata, scored chunks, documents with
//! chunks, queries with embeddings) are flattened, so the JSON has a single
//! level of fields.
//!
//! ## Example
//!
//! ```rust,ignore
//! use retrieval_schema::{Document, DocumentChunk, DocumentMetadata, DocumentWithChunks, Source};
//!
//! let document = Document::new("Revenue grew 12%.", DocumentMetadata::from_source(Source::File));
//! let chunks = vec![DocumentChunk::from_document(&document, "Revenue grew 12%.")];
//! let composite = DocumentWithChunks::with_owner_references(document, chunks);
//! let query: retrieval_schema::Query = retrieval_schema::from_json(r#"{"query":"revenue"}"#)?;
//! assert_eq!(query.top_k, 3);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod query;
pub mod validate;
pub mod validator;

pub use config::{SchemaConfig, SchemaConfigBuilder};
pub use document::{Document, DocumentChunk, DocumentChunkWithScore, DocumentWithChunks};
pub use error::{FieldViolation, Result, ValidationError};
pub use filter::DocumentMetadataFilter;
pub use metadata::{ChatMetadata, DocumentChunkMetadata, DocumentMetadata, Source};
pub use query::{DEFAULT_TOP_K, Query, QueryResult, QueryWithEmbedding};
pub use validate::{Validate, from_json, from_value, to_json};
pub use validator::SchemaValidator;
