//! Query request and response envelopes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::document::DocumentChunkWithScore;
use crate::filter::DocumentMetadataFilter;

/// Number of results a query asks for when `top_k` is not given.
pub const DEFAULT_TOP_K: usize = 3;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// An explicit `null` is treated the same as an omitted `top_k`.
fn top_k_or_default<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<usize>::deserialize(deserializer)?.unwrap_or(DEFAULT_TOP_K))
}

/// A natural-language search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<DocumentMetadataFilter>,
    /// Upper bound on the number of results. Always populated, never a sentinel.
    #[serde(default = "default_top_k", deserialize_with = "top_k_or_default")]
    pub top_k: usize,
}

impl Query {
    /// A query with no filter and the default `top_k`.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), filter: None, top_k: DEFAULT_TOP_K }
    }

    pub fn with_filter(mut self, filter: DocumentMetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// A [`Query`] with its precomputed embedding.
///
/// Retrieval consumes this directly and never embeds the text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryWithEmbedding {
    #[serde(flatten)]
    pub query: Query,
    pub embedding: Vec<f64>,
}

impl QueryWithEmbedding {
    pub fn new(query: Query, embedding: Vec<f64>) -> Self {
        Self { query, embedding }
    }
}

/// The scored chunks returned for one query, best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// The original query text.
    pub query: String,
    pub results: Vec<DocumentChunkWithScore>,
}

impl QueryResult {
    pub fn new(query: impl Into<String>, results: Vec<DocumentChunkWithScore>) -> Self {
        Self { query: query.into(), results }
    }

    /// True when scores never increase from one result to the next.
    pub fn is_ranked(&self) -> bool {
        self.results.windows(2).all(|pair| pair[0].score >= pair[1].score)
    }
}
