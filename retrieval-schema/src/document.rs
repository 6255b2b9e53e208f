//! Data types for documents, chunks, and scored chunks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata::{DocumentChunkMetadata, DocumentMetadata};

/// A source document to be upserted into a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier. Assigned by the caller or by [`Document::ensure_id`]
    /// before chunking, so chunks can carry a stable owner id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Full text content, before chunking.
    pub text: String,
    /// Provenance of the whole document.
    pub metadata: DocumentMetadata,
}

impl Document {
    /// A document without an id.
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self { id: None, text: text.into(), metadata }
    }

    /// Set the document id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Return the document id, generating a UUID v4 first if it is absent.
    pub fn ensure_id(&mut self) -> &str {
        self.id.get_or_insert_with(|| Uuid::new_v4().to_string())
    }
}

/// A segment of a [`Document`], optionally carrying its embedding.
///
/// A chunk without an embedding is not yet indexable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Assigned by the store when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The chunk's slice of the document text.
    pub text: String,
    /// Parent metadata plus the owner reference.
    pub metadata: DocumentChunkMetadata,
    /// Vector representation of `text`, absent until embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f64>>,
}

impl DocumentChunk {
    pub fn new(text: impl Into<String>, metadata: DocumentChunkMetadata) -> Self {
        Self { id: None, text: text.into(), metadata, embedding: None }
    }

    /// A chunk of `document` whose metadata is copied from it, owner id included.
    pub fn from_document(document: &Document, text: impl Into<String>) -> Self {
        Self::new(text, DocumentChunkMetadata::for_document(document))
    }

    /// Set the chunk id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach the embedding.
    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn is_indexable(&self) -> bool {
        self.embedding.is_some()
    }

    /// Length of the embedding, if there is one.
    pub fn dimensions(&self) -> Option<usize> {
        self.embedding.as_ref().map(Vec::len)
    }
}

/// A retrieved [`DocumentChunk`] paired with a relevance score.
///
/// Higher scores are more relevant. The scale is whatever the producing
/// store uses. Only ever produced as a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunkWithScore {
    /// The retrieved chunk, flattened into this object.
    #[serde(flatten)]
    pub chunk: DocumentChunk,
    /// Relevance of the chunk to the query. Higher is better.
    pub score: f64,
}

impl DocumentChunkWithScore {
    pub fn new(chunk: DocumentChunk, score: f64) -> Self {
        Self { chunk, score }
    }
}

/// A [`Document`] together with the chunks produced from it, in text order.
///
/// Only a transfer shape between ingestion stages. Building one does not
/// chunk anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentWithChunks {
    /// The source document, flattened into this object.
    #[serde(flatten)]
    pub document: Document,
    /// Chunks in text order.
    pub chunks: Vec<DocumentChunk>,
}

impl DocumentWithChunks {
    /// Pair a document with its chunks as given.
    pub fn new(document: Document, chunks: Vec<DocumentChunk>) -> Self {
        Self { document, chunks }
    }

    /// Pair a document with its chunks, pointing every chunk at the document.
    ///
    /// Assigns the document an id first if it has none.
    pub fn with_owner_references(mut document: Document, mut chunks: Vec<DocumentChunk>) -> Self {
        let id = document.ensure_id().to_string();
        for chunk in &mut chunks {
            chunk.metadata.document_id = Some(id.clone());
        }
        Self { document, chunks }
    }

    /// Chunks whose owner reference is missing or points elsewhere.
    pub fn orphaned_chunks(&self) -> impl Iterator<Item = (usize, &DocumentChunk)> {
        let owner = self.document.id.as_deref();
        self.chunks.iter().enumerate().filter(move |(_, chunk)| {
            owner.is_none() || chunk.metadata.document_id.as_deref() != owner
        })
    }
}
