//! Provenance metadata for documents and chunks.
//!
//! [`DocumentMetadata::source`] is a loose string so that metadata can record
//! provenance tags this crate does not know about yet. Filters, on the other
//! hand, only search over the closed [`Source`] set and reject anything else.
//! Keep the two apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::ValidationError;

/// The origin system of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Email,
    File,
    Chat,
}

impl Source {
    /// Every known source, in declaration order.
    pub const ALL: [Source; 3] = [Source::Email, Source::File, Source::Chat];

    /// The wire value of this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Email => "email",
            Source::File => "file",
            Source::Chat => "chat",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSource(s.to_string()))
    }
}

/// Metadata specific to chat conversations.
///
/// Only meaningful when the owning [`DocumentMetadata::source`] is `"chat"`.
/// Nothing here enforces that; see
/// [`SchemaConfig::enforce_chat_source`](crate::SchemaConfig) for the opt-in check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMetadata {
    /// Identifier of the conversation.
    pub conversation_id: String,
    /// Identifier of the message within the conversation.
    pub message_id: String,
    /// Role of the author, e.g. `"user"` or `"assistant"`.
    pub author_role: String,
    /// When the message was created. Opaque, not parsed.
    pub create_time: String,
    /// When the message was last edited, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    /// Conversation title or message subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Free-text tags, in the order they were given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Message status, e.g. `"finished_successfully"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Open-ended extension data. Must be a JSON object when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_metadata: Option<Map<String, Value>>,
}

impl ChatMetadata {
    /// Chat metadata with the four required fields and nothing else.
    pub fn new(
        conversation_id: impl Into<String>,
        message_id: impl Into<String>,
        author_role: impl Into<String>,
        create_time: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
            author_role: author_role.into(),
            create_time: create_time.into(),
            update_time: None,
            subject: None,
            keywords: None,
            status: None,
            extra_metadata: None,
        }
    }

    /// Set when the message was last edited.
    pub fn with_update_time(mut self, update_time: impl Into<String>) -> Self {
        self.update_time = Some(update_time.into());
        self
    }

    /// Set the subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Replace the keyword list.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Set the message status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Insert one extension entry, creating the map on first use.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_metadata.get_or_insert_with(Map::new).insert(key.into(), value.into());
        self
    }
}

/// Everything about a document's origin except its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Provenance tag, conventionally one of [`Source`] but not limited to it.
    pub source: String,
    /// Identifier of the document within its source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Where the original can be fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Creation date/time. Stored as given; ISO-8601 is expected by
    /// [`DocumentMetadataFilter`](crate::DocumentMetadataFilter) date bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Who wrote the document, in the source system's terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Chat payload, valid only when `source == "chat"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_metadata: Option<ChatMetadata>,
}

impl DocumentMetadata {
    /// Metadata with only the provenance tag set.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_id: None,
            url: None,
            created_at: None,
            author: None,
            chat_metadata: None,
        }
    }

    /// Metadata tagged with one of the known sources.
    pub fn from_source(source: Source) -> Self {
        Self::new(source.as_str())
    }

    /// Set the identifier within the source system.
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Set the link to the original.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the creation date/time, kept verbatim.
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Attach chat metadata. The source is left as it is.
    pub fn with_chat_metadata(mut self, chat_metadata: ChatMetadata) -> Self {
        self.chat_metadata = Some(chat_metadata);
        self
    }

    /// The provenance tag as a [`Source`], if it is one of the known values.
    pub fn known_source(&self) -> Option<Source> {
        self.source.parse().ok()
    }

    /// False when chat metadata is attached to a non-chat document.
    pub fn chat_metadata_is_consistent(&self) -> bool {
        self.chat_metadata.is_none() || self.known_source() == Some(Source::Chat)
    }
}

/// Chunk metadata: the parent document's metadata plus an owner reference.
///
/// On the wire the document fields sit at the same level as `document_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunkMetadata {
    /// The parent document's metadata, flattened into this object.
    #[serde(flatten)]
    pub base: DocumentMetadata,
    /// Id of the owning [`Document`]. May be absent for chunks that were never
    /// persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl DocumentChunkMetadata {
    /// Chunk metadata without an owner reference.
    pub fn new(base: DocumentMetadata) -> Self {
        Self { base, document_id: None }
    }

    /// Copy of the document's metadata, owned by the document's id (if it has one).
    pub fn for_document(document: &Document) -> Self {
        Self { base: document.metadata.clone(), document_id: document.id.clone() }
    }

    /// Point the chunk at its owning document.
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

impl From<DocumentMetadata> for DocumentChunkMetadata {
    fn from(base: DocumentMetadata) -> Self {
        Self::new(base)
    }
}
