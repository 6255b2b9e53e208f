//! Wire-level behavior of the model types, exercised through the public API.

use retrieval_schema::{
    ChatMetadata, Document, DocumentChunk, DocumentChunkWithScore, DocumentMetadata,
    DocumentMetadataFilter, DocumentWithChunks, Query, QueryResult, QueryWithEmbedding,
    SchemaValidator, Source, ValidationError, from_json, from_value, to_json,
};
use serde_json::json;

fn chat_chunk_json() -> serde_json::Value {
    json!({
        "id": "c1",
        "text": "Can I get a refund?",
        "metadata": {
            "source": "chat",
            "source_id": "conv-9",
            "created_at": "2024-02-01T10:00:00Z",
            "author": "ana",
            "chat_metadata": {
                "conversation_id": "conv-9",
                "message_id": "msg-3",
                "author_role": "user",
                "create_time": "2024-02-01T10:00:00Z",
                "keywords": ["refund", "billing"],
                "extra_metadata": { "channel": "web", "priority": 2, "flags": [true, null] }
            },
            "document_id": "d9"
        },
        "embedding": [0.25, -0.5, 1.0],
        "score": 0.875
    })
}

#[test]
fn nested_chat_payload_round_trips_unchanged() {
    let input = chat_chunk_json();
    let parsed: DocumentChunkWithScore = from_value(input.clone()).unwrap();

    let chat = parsed.chunk.metadata.base.chat_metadata.as_ref().unwrap();
    assert_eq!(chat.message_id, "msg-3");
    assert_eq!(chat.update_time, None);
    assert_eq!(chat.extra_metadata.as_ref().unwrap()["flags"], json!([true, null]));
    assert_eq!(parsed.chunk.metadata.document_id.as_deref(), Some("d9"));

    let output: serde_json::Value = serde_json::from_str(&to_json(&parsed).unwrap()).unwrap();
    assert_eq!(output, input);
}

#[test]
fn absent_fields_stay_absent() {
    let chunk = DocumentChunk::new("t", DocumentMetadata::new("email").into());
    let json = to_json(&chunk).unwrap();
    assert_eq!(json, r#"{"text":"t","metadata":{"source":"email"}}"#);
    let back: DocumentChunk = from_json(&json).unwrap();
    assert_eq!(back.id, None);
    assert_eq!(back.embedding, None);
    assert_eq!(back.metadata.document_id, None);
    assert_eq!(back, chunk);
}

#[test]
fn filter_source_is_closed_but_metadata_source_is_open() {
    for source in ["email", "file", "chat"] {
        let filter: DocumentMetadataFilter = from_value(json!({ "source": source })).unwrap();
        assert_eq!(filter.source.map(|s| s.as_str()), Some(source));
    }
    for bad in ["Email", "slack", ""] {
        let err = from_value::<DocumentMetadataFilter>(json!({ "source": bad })).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }), "{bad} should be rejected");
    }
    let metadata: DocumentMetadata = from_value(json!({ "source": "slack" })).unwrap();
    assert_eq!(metadata.source, "slack");
}

#[test]
fn top_k_default_is_applied_at_construction() {
    assert_eq!(Query::new("x").top_k, 3);
    assert_eq!(Query::new("x").with_top_k(10).top_k, 10);
    let parsed: Query = from_json(r#"{"query":"x"}"#).unwrap();
    assert_eq!(parsed.top_k, 3);
    assert_eq!(to_json(&parsed).unwrap(), r#"{"query":"x","top_k":3}"#);
}

#[test]
fn document_required_fields() {
    assert!(from_json::<Document>(r#"{"metadata":{"source":"file"}}"#).is_err());
    assert!(from_json::<Document>(r#"{"text":"t"}"#).is_err());
    let minimal: Document = from_json(r#"{"text":"t","metadata":{"source":"file"}}"#).unwrap();
    assert_eq!(minimal, Document::new("t", DocumentMetadata::new("file")));
}

#[test]
fn wrong_shapes_are_rejected() {
    assert!(from_json::<Document>(r#"{"text":42,"metadata":{"source":"file"}}"#).is_err());
    let bad_embedding =
        json!({ "text": "t", "metadata": { "source": "file" }, "embedding": ["a"] });
    assert!(from_value::<DocumentChunk>(bad_embedding).is_err());
    let bad_extra = json!({
        "conversation_id": "c",
        "message_id": "m",
        "author_role": "user",
        "create_time": "t",
        "extra_metadata": "oops"
    });
    assert!(from_value::<ChatMetadata>(bad_extra).is_err());
    assert!(from_json::<Query>(r#"{"query":"x","filter":{"start_date":7}}"#).is_err());
}

#[test]
fn builder_sets_owner_references() {
    let document =
        Document::new("Two chunks.", DocumentMetadata::from_source(Source::File)).with_id("d1");
    let chunks = vec![
        DocumentChunk::new("Two", DocumentMetadata::from_source(Source::File).into()),
        DocumentChunk::new("chunks.", DocumentMetadata::from_source(Source::File).into()),
    ];
    let composite = DocumentWithChunks::with_owner_references(document, chunks);
    assert_eq!(composite.chunks.len(), 2);
    for chunk in &composite.chunks {
        assert_eq!(chunk.metadata.document_id.as_deref(), Some("d1"));
    }
}

#[test]
fn builder_assigns_missing_document_id() {
    let document = Document::new("text", DocumentMetadata::new("file"));
    let chunk = DocumentChunk::new("text", DocumentMetadata::new("file").into());
    let composite = DocumentWithChunks::with_owner_references(document, vec![chunk]);
    let id = composite.document.id.clone().unwrap();
    assert_eq!(composite.chunks[0].metadata.document_id.as_deref(), Some(id.as_str()));
}

#[test]
fn score_is_required_only_on_scored_chunks() {
    let plain = r#"{"text":"t","metadata":{"source":"file"}}"#;
    assert!(from_json::<DocumentChunk>(plain).is_ok());
    let err = from_json::<DocumentChunkWithScore>(plain).unwrap_err();
    assert!(err.to_string().contains("score"));
}

#[test]
fn query_with_embedding_is_consumed_as_sent() {
    let query: QueryWithEmbedding = from_value(json!({
        "query": "revenue 2023",
        "filter": { "source": "file", "start_date": "2023-01-01", "end_date": "2023-12-31" },
        "top_k": 2,
        "embedding": [0.1, 0.2]
    }))
    .unwrap();
    assert_eq!(query.query.top_k, 2);
    assert_eq!(query.query.filter.as_ref().unwrap().source, Some(Source::File));
    assert_eq!(query.embedding.len(), 2);
}

fn hit(source: Source, created_at: &str, score: f64) -> DocumentChunkWithScore {
    DocumentChunkWithScore::new(
        DocumentChunk::new(
            "revenue line",
            DocumentMetadata::from_source(source).with_created_at(created_at).into(),
        ),
        score,
    )
}

#[test]
fn end_to_end_response_conformance() {
    let query = Query::new("revenue 2023")
        .with_filter(
            DocumentMetadataFilter::new()
                .with_source(Source::File)
                .with_start_date("2023-01-01")
                .with_end_date("2023-12-31"),
        )
        .with_top_k(2);
    let validator = SchemaValidator::default();

    let valid = QueryResult::new(
        "revenue 2023",
        vec![hit(Source::File, "2023-08-01", 0.92), hit(Source::File, "2023-02-14", 0.61)],
    );
    assert!(validator.check_result(&query, &valid).is_ok());

    let too_many = QueryResult::new(
        "revenue 2023",
        vec![
            hit(Source::File, "2023-08-01", 0.92),
            hit(Source::File, "2023-02-14", 0.61),
            hit(Source::File, "2023-03-14", 0.40),
        ],
    );
    assert!(validator.check_result(&query, &too_many).is_err());

    let wrong_source = QueryResult::new(
        "revenue 2023",
        vec![hit(Source::File, "2023-08-01", 0.92), hit(Source::Email, "2023-02-14", 0.61)],
    );
    let err = validator.check_result(&query, &wrong_source).unwrap_err();
    assert_eq!(err.violations()[0].path, "QueryResult.results[1].metadata");
}
