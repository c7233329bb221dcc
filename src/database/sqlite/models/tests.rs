use super::*;
use serde_json::json;

#[test]
fn embedding_codec_round_trips() {
    let vector = vec![0.0, 1.0, -1.0, 0.5, f32::MAX, f32::MIN, 1e-38];
    let decoded = decode_embedding(&encode_embedding(&vector)).expect("Decode failed");
    assert_eq!(decoded, vector);
}

#[test]
fn embedding_encoding_is_four_bytes_per_element() {
    let vector = vec![0.1f32; 384];
    assert_eq!(encode_embedding(&vector).len(), 384 * 4);
}

#[test]
fn empty_embedding_round_trips() {
    let decoded = decode_embedding(&encode_embedding(&[])).expect("Decode failed");
    assert!(decoded.is_empty());
}

#[test]
fn truncated_blob_is_rejected() {
    let mut bytes = encode_embedding(&[1.0, 2.0]);
    bytes.pop();
    assert!(decode_embedding(&bytes).is_err());
}

#[test]
fn metadata_codec_round_trips() {
    let mut metadata = serde_json::Map::new();
    metadata.insert("author".to_string(), json!("alice"));
    metadata.insert("page".to_string(), json!(12));
    metadata.insert("tags".to_string(), json!(["a", "b"]));
    metadata.insert("nested".to_string(), json!({"k": null}));

    let encoded = encode_metadata(&metadata).expect("Encode failed");
    let decoded = decode_metadata(&encoded).expect("Decode failed");
    assert_eq!(decoded, metadata);
}

#[test]
fn empty_metadata_decodes_to_empty_map() {
    assert!(decode_metadata("").expect("Decode failed").is_empty());
    assert!(decode_metadata("  ").expect("Decode failed").is_empty());
    assert!(decode_metadata("{}").expect("Decode failed").is_empty());
    assert!(decode_metadata("null").expect("Decode failed").is_empty());
}

#[test]
fn non_object_metadata_is_rejected() {
    assert!(decode_metadata("[1, 2]").is_err());
    assert!(decode_metadata("\"just a string\"").is_err());
}

#[test]
fn chunk_row_decodes_into_stored_chunk() {
    let embedding = vec![0.25, 0.75];
    let row = ChunkRow {
        id: 7,
        filename: "report.txt".to_string(),
        content: "chunk body".to_string(),
        chunk_index: 2,
        embedding: encode_embedding(&embedding),
        metadata: "{\"source\":\"unit\"}".to_string(),
        created_at: chrono::Utc::now().naive_utc(),
    };

    let stored = row.into_stored().expect("Decode failed");
    assert_eq!(stored.id, 7);
    assert_eq!(stored.embedding, embedding);
    assert_eq!(stored.metadata.get("source"), Some(&json!("unit")));
}
