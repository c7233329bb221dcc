use super::*;
use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;

async fn create_test_database() -> Result<(TempDir, Database)> {
    let temp_dir = TempDir::new()?;
    let database = Database::new(temp_dir.path().join("rag.db")).await?;
    Ok((temp_dir, database))
}

fn sample_chunk(filename: &str, index: i64, embedding: Vec<f32>) -> NewChunk {
    NewChunk {
        filename: filename.to_string(),
        content: format!("{filename} body {index}"),
        chunk_index: index,
        embedding,
        metadata: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn schema_creates_chunk_table_and_index() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(database.pool())
    .await?;
    assert_eq!(tables, vec!["chunks".to_string()]);

    let indexes: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='index' AND name NOT LIKE 'sqlite_%'")
            .fetch_all(database.pool())
            .await?;
    assert!(indexes.contains(&"idx_chunks_filename".to_string()));

    Ok(())
}

#[tokio::test]
async fn reopening_an_existing_store_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("rag.db");

    let first = Database::new(&path).await?;
    first
        .insert_chunk(sample_chunk("a.txt", 0, vec![1.0]))
        .await?;
    drop(first);

    let second = Database::new(&path).await?;
    assert_eq!(second.count_chunks().await?, 1);

    Ok(())
}

#[tokio::test]
async fn insert_then_get_round_trips() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;

    let mut metadata = serde_json::Map::new();
    metadata.insert("lang".to_string(), json!("en"));
    let id = database
        .insert_chunk(NewChunk {
            filename: "doc.txt".to_string(),
            content: "hello chunk".to_string(),
            chunk_index: 0,
            embedding: vec![0.5, -0.5, 0.25],
            metadata: metadata.clone(),
        })
        .await?;

    let chunk = database.get_chunk(id).await?.expect("Chunk missing");
    assert_eq!(chunk.id, id);
    assert_eq!(chunk.filename, "doc.txt");
    assert_eq!(chunk.content, "hello chunk");
    assert_eq!(chunk.chunk_index, 0);
    assert_eq!(chunk.embedding, vec![0.5, -0.5, 0.25]);
    assert_eq!(chunk.metadata, metadata);

    Ok(())
}

#[tokio::test]
async fn get_missing_chunk_is_none() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;
    assert!(database.get_chunk(42).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn ids_are_monotonically_increasing() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;

    let mut previous = 0;
    for i in 0..5 {
        let id = database
            .insert_chunk(sample_chunk("mono.txt", i, vec![i as f32]))
            .await?;
        assert!(id > previous);
        previous = id;
    }

    Ok(())
}

#[tokio::test]
async fn scan_all_returns_decoded_chunks_in_insertion_order() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;

    database
        .insert_chunk(sample_chunk("b.txt", 0, vec![0.1]))
        .await?;
    database
        .insert_chunk(sample_chunk("a.txt", 0, vec![0.2]))
        .await?;
    database
        .insert_chunk(sample_chunk("a.txt", 1, vec![0.3]))
        .await?;

    let chunks = database.scan_all().await?;
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].filename, "b.txt");
    assert_eq!(chunks[1].filename, "a.txt");
    assert_eq!(chunks[2].chunk_index, 1);
    assert_eq!(chunks[1].embedding, vec![0.2]);

    Ok(())
}

#[tokio::test]
async fn aggregate_counts_follow_inserts() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;

    for i in 0..3 {
        database
            .insert_chunk(sample_chunk("first.txt", i, vec![0.0]))
            .await?;
    }
    for i in 0..2 {
        database
            .insert_chunk(sample_chunk("second.md", i, vec![0.0]))
            .await?;
    }

    assert_eq!(database.count_chunks().await?, 5);
    assert_eq!(database.count_distinct_filenames().await?, 2);

    let breakdown = database.chunks_per_filename().await?;
    assert_eq!(
        breakdown,
        vec![("first.txt".to_string(), 3), ("second.md".to_string(), 2)]
    );

    Ok(())
}

#[tokio::test]
async fn delete_by_filename_removes_exactly_that_document() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;

    for i in 0..4 {
        database
            .insert_chunk(sample_chunk("victim.txt", i, vec![0.0]))
            .await?;
    }
    database
        .insert_chunk(sample_chunk("survivor.txt", 0, vec![0.0]))
        .await?;

    let deleted = database.delete_by_filename("victim.txt").await?;
    assert_eq!(deleted, 4);
    assert_eq!(database.count_chunks().await?, 1);

    let breakdown = database.chunks_per_filename().await?;
    assert_eq!(breakdown, vec![("survivor.txt".to_string(), 1)]);

    Ok(())
}

#[tokio::test]
async fn delete_of_unknown_filename_touches_nothing() -> Result<()> {
    let (_temp_dir, database) = create_test_database().await?;

    database
        .insert_chunk(sample_chunk("kept.txt", 0, vec![0.0]))
        .await?;

    let deleted = database.delete_by_filename("ghost.txt").await?;
    assert_eq!(deleted, 0);
    assert_eq!(database.count_chunks().await?, 1);

    Ok(())
}
