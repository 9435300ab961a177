//! SQLite persistence for the vector store.
//!
//! The index directory holds a single `index.sqlite` file with a `meta`
//! table (dimension, format version) and an `entries` table keyed by the
//! entry's insertion sequence. Saves are incremental and transactional.

use crate::types::{Chunk, IndexEntry};
use crate::vector_index::VectorStore;
use chrono::{DateTime, Utc};
use docbrain_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// File name of the index database inside the index directory.
pub const INDEX_FILE: &str = "index.sqlite";

/// Bumped whenever the table layout changes.
const FORMAT_VERSION: i64 = 1;

fn storage(context: &'static str) -> impl FnOnce(rusqlite::Error) -> AppError {
    move |e| AppError::Storage(format!("{}: {}", context, e))
}

/// Open the index database, creating tables as needed.
fn open_index(db_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(db_path).map_err(storage("Failed to open SQLite index"))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entries (
            seq INTEGER PRIMARY KEY,
            source TEXT NOT NULL,
            sequence_index INTEGER NOT NULL,
            char_start INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            ingested_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_source ON entries(source);
        "#,
    )
    .map_err(storage("Failed to create tables"))?;

    Ok(conn)
}

fn read_meta(conn: &Connection, key: &str) -> AppResult<Option<i64>> {
    conn.query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
        row.get::<_, i64>(0)
    })
    .optional()
    .map_err(storage("Failed to read index metadata"))
}

/// Load a store from `dir`.
///
/// Returns `None` when the directory does not exist, and an empty store when
/// the directory exists without an index file.
pub fn load_store(dir: &Path) -> AppResult<Option<VectorStore>> {
    if !dir.exists() {
        tracing::debug!("No index directory at {:?}", dir);
        return Ok(None);
    }

    let db_path = dir.join(INDEX_FILE);
    if !db_path.exists() {
        tracing::debug!("Index directory {:?} has no {}", dir, INDEX_FILE);
        return Ok(Some(VectorStore::new()));
    }

    let conn = open_index(&db_path)?;

    if let Some(version) = read_meta(&conn, "format_version")? {
        if version != FORMAT_VERSION {
            return Err(AppError::Storage(format!(
                "Unsupported index format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }
    }

    let dimension = read_meta(&conn, "dimension")?.map(|d| d as usize);

    let mut stmt = conn
        .prepare(
            "SELECT source, sequence_index, char_start, text, embedding, ingested_at
             FROM entries ORDER BY seq",
        )
        .map_err(storage("Failed to prepare query"))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Vec<u8>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(storage("Failed to query entries"))?;

    let mut entries = Vec::new();
    for row in rows {
        let (source, sequence_index, char_start, text, blob, ingested_at) =
            row.map_err(storage("Failed to read entry"))?;

        let embedding = bytes_to_embedding(&blob)?;
        if Some(embedding.len()) != dimension {
            return Err(AppError::Storage(format!(
                "Corrupt index: entry has dimension {}, index records {:?}",
                embedding.len(),
                dimension
            )));
        }

        let ingested_at = DateTime::parse_from_rfc3339(&ingested_at)
            .map_err(|e| AppError::Storage(format!("Invalid ingestion timestamp: {}", e)))?
            .with_timezone(&Utc);

        entries.push(IndexEntry {
            embedding,
            chunk: Chunk {
                text,
                source,
                sequence_index: sequence_index as usize,
                char_start: char_start as usize,
            },
            ingested_at,
        });
    }

    tracing::info!("Loaded {} index entries from {:?}", entries.len(), db_path);

    Ok(Some(VectorStore::from_parts(dimension, entries)))
}

/// Persist `entries` as sequence numbers `start_seq..`.
///
/// Runs in one transaction: on any failure the file keeps its prior
/// contents. Rows at or beyond `start_seq` left by an earlier process are
/// replaced so disk always mirrors memory.
pub fn save_entries(
    dir: &Path,
    dimension: usize,
    start_seq: usize,
    entries: &[IndexEntry],
) -> AppResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::Storage(format!("Failed to create index directory: {}", e)))?;

    let db_path = dir.join(INDEX_FILE);
    let mut conn = open_index(&db_path)?;
    let tx = conn
        .transaction()
        .map_err(storage("Failed to begin transaction"))?;

    if let Some(existing) = read_meta(&tx, "dimension")? {
        if existing as usize != dimension {
            return Err(AppError::Storage(format!(
                "Index on disk has dimension {}, refusing to write dimension {}",
                existing, dimension
            )));
        }
    }

    let stale = tx
        .execute("DELETE FROM entries WHERE seq >= ?1", [start_seq as i64])
        .map_err(storage("Failed to clear stale entries"))?;
    if stale > 0 {
        tracing::warn!("Replaced {} stale index entries on disk", stale);
    }

    let persisted: i64 = tx
        .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
        .map_err(storage("Failed to count entries"))?;
    if persisted as usize != start_seq {
        return Err(AppError::Storage(format!(
            "Index on disk holds {} entries, expected {}",
            persisted, start_seq
        )));
    }

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO entries (seq, source, sequence_index, char_start, text, embedding, ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .map_err(storage("Failed to prepare insert"))?;

        for (offset, entry) in entries.iter().enumerate() {
            stmt.execute(params![
                (start_seq + offset) as i64,
                entry.chunk.source,
                entry.chunk.sequence_index as i64,
                entry.chunk.char_start as i64,
                entry.chunk.text,
                embedding_to_bytes(&entry.embedding),
                entry.ingested_at.to_rfc3339(),
            ])
            .map_err(storage("Failed to insert entry"))?;
        }
    }

    tx.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('dimension', ?1), ('format_version', ?2)",
        params![dimension as i64, FORMAT_VERSION],
    )
    .map_err(storage("Failed to write index metadata"))?;

    tx.commit().map_err(storage("Failed to commit index"))?;

    tracing::debug!(
        "Saved {} entries to {:?} (total {})",
        entries.len(),
        db_path,
        start_seq + entries.len()
    );

    Ok(())
}

/// [`load_store`] on the blocking pool.
pub async fn load(dir: PathBuf) -> AppResult<Option<VectorStore>> {
    tokio::task::spawn_blocking(move || load_store(&dir))
        .await
        .map_err(|e| AppError::Storage(format!("Index load task failed: {}", e)))?
}

/// [`save_entries`] on the blocking pool.
pub async fn save(
    dir: PathBuf,
    dimension: usize,
    start_seq: usize,
    entries: Vec<IndexEntry>,
) -> AppResult<()> {
    tokio::task::spawn_blocking(move || save_entries(&dir, dimension, start_seq, &entries))
        .await
        .map_err(|e| AppError::Storage(format!("Index save task failed: {}", e)))?
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Storage(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(text: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry::new(
            Chunk {
                text: text.to_string(),
                source: "notes.txt".to_string(),
                sequence_index: 0,
                char_start: 0,
            },
            embedding,
        )
    }

    #[test]
    fn test_load_missing_dir_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(load_store(&temp.path().join("vectors")).unwrap().is_none());
    }

    #[test]
    fn test_load_dir_without_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = load_store(temp.path()).unwrap().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_incremental_save_and_load() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("vectors");

        save_entries(&dir, 2, 0, &[entry("one", vec![1.0, 0.0])]).unwrap();
        save_entries(&dir, 2, 1, &[entry("two", vec![0.0, 1.0])]).unwrap();

        let store = load_store(&dir).unwrap().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.entries()[0].chunk.text, "one");
        assert_eq!(store.entries()[1].embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn test_dimension_mismatch_leaves_disk_untouched() {
        let temp = TempDir::new().unwrap();
        save_entries(temp.path(), 2, 0, &[entry("one", vec![1.0, 0.0])]).unwrap();

        let result = save_entries(temp.path(), 3, 1, &[entry("two", vec![1.0, 0.0, 0.0])]);
        assert!(matches!(result, Err(AppError::Storage(_))));

        let store = load_store(temp.path()).unwrap().unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stale_rows_replaced() {
        let temp = TempDir::new().unwrap();
        save_entries(
            temp.path(),
            1,
            0,
            &[entry("a", vec![1.0]), entry("b", vec![1.0])],
        )
        .unwrap();

        // Memory only knows about the first entry
        save_entries(temp.path(), 1, 1, &[entry("c", vec![1.0])]).unwrap();

        let store = load_store(temp.path()).unwrap().unwrap();
        let texts: Vec<&str> = store.entries().iter().map(|e| e.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[test]
    fn test_behind_disk_is_error() {
        let temp = TempDir::new().unwrap();
        let result = save_entries(temp.path(), 1, 3, &[entry("a", vec![1.0])]);
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[test]
    fn test_embedding_bytes() {
        let original = vec![0.5, -1.25, 3.0];
        let decoded = bytes_to_embedding(&embedding_to_bytes(&original)).unwrap();
        assert_eq!(decoded, original);
        assert!(bytes_to_embedding(&[0, 1, 2]).is_err());
    }
}
