//! SQLite-backed vector store.

use super::{rank, VectorStore};
use crate::types::{Chunk, CollectionInfo, SearchHits, StoredChunk};
use chrono::{DateTime, Utc};
use newsdesk_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    embedding_model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    chunk_count INTEGER NOT NULL,
    source_count INTEGER NOT NULL,
    generation_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    collection TEXT NOT NULL,
    position INTEGER NOT NULL,
    chunk_id TEXT NOT NULL,
    source_id TEXT NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    PRIMARY KEY (collection, position)
);
"#;

const INFO_COLUMNS: &str =
    "name, embedding_model, dimensions, chunk_count, source_count, generation_id, created_at";

/// Persistent store in a single SQLite file.
///
/// Embeddings are little-endian `f32` blobs. Search scans the collection and
/// ranks in process.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create store directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite store: {}", e)))?;

        tracing::debug!("Opened SQLite store at {:?}", db_path);
        Self::init(conn)
    }

    /// Store that lives only as long as this value.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite store: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("SQLite store lock poisoned".to_string()))
    }

    fn load_chunks(conn: &Connection, collection: &str) -> AppResult<Vec<StoredChunk>> {
        let mut stmt = conn
            .prepare(
                "SELECT chunk_id, source_id, text, embedding FROM chunks
                 WHERE collection = ?1 ORDER BY position",
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![collection], |row| {
                let bytes: Vec<u8> = row.get(3)?;
                Ok((
                    Chunk {
                        chunk_id: row.get(0)?,
                        source_id: row.get(1)?,
                        text: row.get(2)?,
                    },
                    bytes,
                ))
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

        let mut chunks = Vec::new();
        for row in rows {
            let (chunk, bytes) =
                row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))?;
            chunks.push(StoredChunk {
                chunk,
                embedding: bytes_to_embedding(&bytes)?,
            });
        }
        Ok(chunks)
    }
}

impl VectorStore for SqliteStore {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    fn replace_collection(&self, info: CollectionInfo, chunks: Vec<StoredChunk>) -> AppResult<()> {
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != info.dimensions) {
            return Err(AppError::Knowledge(format!(
                "Chunk {} has {} dimensions, collection expects {}",
                bad.chunk.chunk_id,
                bad.embedding.len(),
                info.dimensions
            )));
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

        tx.execute("DELETE FROM chunks WHERE collection = ?1", params![info.name])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;
        tx.execute("DELETE FROM collections WHERE name = ?1", params![info.name])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete collection: {}", e)))?;

        tx.execute(
            &format!(
                "INSERT INTO collections ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                INFO_COLUMNS
            ),
            params![
                info.name,
                info.embedding_model,
                info.dimensions as i64,
                info.chunk_count as i64,
                info.source_count as i64,
                info.generation_id,
                info.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to insert collection: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (collection, position, chunk_id, source_id, text, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(|e| AppError::Knowledge(format!("Failed to prepare insert: {}", e)))?;

            for (position, stored) in chunks.iter().enumerate() {
                stmt.execute(params![
                    info.name,
                    position as i64,
                    stored.chunk.chunk_id,
                    stored.chunk.source_id,
                    stored.chunk.text,
                    embedding_to_bytes(&stored.embedding),
                ])
                .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit collection: {}", e)))?;

        tracing::debug!(
            collection = %info.name,
            generation = %info.generation_id,
            chunks = chunks.len(),
            "Replaced SQLite collection"
        );
        Ok(())
    }

    fn search(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
    ) -> AppResult<SearchHits> {
        let conn = self.lock()?;
        let info = read_info(&conn, collection)?
            .ok_or_else(|| AppError::CollectionNotFound(collection.to_string()))?;

        let chunks = Self::load_chunks(&conn, collection)?;
        let results = rank(query, &chunks, k);

        tracing::debug!(
            "Retrieved {} chunks from {} candidates (requested top-{})",
            results.len(),
            chunks.len(),
            k
        );
        Ok(SearchHits { info, results })
    }

    fn collection_info(&self, collection: &str) -> AppResult<Option<CollectionInfo>> {
        let conn = self.lock()?;
        read_info(&conn, collection)
    }

    fn list_collections(&self) -> AppResult<Vec<CollectionInfo>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM collections ORDER BY name", INFO_COLUMNS))
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], info_from_row)
            .map_err(|e| AppError::Knowledge(format!("Failed to list collections: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Knowledge(format!("Failed to read collection: {}", e)))
    }

    fn drop_collection(&self, collection: &str) -> AppResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

        tx.execute("DELETE FROM chunks WHERE collection = ?1", params![collection])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;
        let removed = tx
            .execute("DELETE FROM collections WHERE name = ?1", params![collection])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete collection: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit drop: {}", e)))?;

        tracing::info!("Dropped collection '{}'", collection);
        Ok(removed > 0)
    }
}

fn read_info(conn: &Connection, collection: &str) -> AppResult<Option<CollectionInfo>> {
    conn.query_row(
        &format!("SELECT {} FROM collections WHERE name = ?1", INFO_COLUMNS),
        params![collection],
        info_from_row,
    )
    .optional()
    .map_err(|e| AppError::Knowledge(format!("Failed to read collection info: {}", e)))
}

fn info_from_row(row: &Row<'_>) -> rusqlite::Result<CollectionInfo> {
    let created_at: String = row.get(6)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(CollectionInfo {
        name: row.get(0)?,
        embedding_model: row.get(1)?,
        dimensions: row.get::<_, i64>(2)? as usize,
        chunk_count: row.get::<_, i64>(3)? as usize,
        source_count: row.get::<_, i64>(4)? as usize,
        generation_id: row.get(5)?,
        created_at,
    })
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
