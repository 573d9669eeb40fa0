use super::schema::{FileKind, FileRecord};
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::{Mutex, RwLock};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// Persistence for file records. Records are append-only: there is no
/// update or delete.
pub trait RecordStore: Send + Sync {
    /// Assign a fresh id, stamp the current time, and persist.
    fn create(&self, file_name: &str, file_kind: FileKind, text: &str) -> Result<FileRecord>;

    /// Fetch one record, or `Error::NotFound`.
    fn get_by_id(&self, id: i64) -> Result<FileRecord>;

    /// Every record, in insertion order.
    fn list_all(&self) -> Result<Vec<FileRecord>>;

    fn count(&self) -> Result<usize>;
}

const SELECT_COLUMNS: &str = "SELECT id, file_name, file_kind, extracted_text, uploaded_at FROM files";

/// SQLite-backed record store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             PRAGMA cache_size   = -2000;
             PRAGMA temp_store   = MEMORY;",
        )?;

        Self::init_schema(&conn)?;
        debug!(path = %db_path.display(), "opened sqlite record store");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// A private database that lives as long as the store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name       TEXT NOT NULL,
                file_kind       TEXT NOT NULL,
                extracted_text  TEXT NOT NULL,
                uploaded_at     TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
        let uploaded_at: String = row.get(4)?;
        let uploaded_at = DateTime::parse_from_rfc3339(&uploaded_at)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?
            .with_timezone(&Utc);
        Ok(FileRecord {
            id: row.get(0)?,
            file_name: row.get(1)?,
            file_kind: row.get(2)?,
            extracted_text: row.get(3)?,
            uploaded_at,
        })
    }
}

impl RecordStore for SqliteStore {
    fn create(&self, file_name: &str, file_kind: FileKind, text: &str) -> Result<FileRecord> {
        let uploaded_at = Utc::now();
        // Insert and rowid read happen under one lock so ids cannot cross
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO files (file_name, file_kind, extracted_text, uploaded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                file_name,
                file_kind,
                text,
                uploaded_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(FileRecord {
            id,
            file_name: file_name.to_string(),
            file_kind,
            extracted_text: text.to_string(),
            uploaded_at,
        })
    }

    fn get_by_id(&self, id: i64) -> Result<FileRecord> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        let record = stmt
            .query_row(params![id], Self::row_to_record)
            .optional()
            .map_err(map_row_error)?;
        record.ok_or(Error::NotFound(id))
    }

    fn list_all(&self) -> Result<Vec<FileRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
        let rows = stmt.query_map([], Self::row_to_record)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_row_error)?;
        Ok(records)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn map_row_error(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::FromSqlConversionFailure(col, _, source) => {
            Error::Corrupt(format!("column {col}: {source}"))
        }
        other => Error::Store(other),
    }
}

impl ToSql for FileKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FileKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Process-local record store; contents vanish with the process.
pub struct MemoryStore {
    records: RwLock<Vec<FileRecord>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn create(&self, file_name: &str, file_kind: FileKind, text: &str) -> Result<FileRecord> {
        let record = FileRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            file_name: file_name.to_string(),
            file_kind,
            extracted_text: text.to_string(),
            uploaded_at: Utc::now(),
        };
        let mut records = self.records.write();
        // Keep the vector sorted by id even when writers race
        let pos = records.partition_point(|r| r.id < record.id);
        records.insert(pos, record.clone());
        Ok(record)
    }

    fn get_by_id(&self, id: i64) -> Result<FileRecord> {
        let records = self.records.read();
        records
            .binary_search_by_key(&id, |r| r.id)
            .map(|idx| records[idx].clone())
            .map_err(|_| Error::NotFound(id))
    }

    fn list_all(&self) -> Result<Vec<FileRecord>> {
        Ok(self.records.read().clone())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn stores() -> Vec<(&'static str, Box<dyn RecordStore>)> {
        vec![
            ("sqlite", Box::new(SqliteStore::in_memory().unwrap()) as Box<dyn RecordStore>),
            ("memory", Box::new(MemoryStore::new()) as Box<dyn RecordStore>),
        ]
    }

    #[test]
    fn create_then_get_returns_equal_record() {
        for (name, store) in stores() {
            let created = store.create("a.txt", FileKind::Text, "hello").unwrap();
            let fetched = store.get_by_id(created.id).unwrap();
            assert_eq!(created, fetched, "{name}");
        }
    }

    #[test]
    fn missing_id_is_not_found() {
        for (name, store) in stores() {
            let err = store.get_by_id(99).unwrap_err();
            assert!(matches!(err, Error::NotFound(99)), "{name}: {err:?}");
        }
    }

    #[test]
    fn list_all_returns_every_record_in_insertion_order() {
        for (name, store) in stores() {
            let mut ids = Vec::new();
            for i in 0..5 {
                ids.push(store.create(&format!("f{i}.csv"), FileKind::Csv, "a,b\n").unwrap().id);
            }
            let listed = store.list_all().unwrap();
            assert_eq!(listed.len(), 5, "{name}");
            assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), ids, "{name}");
            for record in &listed {
                assert_eq!(&store.get_by_id(record.id).unwrap(), record, "{name}");
            }
            assert_eq!(store.count().unwrap(), 5, "{name}");
        }
    }

    #[test]
    fn ids_are_unique_under_concurrent_creates() {
        let stores: Vec<Arc<dyn RecordStore>> = vec![
            Arc::new(SqliteStore::in_memory().unwrap()) as Arc<dyn RecordStore>,
            Arc::new(MemoryStore::new()) as Arc<dyn RecordStore>,
        ];
        for store in stores {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let store = Arc::clone(&store);
                    std::thread::spawn(move || {
                        (0..25)
                            .map(|i| {
                                store
                                    .create(&format!("t{t}-{i}.txt"), FileKind::Text, "x")
                                    .unwrap()
                                    .id
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            let ids: HashSet<i64> = handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect();
            assert_eq!(ids.len(), 200);
            assert_eq!(store.list_all().unwrap().len(), 200);
        }
    }

    #[test]
    fn sqlite_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("files.db");

        let created = {
            let store = SqliteStore::open(&db_path).unwrap();
            store.create("sheet.xlsx", FileKind::Spreadsheet, "a,b\n").unwrap()
        };

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.get_by_id(created.id).unwrap(), created);
        let next = store.create("b.txt", FileKind::Text, "").unwrap();
        assert!(next.id > created.id);
    }

    #[test]
    fn unknown_stored_kind_is_reported_as_corrupt() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO files (file_name, file_kind, extracted_text, uploaded_at)
                 VALUES ('x', 'excel', '', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        let err = store.get_by_id(1).unwrap_err();
        assert!(matches!(err, Error::Corrupt(_)), "{err:?}");
    }
}
