//! File records: upload, text extraction, storage and export.
//!
//! An upload is classified by file name, its text extracted, and the result
//! stored as an immutable [`FileRecord`]. Stored records can be listed,
//! fetched by id, and exported as JSON or CSV.

pub mod schema;
pub mod extract;
pub mod index;
pub mod export;
pub mod service;

pub use schema::{FileKind, FileRecord};
pub use index::{MemoryStore, RecordStore, SqliteStore};
pub use export::ExportFormat;
pub use service::{FileService, Upload};
