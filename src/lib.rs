//! # fileshelf
//!
//! Accepts uploaded files, extracts their text by extension (plain text,
//! CSV, spreadsheet, PDF), keeps the text and metadata in SQLite, and
//! serves it back as JSON or CSV.
//!
//! ```no_run
//! use std::sync::Arc;
//! use fileshelf::files::{FileService, SqliteStore, Upload};
//!
//! # async fn example() -> fileshelf::Result<()> {
//! let service = FileService::new(Arc::new(SqliteStore::in_memory()?));
//! let records = service
//!     .ingest(vec![Upload::new(Some("data.csv".into()), b"a,b\nc,d".to_vec())])
//!     .await?;
//! assert_eq!(records[0].extracted_text, "a,b\nc,d\n");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod gateway;

pub use error::{Error, ExtractError, Result};
