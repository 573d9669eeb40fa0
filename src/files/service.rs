use super::export::ExportFormat;
use super::extract::extract_text;
use super::index::RecordStore;
use super::schema::{ExtractedFile, FileKind, FileRecord, UNKNOWN_FILE_NAME};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One uploaded file as received from a caller.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: Option<String>, data: Vec<u8>) -> Self {
        Self { file_name, data }
    }
}

/// Upload, lookup and export entry points over a shared record store.
#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn RecordStore>,
}

impl FileService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Classify and extract one upload without persisting anything.
    pub fn prepare(upload: &Upload) -> Result<ExtractedFile> {
        let name = upload.file_name.as_deref().filter(|n| !n.is_empty());
        let file_kind = FileKind::from_file_name(name);
        let file_name = name.unwrap_or(UNKNOWN_FILE_NAME).to_string();

        let text = extract_text(&upload.data, file_kind).map_err(|e| {
            warn!(file = %file_name, kind = %file_kind, error = %e, "extraction failed");
            e
        })?;
        debug!(file = %file_name, kind = %file_kind, bytes = upload.data.len(), chars = text.len(), "extracted");

        Ok(ExtractedFile {
            file_name,
            file_kind,
            text,
        })
    }

    /// Extract every upload, then persist them all. If any extraction
    /// fails nothing from the batch is stored.
    pub async fn ingest(&self, uploads: Vec<Upload>) -> Result<Vec<FileRecord>> {
        let extracted = tokio::task::spawn_blocking(move || {
            uploads.iter().map(Self::prepare).collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| Error::Join(e.to_string()))??;

        self.persist(extracted)
    }

    fn persist(&self, extracted: Vec<ExtractedFile>) -> Result<Vec<FileRecord>> {
        let mut records = Vec::with_capacity(extracted.len());
        for file in extracted {
            let record = self.store.create(&file.file_name, file.file_kind, &file.text)?;
            info!(id = record.id, file = %record.file_name, kind = %record.file_kind, "stored file record");
            records.push(record);
        }
        Ok(records)
    }

    pub fn list(&self) -> Result<Vec<FileRecord>> {
        self.store.list_all()
    }

    pub fn get(&self, id: i64) -> Result<FileRecord> {
        self.store.get_by_id(id)
    }

    /// Resolve `id` and render it in `format`.
    pub fn export(&self, id: i64, format: ExportFormat) -> Result<Vec<u8>> {
        let record = self.store.get_by_id(id)?;
        format.render(&record)
    }
}
