//! Rendering of stored records as downloadable JSON or CSV.

use super::index::RecordStore;
use super::schema::FileRecord;
use crate::error::Result;
use std::fmt;
use std::str::FromStr;

/// Download format for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Attachment name offered to the client, e.g. `file-7.csv`.
    pub fn attachment_name(self, id: i64) -> String {
        format!("file-{id}.{}", self.extension())
    }

    pub fn render(self, record: &FileRecord) -> Result<Vec<u8>> {
        match self {
            Self::Json => render_json(record),
            Self::Csv => Ok(render_csv(record)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format '{other}' (expected json or csv)")),
        }
    }
}

/// The full record as a single JSON object.
pub fn render_json(record: &FileRecord) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(record)?)
}

/// Text that already contains both a newline and a comma is passed through
/// as-is; anything else becomes a one-column CSV under a `content` header.
///
/// The pass-through test is a crude heuristic and does not check that the
/// text is well-formed CSV: multi-line prose with a single comma anywhere is
/// emitted unquoted. Kept for compatibility with existing exports.
pub fn render_csv(record: &FileRecord) -> Vec<u8> {
    let content = record.extracted_text.as_str();
    if content.contains('\n') && content.contains(',') {
        return content.as_bytes().to_vec();
    }

    let mut out = String::with_capacity(content.len() + 12);
    out.push_str("content\n\"");
    out.push_str(&content.replace('"', "\"\""));
    out.push_str("\"\n");
    out.into_bytes()
}

/// Look up `id` and render it as JSON.
pub fn export_json(store: &dyn RecordStore, id: i64) -> Result<Vec<u8>> {
    render_json(&store.get_by_id(id)?)
}

/// Look up `id` and render it as CSV.
pub fn export_csv(store: &dyn RecordStore, id: i64) -> Result<Vec<u8>> {
    Ok(render_csv(&store.get_by_id(id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::files::index::MemoryStore;
    use crate::files::schema::FileKind;
    use chrono::{TimeZone, Utc};

    fn record(text: &str) -> FileRecord {
        FileRecord {
            id: 1,
            file_name: "a.txt".to_string(),
            file_kind: FileKind::Text,
            extracted_text: text.to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn json_contains_all_fields() {
        let bytes = render_json(&record("hello")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["fileName"], "a.txt");
        assert_eq!(value["fileKind"], "text");
        assert_eq!(value["extractedText"], "hello");
        assert_eq!(value["uploadedAt"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn plain_text_is_wrapped_in_single_column() {
        assert_eq!(render_csv(&record("hi")), b"content\n\"hi\"\n");
    }

    #[test]
    fn quotes_are_doubled_when_wrapping() {
        assert_eq!(
            render_csv(&record("say \"hi\", bye")),
            b"content\n\"say \"\"hi\"\", bye\"\n"
        );
    }

    #[test]
    fn csv_like_text_passes_through() {
        assert_eq!(render_csv(&record("a,b\nc,d\n")), b"a,b\nc,d\n");
    }

    #[test]
    fn multiline_text_without_comma_is_wrapped() {
        assert_eq!(render_csv(&record("one\ntwo")), b"content\n\"one\ntwo\"\n");
    }

    #[test]
    fn empty_text_is_wrapped() {
        assert_eq!(render_csv(&record("")), b"content\n\"\"\n");
    }

    #[test]
    fn missing_record_fails_both_exports() {
        let store = MemoryStore::new();
        assert!(matches!(export_json(&store, 5), Err(Error::NotFound(5))));
        assert!(matches!(export_csv(&store, 5), Err(Error::NotFound(5))));
    }

    #[test]
    fn exports_resolve_through_store() {
        let store = MemoryStore::new();
        let created = store.create("notes.txt", FileKind::Text, "hi").unwrap();
        assert_eq!(export_csv(&store, created.id).unwrap(), b"content\n\"hi\"\n");
        let json: FileRecord = serde_json::from_slice(&export_json(&store, created.id).unwrap()).unwrap();
        assert_eq!(json, created);
    }

    #[test]
    fn format_metadata() {
        assert_eq!(ExportFormat::Json.attachment_name(3), "file-3.json");
        assert_eq!(ExportFormat::Csv.attachment_name(3), "file-3.csv");
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv");
        assert_eq!("JSON".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
