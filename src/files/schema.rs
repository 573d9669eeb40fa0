use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// File name recorded when an upload arrives without one.
pub const UNKNOWN_FILE_NAME: &str = "unknown";

/// Logical kind of an uploaded file, derived from its name once at upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Csv,
    Spreadsheet,
    Pdf,
    Unknown,
}

impl FileKind {
    /// Classify by lowercase suffix. Names without a recognised suffix,
    /// and missing names, are `Unknown`.
    pub fn from_file_name(file_name: Option<&str>) -> Self {
        let Some(name) = file_name else {
            return Self::Unknown;
        };
        let lower = name.to_lowercase();
        if lower.ends_with(".csv") {
            Self::Csv
        } else if lower.ends_with(".txt") {
            Self::Text
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Self::Spreadsheet
        } else if lower.ends_with(".pdf") {
            Self::Pdf
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
            Self::Pdf => "pdf",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "spreadsheet" => Ok(Self::Spreadsheet),
            "pdf" => Ok(Self::Pdf),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown file kind '{other}'")),
        }
    }
}

/// A stored file record with metadata and extracted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: i64,
    pub file_name: String,
    pub file_kind: FileKind,
    pub extracted_text: String,
    pub uploaded_at: DateTime<Utc>,
}

/// An upload that has been extracted but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFile {
    pub file_name: String,
    pub file_kind: FileKind,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_suffixes() {
        assert_eq!(FileKind::from_file_name(Some("data.csv")), FileKind::Csv);
        assert_eq!(FileKind::from_file_name(Some("notes.txt")), FileKind::Text);
        assert_eq!(FileKind::from_file_name(Some("book.xlsx")), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_file_name(Some("old.xls")), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_file_name(Some("paper.pdf")), FileKind::Pdf);
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(FileKind::from_file_name(Some("REPORT.PDF")), FileKind::Pdf);
        assert_eq!(FileKind::from_file_name(Some("Sheet.XlSx")), FileKind::Spreadsheet);
    }

    #[test]
    fn unrecognised_names_are_unknown() {
        assert_eq!(FileKind::from_file_name(Some("image.png")), FileKind::Unknown);
        assert_eq!(FileKind::from_file_name(Some("csv")), FileKind::Unknown);
        assert_eq!(FileKind::from_file_name(Some("")), FileKind::Unknown);
        assert_eq!(FileKind::from_file_name(None), FileKind::Unknown);
    }

    #[test]
    fn kind_tags_round_trip() {
        for kind in [
            FileKind::Text,
            FileKind::Csv,
            FileKind::Spreadsheet,
            FileKind::Pdf,
            FileKind::Unknown,
        ] {
            assert_eq!(kind.as_str().parse::<FileKind>(), Ok(kind));
        }
        assert!("excel".parse::<FileKind>().is_err());
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let record = FileRecord {
            id: 1,
            file_name: "a.txt".to_string(),
            file_kind: FileKind::Text,
            extracted_text: "hello".to_string(),
            uploaded_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["fileName"], "a.txt");
        assert_eq!(value["fileKind"], "text");
        assert_eq!(value["extractedText"], "hello");
        assert!(value["uploadedAt"].is_string());
    }
}
