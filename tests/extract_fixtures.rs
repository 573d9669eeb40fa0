//! Extraction over real documents in `tests/fixtures`.

use fileshelf::files::extract::extract_text;
use fileshelf::files::FileKind;
use std::path::PathBuf;

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

#[test]
fn test_xlsx_first_sheet_is_rendered() {
    let kind = FileKind::from_file_name(Some("simple.xlsx"));
    assert_eq!(kind, FileKind::Spreadsheet);

    let text = extract_text(&fixture("simple.xlsx"), kind).unwrap();
    assert_eq!(text, "name,qty\napple,42.0\n");
}

#[test]
fn test_xlsx_read_as_text_is_rejected() {
    // A zip container is not UTF-8
    assert!(extract_text(&fixture("simple.xlsx"), FileKind::Text).is_err());
}

#[cfg(feature = "pdf")]
#[test]
fn test_pdf_page_text_is_extracted() {
    let kind = FileKind::from_file_name(Some("simple.pdf"));
    assert_eq!(kind, FileKind::Pdf);

    let text = extract_text(&fixture("simple.pdf"), kind).unwrap();
    assert!(text.contains("Hello"), "{text:?}");
    assert!(text.contains("fileshelf"), "{text:?}");
}
