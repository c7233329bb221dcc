use super::*;
use crate::RagError;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn missing_file_is_not_found() {
    let result = extract_text(Path::new("/nonexistent/report.txt"));
    assert!(matches!(result, Err(RagError::NotFound(_))));
}

#[test]
fn unknown_extension_is_unsupported() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("archive.tar");
    fs::write(&path, b"not a document").expect("Failed to write file");

    match extract_text(&path) {
        Err(RagError::UnsupportedFormat(ext)) => assert_eq!(ext, ".tar"),
        other => panic!("Expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn missing_extension_is_unsupported() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("README");
    fs::write(&path, b"plain text").expect("Failed to write file");

    assert!(matches!(
        extract_text(&path),
        Err(RagError::UnsupportedFormat(_))
    ));
}

#[test]
fn plain_text_is_read_verbatim() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("notes.txt");
    fs::write(&path, "line one\nline two\n").expect("Failed to write file");

    let text = extract_text(&path).expect("Extraction failed");
    assert_eq!(text, "line one\nline two\n");
}

#[test]
fn markdown_is_read_verbatim() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("guide.md");
    fs::write(&path, "# Title\n\nSome *markdown* body.\n").expect("Failed to write file");

    let text = extract_text(&path).expect("Extraction failed");
    assert_eq!(text, "# Title\n\nSome *markdown* body.\n");
}

#[test]
fn extension_matching_is_case_insensitive() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("NOTES.TXT");
    fs::write(&path, "shouting").expect("Failed to write file");

    let text = extract_text(&path).expect("Extraction failed");
    assert_eq!(text, "shouting");
}

#[test]
fn docx_paragraphs_join_with_newlines() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("memo.docx");

    let document_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
    <w:p/>
  </w:body>
</w:document>"#;

    let file = fs::File::create(&path).expect("Failed to create docx");
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .expect("Failed to start zip entry");
    writer
        .write_all(document_xml.as_bytes())
        .expect("Failed to write zip entry");
    writer.finish().expect("Failed to finish zip");

    let text = extract_text(&path).expect("Extraction failed");
    assert_eq!(text, "First paragraph.\nSecond paragraph.");
}

#[test]
fn docx_without_document_part_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("broken.docx");

    let file = fs::File::create(&path).expect("Failed to create docx");
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("unrelated.xml", zip::write::SimpleFileOptions::default())
        .expect("Failed to start zip entry");
    writer.write_all(b"<x/>").expect("Failed to write zip entry");
    writer.finish().expect("Failed to finish zip");

    assert!(extract_text(&path).is_err());
}

#[test]
fn docx_entities_are_unescaped() {
    let document_xml = r#"<w:document xmlns:w="http://example.com/w">
<w:body><w:p><w:r><w:t>ham &amp; eggs</w:t></w:r></w:p></w:body>
</w:document>"#;

    let paragraphs = paragraphs_from_document_xml(document_xml).expect("Parse failed");
    assert_eq!(paragraphs, vec!["ham & eggs".to_string()]);
}
