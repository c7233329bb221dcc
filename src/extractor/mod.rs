#[cfg(test)]
mod tests;

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use pdf_oxide::converters::ConversionOptions;
use quick_xml::events::Event;
use tracing::debug;

use crate::{RagError, Result};

/// Extract plain text from a source document.
///
/// Dispatches on the lowercased file extension: `txt` and `md` are read
/// verbatim, `pdf` is extracted page by page with pages joined by newlines,
/// and `docx` yields its paragraph text joined by newlines. Anything else
/// fails with [`RagError::UnsupportedFormat`]; a missing file fails with
/// [`RagError::NotFound`].
#[inline]
pub fn extract_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RagError::NotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(text)
        }
        "pdf" => extract_pdf_text(path),
        "docx" => extract_docx_text(path),
        other => Err(RagError::UnsupportedFormat(format!(".{other}"))),
    }
}

/// Extract text from every PDF page and join the pages with newlines.
fn extract_pdf_text(path: &Path) -> Result<String> {
    let mut doc = pdf_oxide::PdfDocument::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open PDF {}: {e}", path.display()))?;
    let page_count = doc
        .page_count()
        .map_err(|e| anyhow::anyhow!("Failed to read PDF page count: {e}"))?;

    let options = ConversionOptions {
        include_images: false,
        ..ConversionOptions::default()
    };

    let mut text = String::new();
    for page_index in 0..page_count {
        let page_text = doc
            .to_markdown(page_index, &options)
            .map_err(|e| anyhow::anyhow!("Failed to extract PDF page {page_index}: {e}"))?;
        text.push_str(&page_text);
        text.push('\n');
    }

    debug!("Extracted {} characters from {} PDF pages", text.len(), page_count);
    Ok(text)
}

/// Extract paragraph text from the main document part of a DOCX archive.
///
/// A DOCX file is a zip; the body lives in `word/document.xml` as `<w:p>`
/// paragraphs whose visible text sits in `<w:t>` runs. Paragraphs are joined
/// with newlines, matching the PDF page treatment.
fn extract_docx_text(path: &Path) -> Result<String> {
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive =
        zip::ZipArchive::new(file).context("Failed to read DOCX archive structure")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX archive has no word/document.xml")?
        .read_to_string(&mut xml)
        .context("Failed to read DOCX document part")?;

    let paragraphs = paragraphs_from_document_xml(&xml)?;
    Ok(paragraphs.join("\n"))
}

fn paragraphs_from_document_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                // Tabs and explicit breaks are whitespace inside a paragraph.
                match e.local_name().as_ref() {
                    b"tab" => current.push('\t'),
                    b"br" => current.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(t)) if in_text_run => {
                let unescaped = t.unescape().context("Invalid XML text in DOCX document")?;
                current.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow::anyhow!("Malformed DOCX document XML: {e}").into());
            }
            Ok(_) => {}
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs)
}
