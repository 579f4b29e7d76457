// src/extraction.rs
//! Plain-text extraction from uploaded PDF and DOCX documents.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::Read;
use tracing::warn;

use crate::error::MatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

/// Map a filename to a supported document kind.
pub fn detect_kind(filename: &str) -> Option<DocumentKind> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".pdf") {
        Some(DocumentKind::Pdf)
    } else if lower.ends_with(".docx") {
        Some(DocumentKind::Docx)
    } else {
        None
    }
}

/// Extract the plain text of an uploaded document.
///
/// An unreadable document or one that yields no text at all is an
/// `ExtractionFailure`; the caller reports it as a warning and stops
/// the pipeline for that upload.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, MatchError> {
    let text = match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes),
    }
    .map_err(|e| {
        warn!("Document extraction failed: {:#}", e);
        MatchError::ExtractionFailure(e.to_string())
    })?;

    if text.trim().is_empty() {
        return Err(MatchError::ExtractionFailure(
            "document contained no extractable text".to_string(),
        ));
    }

    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).context("Failed to extract text from PDF")
}

/// DOCX is a zip container; the document body lives in
/// word/document.xml. Paragraph ends become newlines, remaining tags
/// are stripped.
fn extract_docx(bytes: &[u8]) -> Result<String> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor).context("Failed to open DOCX container")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX is missing word/document.xml")?
        .read_to_string(&mut xml)
        .context("Failed to read DOCX document body")?;

    Ok(strip_document_xml(&xml))
}

fn strip_document_xml(xml: &str) -> String {
    let with_breaks = xml.replace("</w:p>", "\n").replace("<w:br/>", "\n");

    let tag_re = Regex::new(r"<[^>]*>").expect("valid tag regex");
    let text = tag_re.replace_all(&with_breaks, "");

    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
