//! Syllabus text extraction
//!
//! Dispatches on file extension: `.pdf` and `.docx` are decoded, anything
//! else is read as UTF-8 text.

use regex::Regex;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{ServiceError, ServiceResult};
use crate::types::SyllabusData;

static DOCX_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|</w:p>|<w:tab/>|<w:br/>").expect("valid regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Docx,
    PlainText,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdf") => SourceKind::Pdf,
            Some("docx") => SourceKind::Docx,
            _ => SourceKind::PlainText,
        }
    }
}

/// Read a syllabus file into plain text.
pub fn extract_text(path: &Path) -> ServiceResult<String> {
    let bytes = fs::read(path)
        .map_err(|e| ServiceError::FileRead(format!("{}: {e}", path.display())))?;
    let text = match SourceKind::from_path(path) {
        SourceKind::Pdf => pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| ServiceError::FileRead(format!("{}: {e}", path.display())))?,
        SourceKind::Docx => docx_text(&bytes)?,
        SourceKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
    };
    tracing::debug!(path = %path.display(), chars = text.len(), "syllabus extracted");
    Ok(text)
}

/// Read a syllabus file and remember its file name for naming the subject.
pub fn load_syllabus(path: &Path) -> ServiceResult<SyllabusData> {
    Ok(SyllabusData {
        content: extract_text(path)?,
        file_name: path.file_name().and_then(|f| f.to_str()).map(str::to_string),
    })
}

fn docx_text(bytes: &[u8]) -> ServiceResult<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ServiceError::FileRead(format!("not a docx archive: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ServiceError::FileRead(format!("docx has no document body: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ServiceError::FileRead(format!("unreadable docx body: {e}")))?;
    Ok(document_xml_text(&xml))
}

/// Raw text of a WordprocessingML body: runs joined, paragraphs on new lines.
fn document_xml_text(xml: &str) -> String {
    let mut out = String::new();
    for caps in DOCX_TOKEN_RE.captures_iter(xml) {
        match caps.get(1) {
            Some(run) => out.push_str(&unescape_xml(run.as_str())),
            None => match &caps[0] {
                "</w:p>" | "<w:br/>" => out.push('\n'),
                _ => out.push('\t'),
            },
        }
    }
    out.trim_end().to_string()
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
