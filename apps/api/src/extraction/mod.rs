//! Text extraction from uploaded resumes.
//!
//! The caller resolves the upload's [`DocumentFormat`] from its file name. The bytes
//! are written to a scoped temporary file and handed to the reader for that format.
//! The temporary file is removed when extraction returns, whatever the outcome.

use std::fmt;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

mod readers;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("text file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// The closed set of formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Resolves the format from the file-name suffix. Matching is case-sensitive.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if file_name.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else if file_name.ends_with(".txt") {
            Some(DocumentFormat::Txt)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Ordered text segments of one document: one per PDF page, one for DOCX and TXT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub segments: Vec<String>,
}

impl ExtractedDocument {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments joined with a blank line, in extraction order.
    pub fn joined(&self) -> String {
        self.segments.join("\n\n")
    }
}

/// Longest file name most filesystems accept, in bytes.
const MAX_FILE_NAME_BYTES: usize = 255;
const STAGED_PREFIX: &str = "temp_";
const STAGED_RANDOM_LEN: usize = 6;

/// Extracts text from an uploaded file of a known format, staging it in the system
/// temp directory. `file_name` only names the staged file and the log lines.
pub fn extract(
    format: DocumentFormat,
    bytes: &[u8],
    file_name: &str,
) -> Result<ExtractedDocument, ExtractionError> {
    extract_in(&std::env::temp_dir(), format, bytes, file_name)
}

/// Same as [`extract`], staging the temporary file inside `dir`.
pub fn extract_in(
    dir: &Path,
    format: DocumentFormat,
    bytes: &[u8],
    file_name: &str,
) -> Result<ExtractedDocument, ExtractionError> {
    if bytes.is_empty() {
        debug!("Empty {format} upload '{file_name}', nothing to extract");
        return Ok(ExtractedDocument::default());
    }

    // Dropping the handle deletes the file.
    let mut staged = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .rand_bytes(STAGED_RANDOM_LEN)
        .suffix(&staged_suffix(file_name, format))
        .tempfile_in(dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    let segments = match format {
        DocumentFormat::Pdf => readers::read_pdf(staged.path())?,
        DocumentFormat::Docx => readers::read_docx(staged.path())?,
        DocumentFormat::Txt => readers::read_txt(staged.path())?,
    };

    let document = ExtractedDocument::new(segments);
    info!(
        "Extracted {} segment(s), {} chars from {format} upload '{}'",
        document.segments.len(),
        document.segments.iter().map(|s| s.chars().count()).sum::<usize>(),
        file_name
    );
    Ok(document)
}

/// `_<stem>.<ext>` for the staged file. The stem is cut on a char boundary so the
/// whole staged name fits in [`MAX_FILE_NAME_BYTES`]; the extension always survives.
fn staged_suffix(file_name: &str, format: DocumentFormat) -> String {
    let ext = format.extension();
    let base = base_name(file_name);
    let stem = base
        .strip_suffix(ext)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(base);

    let budget = MAX_FILE_NAME_BYTES - STAGED_PREFIX.len() - STAGED_RANDOM_LEN - ext.len() - 2;
    let mut end = stem.len().min(budget);
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("_{}.{ext}", &stem[..end])
}

/// Final path component of a client-supplied name, so uploads cannot escape the temp dir.
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(&['/', '\\'][..])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("upload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = docx_rs::Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)),
            );
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    /// A minimal uncompressed PDF with one Helvetica text line per page.
    fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
        let first_page_id = 4;
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", first_page_id + 2 * i))
            .collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        for (i, text) in pages.iter().enumerate() {
            let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                first_page_id + 2 * i + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(DocumentFormat::from_file_name("cv.pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_file_name("cv.docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_file_name("john.txt"), Some(DocumentFormat::Txt));
        assert_eq!(DocumentFormat::from_file_name("notes.pdf.txt"), Some(DocumentFormat::Txt));
    }

    #[test]
    fn test_format_resolution_is_case_sensitive() {
        assert_eq!(DocumentFormat::from_file_name("CV.PDF"), None);
        assert_eq!(DocumentFormat::from_file_name("cv.Docx"), None);
    }

    #[test]
    fn test_format_resolution_rejects_other_suffixes() {
        assert_eq!(DocumentFormat::from_file_name("resume.xyz"), None);
        assert_eq!(DocumentFormat::from_file_name("resume.doc"), None);
        assert_eq!(DocumentFormat::from_file_name("pdf"), None);
        assert_eq!(DocumentFormat::from_file_name(""), None);
    }

    #[test]
    fn test_txt_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let doc = extract_in(
            dir.path(),
            DocumentFormat::Txt,
            b"Name: Jane Doe",
            "john.txt",
        )
        .unwrap();
        assert_eq!(doc.segments, vec!["Name: Jane Doe".to_string()]);
    }

    #[test]
    fn test_empty_file_yields_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["empty.txt", "empty.pdf", "empty.docx"] {
            let format = DocumentFormat::from_file_name(name).unwrap();
            let doc = extract_in(dir.path(), format, b"", name).unwrap();
            assert!(doc.is_empty(), "{name} should produce no segments");
        }
    }

    #[test]
    fn test_invalid_utf8_text_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_in(
            dir.path(),
            DocumentFormat::Txt,
            &[0xff, 0xfe, 0x00, 0xc3],
            "bad.txt",
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding(_)));
    }

    #[test]
    fn test_corrupt_pdf_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_in(
            dir.path(),
            DocumentFormat::Pdf,
            b"definitely not a pdf",
            "cv.pdf",
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[test]
    fn test_corrupt_docx_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_in(
            dir.path(),
            DocumentFormat::Docx,
            b"not a zip archive",
            "cv.docx",
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(_)));
    }

    #[test]
    fn test_docx_extraction_keeps_paragraph_order() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = docx_bytes(&["Jane Doe", "Rust Engineer", "Skills: Rust, SQL"]);
        let doc = extract_in(dir.path(), DocumentFormat::Docx, &bytes, "cv.docx").unwrap();
        assert_eq!(doc.segments.len(), 1);
        assert_eq!(doc.segments[0], "Jane Doe\nRust Engineer\nSkills: Rust, SQL");
    }

    #[test]
    fn test_temp_file_removed_after_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        extract_in(dir.path(), DocumentFormat::Txt, b"Name: Jane Doe", "john.txt").unwrap();
        extract_in(dir.path(), DocumentFormat::Pdf, b"garbage", "cv.pdf").unwrap_err();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_pdf_extraction_yields_one_segment_per_page_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = pdf_bytes(&["Jane Doe page one", "Rust Engineer page two"]);
        let doc = extract_in(dir.path(), DocumentFormat::Pdf, &bytes, "cv.pdf").unwrap();
        assert_eq!(doc.segments.len(), 2);
        assert!(doc.segments[0].contains("Jane Doe page one"), "{:?}", doc.segments);
        assert!(doc.segments[1].contains("Rust Engineer page two"), "{:?}", doc.segments);

        let joined = doc.joined();
        let first = joined.find("Jane Doe").unwrap();
        let second = joined.find("Rust Engineer").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_long_file_name_is_staged_within_name_limit() {
        let dir = tempfile::tempdir().unwrap();
        let name = format!("{}.txt", "a".repeat(246));
        assert_eq!(name.len(), 250);
        let doc = extract_in(dir.path(), DocumentFormat::Txt, b"Name: Jane Doe", &name).unwrap();
        assert_eq!(doc.segments, vec!["Name: Jane Doe".to_string()]);
    }

    #[test]
    fn test_staged_suffix_keeps_extension_and_fits_limit() {
        let suffix = staged_suffix(&format!("{}.docx", "b".repeat(300)), DocumentFormat::Docx);
        assert!(suffix.ends_with(".docx"));
        assert_eq!(
            STAGED_PREFIX.len() + STAGED_RANDOM_LEN + suffix.len(),
            MAX_FILE_NAME_BYTES
        );

        assert_eq!(staged_suffix("cv.pdf", DocumentFormat::Pdf), "_cv.pdf");
        assert_eq!(staged_suffix("../../etc/passwd.txt", DocumentFormat::Txt), "_passwd.txt");
    }

    #[test]
    fn test_staged_suffix_cuts_on_char_boundary() {
        let suffix = staged_suffix(&format!("{}.txt", "é".repeat(200)), DocumentFormat::Txt);
        assert!(suffix.ends_with(".txt"));
        assert!(STAGED_PREFIX.len() + STAGED_RANDOM_LEN + suffix.len() <= MAX_FILE_NAME_BYTES);
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("../../etc/passwd.txt"), "passwd.txt");
        assert_eq!(base_name("C:\\Users\\jane\\cv.pdf"), "cv.pdf");
        assert_eq!(base_name("cv.pdf"), "cv.pdf");
        assert_eq!(base_name("dir/"), "upload");
    }

    #[test]
    fn test_path_like_name_stays_inside_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let doc = extract_in(dir.path(), DocumentFormat::Txt, b"hello", "../escape.txt").unwrap();
        assert_eq!(doc.segments, vec!["hello".to_string()]);
    }

    #[test]
    fn test_joined_uses_blank_line_separator() {
        let doc = ExtractedDocument::new(vec!["page one".into(), "page two".into()]);
        assert_eq!(doc.joined(), "page one\n\npage two");
    }
}
