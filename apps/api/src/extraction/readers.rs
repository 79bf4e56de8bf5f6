//! Format readers. Each reads a staged file from disk and returns its text segments.

use std::path::Path;

use super::ExtractionError;

/// One segment per page.
pub(super) fn read_pdf(path: &Path) -> Result<Vec<String>, ExtractionError> {
    // pdf-extract can panic on malformed fonts/glyphs
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(path)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(_) => {
            tracing::error!("PDF extraction panicked for {}", path.display());
            Err(ExtractionError::Pdf(
                "parser panicked, the file likely contains malformed fonts".to_string(),
            ))
        }
    }
}

/// The whole document body as one segment, one line per paragraph or table row.
pub(super) fn read_docx(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let doc = docx_rs::read_docx(&bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut lines = Vec::new();
    for child in &doc.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let mut line = String::new();
                push_paragraph_text(&para.children, &mut line);
                lines.push(line);
            }
            docx_rs::DocumentChild::Table(table) => {
                for row in &table.rows {
                    let docx_rs::TableChild::TableRow(tr) = row;
                    let mut cells = Vec::new();
                    for cell in &tr.cells {
                        let docx_rs::TableRowChild::TableCell(tc) = cell;
                        let mut text = String::new();
                        for content in &tc.children {
                            if let docx_rs::TableCellContent::Paragraph(para) = content {
                                push_paragraph_text(&para.children, &mut text);
                            }
                        }
                        cells.push(text);
                    }
                    lines.push(cells.join(" | "));
                }
            }
            _ => {}
        }
    }

    Ok(vec![lines.join("\n")])
}

fn push_paragraph_text(children: &[docx_rs::ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    if let docx_rs::RunChild::Text(text) = run_child {
                        out.push_str(&text.text);
                    }
                }
            }
            docx_rs::ParagraphChild::Hyperlink(link) => push_paragraph_text(&link.children, out),
            _ => {}
        }
    }
}

/// The whole file as one segment. Invalid UTF-8 is an error, not a lossy decode.
pub(super) fn read_txt(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let bytes = std::fs::read(path)?;
    Ok(vec![String::from_utf8(bytes)?])
}
