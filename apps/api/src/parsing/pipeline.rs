//! Resume pipeline: upload → extraction → preview, then (on a separate request)
//! prompt → completion → validation.
//!
//! The two steps are separate calls: [`load`] runs on upload and never touches the
//! completion service; [`LoadedResume::parse`] is the explicit second trigger.

use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::{self, DocumentFormat, ExtractedDocument};
use crate::llm_client::CompletionClient;
use crate::parsing::prompts::build_resume_prompt;
use crate::parsing::validator::{validate, ParseOutcome};

/// Maximum number of characters shown in the extracted-text preview.
pub const PREVIEW_CHAR_LIMIT: usize = 4000;

/// A file as received from the client. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content: Bytes,
}

/// An uploaded resume whose text has been extracted.
#[derive(Debug, Clone)]
pub struct LoadedResume {
    pub file_name: String,
    pub format: DocumentFormat,
    pub document: ExtractedDocument,
}

/// Extracts the uploaded file. Unsupported formats stop here, before any completion call.
/// Extraction runs on the blocking pool.
pub async fn load(upload: UploadedFile) -> Result<LoadedResume, AppError> {
    let format = DocumentFormat::from_file_name(&upload.name)
        .ok_or_else(|| AppError::UnsupportedFormat(upload.name.clone()))?;

    let UploadedFile { name, content } = upload;
    let (name, result) = tokio::task::spawn_blocking(move || {
        let result = extraction::extract(format, &content, &name);
        (name, result)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))?;

    let document = result?;
    if document.is_empty() {
        warn!("Upload '{name}' produced no text");
    }

    Ok(LoadedResume {
        file_name: name,
        format,
        document,
    })
}

impl LoadedResume {
    /// Full extracted text, segments joined with a blank line.
    pub fn full_text(&self) -> String {
        self.document.joined()
    }

    /// The first [`PREVIEW_CHAR_LIMIT`] characters of the full text. Display only.
    pub fn preview(&self) -> String {
        preview_of(&self.full_text())
    }

    pub fn char_count(&self) -> usize {
        self.full_text().chars().count()
    }

    /// Builds the prompt from the untruncated text, calls the completion service once,
    /// and validates the answer.
    pub async fn parse(&self, llm: &dyn CompletionClient) -> Result<ParseOutcome, AppError> {
        let prompt = build_resume_prompt(&self.full_text());
        let response = llm.complete(&prompt).await?;
        let outcome = validate(&response);

        match &outcome {
            ParseOutcome::Structured(record) => info!(
                "Parsed '{}' into a structured record with {} fields",
                self.file_name,
                record.fields().len()
            ),
            ParseOutcome::RawText(_) => {
                info!("Parsed '{}' but the response was not JSON", self.file_name)
            }
        }

        Ok(outcome)
    }
}

fn preview_of(text: &str) -> String {
    text.chars().take(PREVIEW_CHAR_LIMIT).collect()
}
