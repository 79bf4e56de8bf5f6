//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::extraction::DocumentFormat;
use crate::parsing::pipeline::{load, UploadedFile, PREVIEW_CHAR_LIMIT};
use crate::parsing::validator::{CandidateRecord, ParseOutcome};
use crate::state::AppState;

/// Multipart field carrying the resume.
pub const FILE_FIELD: &str = "file";

pub const LOADED_MESSAGE: &str = "Resume successfully loaded!";
pub const PARSED_MESSAGE: &str = "Parsing Complete! Here are the extracted insights:";
pub const RAW_OUTPUT_MESSAGE: &str = "Could not parse JSON properly. Here is the raw output:";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub file_name: String,
    pub format: DocumentFormat,
    pub segment_count: usize,
    pub char_count: usize,
    pub preview: String,
    pub truncated: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseResponse {
    Parsed {
        message: &'static str,
        record: CandidateRecord,
    },
    RawOutput {
        message: &'static str,
        raw_text: String,
    },
}

impl From<ParseOutcome> for ParseResponse {
    fn from(outcome: ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Structured(record) => ParseResponse::Parsed {
                message: PARSED_MESSAGE,
                record,
            },
            ParseOutcome::RawText(raw_text) => ParseResponse::RawOutput {
                message: RAW_OUTPUT_MESSAGE,
                raw_text,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/preview
///
/// Extracts the uploaded resume and returns the first 4000 characters.
/// Does not call the completion service.
pub async fn handle_preview(multipart: Multipart) -> Result<Json<PreviewResponse>, AppError> {
    let resume = load(read_upload(multipart).await?).await?;
    let char_count = resume.char_count();

    Ok(Json(PreviewResponse {
        segment_count: resume.document.segments.len(),
        preview: resume.preview(),
        truncated: char_count > PREVIEW_CHAR_LIMIT,
        char_count,
        format: resume.format,
        file_name: resume.file_name,
        message: LOADED_MESSAGE,
    }))
}

/// POST /api/v1/resumes/parse
///
/// Extracts the uploaded resume and asks the completion service for a structured
/// summary. A non-JSON answer is returned as `raw_output`, not as an error.
pub async fn handle_parse(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let resume = load(read_upload(multipart).await?).await?;
    let outcome = resume.parse(state.llm.as_ref()).await?;
    Ok(Json(outcome.into()))
}

/// Reads the `file` field. Other fields are drained and ignored.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some(FILE_FIELD) && upload.is_none() {
            let name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("file field has no file name".to_string()))?;
            let content = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some(UploadedFile { name, content });
        } else {
            field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;
        }
    }

    upload.ok_or_else(|| AppError::Validation(format!("multipart field '{FILE_FIELD}' is required")))
}
