// src/web/handlers.rs
//! Request handlers for the matching API.

use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::MatchError;
use crate::extraction::detect_kind;
use crate::pipeline::{MatchReport, Pipeline};
use crate::web::types::{DataResponse, MatchForm, StandardErrorResponse, TextResponse};

// 10MB upload cap, same limit the original interface enforced.
const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_TARGET_ROLE: &str = "Software Engineer";

pub async fn match_resume_handler(
    mut upload: Form<MatchForm<'_>>,
    config: &State<AppConfig>,
) -> Result<Json<DataResponse<MatchReport>>, Json<StandardErrorResponse>> {
    let filename = upload
        .resume
        .raw_name()
        .and_then(|n| n.as_str().map(str::to_string))
        .unwrap_or_else(|| "resume".to_string());

    let kind = detect_kind(&filename).ok_or_else(|| {
        Json(StandardErrorResponse::new(
            format!("Only PDF and Word documents are supported. Received: {}", filename),
            "INVALID_FORMAT".to_string(),
            vec![
                "Upload a PDF file (.pdf)".to_string(),
                "Upload a Word document (.docx)".to_string(),
            ],
        ))
    })?;

    if upload.resume.len() > MAX_UPLOAD_BYTES {
        return Err(Json(StandardErrorResponse::new(
            "File size exceeds 10MB limit".to_string(),
            "FILE_TOO_LARGE".to_string(),
            vec!["Use a smaller file size (max 10MB)".to_string()],
        )));
    }

    let target_role = upload
        .target_role
        .as_deref()
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .unwrap_or(DEFAULT_TARGET_ROLE)
        .to_string();

    info!("Processing upload '{}' for target role '{}'", filename, target_role);

    let temp_path = std::env::temp_dir().join(format!("resume_upload_{}", uuid::Uuid::new_v4()));

    if let Err(e) = upload.resume.persist_to(&temp_path).await {
        error!("Failed to save uploaded file: {}", e);
        return Err(Json(StandardErrorResponse::new(
            "Failed to process uploaded file".to_string(),
            "FILE_SAVE_ERROR".to_string(),
            vec!["Try uploading the file again".to_string()],
        )));
    }

    let bytes = match tokio::fs::read(&temp_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read uploaded file: {}", e);
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Json(StandardErrorResponse::new(
                "Failed to process uploaded file".to_string(),
                "FILE_SAVE_ERROR".to_string(),
                vec!["Try uploading the file again".to_string()],
            )));
        }
    };

    let pipeline = Pipeline::new(config.inner().clone());
    let result = pipeline.run(&bytes, kind, &target_role).await;
    let _ = tokio::fs::remove_file(&temp_path).await;

    match result {
        Ok(report) => {
            let message = if report.jobs.is_empty() {
                "Resume analyzed; no job matches found".to_string()
            } else {
                format!("Resume analyzed, {} job matches found", report.jobs.len())
            };
            Ok(Json(DataResponse::success(message, report)))
        }
        Err(e @ MatchError::ExtractionFailure(_)) => {
            Err(Json(StandardErrorResponse::new(
                e.to_string(),
                e.code().to_string(),
                vec![
                    "Ensure the document has readable text".to_string(),
                    "Try a different file format".to_string(),
                ],
            )))
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(Json(StandardErrorResponse::new(
                e.to_string(),
                e.code().to_string(),
                vec!["Try again in a few moments".to_string()],
            )))
        }
    }
}

pub async fn health_handler() -> Json<TextResponse> {
    Json(TextResponse::success("Service is healthy".to_string()))
}
