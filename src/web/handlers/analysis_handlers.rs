// src/web/handlers/analysis_handlers.rs
use crate::analysis::{
    GeminiClient, GeminiError, InterviewAnalysis, InterviewAnalyzer, InterviewData,
    SkillGapAnalyzer, SkillGapReport,
};
use crate::core::{Database, FsOps};
use crate::experiences::ExperienceRepository;
use crate::file_utils::{extract_text_from_file, FileExtractionError};
use crate::web::handlers::experience_handlers::{database_error, not_found};
use crate::web::types::{
    api_error, ApiError, ApiResult, DataResponse, SkillGapRequest, SkillGapUploadForm,
    StandardRequest, WithConversationId,
};

use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

pub async fn analyze_experience_handler(
    id: i64,
    db: &State<Database>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<InterviewAnalysis>> {
    let repo = ExperienceRepository::new(db.pool());

    let experience = match repo.get(id).await {
        Ok(Some(experience)) => experience,
        Ok(None) => return Err(not_found(id, None)),
        Err(e) => {
            error!("Failed to load experience {}: {:#}", id, e);
            return Err(database_error(None));
        }
    };

    let analyzer = InterviewAnalyzer::new(client.inner());
    match analyzer.analyze(&InterviewData::from(&experience)).await {
        Ok(analysis) => Ok(Json(DataResponse::success(
            format!(
                "Analysis for {} - {}",
                experience.company, experience.position
            ),
            analysis,
            None,
        ))),
        Err(e) => {
            error!("Interview analysis failed for experience {}: {:#}", id, e);
            Err(categorize_analysis_error(&e))
        }
    }
}

pub async fn skill_gap_handler(
    request: Json<StandardRequest<SkillGapRequest>>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<SkillGapReport>> {
    let conversation_id = request.conversation_id();

    if request.data.resume.trim().is_empty() {
        return Err(validation_error(
            "Please enter your resume content or upload a file",
            conversation_id,
        ));
    }
    if request.data.job_role.trim().is_empty() {
        return Err(validation_error(
            "Please enter your desired job role",
            conversation_id,
        ));
    }

    let report = SkillGapAnalyzer::new(client.inner())
        .run(&request.data.resume, &request.data.job_role)
        .await;

    Ok(Json(report_response(report, conversation_id)))
}

pub async fn skill_gap_upload_handler(
    mut upload: Form<SkillGapUploadForm<'_>>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<SkillGapReport>> {
    if upload.job_role.trim().is_empty() {
        return Err(validation_error("Please enter your desired job role", None));
    }

    let content_type = upload.resume_file.content_type().map(|ct| ct.to_string());
    let file_name = upload
        .resume_file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_else(|| "resume".to_string());

    info!(
        "Received résumé upload: {} ({} bytes, {})",
        file_name,
        upload.resume_file.len(),
        content_type.as_deref().unwrap_or("unknown type")
    );

    let temp_path = std::env::temp_dir().join(format!("resume_upload_{}", uuid::Uuid::new_v4()));
    if let Err(e) = upload.resume_file.persist_to(&temp_path).await {
        error!("Failed to save uploaded file: {}", e);
        return Err(api_error(
            Status::InternalServerError,
            "Failed to process uploaded file",
            "FILE_SAVE_ERROR",
            &["Try uploading the file again"],
            None,
        ));
    }

    let bytes = FsOps::read_bytes_safe(&temp_path).await;
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        warn!("Failed to remove {}: {}", temp_path.display(), e);
    }
    let bytes = match bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read uploaded file: {:#}", e);
            return Err(api_error(
                Status::InternalServerError,
                "Failed to process uploaded file",
                "FILE_SAVE_ERROR",
                &["Try uploading the file again"],
                None,
            ));
        }
    };

    let resume = match extract_text_from_file(&file_name, content_type.as_deref(), &bytes) {
        Ok(text) => text,
        Err(e) => return Err(extraction_error(e)),
    };

    let report = SkillGapAnalyzer::new(client.inner())
        .run(&resume, &upload.job_role)
        .await;

    Ok(Json(report_response(report, None)))
}

fn report_response(
    report: SkillGapReport,
    conversation_id: Option<String>,
) -> DataResponse<SkillGapReport> {
    let message = if report.used_fallback {
        format!(
            "Skill gap analysis for {} (general guidance, AI analysis unavailable)",
            report.job_role
        )
    } else {
        format!("Skill gap analysis for {}", report.job_role)
    };
    DataResponse::success(message, report, conversation_id)
}

fn validation_error(message: &str, conversation_id: Option<String>) -> ApiError {
    api_error(
        Status::UnprocessableEntity,
        message,
        "VALIDATION_ERROR",
        &["Provide both the résumé text and the target role"],
        conversation_id,
    )
}

fn extraction_error(e: FileExtractionError) -> ApiError {
    warn!("Rejected résumé upload: {}", e);
    match &e {
        FileExtractionError::UnsupportedType(_) => api_error(
            Status::UnprocessableEntity,
            e.to_string(),
            "INVALID_FORMAT",
            &["Upload a PDF, DOCX, DOC or TXT file"],
            None,
        ),
        FileExtractionError::InsufficientText { .. } => api_error(
            Status::UnprocessableEntity,
            e.to_string(),
            "EXTRACTION_ERROR",
            &[
                "Try a plain text version of your résumé",
                "Paste the résumé content directly instead",
            ],
            None,
        ),
    }
}

fn categorize_analysis_error(e: &anyhow::Error) -> ApiError {
    match e.downcast_ref::<GeminiError>() {
        Some(GeminiError::MissingApiKey) => api_error(
            Status::ServiceUnavailable,
            e.to_string(),
            "AI_NOT_CONFIGURED",
            &["Set GEMINI_API_KEY and restart the server"],
            None,
        ),
        Some(GeminiError::RateLimited { .. }) => api_error(
            Status::TooManyRequests,
            e.to_string(),
            "RATE_LIMITED",
            &["The AI service is busy, try again in a minute"],
            None,
        ),
        _ => api_error(
            Status::BadGateway,
            format!("{:#}", e),
            "ANALYSIS_ERROR",
            &[
                "Try again in a few moments",
                "Contact support if the problem persists",
            ],
            None,
        ),
    }
}
