// src/web/handlers/experience_handlers.rs
use crate::core::Database;
use crate::experiences::{
    ExperienceRepository, ExperienceValidationError, InterviewExperience, NewExperience,
};
use crate::web::types::{
    api_error, ApiError, ApiResult, DataResponse, StandardRequest, WithConversationId,
};

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

pub async fn list_experiences_handler(
    q: Option<String>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<InterviewExperience>>> {
    let repo = ExperienceRepository::new(db.pool());

    match repo.list(q.as_deref()).await {
        Ok(experiences) => {
            let message = match q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
                Some(query) => format!("{} experiences match '{}'", experiences.len(), query),
                None => format!("{} experiences", experiences.len()),
            };
            Ok(Json(DataResponse::success(message, experiences, None)))
        }
        Err(e) => {
            error!("Failed to list experiences: {:#}", e);
            Err(database_error(None))
        }
    }
}

pub async fn get_experience_handler(
    id: i64,
    db: &State<Database>,
) -> ApiResult<DataResponse<InterviewExperience>> {
    let repo = ExperienceRepository::new(db.pool());

    match repo.get(id).await {
        Ok(Some(experience)) => Ok(Json(DataResponse::success(
            format!("Interview experience {}", id),
            experience,
            None,
        ))),
        Ok(None) => Err(not_found(id, None)),
        Err(e) => {
            error!("Failed to load experience {}: {:#}", id, e);
            Err(database_error(None))
        }
    }
}

pub async fn create_experience_handler(
    request: Json<StandardRequest<NewExperience>>,
    db: &State<Database>,
) -> Result<(Status, Json<DataResponse<InterviewExperience>>), ApiError> {
    let conversation_id = request.conversation_id();
    let repo = ExperienceRepository::new(db.pool());

    match repo.create(&request.data).await {
        Ok(experience) => {
            info!(
                "Created experience {} ({} - {})",
                experience.id, experience.company, experience.position
            );
            Ok((
                Status::Created,
                Json(DataResponse::success(
                    "Your interview experience has been shared successfully.".to_string(),
                    experience,
                    conversation_id,
                )),
            ))
        }
        Err(e) => match e.downcast_ref::<ExperienceValidationError>() {
            Some(validation) => {
                warn!("Rejected experience submission: {}", validation);
                Err(api_error(
                    Status::UnprocessableEntity,
                    validation.message.clone(),
                    "VALIDATION_ERROR",
                    &[
                        "Company and position need at least 2 characters",
                        "Describe the interview in at least 10 characters",
                    ],
                    conversation_id,
                ))
            }
            None => {
                error!("Failed to store experience: {:#}", e);
                Err(database_error(conversation_id))
            }
        },
    }
}

pub(crate) fn not_found(id: i64, conversation_id: Option<String>) -> ApiError {
    api_error(
        Status::NotFound,
        format!("Interview experience {} not found", id),
        "EXPERIENCE_NOT_FOUND",
        &["List experiences to see the available ids"],
        conversation_id,
    )
}

pub(crate) fn database_error(conversation_id: Option<String>) -> ApiError {
    api_error(
        Status::InternalServerError,
        "Database operation failed",
        "DATABASE_ERROR",
        &["Try again in a few moments"],
        conversation_id,
    )
}
