// src/web/handlers/system_handlers.rs
use crate::analysis::GeminiClient;
use crate::core::Database;
use crate::experiences::ExperienceRepository;
use crate::web::types::{api_error, ApiResult, DataResponse, HealthData};

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn health_handler(
    db: &State<Database>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<HealthData>> {
    let status = async {
        db.health_check().await?;
        let schema_version = db.schema_version().await?;
        let experiences = ExperienceRepository::new(db.pool()).count().await?;
        anyhow::Ok((schema_version, experiences))
    }
    .await;

    match status {
        Ok((schema_version, experiences)) => {
            info!("Health check ok ({} experiences)", experiences);
            Ok(Json(DataResponse::success(
                "OK".to_string(),
                HealthData {
                    database: "ok".to_string(),
                    schema_version,
                    experiences,
                    ai_configured: client.is_configured(),
                },
                None,
            )))
        }
        Err(e) => {
            error!("Health check failed: {:#}", e);
            Err(api_error(
                Status::ServiceUnavailable,
                "Database unavailable",
                "DATABASE_ERROR",
                &["Check the database path in config.yaml"],
                None,
            ))
        }
    }
}
