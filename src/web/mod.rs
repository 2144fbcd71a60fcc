// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use crate::analysis::{GeminiClient, InterviewAnalysis, SkillGapReport};
use crate::core::{ConfigManager, Database};
use crate::experiences::{ExperienceRepository, InterviewExperience, NewExperience};
use anyhow::{Context, Result};
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[get("/experiences?<q>")]
pub async fn list_experiences(
    q: Option<String>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<InterviewExperience>>> {
    handlers::list_experiences_handler(q, db).await
}

#[get("/experiences/<id>")]
pub async fn get_experience(
    id: i64,
    db: &State<Database>,
) -> ApiResult<DataResponse<InterviewExperience>> {
    handlers::get_experience_handler(id, db).await
}

#[post("/experiences", data = "<request>")]
pub async fn create_experience(
    request: Json<StandardRequest<NewExperience>>,
    db: &State<Database>,
) -> Result<(Status, Json<DataResponse<InterviewExperience>>), ApiError> {
    handlers::create_experience_handler(request, db).await
}

#[post("/experiences/<id>/analysis")]
pub async fn analyze_experience(
    id: i64,
    db: &State<Database>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<InterviewAnalysis>> {
    handlers::analyze_experience_handler(id, db, client).await
}

#[post("/skill-gap", data = "<request>")]
pub async fn skill_gap(
    request: Json<StandardRequest<SkillGapRequest>>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<SkillGapReport>> {
    handlers::skill_gap_handler(request, client).await
}

#[post("/skill-gap/upload", data = "<upload>")]
pub async fn skill_gap_upload(
    upload: Form<SkillGapUploadForm<'_>>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<SkillGapReport>> {
    handlers::skill_gap_upload_handler(upload, client).await
}

#[get("/health")]
pub async fn health(
    db: &State<Database>,
    client: &State<GeminiClient>,
) -> ApiResult<DataResponse<HealthData>> {
    handlers::health_handler(db, client).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {} {}", request.method(), request.uri()),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable_entity() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be processed".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec![
            "Check field names and types".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the application without launching it.
pub fn build_rocket(db: Database, client: GeminiClient, port: u16) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", 10.mebibytes())
        .limit("data-form", 11.mebibytes());

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(db)
        .manage(client)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable_entity, internal_error],
        )
        .mount(
            "/api",
            routes![
                list_experiences,
                get_experience,
                create_experience,
                analyze_experience,
                skill_gap,
                skill_gap_upload,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: &ConfigManager, port: u16) -> Result<()> {
    config.ensure_directories().await?;

    let db = Database::new(&config.environment.database_path).await?;
    if config.server.seed_data {
        ExperienceRepository::new(db.pool()).seed_if_empty().await?;
    }

    let client = GeminiClient::new(&config.gemini)?;

    info!("Starting interview-hub API server on port {}", port);
    info!("Database: {}", config.environment.database_path.display());
    info!(
        "AI analysis: {}",
        if client.is_configured() {
            "enabled"
        } else {
            "fallback only"
        }
    );

    let _rocket = build_rocket(db, client, port)
        .launch()
        .await
        .context("Web server terminated with an error")?;

    Ok(())
}
