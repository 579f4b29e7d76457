// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Request, Response, State};
use tracing::info;

use crate::config::AppConfig;
use crate::pipeline::MatchReport;

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
    }
}

#[post("/match", data = "<upload>")]
pub async fn match_resume(
    upload: Form<MatchForm<'_>>,
    config: &State<AppConfig>,
) -> Result<Json<DataResponse<MatchReport>>, Json<StandardErrorResponse>> {
    handlers::match_resume_handler(upload, config).await
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
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
            "Check your multipart form fields".to_string(),
            "Verify the resume file is attached".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
    ))
}

// Main server start function
pub async fn start_web_server(config: AppConfig, port: u16) -> Result<()> {
    info!("Starting resume matching API server on port {}", port);

    // Let uploads through to the handler's own 10MB check.
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("limits.file", "12MiB"))
        .merge(("limits.data-form", "12MiB"));

    let _rocket = rocket::custom(figment)
        .attach(Cors)
        .manage(config)
        .register("/api", catchers![bad_request, internal_error])
        .mount("/api", routes![match_resume, health, options])
        .launch()
        .await;

    Ok(())
}
