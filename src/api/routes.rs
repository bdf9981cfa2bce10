use askama::Template;
use axum::{
    routing::{get, post},
    Router,
    extract::{Form, Json, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::api::models::{RunForm, RunRequest, RunResponse};
use crate::api::pages::{IndexPage, RunView};
use crate::api::response;
use crate::pipeline::parse_fields;
use crate::storage::artifact_kind;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/scrape", post(scrape_form_handler))
        .route("/download/:file_name", get(download_handler))
        .route("/api/scrape", post(scrape_api_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn index_handler() -> Result<Html<String>> {
    Ok(Html(IndexPage::blank().render()?))
}

async fn scrape_form_handler(
    State(state): State<AppState>,
    Form(form): Form<RunForm>,
) -> Result<Html<String>> {
    let fields = parse_fields(&form.fields);

    let page = match state.pipeline.run(&form.url, &fields).await {
        Ok(artifacts) => match RunView::new(&artifacts) {
            Ok(view) => IndexPage::succeeded(form.url, form.fields, view),
            Err(err) => IndexPage::failed(form.url, form.fields, err.to_string()),
        },
        Err(err) => IndexPage::failed(form.url, form.fields, err.to_string()),
    };

    Ok(Html(page.render()?))
}

async fn download_handler(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Response {
    let Some(kind) = artifact_kind(&file_name) else {
        return (StatusCode::NOT_FOUND, "Unknown file").into_response();
    };

    let path = state.pipeline.output_dir().join(&file_name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            info!(file = %file_name, bytes = bytes.len(), "Serving download");
            (
                [
                    (header::CONTENT_TYPE, kind.content_type().to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file_name),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(file = %file_name, "Requested download does not exist");
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
        Err(err) => AppError::Io(err).into_response(),
    }
}

async fn scrape_api_handler(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> impl IntoResponse {
    let fields: Vec<String> = req
        .fields
        .iter()
        .map(|field| field.trim().to_string())
        .filter(|field| !field.is_empty())
        .collect();

    match state.pipeline.run(&req.url, &fields).await {
        Ok(artifacts) => response::success(RunResponse::new(&req.url, &artifacts)),
        Err(err) => response::failure(&err),
    }
}

async fn health_handler() -> &'static str {
    "ok"
}
