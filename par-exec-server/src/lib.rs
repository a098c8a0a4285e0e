use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use par_exec::{
    CompileOutcome, CompileRequest, CompileService, ExecConfig, Language, ToolchainHealth,
    ToolchainMode,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid mode: {0}")]
    InvalidMode(String),
    #[error("invalid language: {0}")]
    InvalidLanguage(String),
    #[error("execution error: {0}")]
    Execution(#[from] par_exec::Error),
    #[error("server error: {0}")]
    Server(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::InvalidMode(_) | ServerError::InvalidLanguage(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServerError::Execution(par_exec::Error::ResourceExhausted(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ServerError::Execution(_) | ServerError::Server(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Wire request, field names matching the browser editor's payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct CompileApiRequest {
    pub code: String,
    /// `"openmp"` or `"mpi"` (the long mode names are accepted too)
    #[serde(default = "default_mode")]
    pub mode: String,
    /// `"c"` or `"cpp"`
    #[serde(default = "default_language")]
    pub language: String,
    /// Worker count: threads for OpenMP, ranks for MPI
    #[serde(default = "default_workers")]
    pub threads: u32,
}

fn default_mode() -> String {
    "openmp".to_string()
}

fn default_language() -> String {
    "c".to_string()
}

fn default_workers() -> u32 {
    4
}

#[derive(Clone)]
pub struct AppState {
    service: Arc<CompileService>,
}

pub async fn create_app(
    max_concurrent_executions: usize,
    config: ExecConfig,
) -> Result<Router, ServerError> {
    let service = CompileService::new(max_concurrent_executions, config).await?;

    let state = AppState {
        service: Arc::new(service),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/examples", get(examples))
        .route("/compile", post(compile))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    Ok(app)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("starting compile server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<ToolchainHealth> {
    Json(state.service.health().await)
}

async fn examples(State(state): State<AppState>) -> Json<BTreeMap<&'static str, &'static str>> {
    let catalog = state
        .service
        .sample_programs()
        .iter()
        .map(|sample| (sample.name, sample.code))
        .collect();
    Json(catalog)
}

async fn compile(
    State(state): State<AppState>,
    Json(payload): Json<CompileApiRequest>,
) -> Result<Json<CompileOutcome>, ServerError> {
    let mode: ToolchainMode = payload
        .mode
        .parse()
        .map_err(|_| ServerError::InvalidMode(payload.mode.clone()))?;
    let language: Language = payload
        .language
        .parse()
        .map_err(|_| ServerError::InvalidLanguage(payload.language.clone()))?;

    let request = CompileRequest {
        code: payload.code,
        mode,
        language,
        workers: payload.threads,
    };

    let outcome = state.service.execute(request).await.map_err(|e| {
        error!("execution error: {}", e);
        ServerError::from(e)
    })?;

    Ok(Json(outcome))
}
