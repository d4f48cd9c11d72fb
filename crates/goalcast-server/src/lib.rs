//! Goalcast Web Server
//!
//! Axum-based REST API for the Goalcast savings goal planner.
//!
//! - Predict and recommend endpoints backed by a hot-swappable model
//! - Background retraining on the blocking pool, one run at a time
//! - Restrictive CORS policy driven by configuration
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use goalcast_core::config::{GoalcastConfig, ServerSection};
use goalcast_core::{
    ModelHandle, ModelStore, NarrativeStyle, Planner, SyntheticDataGenerator, Trainer,
};

mod handlers;

/// Upper bound on records generated for a single training request
pub const MAX_TRAINING_RECORDS: usize = 100_000;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        Self {
            allowed_origins: section.cors_origins.clone(),
        }
    }
}

/// Dataset size and seed used when a training request omits them
#[derive(Debug, Clone, Copy)]
pub struct TrainingDefaults {
    pub records: usize,
    pub seed: u64,
}

/// Shared application state
pub struct AppState {
    pub planner: Planner,
    pub store: Arc<dyn ModelStore>,
    pub trainer: Trainer,
    pub generator: SyntheticDataGenerator,
    pub training: TrainingDefaults,
}

impl AppState {
    /// Build state from resolved configuration around an existing handle
    pub fn from_config(
        config: &GoalcastConfig,
        handle: ModelHandle,
        store: Arc<dyn ModelStore>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            planner: Planner::new(handle, config.narrative.clone()),
            store,
            trainer: Trainer::new(config.training.trainer_config()),
            generator: SyntheticDataGenerator::new(config.generator.clone())?,
            training: TrainingDefaults {
                records: config.training.records,
                seed: config.training.seed,
            },
        })
    }

    /// Default settings around the given handle and store
    pub fn new(handle: ModelHandle, store: Arc<dyn ModelStore>) -> Self {
        Self {
            planner: Planner::new(handle, NarrativeStyle::default()),
            store,
            trainer: Trainer::default(),
            generator: SyntheticDataGenerator::default(),
            training: TrainingDefaults {
                records: goalcast_core::synthetic::DEFAULT_RECORDS,
                seed: goalcast_core::synthetic::DEFAULT_SEED,
            },
        }
    }

    pub fn handle(&self) -> &ModelHandle {
        self.planner.handle()
    }
}

/// Create the application router
pub fn create_router(state: AppState, config: ServerConfig) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/model", get(handlers::model_status))
        .route("/predict", post(handlers::predict))
        .route("/recommend", post(handlers::recommend))
        .route("/train", post(handlers::train));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    state: AppState,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    match state.handle().current() {
        Some(model) => info!(
            trained_at = %model.metadata.trained_at,
            records = model.metadata.training_records,
            "Serving model from {}",
            state.store.location()
        ),
        None => warn!("⚠️  No model loaded - predictions return 503 until POST /api/train"),
    }

    let app = create_router(state, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Engine errors the caller can act on keep their message
        if let Some(core) = err.downcast_ref::<goalcast_core::Error>() {
            match core {
                goalcast_core::Error::InvalidInput(_)
                | goalcast_core::Error::TrainingDataInvalid(_) => {
                    return Self::bad_request(&core.to_string())
                }
                goalcast_core::Error::ModelUnavailable => {
                    return Self::unavailable(&core.to_string())
                }
                goalcast_core::Error::TrainingInProgress => {
                    return Self::conflict(&core.to_string())
                }
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
