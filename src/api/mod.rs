//! HTTP API server for the AITwin gateway

pub mod ask;
pub mod health;
pub mod history;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::history::SessionRegistry;
use crate::persona::Persona;
use crate::pipeline::Pipeline;
use crate::Result;

/// Header carrying the caller's session identity
pub const SESSION_HEADER: &str = "x-session-id";

/// Shared state for API handlers
pub struct ApiState {
    /// The question-to-answer pipeline
    pub pipeline: Pipeline,

    /// Live sessions and their history logs
    pub sessions: SessionRegistry,

    /// Display name of the active persona
    pub persona_name: String,

    /// Tagline of the active persona
    pub persona_tagline: Option<String>,

    /// Interview questions the persona is prepared for
    pub sample_questions: Vec<String>,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    #[must_use]
    pub fn new(pipeline: Pipeline, persona: &Persona, config: &crate::Config) -> Self {
        let state = Arc::new(ApiState {
            pipeline,
            sessions: SessionRegistry::new(),
            persona_name: persona.identity.name.clone(),
            persona_tagline: persona.identity.tagline.clone(),
            sample_questions: persona.personality.sample_questions.clone(),
            max_upload_bytes: config.limits.max_upload_bytes,
        });

        Self {
            state,
            host: config.server.host.clone(),
            port: config.server.port,
        }
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .nest("/api", ask::router(Arc::clone(&self.state)))
            .nest("/api/history", history::router(Arc::clone(&self.state)))
            .merge(health::router())
            .merge(health::status_router(Arc::clone(&self.state)))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
