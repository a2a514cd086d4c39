use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use voxgate_config::Config;

use crate::{
    error::Result,
    orchestrator::Orchestrator,
    request::ExtractPayload,
    types::{SpeakRequest, SpeakResponse},
};

/// Speech gateway state shared across requests
pub struct Server {
    orchestrator: Orchestrator,
}

impl Server {
    pub fn build(config: Config) -> Result<Self> {
        Ok(Self {
            orchestrator: Orchestrator::from_config(config)?,
        })
    }

    /// Build with an explicit flag store instead of the configured one
    pub fn with_flag_store(
        config: Config,
        store: std::sync::Arc<dyn voxgate_provider::FlagStore>,
    ) -> Result<Self> {
        Ok(Self {
            orchestrator: Orchestrator::with_flag_store(config, store)?,
        })
    }

    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

/// Router for the speech endpoint
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/v1/speech", post(speak))
}

async fn speak(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<SpeakRequest>,
) -> Result<Json<SpeakResponse>> {
    let response = server.orchestrator.speak(request).await?;
    Ok(Json(response))
}
