//! HTTP surface of the signing service.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::to_bytes,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use remsig_keystore::{registry::normalize_pubkey_hex, KeyRegistry};
use remsig_network_spec::ChainSpec;
use remsig_slashing::SlashingStore;
use serde::Serialize;
use tracing::info;

pub mod envelope;
pub mod error;
pub mod pipeline;

use envelope::RequestEnvelope;
use error::ApiError;

/// Request bodies larger than this are rejected outright.
const MAX_BODY_BYTES: usize = 1 << 20;

/// How long draining connections may take once shutdown begins.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct AppState {
    pub registry: KeyRegistry,
    pub store: Arc<dyn SlashingStore>,
    pub spec: ChainSpec,
}

pub fn router(state: Arc<AppState>, api_prefix: &str) -> Router {
    let base = Router::new()
        .route("/healthz", get(healthz))
        .route("/sign/{pubkey}", post(sign))
        .with_state(state);

    match normalize_prefix(api_prefix) {
        None => base,
        Some(prefix) => Router::new().nest(&prefix, base),
    }
}

/// Serve until ctrl-c, then drain in-flight requests for a bounded grace
/// period.
pub async fn serve(address: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(%address, "signing API listening");

    let (drain_started, drain_watch) = tokio::sync::oneshot::channel::<()>();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received, draining connections");
        let _ = drain_started.send(());
    });
    let graceful = async move { graceful.await };

    tokio::select! {
        result = graceful => result,
        _ = async {
            let _ = drain_watch.await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } => Ok(()),
    }
}

fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

async fn healthz() {}

#[derive(Serialize)]
struct SignResponse {
    signature: String,
}

async fn sign(
    State(state): State<Arc<AppState>>,
    Path(pubkey): Path<String>,
    request: Request,
) -> Response {
    match handle_sign(state, pubkey, request).await {
        Ok(signature) => (StatusCode::OK, Json(SignResponse { signature })).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn handle_sign(
    state: Arc<AppState>,
    pubkey: String,
    request: Request,
) -> Result<String, ApiError> {
    let pubkey = normalize_pubkey_hex(&pubkey);
    if pubkey.is_empty() {
        return Err(ApiError::InvalidRequest("missing public key in URL".into()));
    }
    if state.registry.get(&pubkey).is_none() {
        return Err(ApiError::UnknownValidator);
    }

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|err| ApiError::InvalidRequest(format!("read body: {err}")))?;
    let request_envelope: RequestEnvelope = serde_json::from_slice(&body)
        .map_err(|err| ApiError::InvalidRequest(format!("invalid JSON: {err}")))?;

    // SSZ hashing and BLS signing are CPU-bound and the store call blocks,
    // so the whole pipeline runs off the async workers.
    tokio::task::spawn_blocking(move || {
        let key = state
            .registry
            .get(&pubkey)
            .ok_or(ApiError::UnknownValidator)?;
        pipeline::sign_request(&request_envelope, key, state.store.as_ref(), &state.spec)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("signing task: {err}")))?
}
