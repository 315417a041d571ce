// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The HTTP health endpoints.
//!
//! `GET /` is the liveness check: it reports "ok" as long as the process can
//! serve requests. `GET /ready` is the readiness check: it reports "ok" only
//! while the listener is streaming.

use crate::listener::ListenerStatus;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const NOT_SET: &str = "NOT_SET";

/// The response body for both endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct HealthState {
    subscription_id: Arc<str>,
    listener: ListenerStatus,
}

impl HealthState {
    pub fn new(subscription_id: Option<&str>, listener: ListenerStatus) -> Self {
        Self {
            subscription_id: Arc::from(subscription_id.unwrap_or(NOT_SET)),
            listener,
        }
    }
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Serves the health endpoints until `shutdown` completes.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: HealthState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("health server listening on {addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthStatus>) {
    let body = HealthStatus {
        status: "ok".to_string(),
        message: format!(
            "Pub/Sub subscriber for {} is running",
            state.subscription_id
        ),
    };
    (StatusCode::OK, Json(body))
}

async fn readiness_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthStatus>) {
    if state.listener.is_ready() {
        return health_check(State(state)).await;
    }
    let body = HealthStatus {
        status: "unavailable".to_string(),
        message: format!(
            "Pub/Sub subscriber for {} is {}",
            state.subscription_id,
            state.listener.get()
        ),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body))
}
