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

//! Starts the listener and the health server, and stops them together.

use crate::config::{Config, HealthConfig};
use crate::error::ConfigError;
use crate::health::{self, HealthState};
use crate::listener::{Connector, Listener, ListenerStatus};
use anyhow::Context as _;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::Instrument as _;

/// Runs the service on `0.0.0.0:<port>` until `shutdown` completes.
pub async fn run<F>(
    config: Result<Config, ConfigError>,
    health: HealthConfig,
    connector: Arc<dyn Connector>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], health.port));
    let tcp = TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind the health server to {addr}"))?;
    run_with_listener(tcp, config, health.subscription_id, connector, shutdown).await
}

/// Runs the service on an already bound socket.
///
/// The listener runs as a background task. A configuration error or a
/// listener failure is logged and does not stop the health server. When
/// `shutdown` completes the server stops accepting requests, the listener is
/// cancelled, and its task is joined before returning.
pub async fn run_with_listener<F>(
    tcp: TcpListener,
    config: Result<Config, ConfigError>,
    subscription_id: Option<String>,
    connector: Arc<dyn Connector>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let status = ListenerStatus::new();
    let token = CancellationToken::new();

    let listener_task = match config {
        Ok(config) => {
            let listener = Listener::new(config, connector, status.clone());
            Some(tokio::spawn(listener.run(token.clone()).in_current_span()))
        }
        Err(e) => {
            tracing::error!("Pub/Sub client not initialized, the listener will not start: {e}");
            None
        }
    };

    let graceful = async move {
        shutdown.await;
        tracing::info!("shutdown requested");
    };
    let state = HealthState::new(subscription_id.as_deref(), status);
    let served = health::serve(tcp, state, graceful).await;

    token.cancel();
    if let Some(task) = listener_task {
        match task.await {
            Ok(Ok(())) => tracing::info!("listener stopped"),
            Ok(Err(e)) => tracing::warn!("listener stopped with an error: {e}"),
            Err(e) => tracing::error!("listener task did not complete: {e}"),
        }
    }
    served.context("health server failed")
}

/// Completes on SIGINT, or on SIGTERM on Unix platforms.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("cannot listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
