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

use pubsub_consumer::config::{Config, HealthConfig};
use pubsub_consumer::listener::PubsubConnector;
use pubsub_consumer::{logging, supervisor};
use std::sync::Arc;
use tracing::Instrument as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let span = tracing::info_span!("consumer", host = %logging::hostname());

    async {
        tracing::info!("starting Pub/Sub consumer");
        let config = Config::from_env();
        let health = HealthConfig::from_env();
        supervisor::run(
            config,
            health,
            Arc::new(PubsubConnector::new()),
            supervisor::shutdown_signal(),
        )
        .await
    }
    .instrument(span)
    .await
}
