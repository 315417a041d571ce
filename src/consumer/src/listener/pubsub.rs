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

//! [Connector] backed by the Cloud Pub/Sub client library.
//!
//! The client library owns subscription management, flow control, lease
//! extension and redelivery. Handlers only enqueue acks and nacks onto a
//! channel drained by the client's lease loop, so they can be used from any
//! task without locking.

use super::{Acknowledger, Connector, InboundMessage, MessageSource};
use crate::config::Config;
use crate::error::ListenerError;
use google_cloud_pubsub::client::Subscriber;
use google_cloud_pubsub::subscriber::handler::Handler;
use google_cloud_pubsub::subscriber::session::Session;

/// Opens streaming pull sessions with [Application Default Credentials].
///
/// `GOOGLE_APPLICATION_CREDENTIALS` is read by the credentials loader, not by
/// this type.
///
/// [application default credentials]: https://cloud.google.com/docs/authentication#adc
#[derive(Clone, Debug, Default)]
pub struct PubsubConnector;

impl PubsubConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Connector for PubsubConnector {
    async fn connect(&self, config: &Config) -> Result<Box<dyn MessageSource>, ListenerError> {
        let client = Subscriber::builder()
            .build()
            .await
            .map_err(|e| ListenerError::Connect(e.into()))?;

        let max_outstanding = i64::try_from(config.max_in_flight).unwrap_or(i64::MAX);
        let session = client
            .streaming_pull(config.subscription_path())
            .set_max_outstanding_messages(max_outstanding)
            .start();
        tracing::info!(
            "Pub/Sub client initialized for subscription: {}",
            config.subscription_path()
        );
        Ok(Box::new(PubsubSource { session }))
    }
}

#[derive(Debug)]
struct PubsubSource {
    session: Session,
}

#[async_trait::async_trait]
impl MessageSource for PubsubSource {
    async fn next(&mut self) -> Option<Result<InboundMessage, ListenerError>> {
        let item = self.session.next().await?;
        Some(
            item.map(|(message, handler)| {
                InboundMessage::new(message.message_id, message.data, handler)
            })
            .map_err(|e| ListenerError::Stream(e.into())),
        )
    }
}

impl Acknowledger for Handler {
    fn ack(self: Box<Self>) {
        Handler::ack(*self)
    }

    fn nack(self: Box<Self>) {
        // In google-cloud-pubsub 0.32.3-preview, dropping the handler nacks.
        drop(*self)
    }
}

#[cfg(all(test, feature = "run-integration-tests"))]
mod tests {
    use super::*;

    // Requires credentials and an existing subscription.
    #[tokio::test]
    async fn connect() -> anyhow::Result<()> {
        let config = Config::from_env()?;
        let mut source = PubsubConnector::new().connect(&config).await?;
        let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(10);
        while let Ok(Some(item)) = tokio::time::timeout_at(deadline, source.next()).await {
            let message = item?;
            message.nack();
        }
        Ok(())
    }
}
