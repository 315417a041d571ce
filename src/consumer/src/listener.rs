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

//! The subscription listener.
//!
//! The listener opens a session with the broker, hands every delivered
//! message to the [Processor], and maps the outcome to exactly one terminal
//! call: [InboundMessage::ack] on success, [InboundMessage::nack] on failure.

pub(crate) mod message;
mod pubsub;
pub(crate) mod source;
mod state;

pub use message::{Acknowledger, InboundMessage};
pub use pubsub::PubsubConnector;
pub use source::{Connector, MessageSource};
pub use state::{ListenerState, ListenerStatus};

use crate::config::Config;
use crate::error::{ListenerError, ProcessError};
use crate::processor::{ProcessOutcome, Processor};
use futures::FutureExt as _;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument as _;

/// Receives messages from one subscription and processes them.
#[derive(Debug)]
pub struct Listener {
    config: Arc<Config>,
    connector: Arc<dyn Connector>,
    processor: Processor,
    status: ListenerStatus,
}

impl Listener {
    pub fn new(config: Config, connector: Arc<dyn Connector>, status: ListenerStatus) -> Self {
        let processor = Processor::from_config(&config);
        Self {
            config: Arc::new(config),
            connector,
            processor,
            status,
        }
    }

    pub fn status(&self) -> ListenerStatus {
        self.status.clone()
    }

    /// Runs until `shutdown` is cancelled, the stream ends, or the session
    /// fails.
    ///
    /// The connection is attempted once. On return, every message handed to
    /// the processor has been acked or nacked and the session is dropped.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ListenerError> {
        let subscription = self.config.subscription_path();
        self.status.set(ListenerState::Connecting);

        let connect = self.connector.connect(&self.config);
        let mut source = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("shutdown requested before connecting to {subscription}");
                self.status.set(ListenerState::Stopped);
                return Ok(());
            }
            r = connect => match r {
                Ok(source) => source,
                Err(e) => {
                    tracing::error!("Pub/Sub listener will not start on {subscription}: {e}");
                    self.status.set(ListenerState::Failed);
                    return Err(e);
                }
            },
        };

        tracing::info!("starting Pub/Sub listener on {subscription}");
        self.status.set(ListenerState::Streaming);
        let result = self.stream(source.as_mut(), &shutdown).await;

        // Releases the transport.
        drop(source);
        match &result {
            Ok(()) => self.status.set(ListenerState::Stopped),
            Err(e) => {
                tracing::error!("Pub/Sub streaming pull stopped due to error: {e}");
                self.status.set(ListenerState::Failed);
            }
        }
        tracing::info!("Pub/Sub listener finished");
        result
    }

    async fn stream(
        &self,
        source: &mut dyn MessageSource,
        shutdown: &CancellationToken,
    ) -> Result<(), ListenerError> {
        let permits = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut tasks = JoinSet::new();

        let result = loop {
            // Wait for capacity before pulling, so at most `max_in_flight`
            // messages are being processed at any time.
            let permit = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break Ok(()),
                p = permits.clone().acquire_owned() => match p {
                    Ok(p) => p,
                    Err(_) => break Ok(()),
                },
            };
            let item = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break Ok(()),
                item = source.next() => item,
            };
            match item {
                None => {
                    tracing::info!("the subscription stream ended");
                    break Ok(());
                }
                Some(Err(e)) => break Err(e),
                Some(Ok(message)) => {
                    let processor = self.processor.clone();
                    let task = async move {
                        let topic = processor.topic().to_string();
                        handle(message, &topic, permit, |m| {
                            async move { processor.process(m).await }.boxed()
                        })
                        .await
                    };
                    tasks.spawn(task.in_current_span());
                }
            }
            while let Some(r) = tasks.try_join_next() {
                log_task_result(r);
            }
        };

        if !tasks.is_empty() {
            tracing::info!("waiting for {} in-flight messages", tasks.len());
        }
        while let Some(r) = tasks.join_next().await {
            log_task_result(r);
        }
        result
    }
}

/// Processes one message and makes its terminal call.
///
/// A panic in `process` still produces a nack.
async fn handle<F>(
    message: InboundMessage,
    topic: &str,
    _permit: OwnedSemaphorePermit,
    process: F,
) where
    F: for<'m> FnOnce(&'m InboundMessage) -> BoxFuture<'m, ProcessOutcome>,
{
    let outcome = AssertUnwindSafe(process(&message))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            ProcessOutcome::Failure(ProcessError::Panicked(panic_message(payload)))
        });

    let id = message.id().to_string();
    match outcome {
        ProcessOutcome::Success => {
            message.ack();
            tracing::info!(topic, message_id = %id, "acknowledged message");
        }
        ProcessOutcome::Failure(e) => {
            message.nack();
            tracing::error!(
                topic,
                message_id = %id,
                "failed to process message, nacked: {e}"
            );
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}

fn log_task_result(r: Result<(), JoinError>) {
    if let Err(e) = r {
        tracing::error!("message task did not complete: {e}");
    }
}
