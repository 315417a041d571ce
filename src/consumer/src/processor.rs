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

//! The per-message unit of work.

use crate::config::Config;
use crate::error::ProcessError;
use crate::listener::InboundMessage;
use std::time::Duration;

/// The result of processing one message.
#[derive(Debug)]
pub enum ProcessOutcome {
    Success,
    Failure(ProcessError),
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Decodes each payload and simulates work by waiting a fixed delay.
#[derive(Clone, Debug)]
pub struct Processor {
    delay: Duration,
    topic: String,
}

impl Processor {
    pub fn new<T: Into<String>>(delay: Duration, topic: T) -> Self {
        Self {
            delay,
            topic: topic.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.processing_delay, config.topic_tag())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The short identifier used in log lines.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Processes `message`.
    ///
    /// Payloads that are not valid UTF-8 fail immediately, without waiting.
    /// Valid payloads succeed after the configured delay. The wait only
    /// suspends the task handling this message.
    pub async fn process(&self, message: &InboundMessage) -> ProcessOutcome {
        let data = match std::str::from_utf8(message.payload()) {
            Ok(data) => data,
            Err(e) => return ProcessOutcome::Failure(e.into()),
        };
        tracing::info!(
            topic = %self.topic,
            message_id = message.id(),
            "received message, data: {data}"
        );

        tokio::time::sleep(self.delay).await;

        tracing::debug!(
            topic = %self.topic,
            message_id = message.id(),
            "processed message in {:?}",
            self.delay
        );
        ProcessOutcome::Success
    }
}
