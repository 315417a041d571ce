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

use super::InboundMessage;
use crate::config::Config;
use crate::error::ListenerError;

/// A stream of messages from one subscription.
///
/// Dropping the source releases the underlying transport.
#[async_trait::async_trait]
pub trait MessageSource: std::fmt::Debug + Send {
    /// Returns the next message.
    ///
    /// `None` represents the end of the stream. In practice broker sessions
    /// stay open until they are dropped or fail.
    async fn next(&mut self) -> Option<Result<InboundMessage, ListenerError>>;
}

/// Opens message sources.
///
/// Implementations make a single attempt and do not retry.
#[async_trait::async_trait]
pub trait Connector: std::fmt::Debug + Send + Sync {
    async fn connect(&self, config: &Config) -> Result<Box<dyn MessageSource>, ListenerError>;
}
