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

//! Errors returned by the consumer service.
//!
//! Each error is handled at the boundary that produces it. None of them stops
//! the process: configuration and listener errors stop the listener, and
//! processing errors turn into a negative acknowledgement.

/// A boxed error from the client library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The environment does not describe a usable subscription.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty.
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// A single message could not be processed.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ProcessError {
    /// The payload is not valid UTF-8.
    #[error("cannot decode payload as UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// The task processing the message panicked.
    #[error("message processing panicked: {0}")]
    Panicked(String),
}

/// The listener stopped because of an error.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ListenerError {
    /// The session with the broker could not be established.
    #[error("cannot connect to the subscription: {0}")]
    Connect(#[source] BoxError),

    /// The session failed after it was established.
    #[error("the streaming pull session stopped: {0}")]
    Stream(#[source] BoxError),
}
