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

//! A Cloud Pub/Sub consumer service.
//!
//! The service receives messages from one subscription, simulates a unit of
//! work for each message, and acknowledges (or rejects) it. An HTTP server
//! reports liveness and readiness to the orchestrator.
//!
//! Subscription management, flow control, lease extension and redelivery
//! are handled by the [google-cloud-pubsub] client library.
//!
//! [google-cloud-pubsub]: https://docs.rs/google-cloud-pubsub

pub mod config;
pub mod error;
pub mod health;
pub mod listener;
pub mod logging;
pub mod processor;
pub mod supervisor;
