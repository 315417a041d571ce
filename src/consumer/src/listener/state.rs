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

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// The lifecycle of the subscription listener.
///
/// ```text
/// Uninitialized -> Connecting -> Streaming -> Stopped
///                       |            |
///                       +------------+------> Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ListenerState {
    Uninitialized = 0,
    Connecting = 1,
    Streaming = 2,
    /// Stopped normally, on shutdown or at the end of the stream.
    Stopped = 3,
    /// Stopped because of a connection or stream error.
    Failed = 4,
}

impl ListenerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting => "connecting",
            Self::Streaming => "streaming",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Connecting,
            2 => Self::Streaming,
            3 => Self::Stopped,
            4 => Self::Failed,
            _ => Self::Uninitialized,
        }
    }
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The listener's current state, shared with the health server.
///
/// Only the listener writes. Cloning shares the underlying value.
#[derive(Clone, Debug)]
pub struct ListenerStatus(Arc<AtomicU8>);

impl Default for ListenerStatus {
    fn default() -> Self {
        Self(Arc::new(AtomicU8::new(ListenerState::Uninitialized as u8)))
    }
}

impl ListenerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ListenerState {
        ListenerState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Returns true if the listener can currently receive messages.
    pub fn is_ready(&self) -> bool {
        self.get() == ListenerState::Streaming
    }

    pub(crate) fn set(&self, state: ListenerState) {
        let previous = ListenerState::from_u8(self.0.swap(state as u8, Ordering::AcqRel));
        tracing::debug!("listener state {previous} -> {state}");
    }
}
