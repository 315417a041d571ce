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

use bytes::Bytes;

/// Delivers the terminal call for one message back to the broker.
///
/// Implementations are owned by exactly one [InboundMessage], and both
/// methods consume the acknowledger.
pub trait Acknowledger: std::fmt::Debug + Send + Sync + 'static {
    /// Acknowledge the message, removing it from the subscription backlog.
    fn ack(self: Box<Self>);

    /// Reject the message. The broker will redeliver it, possibly to
    /// another client.
    fn nack(self: Box<Self>);
}

/// A message delivered by the broker.
#[derive(Debug)]
pub struct InboundMessage {
    id: String,
    payload: Bytes,
    acker: Box<dyn Acknowledger>,
}

impl InboundMessage {
    pub fn new<I, P, A>(id: I, payload: P, acker: A) -> Self
    where
        I: Into<String>,
        P: Into<Bytes>,
        A: Acknowledger,
    {
        Self {
            id: id.into(),
            payload: payload.into(),
            acker: Box::new(acker),
        }
    }

    /// The broker-assigned message id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Acknowledge the message.
    ///
    /// The acknowledgement is best effort. The broker may still redeliver
    /// the message to this client, or another client.
    pub fn ack(self) {
        self.acker.ack()
    }

    /// Reject the message.
    pub fn nack(self) {
        self.acker.nack()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Terminal {
        Ack(String),
        Nack(String),
    }

    /// Records terminal calls so tests can verify them.
    #[derive(Clone, Debug, Default)]
    pub(crate) struct Recorder(Arc<Mutex<Vec<Terminal>>>);

    impl Recorder {
        pub(crate) fn message<P: Into<Bytes>>(&self, id: &str, payload: P) -> InboundMessage {
            InboundMessage::new(
                id,
                payload,
                RecordingAcker {
                    id: id.to_string(),
                    calls: self.clone(),
                },
            )
        }

        pub(crate) fn calls(&self) -> Vec<Terminal> {
            let calls = self.0.lock().expect("recorder lock is never poisoned");
            calls.clone()
        }

        fn push(&self, terminal: Terminal) {
            let mut calls = self.0.lock().expect("recorder lock is never poisoned");
            calls.push(terminal);
        }

        /// The terminal calls, sorted by message id.
        pub(crate) fn sorted_calls(&self) -> Vec<Terminal> {
            let mut calls = self.calls();
            calls.sort_by(|a, b| id_of(a).cmp(id_of(b)));
            calls
        }
    }

    fn id_of(t: &Terminal) -> &str {
        match t {
            Terminal::Ack(id) | Terminal::Nack(id) => id,
        }
    }

    #[derive(Debug)]
    struct RecordingAcker {
        id: String,
        calls: Recorder,
    }

    impl Acknowledger for RecordingAcker {
        fn ack(self: Box<Self>) {
            self.calls.push(Terminal::Ack(self.id));
        }
        fn nack(self: Box<Self>) {
            self.calls.push(Terminal::Nack(self.id));
        }
    }

    #[test]
    fn accessors() {
        let recorder = Recorder::default();
        let message = recorder.message("m1", "hello");
        assert_eq!(message.id(), "m1");
        assert_eq!(message.payload(), b"hello");
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn ack() {
        let recorder = Recorder::default();
        recorder.message("m1", "hello").ack();
        assert_eq!(recorder.calls(), vec![Terminal::Ack("m1".to_string())]);
    }

    #[test]
    fn nack() {
        let recorder = Recorder::default();
        recorder.message("m1", "hello").nack();
        assert_eq!(recorder.calls(), vec![Terminal::Nack("m1".to_string())]);
    }
}
