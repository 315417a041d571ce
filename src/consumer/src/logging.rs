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

//! Logging setup.

use tracing_subscriber::EnvFilter;

const HOSTNAME_VAR: &str = "HOSTNAME";
const HOSTNAME_FILE: &str = "/etc/hostname";

/// Installs the global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

/// The name of this host, used to tell replicas apart in the logs.
pub fn hostname() -> String {
    std::env::var(HOSTNAME_VAR)
        .ok()
        .or_else(|| std::fs::read_to_string(HOSTNAME_FILE).ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_env::ScopedEnv;

    #[test]
    #[serial_test::serial]
    fn hostname_from_env() {
        let _e = ScopedEnv::set(HOSTNAME_VAR, "consumer-7f9c\n");
        assert_eq!(hostname(), "consumer-7f9c");
    }

    #[test]
    #[serial_test::serial]
    fn hostname_fallback() {
        let _e = ScopedEnv::remove(HOSTNAME_VAR);
        assert!(!hostname().is_empty());
    }
}
