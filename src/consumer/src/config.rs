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

//! Service configuration, read once from the process environment.
//!
//! The listener needs a complete [Config]. The health server only needs a
//! [HealthConfig], which never fails to load, so the HTTP endpoint stays up
//! even when the listener cannot start.

use crate::error::ConfigError;
use std::time::Duration;

pub const PROJECT_ID_VAR: &str = "GCP_PROJECT_ID";
pub const SUBSCRIPTION_ID_VAR: &str = "PUBSUB_SUBSCRIPTION_ID";
pub const CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const PROCESSING_DELAY_VAR: &str = "PROCESSING_DELAY_SECONDS";
pub const MAX_IN_FLIGHT_VAR: &str = "MAX_IN_FLIGHT_MESSAGES";
pub const PORT_VAR: &str = "PORT";

pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;
pub const DEFAULT_PORT: u16 = 80;

// Deployments name their subscriptions `my-pubsub-subscription-<topic>`.
const SUBSCRIPTION_PREFIX: &str = "my-pubsub-subscription-";

/// Configuration for the subscription listener.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub project_id: String,
    pub subscription_id: String,
    /// Consumed by the client library through Application Default
    /// Credentials. This service only checks that it is set.
    pub credentials_path: String,
    /// Simulated work per message.
    pub processing_delay: Duration,
    /// Maximum number of messages processed concurrently.
    pub max_in_flight: usize,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Loads the configuration using `lookup` to resolve variables.
    ///
    /// Empty values are treated as missing. All missing variables are
    /// reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let vars = (
            get(PROJECT_ID_VAR),
            get(SUBSCRIPTION_ID_VAR),
            get(CREDENTIALS_VAR),
        );
        match vars {
            (Some(project_id), Some(subscription_id), Some(credentials_path)) => Ok(Self {
                project_id,
                subscription_id,
                credentials_path,
                processing_delay: parse_delay(get(PROCESSING_DELAY_VAR)),
                max_in_flight: parse_max_in_flight(get(MAX_IN_FLIGHT_VAR)),
            }),
            (project_id, subscription_id, credentials_path) => {
                let missing = [
                    (PROJECT_ID_VAR, project_id.is_none()),
                    (SUBSCRIPTION_ID_VAR, subscription_id.is_none()),
                    (CREDENTIALS_VAR, credentials_path.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(ConfigError::Missing(missing))
            }
        }
    }

    /// The fully qualified subscription name, as used by the Pub/Sub API.
    pub fn subscription_path(&self) -> String {
        format!(
            "projects/{}/subscriptions/{}",
            self.project_id, self.subscription_id
        )
    }

    /// A short identifier for log lines.
    pub fn topic_tag(&self) -> String {
        topic_tag(&self.subscription_id)
    }
}

/// Strips the deployment prefix from a subscription id.
pub fn topic_tag(subscription_id: &str) -> String {
    subscription_id.replace(SUBSCRIPTION_PREFIX, "")
}

/// Configuration for the health server.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthConfig {
    pub port: u16,
    /// The raw subscription id, if any, reported by the health endpoints.
    pub subscription_id: Option<String>,
}

impl HealthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(PORT_VAR) {
            None => DEFAULT_PORT,
            Some(v) => v.trim().parse::<u16>().unwrap_or_else(|e| {
                tracing::warn!("invalid {PORT_VAR}={v:?} ({e}), using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
        };
        Self {
            port,
            subscription_id: lookup(SUBSCRIPTION_ID_VAR).filter(|v| !v.trim().is_empty()),
        }
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// A malformed delay falls back to the default instead of failing startup.
fn parse_delay(value: Option<String>) -> Duration {
    let Some(value) = value else {
        return DEFAULT_PROCESSING_DELAY;
    };
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|e| e.to_string())
        .and_then(|secs| Duration::try_from_secs_f64(secs).map_err(|e| e.to_string()));
    match parsed {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(
                "invalid {PROCESSING_DELAY_VAR}={value:?} ({e}), using {:?}",
                DEFAULT_PROCESSING_DELAY
            );
            DEFAULT_PROCESSING_DELAY
        }
    }
}

fn parse_max_in_flight(value: Option<String>) -> usize {
    let Some(value) = value else {
        return DEFAULT_MAX_IN_FLIGHT;
    };
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            tracing::warn!("invalid {MAX_IN_FLIGHT_VAR}={value:?}, using {DEFAULT_MAX_IN_FLIGHT}");
            DEFAULT_MAX_IN_FLIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_env::ScopedEnv;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (PROJECT_ID_VAR, "p1"),
            (SUBSCRIPTION_ID_VAR, "s1"),
            (CREDENTIALS_VAR, "/tmp/c.json"),
        ]
    }

    #[test]
    fn complete() -> anyhow::Result<()> {
        let mut vars = required();
        vars.push((PROCESSING_DELAY_VAR, "0"));
        let config = Config::from_lookup(lookup(&vars))?;
        assert_eq!(
            config,
            Config {
                project_id: "p1".to_string(),
                subscription_id: "s1".to_string(),
                credentials_path: "/tmp/c.json".to_string(),
                processing_delay: Duration::ZERO,
                max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            }
        );
        assert_eq!(config.subscription_path(), "projects/p1/subscriptions/s1");
        Ok(())
    }

    #[test]
    fn defaults() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&required()))?;
        assert_eq!(config.processing_delay, DEFAULT_PROCESSING_DELAY);
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        Ok(())
    }

    #[test_case(PROJECT_ID_VAR; "project")]
    #[test_case(SUBSCRIPTION_ID_VAR; "subscription")]
    #[test_case(CREDENTIALS_VAR; "credentials")]
    fn missing_one(name: &str) {
        let vars: Vec<_> = required().into_iter().filter(|(k, _)| *k != name).collect();
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(
            matches!(err, ConfigError::Missing(ref m) if m == &vec![name]),
            "{err:?}"
        );
        assert!(err.to_string().contains(name), "{err}");
    }

    #[test]
    fn missing_all() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        let ConfigError::Missing(missing) = err;
        assert_eq!(
            missing,
            vec![PROJECT_ID_VAR, SUBSCRIPTION_ID_VAR, CREDENTIALS_VAR]
        );
    }

    #[test]
    fn empty_is_missing() {
        let mut vars = required();
        vars[0] = (PROJECT_ID_VAR, "  ");
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(
            matches!(err, ConfigError::Missing(ref m) if m == &vec![PROJECT_ID_VAR]),
            "{err:?}"
        );
    }

    #[test_case("0", Duration::ZERO)]
    #[test_case("1.5", Duration::from_millis(1500))]
    #[test_case(" 2 ", Duration::from_secs(2))]
    #[test_case("abc", DEFAULT_PROCESSING_DELAY)]
    #[test_case("-1", DEFAULT_PROCESSING_DELAY)]
    #[test_case("NaN", DEFAULT_PROCESSING_DELAY)]
    #[test_case("inf", DEFAULT_PROCESSING_DELAY)]
    fn processing_delay(value: &str, want: Duration) -> anyhow::Result<()> {
        let mut vars = required();
        vars.push((PROCESSING_DELAY_VAR, value));
        let config = Config::from_lookup(lookup(&vars))?;
        assert_eq!(config.processing_delay, want);
        Ok(())
    }

    #[test_case("25", 25)]
    #[test_case("0", DEFAULT_MAX_IN_FLIGHT)]
    #[test_case("-3", DEFAULT_MAX_IN_FLIGHT)]
    #[test_case("many", DEFAULT_MAX_IN_FLIGHT)]
    fn max_in_flight(value: &str, want: usize) -> anyhow::Result<()> {
        let mut vars = required();
        vars.push((MAX_IN_FLIGHT_VAR, value));
        let config = Config::from_lookup(lookup(&vars))?;
        assert_eq!(config.max_in_flight, want);
        Ok(())
    }

    #[test_case("my-pubsub-subscription-orders", "orders")]
    #[test_case("orders", "orders")]
    #[test_case("my-pubsub-subscription-", "")]
    fn topic_tags(subscription: &str, want: &str) {
        assert_eq!(topic_tag(subscription), want);
    }

    #[test]
    fn health_config() {
        let config = HealthConfig::from_lookup(lookup(&[]));
        assert_eq!(
            config,
            HealthConfig {
                port: DEFAULT_PORT,
                subscription_id: None
            }
        );

        let config = HealthConfig::from_lookup(lookup(&[
            (PORT_VAR, "8080"),
            (SUBSCRIPTION_ID_VAR, "s1"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.subscription_id.as_deref(), Some("s1"));

        let config = HealthConfig::from_lookup(lookup(&[(PORT_VAR, "http")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn blank_subscription_is_missing_everywhere() {
        let mut vars = required();
        vars[1] = (SUBSCRIPTION_ID_VAR, "  ");
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(
            matches!(err, ConfigError::Missing(ref m) if m == &vec![SUBSCRIPTION_ID_VAR]),
            "{err:?}"
        );

        let health = HealthConfig::from_lookup(lookup(&vars));
        assert_eq!(health.subscription_id, None);
    }

    // These tests must run serially because they manipulate the environment.
    #[test]
    #[serial_test::serial]
    fn from_env() -> anyhow::Result<()> {
        let _p = ScopedEnv::set(PROJECT_ID_VAR, "p1");
        let _s = ScopedEnv::set(SUBSCRIPTION_ID_VAR, "s1");
        let _c = ScopedEnv::set(CREDENTIALS_VAR, "/tmp/c.json");
        let _d = ScopedEnv::set(PROCESSING_DELAY_VAR, "abc");
        let _m = ScopedEnv::remove(MAX_IN_FLIGHT_VAR);

        let config = Config::from_env()?;
        assert_eq!(config.subscription_path(), "projects/p1/subscriptions/s1");
        assert_eq!(config.processing_delay, DEFAULT_PROCESSING_DELAY);
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn from_env_missing_project() {
        let _p = ScopedEnv::remove(PROJECT_ID_VAR);
        let _s = ScopedEnv::set(SUBSCRIPTION_ID_VAR, "s1");
        let _c = ScopedEnv::set(CREDENTIALS_VAR, "/tmp/c.json");

        let err = Config::from_env().unwrap_err();
        assert!(
            matches!(err, ConfigError::Missing(ref m) if m == &vec![PROJECT_ID_VAR]),
            "{err:?}"
        );

        // The health server still has what it needs.
        let health = HealthConfig::from_env();
        assert_eq!(health.subscription_id.as_deref(), Some("s1"));
    }
}
