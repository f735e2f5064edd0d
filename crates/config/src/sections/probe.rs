// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::util::ConfigurationSection;

fn default_target() -> Url {
    Url::parse("http://127.0.0.1:7080/hello").unwrap()
}

fn default_interval() -> u64 {
    1
}

fn is_default_interval(interval: &u64) -> bool {
    *interval == default_interval()
}

/// Configuration of the probe loop: which endpoint to request, and how often
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProbeConfig {
    /// URL requested by the probe
    #[serde(default = "default_target")]
    #[schemars(url)]
    pub target: Url,

    /// Seconds between two requests
    #[serde(default = "default_interval", skip_serializing_if = "is_default_interval")]
    pub interval: u64,

    /// Value of the `User-Agent` header sent with each request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ProbeConfig {
    /// Time to wait between two requests
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            interval: default_interval(),
            user_agent: None,
        }
    }
}

impl ConfigurationSection for ProbeConfig {
    const PATH: Option<&'static str> = Some("probe");

    fn validate(
        &self,
        _figment: &figment::Figment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        if self.interval == 0 {
            return Err("probe interval must be at least one second".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment, Jail,
        providers::{Env, Format, Yaml},
    };

    use super::*;

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    probe:
                      target: http://demo-server:7080/hello
                      interval: 5
                ",
            )?;

            let config = Figment::new().merge(Yaml::file("config.yaml"));
            let config = ProbeConfig::extract(&config).map_err(|e| e.to_string())?;

            assert_eq!(config.target.as_str(), "http://demo-server:7080/hello");
            assert_eq!(config.interval(), Duration::from_secs(5));

            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    probe:
                      target: http://demo-server:7080/hello
                ",
            )?;
            jail.set_env("HTTPMETER_PROBE__TARGET", "http://other:7080/hello");

            let config = Figment::new()
                .merge(Yaml::file("config.yaml"))
                .merge(Env::prefixed("HTTPMETER_").split("__"));
            let config = ProbeConfig::extract(&config).map_err(|e| e.to_string())?;

            assert_eq!(config.target.as_str(), "http://other:7080/hello");

            Ok(())
        });
    }

    #[test]
    fn zero_interval_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    probe:
                      interval: 0
                ",
            )?;

            let config = Figment::new().merge(Yaml::file("config.yaml"));
            assert!(ProbeConfig::extract(&config).is_err());

            Ok(())
        });
    }
}
