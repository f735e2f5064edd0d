// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use figment::Figment;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod probe;
mod telemetry;

pub use self::{
    probe::ProbeConfig,
    telemetry::{MetricsConfig, MetricsExporterKind, TelemetryConfig},
};
use crate::util::ConfigurationSection;

/// Application configuration root
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// Configuration of the probe loop
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Configuration related to sending monitoring data
    #[serde(default, skip_serializing_if = "TelemetryConfig::is_default")]
    pub telemetry: TelemetryConfig,
}

impl ConfigurationSection for AppConfig {
    fn validate(
        &self,
        figment: &Figment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        self.probe.validate(figment)?;
        self.telemetry.validate(figment)?;

        Ok(())
    }
}
