// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::OnceLock;

use anyhow::Context as _;
use httpmeter_config::{MetricsConfig, MetricsExporterKind, TelemetryConfig};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    metrics::{ManualReader, PeriodicReader, SdkMeterProvider},
};

static METER_PROVIDER: OnceLock<SdkMeterProvider> = OnceLock::new();

pub fn setup(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_meter(&config.metrics).context("Failed to configure metrics exporter")?;

    Ok(())
}

pub fn shutdown() -> opentelemetry_sdk::error::OTelSdkResult {
    if let Some(meter_provider) = METER_PROVIDER.get() {
        meter_provider.shutdown()?;
    }

    Ok(())
}

fn init_meter(config: &MetricsConfig) -> anyhow::Result<()> {
    let meter_provider_builder = SdkMeterProvider::builder();
    let meter_provider_builder = match config.exporter {
        MetricsExporterKind::None => meter_provider_builder.with_reader(ManualReader::default()),

        MetricsExporterKind::Stdout => {
            let exporter = opentelemetry_stdout::MetricExporter::builder().build();
            meter_provider_builder.with_reader(PeriodicReader::builder(exporter).build())
        }

        MetricsExporterKind::Otlp => {
            let mut exporter = opentelemetry_otlp::MetricExporter::builder().with_http();
            if let Some(endpoint) = &config.endpoint {
                exporter = exporter.with_endpoint(endpoint.to_string());
            }
            let exporter = exporter
                .build()
                .context("Failed to configure OTLP metric exporter")?;

            meter_provider_builder.with_reader(PeriodicReader::builder(exporter).build())
        }
    };

    let meter_provider = meter_provider_builder.with_resource(resource()).build();

    METER_PROVIDER
        .set(meter_provider.clone())
        .map_err(|_| anyhow::anyhow!("METER_PROVIDER was set twice"))?;
    opentelemetry::global::set_meter_provider(meter_provider);

    Ok(())
}

fn resource() -> Resource {
    Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .build()
}
