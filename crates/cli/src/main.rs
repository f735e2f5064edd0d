// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::module_name_repetitions)]

use std::{io::IsTerminal, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use httpmeter_config::{ConfigurationSection, TelemetryConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod telemetry;

fn main() -> anyhow::Result<ExitCode> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    let runtime = builder.build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<ExitCode> {
    // We're splitting the "fallible" part of main in another function to have
    // a chance to shutdown the telemetry exporters regardless of if there was
    // an error or not
    let res = try_main().await;
    if let Err(err) = self::telemetry::shutdown() {
        eprintln!("Failed to shutdown telemetry exporters: {err}");
    }
    res
}

async fn try_main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env files
    // We keep the path to log it afterwards
    let dotenv_path: Result<Option<_>, _> = dotenvy::dotenv()
        .map(Some)
        // Display the error if it is something other than the .env file not existing
        .or_else(|e| if e.not_found() { Ok(None) } else { Err(e) });

    // Setup logging
    // This writes logs to stderr
    let output = std::io::stderr();
    let with_ansi = output.is_terminal();
    let (log_writer, _guard) = tracing_appender::non_blocking(output);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_writer)
        .with_ansi(with_ansi);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("could not setup logging filter")?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // Now that logging is set up, we can log the .env file path
    if let Some(path) = dotenv_path.context("could not load .env file")? {
        tracing::info!(?path, "Loaded environment variables from .env file");
    }

    // Parse the CLI arguments
    let opts = self::commands::Options::parse();

    // Load the base configuration
    let figment = opts.figment();

    let telemetry_config = TelemetryConfig::extract(&figment)
        .map_err(anyhow::Error::from_boxed)
        .context("Failed to load telemetry config")?;

    // Setup OpenTelemetry metrics
    self::telemetry::setup(&telemetry_config).context("failed to setup OpenTelemetry")?;

    opts.run(&figment).await
}
