// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use bytes::Bytes;
use clap::Parser;
use figment::Figment;
use http::{Request, header::USER_AGENT};
use http_body_util::Empty;
use httpmeter_client::TransportBuilder;
use httpmeter_config::{AppConfig, ConfigurationSection};
use tower::{Service, ServiceExt};
use tracing::{error, info};

static DEFAULT_USER_AGENT: &str = concat!("httpmeter/", env!("CARGO_PKG_VERSION"));

#[derive(Parser, Debug, Default)]
pub(super) struct Options {
    /// Send a single request and exit
    #[arg(long)]
    once: bool,
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let config = AppConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;

        // The transport reports through the global meter provider, which the
        // telemetry setup registered before this command ran.
        let mut transport = TransportBuilder::new(env!("CARGO_PKG_NAME"))
            .build_with_default_dispatcher::<Empty<Bytes>>()?;

        let user_agent = config
            .probe
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT);

        let mut interval = tokio::time::interval(config.probe.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(target = %config.probe.target, "Starting probe loop");

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    break;
                }
            }

            let request = Request::builder()
                .method("GET")
                .uri(config.probe.target.as_str())
                .header(USER_AGENT, user_agent)
                .body(Empty::<Bytes>::new())?;

            let start = std::time::Instant::now();
            match transport.ready().await?.call(request).await {
                Ok(response) => {
                    let latency = start.elapsed().as_secs_f64() * 1000.0;
                    info!(
                        status = %response.status(),
                        latency_ms = latency,
                        "Request finished"
                    );
                }
                Err(err) => {
                    // Failed dispatches are not measured; they only show up
                    // in the logs
                    error!(error = &err as &dyn std::error::Error, "Request failed");
                }
            }

            if self.once {
                break;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
