// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

mod config;
mod probe;

#[derive(clap::Subcommand, Debug)]
enum Subcommand {
    /// Configuration-related commands
    Config(self::config::Options),

    /// Run the probe loop
    Probe(self::probe::Options),
}

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Options {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: Utf8PathBuf,

    #[command(subcommand)]
    subcommand: Option<Subcommand>,
}

impl Options {
    /// Assemble the configuration sources: the YAML file, overridden by
    /// `HTTPMETER_`-prefixed environment variables.
    pub fn figment(&self) -> Figment {
        Figment::new()
            .merge(Yaml::file(self.config.as_std_path()))
            .merge(Env::prefixed("HTTPMETER_").split("__"))
    }

    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as S;
        match self.subcommand {
            Some(S::Config(c)) => c.run(figment),
            Some(S::Probe(c)) => c.run(figment).await,

            // Run the probe loop by default
            None => self::probe::Options::default().run(figment).await,
        }
    }
}
