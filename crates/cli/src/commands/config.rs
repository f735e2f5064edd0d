// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use clap::Parser;
use figment::Figment;
use httpmeter_config::{AppConfig, ConfigurationSection};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
enum Subcommand {
    /// Dump the active configuration
    Dump,
}

impl Options {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        match self.subcommand {
            Subcommand::Dump => {
                let config = AppConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;
                let config = serde_yaml::to_string(&config)?;
                print!("{config}");

                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment,
        providers::{Format, Yaml},
    };

    use super::{Options, Subcommand};

    #[test]
    fn test_invalid_config_turns_into_an_error() {
        let figment = Figment::new().merge(Yaml::string("probe:\n  interval: 0\n"));
        let options = Options {
            subcommand: Subcommand::Dump,
        };

        let err = options.run(&figment).unwrap_err();
        assert!(err.to_string().contains("interval"));
    }
}
