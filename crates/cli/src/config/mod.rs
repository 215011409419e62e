//! Command-line configuration

use clap::Parser;

use crate::{
    commands::Command,
    config::{api::ApiClientConfig, logging::LoggingConfig, storage::StorageConfig},
};

pub(crate) mod api;
pub(crate) mod logging;
pub(crate) mod storage;

/// Storefront command-line client
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront command-line client", long_about = None)]
pub(crate) struct Cli {
    /// Storefront API settings.
    #[command(flatten)]
    pub api: ApiClientConfig,

    /// Session state settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};

    use testresult::TestResult;

    use crate::{
        commands::{CartCommand, Command},
        config::logging::LogFormat,
    };

    use super::*;

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "storefront",
            "cart",
            "show",
            "--api-base-url",
            "https://shop.example.com",
            "--request-timeout-seconds",
            "5",
            "--state-file",
            "/tmp/state.json",
            "--log-format",
            "json",
        ])?;

        let api = cli.api.to_api_config();

        assert_eq!(api.base_url, "https://shop.example.com");
        assert_eq!(api.timeout, Duration::from_secs(5));
        assert_eq!(cli.storage.state_file, Path::new("/tmp/state.json"));
        assert_eq!(cli.logging.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Cart(CartCommand::Show)));

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected_at_parse_time() {
        let result = Cli::try_parse_from(["storefront", "cart", "update", "line-1", "0"]);

        assert!(result.is_err(), "zero quantity should not parse");
    }

    #[test]
    fn add_defaults_to_one_unit() -> TestResult {
        let cli = Cli::try_parse_from(["storefront", "cart", "add", "p-1"])?;

        let Command::Cart(CartCommand::Add { product, quantity }) = cli.command else {
            return Err("expected cart add".into());
        };

        assert_eq!(product, "p-1");
        assert_eq!(quantity.get(), 1);

        Ok(())
    }
}
