//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Where session state survives between runs.
#[derive(Debug, Args)]
pub(crate) struct StorageConfig {
    /// JSON file holding the cart identifier and login token
    #[arg(
        long,
        env = "STOREFRONT_STATE_FILE",
        default_value = ".storefront/state.json",
        global = true
    )]
    pub state_file: PathBuf,
}
