//! The `config` subcommand.

use clap::Args;
use tokio::io::AsyncWriteExt as _;

use crate::{async_utils::io::create_writer, config::DEFAULT_CONFIG, prelude::*};

/// Config command line arguments.
#[derive(Debug, Args)]
pub struct ConfigOpts {
    /// Write the configuration here instead of stdout.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// Print the built-in configuration, as a starting point for `--config`.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_config(opts: &ConfigOpts) -> Result<()> {
    let mut wtr = create_writer(opts.output_path.as_deref()).await?;
    wtr.write_all(DEFAULT_CONFIG.as_bytes())
        .await
        .context("failed to write configuration")?;
    wtr.flush().await.context("failed to flush configuration")?;
    Ok(())
}
