//! The `date` subcommand.

use clap::Args;

use crate::{async_utils::io::read_text_lossy, config::ExtractorOpts, prelude::*};

/// Date command line arguments.
#[derive(Debug, Args)]
pub struct DateOpts {
    /// A text file to search. Reads stdin if omitted.
    pub input_path: Option<PathBuf>,

    #[clap(flatten)]
    pub extractor_opts: ExtractorOpts,
}

/// Run the `date` subcommand, printing the expiry date or `Not found`.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_date(opts: &DateOpts) -> Result<()> {
    let extractor = opts.extractor_opts.build_extractor().await?;
    let text = read_text_lossy(opts.input_path.as_deref()).await?;
    println!("{}", extractor.extract(&text));
    Ok(())
}
