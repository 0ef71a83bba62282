//! The `extract` subcommand.

use std::sync::Arc;

use clap::Args;
use futures::StreamExt as _;

use crate::{
    async_utils::io::{read_jsonl_or_csv, write_output},
    config::ExtractorOpts,
    prelude::*,
    records::{OutputCounters, OutputCountersExt as _, process_record},
    ui::{ProgressConfig, Ui},
};

use super::StreamOpts;

/// Extract command line arguments.
#[derive(Debug, Args)]
pub struct ExtractOpts {
    /// Input JSONL or CSV file. Each record needs an `id`, plus either `text`
    /// or the `path` of a text file. Reads stdin if omitted.
    pub input_path: Option<PathBuf>,

    /// Output JSONL file. Writes stdout if omitted.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,

    #[clap(flatten)]
    pub stream_opts: StreamOpts,

    #[clap(flatten)]
    pub extractor_opts: ExtractorOpts,
}

/// Run the `extract` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_extract(ui: Ui, opts: &ExtractOpts) -> Result<()> {
    let extractor = opts.extractor_opts.build_extractor().await?;

    // Open up our input stream.
    let (input, count) = read_jsonl_or_csv(&ui, opts.input_path.as_deref()).await?;
    let input = opts.stream_opts.apply_stream_input_opts(input);

    // Configure our progress bar.
    let pb = ui.new_from_count(
        &ProgressConfig {
            emoji: "📅",
            msg: "Extracting expiry dates",
            done_msg: "Extracted expiry dates",
        },
        opts.stream_opts.apply_to_count(count),
    );

    // Records are processed one at a time, in order.
    let extractor = Arc::new(extractor);
    let output = input
        .then(move |value| {
            let extractor = extractor.clone();
            async move { process_record(&extractor, value?).await }
        })
        .boxed();
    let (output, counters) = OutputCounters::wrap_stream(output);
    let output = pb
        .wrap_stream(output)
        .map(|output| output?.to_json())
        .boxed();

    write_output(opts.output_path.as_deref(), output).await?;
    counters.finish(&ui, opts.stream_opts.allowed_failure_rate)
}
