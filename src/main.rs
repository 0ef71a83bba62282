use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing_subscriber::{
    EnvFilter, Layer as _, filter::Directive, fmt::format::FmtSpan, layer::SubscriberExt,
    util::SubscriberInitExt as _,
};

use self::{prelude::*, ui::Ui};

mod async_utils;
mod cmd;
mod config;
mod expiry;
mod prelude;
mod records;
mod ui;

/// Find expiry dates in OCRed French and Dutch documents.
#[derive(Debug, Parser)]
#[clap(
    version,
    after_help = r#"
Environment Variables:
  - RUST_LOG (optional): Log filter, such as `debug` or
    `doc_expiry=trace`. Defaults to `info`.

  These variables may be set in a standard `.env` file.
"#
)]
struct Opts {
    #[clap(subcommand)]
    subcmd: Cmd,
}

/// The subcommands we support.
#[derive(Debug, Subcommand)]
enum Cmd {
    /// Print the expiry date of a single text document, or "Not found".
    Date(cmd::date::DateOpts),
    /// Extract expiry dates from a JSONL or CSV stream of records.
    Extract(cmd::extract::ExtractOpts),
    /// Write a prediction file for every `.txt` file in a directory.
    ScanDir(cmd::scan_dir::ScanDirOpts),
    /// Print schemas for input, output and configuration formats.
    Schema(cmd::schema::SchemaOpts),
    /// Print the built-in extraction settings.
    Config(cmd::config::ConfigOpts),
}

impl Cmd {
    /// Are we using stdout for output?
    fn using_stdout_for_output(&self) -> bool {
        match self {
            Cmd::Date(_) => true,
            Cmd::Extract(opts) => opts.output_path.is_none(),
            Cmd::ScanDir(_) => false,
            Cmd::Schema(opts) => opts.output_path.is_none(),
            Cmd::Config(opts) => opts.output_path.is_none(),
        }
    }
}

/// Our entry point, which can return an error. [`anyhow::Result`] will
/// automatically print a nice error message with optional backtrace.
#[tokio::main]
async fn main() -> Result<()> {
    let ui = Ui::init();

    // Initialize tracing.
    let directive =
        Directive::from_str("info").expect("built-in directive should be valid");
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_writer(ui.get_stderr_writer())
        .with_filter(env_filter);

    tracing_subscriber::registry().with(subscriber).init();

    real_main(ui).await
}

/// Our real entry point.
#[instrument(level = "debug", name = "main", skip_all)]
async fn real_main(ui: Ui) -> Result<()> {
    // Load environment variables from a `.env` file, if it exists.
    dotenvy::dotenv().ok();

    let opts = Opts::parse();
    debug!("Parsed options: {:?}", opts);

    // Hide the progress bars if we're using stdout for output.
    if opts.subcmd.using_stdout_for_output() {
        ui.hide_progress_bars();
    }

    match &opts.subcmd {
        Cmd::Date(opts) => cmd::date::cmd_date(opts).await,
        Cmd::Extract(opts) => cmd::extract::cmd_extract(ui, opts).await,
        Cmd::ScanDir(opts) => cmd::scan_dir::cmd_scan_dir(ui, opts).await,
        Cmd::Schema(opts) => cmd::schema::cmd_schema(opts).await,
        Cmd::Config(opts) => cmd::config::cmd_config(opts).await,
    }
}
