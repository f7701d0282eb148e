use anyhow::{Context, bail};
use clap::Parser;

use chainerr::{ChainOptions, OutputFormat, build_chain, render_chain, write_output};
use chainerr_core::{ObserverRegistry, log_observer};

#[derive(Parser, Debug)]
#[command(
    name = "chainerr",
    about = "chainerr: build an error cause chain and print how it renders",
    version
)]
pub struct Cli {
    /// Error messages, outermost first (repeatable)
    #[arg(
        short = 'm',
        long = "message",
        value_name = "MESSAGE",
        num_args = 1..,
        action = clap::ArgAction::Append,
        required = true
    )]
    messages: Vec<String>,

    /// Code attached to the outermost error
    #[arg(long, value_name = "CODE", allow_negative_numbers = true)]
    code: Option<i64>,

    /// Make every message after the first a plain error in one collection
    #[arg(long, default_value_t = false)]
    multi: bool,

    /// Class name reported for each chained error
    #[arg(long, value_name = "CLASS")]
    class: Option<String>,

    /// Output format: 'text', 'html' or 'json'
    #[arg(long, value_name = "FORMAT", conflicts_with_all = ["html", "json"])]
    format: Option<OutputFormat>,

    /// Render an html table instead of text (same as --format html)
    #[arg(long, default_value_t = false, conflicts_with = "json")]
    html: bool,

    /// Print cause records and frames as JSON (same as --format json)
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Truncate string arguments in the trace after this many characters
    #[arg(long = "max-arg-len", value_name = "N")]
    max_arg_len: Option<usize>,

    /// Report every constructed error through the log
    #[arg(long = "log-observer", default_value_t = false)]
    log_observer: bool,

    /// Output file path (writes to file instead of stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<String>,
}

pub fn run(args: Cli) -> anyhow::Result<()> {
    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_ok() || args.log_observer {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let registry = ObserverRegistry::global();
    if args.log_observer {
        registry.add_labeled_observer("log", log_observer());
    }

    let format = match args.format {
        Some(format) => format,
        None if args.json => OutputFormat::Json,
        None if args.html => OutputFormat::Html,
        None => OutputFormat::Text,
    };
    let opts = ChainOptions {
        messages: args.messages,
        code: args.code,
        multi: args.multi,
        class: args.class,
        format,
        max_arg_len: args.max_arg_len,
    };

    let Some(err) = build_chain(&opts, registry) else {
        bail!("at least one message is required");
    };
    let output = render_chain(&err, &opts).context("rendering error chain")?;
    write_output(&output, args.output.as_deref())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    run(args)
}
