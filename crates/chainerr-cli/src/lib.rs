//! chainerr command-line interface.
//!
//! Builds a cause chain from plain messages and prints its rendering, which is
//! handy for checking how an error will look in logs or on an html page.

use std::io;
use std::path::Path;

use anyhow::Context;

use chainerr_core::{ChainableError, ErrorRef, ObserverRegistry, RenderConfig, RenderFormat};

/// How the chain is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl From<RenderFormat> for OutputFormat {
    fn from(format: RenderFormat) -> Self {
        match format {
            RenderFormat::Text => OutputFormat::Text,
            RenderFormat::Html => OutputFormat::Html,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            return Ok(OutputFormat::Json);
        }
        s.parse::<RenderFormat>()
            .map(OutputFormat::from)
            .map_err(|_| format!("Unknown format: {}. Use 'text', 'html' or 'json'", s))
    }
}

/// Options for building and printing a chain.
#[derive(Debug, Clone, Default)]
pub struct ChainOptions {
    /// Messages, outermost first
    pub messages: Vec<String>,
    /// Code of the outermost error
    pub code: Option<i64>,
    /// Treat every message after the first as an independent plain error
    pub multi: bool,
    /// Class name used for every chainable error
    pub class: Option<String>,
    pub format: OutputFormat,
    pub max_arg_len: Option<usize>,
}

/// Build the chain described by `opts`, notifying `registry` for each
/// chainable error. Returns `None` when there are no messages.
pub fn build_chain(opts: &ChainOptions, registry: &ObserverRegistry) -> Option<ChainableError> {
    let (outer, rest) = opts.messages.split_first()?;

    let builder = |message: &str| {
        let builder = ChainableError::builder(message).registry(registry);
        match &opts.class {
            Some(class) => builder.class(class.clone()),
            None => builder,
        }
    };

    let mut top = builder(outer);
    if opts.multi {
        let leaves = rest
            .iter()
            .map(|message| ErrorRef::native(io::Error::other(message.clone())));
        top = top.causes(leaves);
    } else if let Some((last, middle)) = rest.split_last() {
        let mut inner = builder(last).build();
        for message in middle.iter().rev() {
            inner = builder(message).cause(inner).build();
        }
        top = top.cause(inner);
    }

    if let Some(code) = opts.code {
        top = top.code(code);
    }
    Some(top.build())
}

/// Render `err` in the requested format.
pub fn render_chain(err: &ChainableError, opts: &ChainOptions) -> anyhow::Result<String> {
    let format = match opts.format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "code": err.code(),
                "causes": err.records(),
                "trace": err.trace(),
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => RenderFormat::Text,
        OutputFormat::Html => RenderFormat::Html,
    };

    let mut config = RenderConfig::new().with_format(format);
    if let Some(len) = opts.max_arg_len {
        config = config.with_max_arg_len(len);
    }
    Ok(err.render(&config))
}

/// Write `output` to `path`, or print it to stdout when no path is given.
pub fn write_output(output: &str, path: Option<&str>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(Path::new(path), output)
                .with_context(|| format!("writing output to {path}"))?;
            tracing::info!(path, "output written");
        }
        None => println!("{output}"),
    }
    Ok(())
}
