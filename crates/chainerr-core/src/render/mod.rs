//! Text and html renderings of a cause chain followed by its stack trace.

pub mod args;
mod html;
mod text;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cause::{HasCauseChain, collect_causes};

pub use args::DEFAULT_MAX_ARG_LEN;
pub use html::escape_html;

/// Process-wide switch consulted by `Display`.
static HTML_ERROR: AtomicBool = AtomicBool::new(false);

/// Make `Display` render html instead of text, process-wide.
pub fn set_html_error(enabled: bool) {
    HTML_ERROR.store(enabled, Ordering::Relaxed);
}

pub fn html_error() -> bool {
    HTML_ERROR.load(Ordering::Relaxed)
}

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderFormat {
    /// One indented line per cause, then `#<i> file:line function(args)` lines
    #[default]
    Text,

    /// A bordered table with cause rows followed by trace rows
    Html,
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderFormat::Text => write!(f, "text"),
            RenderFormat::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(RenderFormat::Text),
            "html" => Ok(RenderFormat::Html),
            other => Err(format!("Unknown format: {}. Use 'text' or 'html'", other)),
        }
    }
}

/// Configuration for rendering an error.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output format (text, html)
    pub format: RenderFormat,

    /// Prefix repeated once per cause position in text output
    pub indent_unit: String,

    /// String arguments longer than this many characters are truncated
    pub max_arg_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            format: RenderFormat::Text,
            indent_unit: " ".to_string(),
            max_arg_len: DEFAULT_MAX_ARG_LEN,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text() -> Self {
        Self::default()
    }

    pub fn html() -> Self {
        Self::default().with_format(RenderFormat::Html)
    }

    /// Format picked by the process-wide html flag.
    pub fn from_global() -> Self {
        if html_error() { Self::html() } else { Self::text() }
    }

    pub fn with_format(mut self, format: RenderFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    pub fn with_max_arg_len(mut self, len: usize) -> Self {
        self.max_arg_len = len;
        self
    }
}

/// Render the causes of `err` and then its own trace.
pub fn render(err: &dyn HasCauseChain, config: &RenderConfig) -> String {
    let causes = collect_causes(err);
    let trace = err.trace();
    match config.format {
        RenderFormat::Text => text::render(&causes, trace, config),
        RenderFormat::Html => html::render(&causes, trace, config),
    }
}
