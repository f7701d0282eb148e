//! Stack frames and the adapter that turns a `backtrace` snapshot into them.

use std::fmt;

use backtrace::{Backtrace, BacktraceFrame, BacktraceSymbol};

/// Placeholder used wherever a file, line or name is missing.
pub const UNKNOWN: &str = "unknown";

/// Frames of this crate that sit between the caller and the snapshot.
const ENTRY_PREFIXES: &[&str] = &[
    "chainerr_core::trace::capture_raw",
    "chainerr_core::trace::fallback_frame",
    "chainerr_core::error::ErrorBuilder::",
    "chainerr_core::error::ChainableError::",
];

/// Unwinder and `backtrace` internals above the entry frames.
const MACHINERY_PREFIXES: &[&str] = &["backtrace::", "_Unwind_", "__rust_"];

/// Runtime start-up frames. Everything from the first match down is `{main}`.
const RUNTIME_MARKERS: &[&str] = &["__rust_begin_short_backtrace", "std::rt::lang_start"];

/// A call argument as seen by the trace renderers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<ArgValue>),
    Object { type_name: String },
}

impl ArgValue {
    /// An opaque object reference of type `T`.
    pub fn object<T: ?Sized>() -> Self {
        ArgValue::Object {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    /// Short name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            ArgValue::Null => "null".to_string(),
            ArgValue::Bool(_) => "bool".to_string(),
            ArgValue::Int(_) => "int".to_string(),
            ArgValue::Float(_) => "float".to_string(),
            ArgValue::Str(_) => "string".to_string(),
            ArgValue::Array(_) => "array".to_string(),
            ArgValue::Object { type_name } => format!("object({type_name})"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ArgValue::Null, Into::into)
    }
}

/// One entry of a captured call stack.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: String,
    pub class: Option<String>,
    pub args: Option<Vec<ArgValue>>,
}

impl StackFrame {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_args(mut self, args: Vec<ArgValue>) -> Self {
        self.args = Some(args);
        self
    }

    /// `class::function`, or just `function` for free functions.
    pub fn qualified_name(&self) -> String {
        match &self.class {
            Some(class) if !class.is_empty() => format!("{}::{}", class, self.function),
            _ => self.function.clone(),
        }
    }

    pub fn file_or_unknown(&self) -> &str {
        self.file.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn line_or_unknown(&self) -> String {
        self.line.map_or_else(|| UNKNOWN.to_string(), |line| line.to_string())
    }

    fn from_symbol(symbol: &BacktraceSymbol) -> Self {
        let name = symbol
            .name()
            .map(|name| format!("{name:#}"))
            .unwrap_or_default();
        let (class, function) = split_symbol(&name);
        Self {
            file: symbol.filename().map(|path| path.display().to_string()),
            line: symbol.lineno(),
            function,
            class,
            args: None,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}",
            self.file_or_unknown(),
            self.line_or_unknown(),
            self.qualified_name()
        )
    }
}

/// Split a demangled symbol into its path and its last segment.
///
/// Only `::` outside angle brackets separates, so `<A as B<C::D>>::call`
/// yields `("<A as B<C::D>>", "call")`. The `>` of a `->` return arrow is
/// not a bracket.
pub fn split_symbol(name: &str) -> (Option<String>, String) {
    let bytes = name.as_bytes();
    let mut depth = 0i32;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    match split {
        Some(at) => (Some(name[..at].to_string()), name[at + 2..].to_string()),
        None => (None, name.to_string()),
    }
}

/// Take an unresolved snapshot of the current stack.
///
/// Symbol resolution is deferred until the frames are first read.
pub(crate) fn capture_raw() -> Backtrace {
    Backtrace::new_unresolved()
}

/// Resolve a snapshot taken by [`capture_raw`] and adapt its frames.
pub(crate) fn resolve(mut raw: Backtrace) -> Vec<StackFrame> {
    raw.resolve();
    adapt(raw.frames())
}

/// Adapt raw frames, dropping the capture machinery at the top and the
/// runtime start-up frames at the bottom.
pub(crate) fn adapt(frames: &[BacktraceFrame]) -> Vec<StackFrame> {
    let frames: Vec<StackFrame> = frames
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(StackFrame::from_symbol)
        .collect();
    // Everything above the first entry frame is unwinder internals.
    let start = frames.iter().position(is_entry_frame).unwrap_or(0);
    frames
        .into_iter()
        .skip(start)
        .skip_while(is_capture_frame)
        .take_while(|frame| !is_runtime_frame(frame))
        .collect()
}

/// Best-effort single frame for errors whose own snapshot came back empty:
/// the oldest resolvable frame of the current execution context.
pub(crate) fn fallback_frame() -> Option<StackFrame> {
    let backtrace = Backtrace::new();
    let frame = backtrace
        .frames()
        .iter()
        .rev()
        .flat_map(|frame| frame.symbols().iter().rev())
        .next()
        .map(StackFrame::from_symbol);
    tracing::trace!(found = frame.is_some(), "fallback frame capture");
    frame
}

fn is_entry_frame(frame: &StackFrame) -> bool {
    let name = frame.qualified_name();
    ENTRY_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn is_capture_frame(frame: &StackFrame) -> bool {
    let name = frame.qualified_name();
    name.is_empty()
        || is_entry_frame(frame)
        || MACHINERY_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn is_runtime_frame(frame: &StackFrame) -> bool {
    let name = frame.qualified_name();
    RUNTIME_MARKERS.iter().any(|marker| name.contains(marker))
}
