//! The chainable error type.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;

use backtrace::Backtrace;
use chainerr_error::{Error, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::cause::{Cause, CauseRecord, ErrorRef, HasCauseChain, collect_causes};
use crate::observer::ObserverRegistry;
use crate::render::{self, RenderConfig};
use crate::trace::{self, ArgValue, StackFrame};

/// Class name used when none is given.
pub const DEFAULT_CLASS: &str = "ChainableError";

/// Error carrying a message, an optional code, an optional cause and the
/// stack trace of the point where it was built.
///
/// Every construction notifies an [`ObserverRegistry`] before returning.
///
/// ```rust
/// use chainerr_core::{ChainableError, ErrorRef};
///
/// let io = std::io::Error::other("disk full");
/// let err = ChainableError::builder("could not save")
///     .class("StoreError")
///     .code(28)
///     .cause(ErrorRef::native(io))
///     .build();
///
/// assert_eq!(err.records().len(), 2);
/// assert!(err.to_text().starts_with("StoreError: could not save in "));
/// ```
pub struct ChainableError {
    class: Cow<'static, str>,
    message: String,
    code: Option<i64>,
    cause: Cause,
    location: &'static Location<'static>,
    raw: Mutex<Option<Backtrace>>,
    trace: OnceCell<Vec<StackFrame>>,
}

/// Second constructor argument of [`ChainableError::from_args`].
#[derive(Debug, Clone)]
pub enum CtorArg {
    Code(i64),
    Error(ErrorRef),
    Errors(Vec<ErrorRef>),
    Value(ArgValue),
}

/// Builder for [`ChainableError`].
#[must_use]
pub struct ErrorBuilder {
    class: Cow<'static, str>,
    message: String,
    code: Option<i64>,
    cause: Cause,
    trace: Option<Vec<StackFrame>>,
    registry: Option<ObserverRegistry>,
}

impl ErrorBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            class: Cow::Borrowed(DEFAULT_CLASS),
            message: message.into(),
            code: None,
            cause: Cause::None,
            trace: None,
            registry: None,
        }
    }

    /// Classify loosely typed constructor arguments.
    ///
    /// - `Code(c)`: code `c`, no cause; `code` is ignored
    /// - `Error(e)` / `Errors(v)`: single or multi cause, code from `code`
    /// - `Value` holding an object: `InvalidCause`
    /// - any other `Value`: ignored
    ///
    /// The message must be a string, otherwise `InvalidMessage`.
    pub fn from_args(message: ArgValue, cause: Option<CtorArg>, code: Option<i64>) -> Result<Self> {
        let (cause, code) = match cause {
            Some(CtorArg::Code(code)) => (Cause::None, Some(code)),
            Some(CtorArg::Error(err)) => (Cause::Single(err), code),
            Some(CtorArg::Errors(errs)) => (Cause::Multi(errs), code),
            Some(CtorArg::Value(value @ ArgValue::Object { .. })) => {
                return Err(Error::invalid_cause(value.type_name())
                    .with_operation("ErrorBuilder::from_args"));
            }
            Some(CtorArg::Value(_)) | None => (Cause::None, None),
        };

        let message = match message {
            ArgValue::Str(message) => message,
            other => {
                return Err(Error::invalid_message(other.type_name())
                    .with_operation("ErrorBuilder::from_args"));
            }
        };

        Ok(Self {
            code,
            cause,
            ..Self::new(message)
        })
    }

    pub fn code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Wrap a single prior error.
    pub fn cause(mut self, cause: impl Into<ErrorRef>) -> Self {
        self.cause = Cause::Single(cause.into());
        self
    }

    /// Wrap a collection of prior errors.
    pub fn causes(mut self, causes: impl IntoIterator<Item = ErrorRef>) -> Self {
        self.cause = Cause::Multi(causes.into_iter().collect());
        self
    }

    pub fn class(mut self, class: impl Into<Cow<'static, str>>) -> Self {
        self.class = class.into();
        self
    }

    /// Use the type name of `T` as the class.
    pub fn class_of<T: ?Sized>(self) -> Self {
        self.class(std::any::type_name::<T>())
    }

    /// Supply the frames instead of capturing them. An empty list gets the
    /// same single-frame fallback as an empty snapshot.
    pub fn trace(mut self, frames: Vec<StackFrame>) -> Self {
        self.trace = Some(frames);
        self
    }

    /// Notify `registry` instead of the global one.
    pub fn registry(mut self, registry: &ObserverRegistry) -> Self {
        self.registry = Some(registry.clone());
        self
    }

    #[track_caller]
    pub fn build(self) -> ChainableError {
        let ErrorBuilder {
            class,
            message,
            code,
            cause,
            trace,
            registry,
        } = self;

        // An injected empty trace behaves like an empty snapshot.
        let (raw, trace) = match trace {
            Some(frames) if !frames.is_empty() => (None, OnceCell::with_value(frames)),
            Some(_) => (None, OnceCell::new()),
            None => (Some(trace::capture_raw()), OnceCell::new()),
        };

        let err = ChainableError {
            class,
            message,
            code,
            cause,
            location: Location::caller(),
            raw: Mutex::new(raw),
            trace,
        };
        tracing::debug!(
            class = err.class(),
            code = ?err.code,
            causes = err.cause.len(),
            "constructed error"
        );

        match registry {
            Some(registry) => registry.notify_all(&err),
            None => ObserverRegistry::global().notify_all(&err),
        }
        err
    }
}

impl ChainableError {
    /// Error with only a message.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBuilder::new(message).build()
    }

    pub fn builder(message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(message)
    }

    /// Build from loosely typed arguments; see [`ErrorBuilder::from_args`].
    #[track_caller]
    pub fn from_args(message: ArgValue, cause: Option<CtorArg>, code: Option<i64>) -> Result<Self> {
        Ok(ErrorBuilder::from_args(message, cause, code)?.build())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<i64> {
        self.code
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Source location of the construction call.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Frames of the construction point, resolved on first call.
    ///
    /// When the snapshot yields nothing, a single frame is taken from the
    /// oldest frame of the current execution context instead.
    pub fn trace(&self) -> &[StackFrame] {
        self.trace_or_else(trace::fallback_frame)
    }

    fn trace_or_else<F>(&self, fallback: F) -> &[StackFrame]
    where
        F: FnOnce() -> Option<StackFrame>,
    {
        self.trace.get_or_init(|| {
            let frames = self.raw.lock().take().map(trace::resolve).unwrap_or_default();
            if frames.is_empty() {
                fallback().into_iter().collect()
            } else {
                frames
            }
        })
    }

    /// Class of the first trace frame, if that frame has one.
    pub fn error_class(&self) -> Result<Option<&str>> {
        let frame = self.first_frame("ChainableError::error_class")?;
        Ok(frame.class.as_deref())
    }

    /// Function of the first trace frame.
    pub fn error_method(&self) -> Result<&str> {
        let frame = self.first_frame("ChainableError::error_method")?;
        Ok(&frame.function)
    }

    fn first_frame(&self, operation: &'static str) -> Result<&StackFrame> {
        self.trace()
            .first()
            .ok_or_else(|| Error::no_trace_available().with_operation(operation))
    }

    /// The cause chain flattened into pre-order records.
    pub fn records(&self) -> Vec<CauseRecord> {
        collect_causes(self)
    }

    pub fn to_text(&self) -> String {
        self.render(&RenderConfig::text())
    }

    pub fn to_html(&self) -> String {
        self.render(&RenderConfig::html())
    }

    pub fn render(&self, config: &RenderConfig) -> String {
        render::render(self, config)
    }
}

impl HasCauseChain for ChainableError {
    fn class_name(&self) -> &str {
        self.class()
    }

    fn message(&self) -> &str {
        self.message()
    }

    fn cause(&self) -> &Cause {
        self.cause()
    }

    fn trace(&self) -> &[StackFrame] {
        self.trace()
    }

    fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self)
    }
}

impl From<ChainableError> for ErrorRef {
    fn from(err: ChainableError) -> Self {
        ErrorRef::chain(err)
    }
}

/// Renders as html when the process-wide html flag is set, text otherwise.
impl fmt::Display for ChainableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&RenderConfig::from_global()))
    }
}

impl fmt::Debug for ChainableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainableError")
            .field("class", &self.class)
            .field("message", &self.message)
            .field("code", &self.code)
            .field("cause", &self.cause)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl StdError for ChainableError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.cause {
            Cause::Single(cause) => cause.as_std_error(),
            _ => None,
        }
    }
}
