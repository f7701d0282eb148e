//! The failure type returned by chainerr constructors and accessors.

use crate::ErrorKind;
use std::fmt;

/// Failure raised by chainerr itself.
pub struct Error {
    kind: ErrorKind,
    message: String,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: "",
            context: Vec::new(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the operation that raised this error
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Look up a context value by key.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set the operation that raised this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at {}", self.kind, self.operation)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create an InvalidMessage error for a message argument of type `actual`.
    pub fn invalid_message(actual: impl Into<String>) -> Self {
        let actual = actual.into();
        Self::new(
            ErrorKind::InvalidMessage,
            format!("exception message must be a string, was {}", actual),
        )
        .with_context("actual", actual)
    }

    /// Create an InvalidCause error for a cause argument of type `actual`.
    pub fn invalid_cause(actual: impl Into<String>) -> Self {
        let actual = actual.into();
        Self::new(
            ErrorKind::InvalidCause,
            "exception cause must be an error or a collection of errors",
        )
        .with_context("actual", actual)
    }

    /// Create a NoTraceAvailable error
    pub fn no_trace_available() -> Self {
        Self::new(
            ErrorKind::NoTraceAvailable,
            "no stack frame could be captured",
        )
    }

    /// Create a CyclicCause error naming the class seen twice on one path
    pub fn cyclic_cause(class: impl Into<String>) -> Self {
        let class = class.into();
        Self::new(
            ErrorKind::CyclicCause,
            format!("'{}' appears in its own cause chain", class),
        )
        .with_context("class", class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorKind::InvalidCause, "bad cause");
        assert_eq!(err.kind(), ErrorKind::InvalidCause);
        assert_eq!(err.message(), "bad cause");
        assert_eq!(err.operation(), "");
    }

    #[test]
    fn test_operation_chaining() {
        let err = Error::no_trace_available()
            .with_operation("trace::first_frame")
            .with_operation("error::error_class");

        assert_eq!(err.operation(), "error::error_class");
        assert_eq!(err.context().len(), 1);
        assert_eq!(
            err.context()[0],
            ("called", "trace::first_frame".to_string())
        );
    }

    #[test]
    fn test_invalid_message_carries_actual_type() {
        let err = Error::invalid_message("int");
        assert_eq!(err.kind(), ErrorKind::InvalidMessage);
        assert_eq!(err.context_value("actual"), Some("int"));
        assert!(err.message().ends_with("was int"));
    }

    #[test]
    fn test_display() {
        let err = Error::invalid_cause("object(Config)").with_operation("ChainableError::from_args");

        let display = format!("{}", err);
        assert_eq!(
            display,
            "InvalidCause at ChainableError::from_args, context { actual: object(Config) } \
             => exception cause must be an error or a collection of errors"
        );
    }

    #[test]
    fn test_display_without_operation() {
        let err = Error::no_trace_available();
        assert_eq!(
            err.to_string(),
            "NoTraceAvailable => no stack frame could be captured"
        );
    }
}
