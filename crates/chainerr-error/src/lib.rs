//! # chainerr-error
//!
//! Failures raised by chainerr itself, as opposed to the chainable errors it
//! builds for its users.
//!
//! - **ErrorKind**: what went wrong (e.g. InvalidMessage, NoTraceAvailable)
//! - **Error Context**: key/value pairs describing the offending input
//!
//! ## Usage
//!
//! ```rust
//! use chainerr_error::{Error, ErrorKind};
//!
//! fn check(message: Option<&str>) -> chainerr_error::Result<&str> {
//!     message.ok_or_else(|| Error::invalid_message("null").with_operation("demo::check"))
//! }
//!
//! let err = check(None).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidMessage);
//! ```
//!
//! Construction-time failures are returned to the caller immediately; they are
//! never downgraded to a default error.

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using chainerr Error
pub type Result<T> = std::result::Result<T, Error>;
