//! # chainerr-core
//!
//! A base error type with causal chaining, construction observers and two
//! renderings (text and html) of the full cause chain plus stack trace.
//!
//! ## Usage
//!
//! ```rust
//! use chainerr_core::{ChainableError, ErrorRef, ObserverRegistry};
//!
//! let registry = ObserverRegistry::new();
//! registry.add_observer(|err: &ChainableError| eprintln!("raised: {}", err.message()));
//!
//! let low = ChainableError::builder("connection reset")
//!     .registry(&registry)
//!     .build();
//! let high = ChainableError::builder("sync failed")
//!     .cause(low)
//!     .registry(&registry)
//!     .build();
//!
//! let text = high.to_text();
//! assert!(text.starts_with("ChainableError: sync failed in "));
//! assert!(text.contains("\n ChainableError: connection reset in "));
//! ```

pub mod cause;
pub mod error;
pub mod observer;
pub mod render;
pub mod trace;

pub use chainerr_error::{Error, ErrorKind, Result};

pub use cause::{
    Cause, CauseRecord, ErrorRef, HasCauseChain, NativeError, collect_causes, try_collect_causes,
};
pub use error::{ChainableError, CtorArg, DEFAULT_CLASS, ErrorBuilder};
pub use observer::{
    DEFAULT_LABEL, Observer, ObserverRegistry, add_labeled_observer, add_observer, log_observer,
    remove_labeled_observer, remove_observer,
};
pub use render::{RenderConfig, RenderFormat, escape_html, html_error, set_html_error};
pub use trace::{ArgValue, StackFrame};
