//! Cause-chain model and its pre-order flattening.

use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use chainerr_error::{Error, Result};

use crate::trace::{StackFrame, UNKNOWN};

/// Capability implemented by errors that carry their own cause chain.
///
/// Anything without this capability is wrapped as a [`NativeError`] leaf.
pub trait HasCauseChain: Send + Sync {
    /// Runtime type name shown in cause records.
    fn class_name(&self) -> &str;

    fn message(&self) -> &str;

    fn cause(&self) -> &Cause;

    /// Own stack frames, most recent call first.
    fn trace(&self) -> &[StackFrame];

    /// View as a standard error, if the implementor is one.
    fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        None
    }
}

/// A plain error without chain support, kept as a leaf of the cause graph.
pub struct NativeError {
    class: &'static str,
    message: String,
    location: &'static Location<'static>,
    inner: Box<dyn StdError + Send + Sync>,
}

impl NativeError {
    /// Wrap `err`, recording its type name and the caller's location.
    #[track_caller]
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            class: std::any::type_name::<E>(),
            message: err.to_string(),
            location: Location::caller(),
            inner: Box::new(err),
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    pub fn line(&self) -> u32 {
        self.location.line()
    }

    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }
}

impl fmt::Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeError")
            .field("class", &self.class)
            .field("message", &self.message)
            .field("location", &self.location)
            .finish()
    }
}

/// Shared reference to one node of a cause graph.
#[derive(Clone)]
pub enum ErrorRef {
    Chain(Arc<dyn HasCauseChain>),
    Native(Arc<NativeError>),
}

impl ErrorRef {
    pub fn chain<E>(err: E) -> Self
    where
        E: HasCauseChain + 'static,
    {
        ErrorRef::Chain(Arc::new(err))
    }

    #[track_caller]
    pub fn native<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ErrorRef::Native(Arc::new(NativeError::new(err)))
    }

    pub fn class_name(&self) -> &str {
        match self {
            ErrorRef::Chain(node) => node.class_name(),
            ErrorRef::Native(leaf) => leaf.class_name(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ErrorRef::Chain(node) => node.message(),
            ErrorRef::Native(leaf) => leaf.message(),
        }
    }

    pub fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ErrorRef::Chain(node) => node.as_std_error(),
            ErrorRef::Native(leaf) => Some(leaf.inner() as &(dyn StdError + 'static)),
        }
    }
}

impl<E> From<Arc<E>> for ErrorRef
where
    E: HasCauseChain + 'static,
{
    fn from(err: Arc<E>) -> Self {
        ErrorRef::Chain(err)
    }
}

impl fmt::Debug for ErrorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorRef::Chain(node) => f
                .debug_struct("Chain")
                .field("class", &node.class_name())
                .field("message", &node.message())
                .field("cause", node.cause())
                .finish(),
            ErrorRef::Native(leaf) => fmt::Debug::fmt(leaf.as_ref(), f),
        }
    }
}

/// What led to an error: nothing, one prior error, or a collection.
#[derive(Debug, Clone, Default)]
pub enum Cause {
    #[default]
    None,
    Single(ErrorRef),
    Multi(Vec<ErrorRef>),
}

impl Cause {
    pub fn is_none(&self) -> bool {
        matches!(self, Cause::None)
    }

    /// Direct causes, in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ErrorRef> {
        match self {
            Cause::None => <&[ErrorRef]>::default().iter(),
            Cause::Single(err) => std::slice::from_ref(err).iter(),
            Cause::Multi(errs) => errs.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Renderer-ready summary of one node in a cause chain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CauseRecord {
    pub class: String,
    pub message: String,
    pub file: String,
    pub line: String,
}

impl CauseRecord {
    /// Record for a chainable node, located at its first own frame.
    pub fn from_node(node: &dyn HasCauseChain) -> Self {
        let (file, line) = match node.trace().first() {
            Some(frame) if frame.file.is_some() => {
                (frame.file_or_unknown().to_string(), frame.line_or_unknown())
            }
            _ => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };
        Self {
            class: node.class_name().to_string(),
            message: node.message().to_string(),
            file,
            line,
        }
    }

    pub fn from_native(leaf: &NativeError) -> Self {
        Self {
            class: leaf.class_name().to_string(),
            message: leaf.message().to_string(),
            file: leaf.file().to_string(),
            line: leaf.line().to_string(),
        }
    }
}

/// Flatten the cause graph under `node` into pre-order records.
///
/// Never fails: a node met again on its own ancestor path is not descended
/// into a second time.
pub fn collect_causes(node: &dyn HasCauseChain) -> Vec<CauseRecord> {
    let mut walker = Walker::new(false);
    // The lenient walker never reports an error.
    let _ = walker.walk(node);
    walker.records
}

/// Like [`collect_causes`], but fails with `CyclicCause` on a cycle.
pub fn try_collect_causes(node: &dyn HasCauseChain) -> Result<Vec<CauseRecord>> {
    let mut walker = Walker::new(true);
    walker.walk(node)?;
    Ok(walker.records)
}

struct Walker {
    records: Vec<CauseRecord>,
    path: Vec<usize>,
    strict: bool,
}

impl Walker {
    fn new(strict: bool) -> Self {
        Self {
            records: Vec::new(),
            path: Vec::new(),
            strict,
        }
    }

    fn walk(&mut self, node: &dyn HasCauseChain) -> Result<()> {
        let id = node_id(node);
        if self.path.contains(&id) {
            if self.strict {
                return Err(Error::cyclic_cause(node.class_name())
                    .with_operation("cause::try_collect_causes"));
            }
            tracing::warn!(class = node.class_name(), "cyclic cause chain cut");
            return Ok(());
        }

        self.records.push(CauseRecord::from_node(node));
        self.path.push(id);
        for member in node.cause().iter() {
            match member {
                ErrorRef::Chain(next) => self.walk(next.as_ref())?,
                ErrorRef::Native(leaf) => self.records.push(CauseRecord::from_native(leaf)),
            }
        }
        self.path.pop();
        Ok(())
    }
}

fn node_id(node: &dyn HasCauseChain) -> usize {
    std::ptr::from_ref(node).cast::<()>() as usize
}
