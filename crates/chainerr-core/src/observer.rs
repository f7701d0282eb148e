//! Observers notified on every error construction.
//!
//! A registry is a label → callback map. Errors notify the registry they were
//! built with, or the process-wide one from [`ObserverRegistry::global`].
//!
//! Notification clones the callbacks out under the read lock and invokes them
//! after releasing it, so an observer may add or remove observers; such
//! changes take effect from the next construction on.
//!
//! Observers must not panic. A panic raised by a callback is not caught and
//! unwinds into the code that constructed the error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::ChainableError;

/// Label used when none is given.
pub const DEFAULT_LABEL: &str = "default";

/// Callback invoked with each newly constructed error.
pub type Observer = Arc<dyn Fn(&ChainableError) + Send + Sync>;

static GLOBAL_REGISTRY: Lazy<ObserverRegistry> = Lazy::new(ObserverRegistry::new);

#[derive(Default)]
struct ObserverRegistryInner {
    observers: RwLock<HashMap<String, Observer>>,
}

/// Shared handle to a set of labeled observers.
///
/// Cloning is cheap and yields a handle to the same set.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<ObserverRegistryInner>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use and never torn down.
    pub fn global() -> &'static ObserverRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register `callback` under the default label, replacing any previous one.
    pub fn add_observer<F>(&self, callback: F)
    where
        F: Fn(&ChainableError) + Send + Sync + 'static,
    {
        self.add_labeled_observer(DEFAULT_LABEL, callback);
    }

    /// Register `callback` under `label`, replacing any previous one.
    pub fn add_labeled_observer<F>(&self, label: impl Into<String>, callback: F)
    where
        F: Fn(&ChainableError) + Send + Sync + 'static,
    {
        let label = label.into();
        tracing::trace!(%label, "registering observer");
        self.inner
            .observers
            .write()
            .insert(label, Arc::new(callback));
    }

    /// Remove the observer under the default label.
    pub fn remove_observer(&self) -> bool {
        self.remove_labeled_observer(DEFAULT_LABEL)
    }

    /// Remove the observer under `label`. Returns whether one was present;
    /// an unknown label is not an error.
    pub fn remove_labeled_observer(&self, label: &str) -> bool {
        let removed = self.inner.observers.write().remove(label).is_some();
        tracing::trace!(label, removed, "removing observer");
        removed
    }

    pub fn contains(&self, label: &str) -> bool {
        self.inner.observers.read().contains_key(label)
    }

    /// Registered labels, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.inner.observers.read().keys().cloned().collect();
        labels.sort();
        labels
    }

    pub fn len(&self) -> usize {
        self.inner.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.observers.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.observers.write().clear();
    }

    /// Invoke every registered observer with `err`.
    pub fn notify_all(&self, err: &ChainableError) {
        let snapshot: Vec<Observer> = self.inner.observers.read().values().cloned().collect();
        tracing::trace!(observers = snapshot.len(), class = err.class(), "notifying observers");
        for observer in snapshot {
            observer(err);
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("labels", &self.labels())
            .finish()
    }
}

/// Register `callback` under the default label of the global registry.
pub fn add_observer<F>(callback: F)
where
    F: Fn(&ChainableError) + Send + Sync + 'static,
{
    ObserverRegistry::global().add_observer(callback);
}

/// Register `callback` under `label` of the global registry.
pub fn add_labeled_observer<F>(label: impl Into<String>, callback: F)
where
    F: Fn(&ChainableError) + Send + Sync + 'static,
{
    ObserverRegistry::global().add_labeled_observer(label, callback);
}

/// Remove the default-labeled observer from the global registry.
pub fn remove_observer() -> bool {
    ObserverRegistry::global().remove_observer()
}

/// Remove the observer under `label` from the global registry.
pub fn remove_labeled_observer(label: &str) -> bool {
    ObserverRegistry::global().remove_labeled_observer(label)
}

/// Observer that reports every constructed error as a `tracing` error event.
pub fn log_observer() -> impl Fn(&ChainableError) + Send + Sync + 'static {
    |err: &ChainableError| {
        tracing::error!(
            class = err.class(),
            code = ?err.code(),
            causes = err.cause().len(),
            "{}",
            err.message()
        );
    }
}
