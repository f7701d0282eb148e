//! Error kinds for chainerr operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of failure that occurred.
///
/// Callers match on this to tell a bad constructor argument apart from an
/// error whose trace could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // Construction errors
    // =========================================================================
    /// The message argument was not text
    InvalidMessage,

    /// The cause argument was an object that is not an error
    InvalidCause,

    // =========================================================================
    // Inspection errors
    // =========================================================================
    /// No stack frame could be produced, not even through the fallback capture
    NoTraceAvailable,

    /// A node reappeared on its own ancestor path while walking causes
    CyclicCause,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Whether the failure was caused by arguments handed to a constructor
    pub fn is_construction(&self) -> bool {
        matches!(self, ErrorKind::InvalidMessage | ErrorKind::InvalidCause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::InvalidMessage.to_string(), "InvalidMessage");
        assert_eq!(ErrorKind::NoTraceAvailable.as_str(), "NoTraceAvailable");
    }

    #[test]
    fn test_is_construction() {
        assert!(ErrorKind::InvalidMessage.is_construction());
        assert!(ErrorKind::InvalidCause.is_construction());
        assert!(!ErrorKind::NoTraceAvailable.is_construction());
        assert!(!ErrorKind::CyclicCause.is_construction());
    }
}
