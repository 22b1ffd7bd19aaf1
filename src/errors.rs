//! Error types shared by every part of the crate.
//!
//! All fallible operations return [`FetchError`]. Failures reported by the
//! host (network, URL parsing, codec) travel inside [`HostError`] without
//! being reclassified, so callers always see exactly what the host produced.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Construction-time validation failed (bad referrer policy, body on a
    /// GET/HEAD request, credentialed URL, malformed search-param pair, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A body was read after it had already been consumed.
    #[error("Body has already been consumed")]
    Consumption,

    /// Opaque failure reported by a host primitive.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// The user handler resolved to something other than a `Response`.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// The user handler failed or panicked.
    #[error("Handler error: {0}")]
    UserHandler(anyhow::Error),

    /// A body could not be parsed as JSON.
    #[error("Syntax error: {0}")]
    Syntax(serde_json::Error),
}

impl FetchError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        FetchError::Validation(msg.into())
    }
}

/// Failure value produced by a host primitive.
///
/// Cheap to clone: an errored body may hand the same cause to several
/// readers (request clones share it).
#[derive(Clone)]
pub struct HostError(Arc<anyhow::Error>);

impl HostError {
    /// Creates a host error from a plain message.
    pub fn new(msg: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self(Arc::new(anyhow::Error::msg(msg)))
    }

    /// Wraps any error value produced by the host.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::new(err)))
    }

    /// Returns the underlying error as produced by the host.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    /// Tries to recover the concrete error type the host reported.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Debug for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostError").field(&self.0.to_string()).finish()
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for HostError {}
