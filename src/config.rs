//! Native host configuration.
//!
//! `HostConfig` controls the ready-made [`NativeHost`](crate::host::NativeHost):
//! identity sent on outbound requests and the transport limits the host
//! enforces on behalf of the compatibility layer (timeouts and redirects are
//! host policy, never decided by `fetch` itself).
//!
//! ```rust
//! use std::time::Duration;
//! use fetch_compat::config::HostConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = HostConfig::builder()
//!     .user_agent("my-proxy/1.0")
//!     .timeout(Duration::from_secs(30))
//!     .max_redirects(5)
//!     .build()?;
//! assert_eq!(cfg.max_redirects, 5);
//! # Ok(()) }
//! ```

use std::fmt;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "fetch-compat/0.1";
const MAX_REDIRECT_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct HostConfig {
    /// User agent sent with every outbound request
    pub user_agent: String,
    /// Total time budget for one network call, `None` for no limit
    pub timeout: Option<Duration>,
    /// Redirects followed by the transport before giving up
    pub max_redirects: usize,
    /// Accept and transparently decode compressed responses
    pub gzip: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            max_redirects: 10,
            gzip: true,
        }
    }
}

impl HostConfig {
    pub fn builder() -> HostConfigBuilder {
        HostConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostConfigBuilder {
    inner: HostConfig,
}

impl HostConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut HostConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn timeout(self, t: Duration) -> Self { self.map(|c| c.timeout = Some(t)) }
    pub fn no_timeout(self) -> Self { self.map(|c| c.timeout = None) }
    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = n) }
    pub fn gzip(self, on: bool) -> Self { self.map(|c| c.gzip = on) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut HostConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<HostConfig, HostConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum HostConfigError {
    EmptyUserAgent,
    ZeroTimeout,
    TooManyRedirects(usize),
}

impl fmt::Display for HostConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostConfigError::EmptyUserAgent => write!(f, "user_agent must not be empty"),
            HostConfigError::ZeroTimeout => write!(f, "timeout must be greater than zero"),
            HostConfigError::TooManyRedirects(n) => {
                write!(f, "max_redirects {n} is out of range (expected 0..={MAX_REDIRECT_LIMIT})")
            }
        }
    }
}

impl std::error::Error for HostConfigError {}

fn validate(c: &HostConfig) -> Result<(), HostConfigError> {
    if c.user_agent.trim().is_empty() {
        return Err(HostConfigError::EmptyUserAgent);
    }
    if c.timeout.is_some_and(|t| t.is_zero()) {
        return Err(HostConfigError::ZeroTimeout);
    }
    if c.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(HostConfigError::TooManyRedirects(c.max_redirects));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = HostConfig::builder().build().unwrap();
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.timeout, None);
        assert_eq!(cfg.max_redirects, 10);
        assert!(cfg.gzip);
    }

    #[test]
    fn builder_applies_changes() {
        let cfg = HostConfig::builder()
            .user_agent("proxy/2")
            .timeout(Duration::from_millis(1500))
            .gzip(false)
            .with(|c| c.max_redirects = 0)
            .build()
            .unwrap();

        assert_eq!(cfg.user_agent, "proxy/2");
        assert_eq!(cfg.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(cfg.max_redirects, 0);
        assert!(!cfg.gzip);
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert_eq!(
            HostConfig::builder().user_agent("  ").build().unwrap_err(),
            HostConfigError::EmptyUserAgent
        );
        assert_eq!(
            HostConfig::builder().timeout(Duration::ZERO).build().unwrap_err(),
            HostConfigError::ZeroTimeout
        );
        let err = HostConfig::builder().max_redirects(51).build().unwrap_err();
        assert_eq!(err, HostConfigError::TooManyRedirects(51));
        assert!(err.to_string().contains("0..=50"));
    }
}
