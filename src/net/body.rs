//! Single-consumption byte payload embedded by `Request` and `Response`.
//!
//! A body is either empty, a byte buffer, or an errored state carrying the
//! host failure that produced it. Whatever the state, it can be read exactly
//! once: the first read marks it disturbed, every later read fails with
//! [`FetchError::Consumption`].

use crate::errors::{FetchError, HostError};
use crate::host::{self, HostRef};
use serde::de::DeserializeOwned;

/// Content type given to text payloads when the caller set none.
pub(crate) const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Payload accepted by request and response constructors.
#[derive(Debug, Clone)]
pub enum BodyInit {
    Bytes(Vec<u8>),
    /// Encoded through the host codec.
    Text(String),
    /// Payload whose production already failed; reading re-raises the cause.
    Errored(HostError),
}

impl From<Vec<u8>> for BodyInit {
    fn from(bytes: Vec<u8>) -> Self {
        BodyInit::Bytes(bytes)
    }
}

impl From<&[u8]> for BodyInit {
    fn from(bytes: &[u8]) -> Self {
        BodyInit::Bytes(bytes.to_vec())
    }
}

impl From<String> for BodyInit {
    fn from(text: String) -> Self {
        BodyInit::Text(text)
    }
}

impl From<&str> for BodyInit {
    fn from(text: &str) -> Self {
        BodyInit::Text(text.to_string())
    }
}

#[derive(Debug, Clone)]
pub(crate) enum BodyState {
    Empty,
    Bytes(Vec<u8>),
    Errored(HostError),
}

pub struct Body {
    state: BodyState,
    disturbed: bool,
    host: HostRef,
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("state", &self.state)
            .field("disturbed", &self.disturbed)
            .finish_non_exhaustive()
    }
}

impl Body {
    pub(crate) fn new(host: &HostRef, init: Option<BodyInit>) -> Self {
        let state = match init {
            None => BodyState::Empty,
            Some(BodyInit::Bytes(bytes)) => BodyState::Bytes(bytes),
            Some(BodyInit::Text(text)) => BodyState::Bytes(host.encode(&text)),
            Some(BodyInit::Errored(cause)) => BodyState::Errored(cause),
        };

        Self {
            state,
            disturbed: false,
            host: host.clone(),
        }
    }

    /// Fresh, undisturbed copy for request/response cloning.
    pub(crate) fn try_clone(&self) -> Result<Body, FetchError> {
        if self.disturbed {
            return Err(FetchError::validation("cannot clone a body that has already been consumed"));
        }
        Ok(Self {
            state: self.state.clone(),
            disturbed: false,
            host: self.host.clone(),
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.state, BodyState::Empty)
    }

    /// Whether the body has been read.
    pub fn body_used(&self) -> bool {
        self.disturbed
    }

    /// Raw buffer, when the payload is bytes.
    pub fn body(&self) -> Option<&[u8]> {
        match &self.state {
            BodyState::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub async fn array_buffer(&mut self) -> Result<Vec<u8>, FetchError> {
        if self.disturbed {
            return Err(FetchError::Consumption);
        }
        self.disturbed = true;

        match &self.state {
            BodyState::Empty => Ok(Vec::new()),
            BodyState::Bytes(bytes) => Ok(bytes.clone()),
            BodyState::Errored(cause) => Err(FetchError::Host(cause.clone())),
        }
    }

    pub async fn text(&mut self) -> Result<String, FetchError> {
        let bytes = self.array_buffer().await?;
        Ok(host::decode(&self.host, bytes).await?)
    }

    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, FetchError> {
        let text = self.text().await?;
        serde_json::from_str(&text).map_err(FetchError::Syntax)
    }
}
