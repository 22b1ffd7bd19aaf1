//! Host primitives.
//!
//! The compatibility layer never talks to the network, decodes bytes or parses
//! URLs by itself. Every such capability is reached through a [`HostBridge`]
//! that the embedder injects into [`fetch`](crate::net::fetch),
//! [`Dispatcher`](crate::dispatch::Dispatcher) and the object constructors.
//!
//! Asynchronous primitives follow a single-resolution callback contract: the
//! bridge receives a [`Completion`] and must settle it once with either a value
//! or a [`HostError`]. The layer awaits the matching [`Pending`] future. Extra
//! settlements by a misbehaving host are ignored (and logged), never observed.
//!
//! URL parsing hands back shared handles ([`UrlHandle`] and its
//! [`SearchParamsHandle`] sub-handle). Both are mutated through `&self`, so a
//! search-params view and the URL it came from always observe each other.
//!
//! [`NativeHost`] is a complete bridge built on `url`, UTF-8 and `reqwest`.
mod completion;
mod native;
mod url_handle;

#[cfg(test)]
pub(crate) mod testing;

use crate::errors::HostError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub use completion::{Completion, Pending};
pub use native::NativeHost;
pub use url_handle::{NativeSearchParams, NativeUrlHandle};

/// Plain name to value header mapping exchanged with the host.
pub type HeaderRecord = HashMap<String, String>;

/// Shared handle to an injected host bridge.
pub type HostRef = Arc<dyn HostBridge>;

/// Shared handle to a host-owned URL.
pub type UrlHandleRef = Arc<dyn UrlHandle>;

/// Shared handle to the query component of a host-owned URL.
pub type SearchParamsRef = Arc<dyn SearchParamsHandle>;

/// Capability set through which the layer reaches the embedding.
pub trait HostBridge: Send + Sync {
    /// Encodes text to bytes (UTF-8 for every known host).
    fn encode(&self, text: &str) -> Vec<u8>;

    /// Decodes bytes to text and settles `complete` with the result.
    fn decode(&self, bytes: Vec<u8>, complete: Completion<String>);

    /// Performs one network round trip and settles `complete` with the
    /// buffered result.
    fn network_fetch(&self, request: HostRequest, complete: Completion<HostResponse>);

    /// Parses an absolute URL.
    fn url_parse(&self, absolute: &str) -> Result<UrlHandleRef, HostError>;

    /// Parses `relative` against `base`.
    fn url_parse_with_base(&self, relative: &str, base: &UrlHandleRef) -> Result<UrlHandleRef, HostError>;

    /// Log sink used by [`Console`](crate::console::Console).
    fn log(&self, level: log::Level, text: &str) {
        log::log!(target: "fetch_compat::console", level, "{text}");
    }
}

/// Outbound request handed to [`HostBridge::network_fetch`].
#[derive(Debug, Clone)]
pub struct HostRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderRecord,
    pub body: Option<Vec<u8>>,
    /// Cancellation signal of the originating request. Enforcing it is up to
    /// the host.
    pub signal: Option<CancellationToken>,
}

/// Buffered result of a host network call.
#[derive(Debug, Clone, Default)]
pub struct HostResponse {
    pub status: u16,
    pub headers: HeaderRecord,
    pub body: Option<Vec<u8>>,
    /// Final URL after any redirects the host followed.
    pub url: String,
}

/// Host-owned parsed URL. Getters and setters follow the WHATWG URL API:
/// setters silently ignore values the URL grammar rejects.
pub trait UrlHandle: Send + Sync {
    fn href(&self) -> String;
    /// Re-parses the whole URL in place.
    fn set_href(&self, value: &str) -> Result<(), HostError>;

    fn protocol(&self) -> String;
    fn set_protocol(&self, value: &str);
    fn username(&self) -> String;
    fn set_username(&self, value: &str);
    fn password(&self) -> String;
    fn set_password(&self, value: &str);
    fn host(&self) -> String;
    fn set_host(&self, value: &str);
    fn hostname(&self) -> String;
    fn set_hostname(&self, value: &str);
    fn port(&self) -> String;
    fn set_port(&self, value: &str);
    fn pathname(&self) -> String;
    fn set_pathname(&self, value: &str);
    fn search(&self) -> String;
    fn set_search(&self, value: &str);
    fn hash(&self) -> String;
    fn set_hash(&self, value: &str);

    /// Live view over this URL's query component.
    fn search_params(&self) -> SearchParamsRef;

    /// Independent copy; mutations on either side are not shared.
    fn duplicate(&self) -> UrlHandleRef;
}

/// Host-owned ordered multi-map over a URL query.
pub trait SearchParamsHandle: Send + Sync {
    fn append(&self, name: &str, value: &str);
    fn delete(&self, name: &str);
    fn get(&self, name: &str) -> Option<String>;
    fn get_all(&self, name: &str) -> Vec<String>;
    fn has(&self, name: &str) -> bool;
    fn set(&self, name: &str, value: &str);
    fn sort(&self);
    /// application/x-www-form-urlencoded serialization, without a leading `?`.
    fn serialize(&self) -> String;
    /// Visits every pair in order.
    fn iterate(&self, visit: &mut dyn FnMut(&str, &str));
}

/// Runs `decode` on the host and waits for its single result.
pub(crate) async fn decode(host: &HostRef, bytes: Vec<u8>) -> Result<String, HostError> {
    let (complete, pending) = Completion::channel("decode");
    host.decode(bytes, complete);
    pending.await
}

/// Runs `network_fetch` on the host and waits for its single result.
pub(crate) async fn network_fetch(host: &HostRef, request: HostRequest) -> Result<HostResponse, HostError> {
    let (complete, pending) = Completion::channel("network_fetch");
    host.network_fetch(request, complete);
    pending.await
}

#[cfg(test)]
mod tests {
    use super::testing::StubHost;
    use super::*;

    #[tokio::test]
    async fn decode_bridges_callback_into_future() {
        let host: HostRef = Arc::new(StubHost::new());
        let text = decode(&host, "h\u{e9}".as_bytes().to_vec()).await.unwrap();
        assert_eq!(text, "h\u{e9}");
    }

    #[tokio::test]
    async fn network_fetch_reports_host_failure_unmodified() {
        let host = StubHost::new();
        host.fail_network("connection reset by peer");
        let host: HostRef = Arc::new(host);

        let req = HostRequest {
            method: "GET".into(),
            url: "http://example.com/".into(),
            headers: HeaderRecord::new(),
            body: None,
            signal: None,
        };
        let err = network_fetch(&host, req).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset by peer");
    }

    #[tokio::test]
    async fn misbehaving_host_settles_only_once() {
        let host = StubHost::new();
        host.respond(HostResponse { status: 201, ..Default::default() });
        host.settle_twice(true);
        let host: HostRef = Arc::new(host);

        let req = HostRequest {
            method: "POST".into(),
            url: "http://example.com/".into(),
            headers: HeaderRecord::new(),
            body: Some(b"x".to_vec()),
            signal: None,
        };
        let res = network_fetch(&host, req).await.unwrap();
        assert_eq!(res.status, 201);
    }
}
