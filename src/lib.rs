//! Fetch and URL object model over injected host primitives.
//!
//! Handler code written against `Request`/`Response` runs inside an embedding
//! that only provides a byte codec, a network call and a URL parser, all
//! reached through a [`HostBridge`]. [`NativeHost`] is a ready-made bridge for
//! running on a plain tokio runtime.
pub mod config;
pub mod console;
pub mod dispatch;
pub mod encoding;
pub mod errors;
pub mod host;
pub mod net;
pub mod web_url;

pub use config::{HostConfig, HostConfigError};
pub use dispatch::{DispatchResult, Dispatcher, Handler, RawRequest};
pub use errors::{FetchError, HostError};
pub use host::{HostBridge, HostRef, NativeHost};
pub use net::{fetch, Headers, Request, RequestInit, Response, ResponseInit};
pub use web_url::{Url, UrlSearchParams};
