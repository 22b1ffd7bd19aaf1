//! Fetch object model: headers, bodies, requests, responses and the
//! outbound [`fetch`] helper.
mod body;
mod fetch;
mod headers;
mod request;
mod response;

pub use body::{Body, BodyInit};
pub use fetch::{fetch, send};
pub use headers::Headers;
pub use request::{RedirectMode, Referrer, ReferrerPolicy, Request, RequestInit, RequestInput};
pub use response::{Response, ResponseInit, ResponseType};
