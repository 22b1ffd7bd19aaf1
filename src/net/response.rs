//! `Response`: the result of a fetch or the value a handler returns.
//!
//! ## Notes
//! - The body is fully buffered and can be read once (see [`Body`]).
//! - `ok` is derived from `status` (200..=299).
//! - A `Response` of type [`ResponseType::Error`] always has status `0` and an
//!   empty status text.
//! - Responses wrapping a host result skip constructor validation: whatever
//!   status the host reports is kept as-is.
use crate::errors::FetchError;
use crate::host::{HostRef, HostResponse};
use crate::net::body::{Body, BodyInit, TEXT_CONTENT_TYPE};
use crate::net::headers::Headers;
use crate::web_url::Url;
use http::header::{CONTENT_TYPE, LOCATION};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

const JSON_CONTENT_TYPE: &str = "application/json";
const NULL_BODY_STATUSES: [u16; 3] = [204, 205, 304];
const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    #[default]
    Default,
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Default => "default",
            ResponseType::Error => "error",
        }
    }
}

/// Optional overrides for [`Response::new`].
#[derive(Debug, Clone, Default)]
pub struct ResponseInit {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Option<Headers>,
}

impl ResponseInit {
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

pub struct Response {
    /// Numeric HTTP status code, `0` for error responses.
    status: u16,
    /// Reason phrase. Empty unless given or reported by the host.
    status_text: String,
    headers: Headers,
    body: Body,
    r#type: ResponseType,
    /// Final URL of a fetched response, empty for constructed ones.
    url: String,
    host: HostRef,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("type", &self.r#type)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl Response {
    pub fn new(host: &HostRef, body: Option<BodyInit>, init: ResponseInit) -> Result<Response, FetchError> {
        let status = init.status.unwrap_or(200);
        if !(200..=599).contains(&status) {
            return Err(FetchError::validation(format!(
                "response status {status} is outside 200..=599"
            )));
        }
        if body.is_some() && NULL_BODY_STATUSES.contains(&status) {
            return Err(FetchError::validation(format!(
                "response with status {status} cannot have a body"
            )));
        }

        let mut headers = init.headers.unwrap_or_default();
        if matches!(body, Some(BodyInit::Text(_))) && !headers.has(CONTENT_TYPE.as_str()) {
            headers.set(CONTENT_TYPE.as_str(), TEXT_CONTENT_TYPE);
        }

        Ok(Response {
            status,
            status_text: init.status_text.unwrap_or_default(),
            headers,
            body: Body::new(host, body),
            r#type: ResponseType::Default,
            url: String::new(),
            host: host.clone(),
        })
    }

    /// Network error response: status 0, empty status text, type `error`.
    pub fn error(host: &HostRef) -> Response {
        Response {
            status: 0,
            status_text: String::new(),
            headers: Headers::new(),
            body: Body::new(host, None),
            r#type: ResponseType::Error,
            url: String::new(),
            host: host.clone(),
        }
    }

    /// Response whose body is `data` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(host: &HostRef, data: &T, init: ResponseInit) -> Result<Response, FetchError> {
        let text = serde_json::to_string(data)
            .map_err(|e| FetchError::validation(format!("value is not JSON serializable: {e}")))?;

        let mut init = init;
        let headers = init.headers.get_or_insert_with(Headers::new);
        if !headers.has(CONTENT_TYPE.as_str()) {
            headers.set(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE);
        }

        Response::new(host, Some(BodyInit::Text(text)), init)
    }

    /// Redirect to `url` (parsed by the host) with a 3xx status.
    pub fn redirect(host: &HostRef, url: &str, status: u16) -> Result<Response, FetchError> {
        let target = Url::parse(host, url, None)?;
        if !REDIRECT_STATUSES.contains(&status) {
            return Err(FetchError::validation(format!("invalid redirect status {status}")));
        }

        let mut headers = Headers::new();
        headers.set(LOCATION.as_str(), &target.href());
        Response::new(host, None, ResponseInit::default().status(status).headers(headers))
    }

    /// Wraps a host network result. The status text comes from the canonical
    /// reason phrase of the status code.
    pub(crate) fn from_host(host: &HostRef, res: HostResponse) -> Response {
        let status_text = StatusCode::from_u16(res.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();

        Response {
            status: res.status,
            status_text,
            headers: Headers::from(&res.headers),
            body: Body::new(host, res.body.map(BodyInit::Bytes)),
            r#type: ResponseType::Default,
            url: res.url,
            host: host.clone(),
        }
    }

    /// Copy with its own, unread body. Fails once the body has been read.
    pub fn try_clone(&self) -> Result<Response, FetchError> {
        Ok(Response {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: self.body.try_clone()?,
            r#type: self.r#type,
            url: self.url.clone(),
            host: self.host.clone(),
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn r#type(&self) -> ResponseType {
        self.r#type
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body_used(&self) -> bool {
        self.body.body_used()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.body()
    }

    pub(crate) fn body_ref(&self) -> &Body {
        &self.body
    }

    pub async fn array_buffer(&mut self) -> Result<Vec<u8>, FetchError> {
        self.body.array_buffer().await
    }

    pub async fn text(&mut self) -> Result<String, FetchError> {
        self.body.text().await
    }

    pub async fn json_body<T: DeserializeOwned>(&mut self) -> Result<T, FetchError> {
        self.body.json().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::StubHost;
    use crate::host::HeaderRecord;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn host() -> HostRef {
        Arc::new(StubHost::new())
    }

    #[tokio::test]
    async fn defaults() {
        let mut res = Response::new(&host(), Some("ok".into()), ResponseInit::default()).unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.status_text(), "");
        assert_eq!(res.r#type(), ResponseType::Default);
        assert!(res.ok());
        assert_eq!(res.url(), "");
        assert_eq!(res.headers().get("content-type").as_deref(), Some(TEXT_CONTENT_TYPE));
        assert_eq!(res.text().await.unwrap(), "ok");
        assert!(matches!(res.text().await, Err(FetchError::Consumption)));
    }

    #[test]
    fn ok_tracks_status() {
        let h = host();
        for (status, ok) in [(200, true), (299, true), (300, false), (404, false), (500, false)] {
            let res = Response::new(&h, None, ResponseInit::default().status(status)).unwrap();
            assert_eq!(res.ok(), ok, "{status}");
        }
    }

    #[test]
    fn error_response() {
        let res = Response::error(&host());
        assert_eq!(res.status(), 0);
        assert_eq!(res.status_text(), "");
        assert_eq!(res.r#type(), ResponseType::Error);
        assert_eq!(res.r#type().as_str(), "error");
        assert!(!res.ok());
        assert!(res.body().is_none());
    }

    #[test]
    fn status_validation() {
        let h = host();
        assert!(matches!(
            Response::new(&h, None, ResponseInit::default().status(99)),
            Err(FetchError::Validation(_))
        ));
        assert!(matches!(
            Response::new(&h, None, ResponseInit::default().status(600)),
            Err(FetchError::Validation(_))
        ));
        assert!(matches!(
            Response::new(&h, Some("x".into()), ResponseInit::default().status(204)),
            Err(FetchError::Validation(_))
        ));
        assert!(Response::new(&h, None, ResponseInit::default().status(204)).is_ok());
    }

    #[tokio::test]
    async fn json_sets_content_type_when_missing() {
        let h = host();
        let mut data = BTreeMap::new();
        data.insert("a", 1);

        let mut res = Response::json(&h, &data, ResponseInit::default()).unwrap();
        assert_eq!(res.headers().get("content-type").as_deref(), Some("application/json"));
        let back: serde_json::Value = res.json_body().await.unwrap();
        assert_eq!(back, serde_json::json!({"a": 1}));

        let mut headers = Headers::new();
        headers.set("Content-Type", "application/vnd.api+json");
        let res = Response::json(&h, &data, ResponseInit::default().headers(headers).status(201)).unwrap();
        assert_eq!(res.headers().get_all("content-type"), vec!["application/vnd.api+json"]);
        assert_eq!(res.status(), 201);
    }

    #[test]
    fn json_rejects_unrepresentable_values() {
        let mut data = BTreeMap::new();
        data.insert(vec![1u8], "non-string key");
        assert!(matches!(
            Response::json(&host(), &data, ResponseInit::default()),
            Err(FetchError::Validation(_))
        ));
    }

    #[test]
    fn redirect_sets_location() {
        let h = host();
        let res = Response::redirect(&h, "https://example.com/next", 302).unwrap();
        assert_eq!(res.status(), 302);
        assert_eq!(res.headers().get("location").as_deref(), Some("https://example.com/next"));

        assert!(matches!(
            Response::redirect(&h, "https://example.com/", 200),
            Err(FetchError::Validation(_))
        ));
        assert!(matches!(Response::redirect(&h, "nope", 301), Err(FetchError::Host(_))));
    }

    #[tokio::test]
    async fn from_host_keeps_status_and_url() {
        let mut headers = HeaderRecord::new();
        headers.insert("X-Upstream".into(), "1".into());
        let mut res = Response::from_host(
            &host(),
            HostResponse {
                status: 404,
                headers,
                body: Some(b"missing".to_vec()),
                url: "https://example.com/final".into(),
            },
        );
        assert_eq!(res.status(), 404);
        assert_eq!(res.status_text(), "Not Found");
        assert_eq!(res.url(), "https://example.com/final");
        assert_eq!(res.headers().get("x-upstream").as_deref(), Some("1"));
        assert_eq!(res.text().await.unwrap(), "missing");
    }

    #[tokio::test]
    async fn clone_before_read_only() {
        let mut res = Response::new(&host(), Some(vec![1u8, 2].into()), ResponseInit::default()).unwrap();
        let mut copy = res.try_clone().unwrap();
        assert_eq!(copy.array_buffer().await.unwrap(), vec![1, 2]);
        assert_eq!(res.array_buffer().await.unwrap(), vec![1, 2]);
        assert!(matches!(res.try_clone(), Err(FetchError::Validation(_))));
    }
}
