//! `Request`: an outbound (or inbound) call description.
//!
//! Construction follows a fixed order of steps and stops at the first
//! failing one:
//!
//! 1. resolve the URL (clone the source request's URL or parse the string)
//! 2. reject URLs with embedded credentials
//! 3. resolve the method; only the six well-known verbs are upper-cased
//! 4. reject a body on GET/HEAD
//! 5. resolve the body (init, else a copy of the source body)
//! 6. merge headers
//! 7. resolve the cancellation signal
//! 8. resolve the referrer
//! 9. resolve and validate the referrer policy

use crate::errors::FetchError;
use crate::host::HostRef;
use crate::net::body::{Body, BodyInit, TEXT_CONTENT_TYPE};
use crate::net::headers::Headers;
use crate::web_url::Url;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

const KNOWN_METHODS: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedirectMode {
    #[default]
    Follow,
    Error,
    Manual,
}

impl RedirectMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectMode::Follow => "follow",
            RedirectMode::Error => "error",
            RedirectMode::Manual => "manual",
        }
    }
}

impl FromStr for RedirectMode {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(RedirectMode::Follow),
            "error" => Ok(RedirectMode::Error),
            "manual" => Ok(RedirectMode::Manual),
            other => Err(FetchError::validation(format!("invalid redirect mode {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferrerPolicy {
    /// The empty policy string: defer to the host default.
    #[default]
    Unset,
    NoReferrer,
    NoReferrerWhenDowngrade,
    SameOrigin,
    Origin,
    StrictOrigin,
    OriginWhenCrossOrigin,
    StrictOriginWhenCrossOrigin,
    UnsafeUrl,
}

impl ReferrerPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferrerPolicy::Unset => "",
            ReferrerPolicy::NoReferrer => "no-referrer",
            ReferrerPolicy::NoReferrerWhenDowngrade => "no-referrer-when-downgrade",
            ReferrerPolicy::SameOrigin => "same-origin",
            ReferrerPolicy::Origin => "origin",
            ReferrerPolicy::StrictOrigin => "strict-origin",
            ReferrerPolicy::OriginWhenCrossOrigin => "origin-when-cross-origin",
            ReferrerPolicy::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
            ReferrerPolicy::UnsafeUrl => "unsafe-url",
        }
    }
}

impl FromStr for ReferrerPolicy {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" => ReferrerPolicy::Unset,
            "no-referrer" => ReferrerPolicy::NoReferrer,
            "no-referrer-when-downgrade" => ReferrerPolicy::NoReferrerWhenDowngrade,
            "same-origin" => ReferrerPolicy::SameOrigin,
            "origin" => ReferrerPolicy::Origin,
            "strict-origin" => ReferrerPolicy::StrictOrigin,
            "origin-when-cross-origin" => ReferrerPolicy::OriginWhenCrossOrigin,
            "strict-origin-when-cross-origin" => ReferrerPolicy::StrictOriginWhenCrossOrigin,
            "unsafe-url" => ReferrerPolicy::UnsafeUrl,
            other => return Err(FetchError::validation(format!("invalid referrer policy {other:?}"))),
        })
    }
}

impl fmt::Display for ReferrerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved referrer of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Referrer {
    NoReferrer,
    Client,
    Url(String),
}

impl Referrer {
    /// Value exposed through `Request.referrer`.
    pub fn as_str(&self) -> &str {
        match self {
            Referrer::NoReferrer => "",
            Referrer::Client => "about:client",
            Referrer::Url(url) => url,
        }
    }
}

/// First constructor argument: where the request points.
pub enum RequestInput<'a> {
    Url(String),
    ParsedUrl(&'a Url),
    Request(&'a Request),
}

impl From<&str> for RequestInput<'_> {
    fn from(url: &str) -> Self {
        RequestInput::Url(url.to_string())
    }
}

impl From<String> for RequestInput<'_> {
    fn from(url: String) -> Self {
        RequestInput::Url(url)
    }
}

impl<'a> From<&'a Url> for RequestInput<'a> {
    fn from(url: &'a Url) -> Self {
        RequestInput::ParsedUrl(url)
    }
}

impl<'a> From<&'a Request> for RequestInput<'a> {
    fn from(request: &'a Request) -> Self {
        RequestInput::Request(request)
    }
}

/// Optional overrides for [`Request::new`].
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Option<String>,
    pub headers: Option<Headers>,
    pub body: Option<BodyInit>,
    pub redirect: Option<RedirectMode>,
    pub signal: Option<CancellationToken>,
    /// Empty string means "no-referrer".
    pub referrer: Option<String>,
    pub referrer_policy: Option<String>,
}

impl RequestInit {
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn body(mut self, body: impl Into<BodyInit>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn redirect(mut self, redirect: RedirectMode) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn referrer_policy(mut self, policy: impl Into<String>) -> Self {
        self.referrer_policy = Some(policy.into());
        self
    }
}

pub struct Request {
    url: Url,
    method: String,
    body: Body,
    headers: Headers,
    redirect: RedirectMode,
    signal: Option<CancellationToken>,
    referrer: Option<Referrer>,
    referrer_policy: ReferrerPolicy,
    host: HostRef,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("redirect", &self.redirect)
            .field("referrer", &self.referrer)
            .field("referrer_policy", &self.referrer_policy)
            .finish_non_exhaustive()
    }
}

/// Upper-cases `method` only when it is one of the well-known verbs.
fn normalize_method(method: &str) -> String {
    KNOWN_METHODS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(method))
        .map(|known| known.to_string())
        .unwrap_or_else(|| method.to_string())
}

fn is_client_referrer(url: &Url) -> bool {
    if url.protocol() != "about:" {
        return false;
    }
    let path = url.pathname();
    path == "client" || (url.host() == "client" && (path.is_empty() || path == "/"))
}

impl Request {
    pub fn new<'a>(host: &HostRef, input: impl Into<RequestInput<'a>>, init: RequestInit) -> Result<Request, FetchError> {
        let input = input.into();
        let source = match &input {
            RequestInput::Request(source) => Some(*source),
            _ => None,
        };

        // 1. URL
        let url = match &input {
            RequestInput::Url(raw) => Url::parse(host, raw, None)?,
            RequestInput::ParsedUrl(url) => url.duplicate(),
            RequestInput::Request(source) => source.url.duplicate(),
        };

        // 2. credentials
        if !url.username().is_empty() || !url.password().is_empty() {
            return Err(FetchError::validation(format!(
                "request URL must not include credentials: {}",
                url.href()
            )));
        }

        // 3. method
        let method = match (&init.method, source) {
            (Some(method), _) => normalize_method(method),
            (None, Some(source)) => source.method.clone(),
            (None, None) => "GET".to_string(),
        };

        // 4. no body on GET/HEAD
        let inherits_body = init.body.is_none() && source.is_some_and(|s| !s.body.is_empty());
        if (init.body.is_some() || inherits_body) && (method == "GET" || method == "HEAD") {
            return Err(FetchError::validation(format!(
                "request with {method} method cannot have a body"
            )));
        }

        // 5. body
        let text_body = matches!(init.body, Some(BodyInit::Text(_)));
        let body = match (init.body, source) {
            (Some(body), _) => Body::new(host, Some(body)),
            (None, Some(source)) => source.body.try_clone()?,
            (None, None) => Body::new(host, None),
        };

        // 6. headers
        let mut headers = match (init.headers, source) {
            (Some(headers), _) => headers,
            (None, Some(source)) => source.headers.clone(),
            (None, None) => Headers::new(),
        };
        if text_body && !headers.has(CONTENT_TYPE.as_str()) {
            headers.set(CONTENT_TYPE.as_str(), TEXT_CONTENT_TYPE);
        }

        // 7. signal; CancellationToken is the only accepted capability
        let signal = init.signal.or_else(|| source.and_then(|s| s.signal.clone()));

        // 8. referrer
        let referrer = match init.referrer {
            Some(raw) if raw.is_empty() => Some(Referrer::NoReferrer),
            Some(raw) => {
                let parsed = Url::parse(host, &raw, None)?;
                if is_client_referrer(&parsed) {
                    Some(Referrer::Client)
                } else {
                    Some(Referrer::Url(parsed.href()))
                }
            }
            None => source.and_then(|s| s.referrer.clone()),
        };

        // 9. referrer policy
        let referrer_policy = match init.referrer_policy {
            Some(policy) => policy.parse()?,
            None => source.map(|s| s.referrer_policy).unwrap_or_default(),
        };

        let redirect = init
            .redirect
            .or_else(|| source.map(|s| s.redirect))
            .unwrap_or_default();

        Ok(Request {
            url,
            method,
            body,
            headers,
            redirect,
            signal,
            referrer,
            referrer_policy,
            host: host.clone(),
        })
    }

    /// New request built from this one, as `Request.clone()` does.
    pub fn try_clone(&self) -> Result<Request, FetchError> {
        Request::new(&self.host, self, RequestInit::default())
    }

    pub fn url(&self) -> String {
        self.url.href()
    }

    pub fn parsed_url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn redirect(&self) -> RedirectMode {
        self.redirect
    }

    pub fn signal(&self) -> Option<&CancellationToken> {
        self.signal.as_ref()
    }

    pub fn referrer(&self) -> Option<&Referrer> {
        self.referrer.as_ref()
    }

    pub fn referrer_policy(&self) -> ReferrerPolicy {
        self.referrer_policy
    }

    pub fn set_referrer_policy(&mut self, policy: &str) -> Result<(), FetchError> {
        self.referrer_policy = policy.parse()?;
        Ok(())
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

    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, FetchError> {
        self.body.json().await
    }
}
