//! `URL` and `URLSearchParams` over host-owned handles.
//!
//! Neither type caches anything: every read and write goes straight to the
//! host handle. A [`UrlSearchParams`] obtained from [`Url::search_params`]
//! wraps the URL's own query sub-handle, so edits made through it show up in
//! [`Url::search`] and the other way around.
mod search_params;

use crate::errors::FetchError;
use crate::host::{HostRef, UrlHandleRef};
use serde::{Serialize, Serializer};
use std::fmt;

pub use search_params::{SearchParamsInit, UrlSearchParams};

#[derive(Clone)]
pub struct Url {
    handle: UrlHandleRef,
}

impl Url {
    /// Parses `url`, resolving it against `base` when one is given.
    pub fn parse(host: &HostRef, url: &str, base: Option<&str>) -> Result<Url, FetchError> {
        let handle = match base {
            Some(base) => {
                let base = host.url_parse(base)?;
                host.url_parse_with_base(url, &base)?
            }
            None => host.url_parse(url)?,
        };
        Ok(Url { handle })
    }

    pub fn can_parse(host: &HostRef, url: &str, base: Option<&str>) -> bool {
        Url::parse(host, url, base).is_ok()
    }

    pub fn from_handle(handle: UrlHandleRef) -> Url {
        Url { handle }
    }

    pub fn handle(&self) -> &UrlHandleRef {
        &self.handle
    }

    /// Independent copy backed by a new host handle.
    pub fn duplicate(&self) -> Url {
        Url { handle: self.handle.duplicate() }
    }

    pub fn href(&self) -> String {
        self.handle.href()
    }

    pub fn set_href(&self, value: &str) -> Result<(), FetchError> {
        Ok(self.handle.set_href(value)?)
    }

    pub fn origin(&self) -> String {
        format!("{}//{}", self.protocol(), self.host())
    }

    pub fn protocol(&self) -> String {
        self.handle.protocol()
    }

    pub fn set_protocol(&self, value: &str) {
        self.handle.set_protocol(value)
    }

    pub fn username(&self) -> String {
        self.handle.username()
    }

    pub fn set_username(&self, value: &str) {
        self.handle.set_username(value)
    }

    pub fn password(&self) -> String {
        self.handle.password()
    }

    pub fn set_password(&self, value: &str) {
        self.handle.set_password(value)
    }

    pub fn host(&self) -> String {
        self.handle.host()
    }

    pub fn set_host(&self, value: &str) {
        self.handle.set_host(value)
    }

    pub fn hostname(&self) -> String {
        self.handle.hostname()
    }

    pub fn set_hostname(&self, value: &str) {
        self.handle.set_hostname(value)
    }

    pub fn port(&self) -> String {
        self.handle.port()
    }

    pub fn set_port(&self, value: &str) {
        self.handle.set_port(value)
    }

    pub fn pathname(&self) -> String {
        self.handle.pathname()
    }

    pub fn set_pathname(&self, value: &str) {
        self.handle.set_pathname(value)
    }

    pub fn search(&self) -> String {
        self.handle.search()
    }

    pub fn set_search(&self, value: &str) {
        self.handle.set_search(value)
    }

    pub fn hash(&self) -> String {
        self.handle.hash()
    }

    pub fn set_hash(&self, value: &str) {
        self.handle.set_hash(value)
    }

    /// Live view over the query component.
    pub fn search_params(&self) -> UrlSearchParams {
        UrlSearchParams::from_handle(self.handle.search_params())
    }

    pub fn to_json(&self) -> String {
        self.href()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

impl fmt::Debug for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Url").field(&self.href()).finish()
    }
}

impl Serialize for Url {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.href())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::StubHost;
    use std::sync::Arc;

    fn host() -> HostRef {
        Arc::new(StubHost::new())
    }

    #[test]
    fn components_pass_through() {
        let url = Url::parse(&host(), "http://example.com/p?a=1#h", None).unwrap();
        assert_eq!(url.pathname(), "/p");
        assert_eq!(url.search(), "?a=1");
        assert_eq!(url.hash(), "#h");
        assert_eq!(url.origin(), "http://example.com");

        url.set_pathname("/q");
        assert!(url.href().contains("/q"));
        assert_eq!(url.search(), "?a=1");
        assert_eq!(url.hash(), "#h");
    }

    #[test]
    fn origin_keeps_explicit_port() {
        let url = Url::parse(&host(), "https://example.com:8443/", None).unwrap();
        assert_eq!(url.origin(), "https://example.com:8443");
    }

    #[test]
    fn relative_parse_uses_base() {
        let h = host();
        let url = Url::parse(&h, "/x?y=1", Some("https://example.com/a/b")).unwrap();
        assert_eq!(url.href(), "https://example.com/x?y=1");

        assert!(Url::can_parse(&h, "https://ok.test/", None));
        assert!(!Url::can_parse(&h, "/x", None));
        assert!(matches!(Url::parse(&h, "/x", None), Err(FetchError::Host(_))));
    }

    #[test]
    fn search_params_view_is_live() {
        let url = Url::parse(&host(), "http://example.com/?a=1", None).unwrap();
        let params = url.search_params();

        params.append("b", "2");
        assert_eq!(url.search(), "?a=1&b=2");

        url.set_search("?c=3");
        assert_eq!(params.get("c").as_deref(), Some("3"));
        assert!(!params.has("a"));
    }

    #[test]
    fn setters_and_href() {
        let url = Url::parse(&host(), "http://example.com/", None).unwrap();
        url.set_protocol("https");
        url.set_hostname("example.org");
        url.set_port("8080");
        url.set_username("me");
        url.set_hash("top");
        assert_eq!(url.href(), "https://me@example.org:8080/#top");

        url.set_href("http://other.test/z").unwrap();
        assert_eq!(url.host(), "other.test");
        assert!(url.set_href("not a url").is_err());
        assert_eq!(url.to_json(), "http://other.test/z");
    }

    #[test]
    fn duplicate_detaches() {
        let url = Url::parse(&host(), "http://example.com/a", None).unwrap();
        let copy = url.duplicate();
        copy.set_pathname("/b");
        assert_eq!(url.pathname(), "/a");
    }

    #[test]
    fn serializes_as_href() {
        let url = Url::parse(&host(), "http://example.com/a", None).unwrap();
        assert_eq!(serde_json::to_string(&url).unwrap(), r#""http://example.com/a""#);
        assert_eq!(url.to_string(), "http://example.com/a");
    }
}
