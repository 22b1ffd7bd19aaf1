use crate::errors::HostError;
use crate::host::{SearchParamsHandle, SearchParamsRef, UrlHandle, UrlHandleRef};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::{quirks, Url};

type SharedUrl = Arc<RwLock<Url>>;

fn read(url: &SharedUrl) -> RwLockReadGuard<'_, Url> {
    url.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(url: &SharedUrl) -> RwLockWriteGuard<'_, Url> {
    url.write().unwrap_or_else(PoisonError::into_inner)
}

/// [`UrlHandle`] backed by the `url` crate's WHATWG implementation.
#[derive(Debug, Clone)]
pub struct NativeUrlHandle {
    url: SharedUrl,
}

impl NativeUrlHandle {
    pub fn parse(absolute: &str) -> Result<Self, HostError> {
        let url = Url::parse(absolute).map_err(HostError::from_error)?;
        Ok(Self::from_url(url))
    }

    pub fn parse_with_base(relative: &str, base: &str) -> Result<Self, HostError> {
        let base = Url::parse(base).map_err(HostError::from_error)?;
        let url = base.join(relative).map_err(HostError::from_error)?;
        Ok(Self::from_url(url))
    }

    pub fn from_url(url: Url) -> Self {
        Self { url: Arc::new(RwLock::new(url)) }
    }

    /// Snapshot of the current URL value.
    pub fn to_url(&self) -> Url {
        read(&self.url).clone()
    }
}

impl UrlHandle for NativeUrlHandle {
    fn href(&self) -> String {
        quirks::href(&read(&self.url)).to_string()
    }

    fn set_href(&self, value: &str) -> Result<(), HostError> {
        quirks::set_href(&mut write(&self.url), value).map_err(HostError::from_error)
    }

    fn protocol(&self) -> String {
        quirks::protocol(&read(&self.url)).to_string()
    }

    fn set_protocol(&self, value: &str) {
        let _ = quirks::set_protocol(&mut write(&self.url), value);
    }

    fn username(&self) -> String {
        quirks::username(&read(&self.url)).to_string()
    }

    fn set_username(&self, value: &str) {
        let _ = quirks::set_username(&mut write(&self.url), value);
    }

    fn password(&self) -> String {
        quirks::password(&read(&self.url)).to_string()
    }

    fn set_password(&self, value: &str) {
        let _ = quirks::set_password(&mut write(&self.url), value);
    }

    fn host(&self) -> String {
        quirks::host(&read(&self.url)).to_string()
    }

    fn set_host(&self, value: &str) {
        let _ = quirks::set_host(&mut write(&self.url), value);
    }

    fn hostname(&self) -> String {
        quirks::hostname(&read(&self.url)).to_string()
    }

    fn set_hostname(&self, value: &str) {
        let _ = quirks::set_hostname(&mut write(&self.url), value);
    }

    fn port(&self) -> String {
        quirks::port(&read(&self.url)).to_string()
    }

    fn set_port(&self, value: &str) {
        let _ = quirks::set_port(&mut write(&self.url), value);
    }

    fn pathname(&self) -> String {
        quirks::pathname(&read(&self.url)).to_string()
    }

    fn set_pathname(&self, value: &str) {
        quirks::set_pathname(&mut write(&self.url), value);
    }

    fn search(&self) -> String {
        quirks::search(&read(&self.url)).to_string()
    }

    fn set_search(&self, value: &str) {
        quirks::set_search(&mut write(&self.url), value);
    }

    fn hash(&self) -> String {
        quirks::hash(&read(&self.url)).to_string()
    }

    fn set_hash(&self, value: &str) {
        quirks::set_hash(&mut write(&self.url), value);
    }

    fn search_params(&self) -> SearchParamsRef {
        Arc::new(NativeSearchParams { url: self.url.clone() })
    }

    fn duplicate(&self) -> UrlHandleRef {
        Arc::new(Self::from_url(self.to_url()))
    }
}

/// Query view sharing its storage with the [`NativeUrlHandle`] it came from.
#[derive(Debug, Clone)]
pub struct NativeSearchParams {
    url: SharedUrl,
}

impl NativeSearchParams {
    fn pairs(&self) -> Vec<(String, String)> {
        read(&self.url).query_pairs().into_owned().collect()
    }

    fn update(&self, f: impl FnOnce(&mut Vec<(String, String)>)) {
        let mut url = write(&self.url);
        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        f(&mut pairs);

        // An empty list leaves the URL without a query at all
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs.iter());
        }
    }
}

impl SearchParamsHandle for NativeSearchParams {
    fn append(&self, name: &str, value: &str) {
        self.update(|pairs| pairs.push((name.to_string(), value.to_string())));
    }

    fn delete(&self, name: &str) {
        self.update(|pairs| pairs.retain(|(n, _)| n != name));
    }

    fn get(&self, name: &str) -> Option<String> {
        self.pairs().into_iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn get_all(&self, name: &str) -> Vec<String> {
        self.pairs()
            .into_iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }

    fn has(&self, name: &str) -> bool {
        self.pairs().iter().any(|(n, _)| n == name)
    }

    fn set(&self, name: &str, value: &str) {
        self.update(|pairs| {
            match pairs.iter().position(|(n, _)| n == name) {
                Some(first) => {
                    pairs[first].1 = value.to_string();
                    let mut index = 0;
                    pairs.retain(|(n, _)| {
                        let keep = index <= first || n != name;
                        index += 1;
                        keep
                    });
                }
                None => pairs.push((name.to_string(), value.to_string())),
            }
        });
    }

    fn sort(&self) {
        // Stable sort on UTF-16 code units, as URLSearchParams.sort() requires
        self.update(|pairs| pairs.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16())));
    }

    fn serialize(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    fn iterate(&self, visit: &mut dyn FnMut(&str, &str)) {
        for (name, value) in self.pairs() {
            visit(&name, &value);
        }
    }
}
