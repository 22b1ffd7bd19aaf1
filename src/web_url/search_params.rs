use crate::errors::FetchError;
use crate::host::{HostRef, SearchParamsRef};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Scratch URL whose query hosts a detached parameter list.
const DETACHED_BASE: &str = "http://x/";

/// Initializer accepted by [`UrlSearchParams::new`].
#[derive(Debug, Clone)]
pub enum SearchParamsInit {
    /// Query string, with or without a leading `?`.
    Query(String),
    /// Sequence of pairs; every element must hold exactly two strings.
    Pairs(Vec<Vec<String>>),
    /// Name/value record, appended in the given order.
    Record(Vec<(String, String)>),
}

impl From<&str> for SearchParamsInit {
    fn from(query: &str) -> Self {
        SearchParamsInit::Query(query.to_string())
    }
}

impl From<String> for SearchParamsInit {
    fn from(query: String) -> Self {
        SearchParamsInit::Query(query)
    }
}

impl From<Vec<Vec<String>>> for SearchParamsInit {
    fn from(pairs: Vec<Vec<String>>) -> Self {
        SearchParamsInit::Pairs(pairs)
    }
}

impl From<BTreeMap<String, String>> for SearchParamsInit {
    fn from(record: BTreeMap<String, String>) -> Self {
        SearchParamsInit::Record(record.into_iter().collect())
    }
}

impl From<HashMap<String, String>> for SearchParamsInit {
    fn from(record: HashMap<String, String>) -> Self {
        SearchParamsInit::Record(record.into_iter().collect())
    }
}

/// Ordered multi-map of query parameters backed by a host handle.
#[derive(Clone)]
pub struct UrlSearchParams {
    params: SearchParamsRef,
}

impl UrlSearchParams {
    /// Builds a detached parameter list.
    pub fn new(host: &HostRef, init: impl Into<SearchParamsInit>) -> Result<Self, FetchError> {
        let scratch = host.url_parse(DETACHED_BASE)?;
        let params = Self::from_handle(scratch.search_params());

        match init.into() {
            SearchParamsInit::Query(query) => {
                let query = query.strip_prefix('?').unwrap_or(&query);
                // The search setter drops one more leading `?`, so hand it one back
                scratch.set_search(&format!("?{query}"));
            }
            SearchParamsInit::Pairs(pairs) => {
                for pair in pairs {
                    let [name, value] = <[String; 2]>::try_from(pair).map_err(|pair| {
                        FetchError::validation(format!(
                            "search param pair must contain exactly two elements, got {}",
                            pair.len()
                        ))
                    })?;
                    params.append(&name, &value);
                }
            }
            SearchParamsInit::Record(record) => {
                for (name, value) in record {
                    params.append(&name, &value);
                }
            }
        }

        Ok(params)
    }

    pub(crate) fn from_handle(params: SearchParamsRef) -> Self {
        Self { params }
    }

    pub fn append(&self, name: &str, value: &str) {
        self.params.append(name, value)
    }

    pub fn delete(&self, name: &str) {
        self.params.delete(name)
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.params.get(name)
    }

    pub fn get_all(&self, name: &str) -> Vec<String> {
        self.params.get_all(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.params.has(name)
    }

    pub fn set(&self, name: &str, value: &str) {
        self.params.set(name, value)
    }

    pub fn sort(&self) {
        self.params.sort()
    }

    /// Calls `f(value, name)` for every pair, matching `forEach`.
    pub fn for_each(&self, mut f: impl FnMut(&str, &str)) {
        self.params.iterate(&mut |name, value| f(value, name));
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.params.iterate(&mut |name, value| out.push((name.to_string(), value.to_string())));
        out
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries().into_iter().map(|(name, _)| name).collect()
    }

    pub fn values(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, value)| value).collect()
    }

    pub fn size(&self) -> usize {
        let mut n = 0;
        self.params.iterate(&mut |_, _| n += 1);
        n
    }
}

impl fmt::Display for UrlSearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.params.serialize())
    }
}

impl fmt::Debug for UrlSearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}
