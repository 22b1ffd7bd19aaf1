//! Ordered, case-insensitive header list.
//!
//! Names are lower-cased when stored, entries keep insertion order and a name
//! may appear more than once. Header syntax is not validated here; the host
//! transport rejects malformed names when it puts them on the wire.

use crate::errors::FetchError;
use crate::host::HeaderRecord;
use http::HeaderMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, keeping any existing values for the same name.
    pub fn append(&mut self, name: &str, value: &str) {
        self.entries.push((normalize(name), value.to_string()));
    }

    /// Replaces every value for `name` with `value`. The first existing entry
    /// keeps its position.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize(name);
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                self.entries[first].1 = value.to_string();
                let mut index = 0;
                self.entries.retain(|(n, _)| {
                    let keep = index <= first || *n != name;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((name, value.to_string())),
        }
    }

    /// All values for `name` joined with `", "`, or `None` when absent.
    pub fn get(&self, name: &str) -> Option<String> {
        let values = self.get_all(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    pub fn get_all(&self, name: &str) -> Vec<String> {
        let name = normalize(name);
        self.entries
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        let name = normalize(name);
        self.entries.iter().any(|(n, _)| *n == name)
    }

    pub fn delete(&mut self, name: &str) {
        let name = normalize(name);
        self.entries.retain(|(n, _)| *n != name);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in insertion order, one per entry.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Calls `f(value, name)` for every entry, matching `Headers.forEach`.
    pub fn for_each(&self, mut f: impl FnMut(&str, &str)) {
        for (name, value) in &self.entries {
            f(value, name);
        }
    }

    /// Flattens into the plain mapping the host expects. Repeated names are
    /// joined with `", "`.
    pub fn to_record(&self) -> HeaderRecord {
        let mut record = HeaderRecord::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            record
                .entry(name.clone())
                .and_modify(|joined: &mut String| {
                    joined.push_str(", ");
                    joined.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        record
    }

    /// Converts to an `http::HeaderMap`, validating names and values.
    pub fn to_header_map(&self) -> Result<HeaderMap, FetchError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let name = http::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::validation(format!("invalid header name {name:?}: {e}")))?;
            let value = http::HeaderValue::from_str(value)
                .map_err(|e| FetchError::validation(format!("invalid header value {value:?}: {e}")))?;
            map.append(name, value);
        }
        Ok(map)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name.as_ref(), value.as_ref());
        }
        headers
    }
}

impl From<&HeaderRecord> for Headers {
    fn from(record: &HeaderRecord) -> Self {
        record.iter().collect()
    }
}

impl From<&HeaderMap> for Headers {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .map(|(n, v)| (n.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect()
    }
}
