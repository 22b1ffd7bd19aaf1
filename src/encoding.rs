//! `TextEncoder` and `TextDecoder` over the host codec.
//!
//! The host only speaks UTF-8. A decoder remembers the label and options it
//! was created with, but they do not change how bytes are decoded.
use crate::errors::FetchError;
use crate::host::{self, HostRef};

const UTF8: &str = "utf-8";

#[derive(Clone)]
pub struct TextEncoder {
    host: HostRef,
}

impl TextEncoder {
    pub fn new(host: &HostRef) -> Self {
        Self { host: host.clone() }
    }

    pub fn encoding(&self) -> &'static str {
        UTF8
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        self.host.encode(text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextDecoderOptions {
    pub fatal: bool,
    pub ignore_bom: bool,
}

#[derive(Clone)]
pub struct TextDecoder {
    host: HostRef,
    label: String,
    options: TextDecoderOptions,
}

impl TextDecoder {
    /// `label` defaults to `"utf-8"`.
    pub fn new(host: &HostRef, label: Option<&str>, options: TextDecoderOptions) -> Self {
        Self {
            host: host.clone(),
            label: label.unwrap_or(UTF8).to_string(),
            options,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fatal(&self) -> bool {
        self.options.fatal
    }

    pub fn ignore_bom(&self) -> bool {
        self.options.ignore_bom
    }

    pub async fn decode(&self, bytes: &[u8]) -> Result<String, FetchError> {
        Ok(host::decode(&self.host, bytes.to_vec()).await?)
    }
}
