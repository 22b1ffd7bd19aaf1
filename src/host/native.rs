use crate::config::HostConfig;
use crate::errors::HostError;
use crate::host::url_handle::NativeUrlHandle;
use crate::host::{Completion, HostBridge, HostRequest, HostResponse, UrlHandleRef};
use crate::net::Headers;
use http::Method;
use std::sync::Arc;

/// Ready-made host: WHATWG URLs from the `url` crate, UTF-8 codec and a
/// `reqwest` transport running on the ambient tokio runtime.
#[derive(Debug, Clone)]
pub struct NativeHost {
    config: HostConfig,
    client: reqwest::Client,
}

impl NativeHost {
    pub fn new(config: HostConfig) -> Result<Self, HostError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .gzip(config.gzip);
        let client = match config.timeout {
            Some(timeout) => client.timeout(timeout),
            None => client,
        };
        let client = client.build().map_err(HostError::from_error)?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

impl HostBridge for NativeHost {
    fn encode(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    fn decode(&self, bytes: Vec<u8>, complete: Completion<String>) {
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        complete.succeed(text);
    }

    fn network_fetch(&self, request: HostRequest, complete: Completion<HostResponse>) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                complete.fail(HostError::from_error(e));
                return;
            }
        };

        let client = self.client.clone();
        runtime.spawn(async move {
            let signal = request.signal.clone();
            let outcome = match signal {
                Some(signal) => tokio::select! {
                    biased;
                    _ = signal.cancelled() => Err(HostError::new("The operation was aborted")),
                    r = send(&client, request) => r,
                },
                None => send(&client, request).await,
            };
            complete.complete(outcome);
        });
    }

    fn url_parse(&self, absolute: &str) -> Result<UrlHandleRef, HostError> {
        Ok(Arc::new(NativeUrlHandle::parse(absolute)?))
    }

    fn url_parse_with_base(&self, relative: &str, base: &UrlHandleRef) -> Result<UrlHandleRef, HostError> {
        Ok(Arc::new(NativeUrlHandle::parse_with_base(relative, &base.href())?))
    }
}

async fn send(client: &reqwest::Client, request: HostRequest) -> Result<HostResponse, HostError> {
    let method = Method::from_bytes(request.method.as_bytes()).map_err(HostError::from_error)?;
    let headers = Headers::from(&request.headers)
        .to_header_map()
        .map_err(HostError::from_error)?;

    log::debug!("native host: {} {}", method, request.url);

    let mut builder = client.request(method, request.url.as_str()).headers(headers);
    if let Some(body) = request.body {
        builder = builder.body(body);
    }
    let res = builder.send().await.map_err(HostError::from_error)?;

    let status = res.status().as_u16();
    let url = res.url().to_string();
    // Repeated names come back joined with ", "
    let headers = Headers::from(res.headers()).to_record();

    // Buffered, no streaming
    let body = res.bytes().await.map_err(HostError::from_error)?.to_vec();

    Ok(HostResponse {
        status,
        headers,
        body: Some(body),
        url,
    })
}
