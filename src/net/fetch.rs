use crate::errors::FetchError;
use crate::host::{self, HostRef, HostRequest};
use crate::net::request::{Request, RequestInit, RequestInput};
use crate::net::response::Response;

/// Performs one network round trip through the host.
///
/// The request is built exactly as [`Request::new`] would, so every
/// construction error is returned before the host is contacted. A host
/// failure is returned as-is in [`FetchError::Host`].
pub async fn fetch<'a>(host: &HostRef, input: impl Into<RequestInput<'a>>, init: RequestInit) -> Result<Response, FetchError> {
    let mut request = Request::new(host, input, init)?;
    send(host, &mut request).await
}

/// Sends an already built request. Its body is consumed.
pub async fn send(host: &HostRef, request: &mut Request) -> Result<Response, FetchError> {
    let body = if request.body_ref().is_empty() {
        None
    } else {
        Some(request.array_buffer().await?)
    };

    let outbound = HostRequest {
        method: request.method().to_string(),
        url: request.url(),
        headers: request.headers().to_record(),
        body,
        signal: request.signal().cloned(),
    };

    log::debug!("fetch: {} {}", outbound.method, outbound.url);
    let res = match host::network_fetch(host, outbound).await {
        Ok(res) => res,
        Err(e) => {
            log::debug!("fetch: {} {} failed: {}", request.method(), request.url(), e);
            return Err(e.into());
        }
    };
    log::debug!("fetch: {} {} -> {}", request.method(), res.url, res.status);

    Ok(Response::from_host(host, res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HostError;
    use crate::host::testing::StubHost;
    use crate::host::{HeaderRecord, HostResponse};
    use crate::net::headers::Headers;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn stub_with(response: HostResponse) -> Arc<StubHost> {
        let stub = Arc::new(StubHost::new());
        stub.respond(response);
        stub
    }

    #[tokio::test]
    async fn end_to_end_text() {
        let mut headers = HeaderRecord::new();
        headers.insert("x".into(), "y".into());
        let stub = stub_with(HostResponse {
            status: 200,
            headers,
            body: Some(b"hi".to_vec()),
            url: "https://example.com/".into(),
        });
        let host: HostRef = stub.clone();

        let mut res = fetch(&host, "https://example.com/", RequestInit::default()).await.unwrap();
        assert_eq!(res.status(), 200);
        assert!(res.ok());
        assert_eq!(res.status_text(), "OK");
        assert_eq!(res.headers().get("x").as_deref(), Some("y"));
        assert_eq!(res.text().await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn host_sees_flattened_request() {
        let stub = stub_with(HostResponse { status: 204, ..Default::default() });
        let host: HostRef = stub.clone();
        let signal = CancellationToken::new();

        let mut headers = Headers::new();
        headers.append("Accept", "text/html");
        headers.append("accept", "application/json");
        let init = RequestInit::default()
            .method("post")
            .headers(headers)
            .body("payload")
            .signal(signal.clone());

        fetch(&host, "https://example.com/api?q=1", init).await.unwrap();

        let sent = stub.requests();
        assert_eq!(sent.len(), 1);
        let sent = &sent[0];
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.url, "https://example.com/api?q=1");
        assert_eq!(sent.headers.get("accept").map(String::as_str), Some("text/html, application/json"));
        assert_eq!(sent.headers.get("content-type").map(String::as_str), Some("text/plain;charset=UTF-8"));
        assert_eq!(sent.body.as_deref(), Some(&b"payload"[..]));

        signal.cancel();
        assert!(sent.signal.as_ref().is_some_and(CancellationToken::is_cancelled));
    }

    #[tokio::test]
    async fn empty_body_is_sent_as_none() {
        let stub = Arc::new(StubHost::new());
        let host: HostRef = stub.clone();
        fetch(&host, "https://example.com/", RequestInit::default()).await.unwrap();
        assert!(stub.requests()[0].body.is_none());
    }

    #[tokio::test]
    async fn sending_a_request_consumes_its_body() {
        let host: HostRef = Arc::new(StubHost::new());
        let mut req = Request::new(&host, "https://example.com/", RequestInit::default().method("PUT").body("x")).unwrap();
        send(&host, &mut req).await.unwrap();
        assert!(req.body_used());
        assert!(matches!(send(&host, &mut req).await, Err(FetchError::Consumption)));
    }

    #[tokio::test]
    async fn host_failure_passes_through_unmodified() {
        let stub = Arc::new(StubHost::new());
        stub.fail_network("dns lookup failed");
        let host: HostRef = stub.clone();

        match fetch(&host, "https://nowhere.test/", RequestInit::default()).await {
            Err(FetchError::Host(e)) => assert_eq!(e.to_string(), "dns lookup failed"),
            other => panic!("expected host error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn validation_fails_before_the_host_is_called() {
        let stub = Arc::new(StubHost::new());
        let host: HostRef = stub.clone();
        let res = fetch(&host, "https://u:p@example.com/", RequestInit::default()).await;
        assert!(matches!(res, Err(FetchError::Validation(_))));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn errored_request_body_is_reported() {
        let stub = Arc::new(StubHost::new());
        let host: HostRef = stub.clone();
        let init = RequestInit::default()
            .method("POST")
            .body(crate::net::body::BodyInit::Errored(HostError::new("source closed")));
        assert!(matches!(fetch(&host, "https://example.com/", init).await, Err(FetchError::Host(_))));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn unsettled_completion_surfaces_as_host_error() {
        let stub = Arc::new(StubHost::new());
        stub.never_settle();
        let host: HostRef = stub.clone();

        let res = tokio::time::timeout(Duration::from_secs(5), fetch(&host, "https://example.com/", RequestInit::default()))
            .await
            .expect("dropped completion must not hang");
        assert!(matches!(res, Err(FetchError::Host(_))));
    }

    #[tokio::test]
    async fn request_input_is_reused() {
        let stub = Arc::new(StubHost::new());
        let host: HostRef = stub.clone();
        let req = Request::new(&host, "https://example.com/a", RequestInit::default().method("DELETE")).unwrap();

        fetch(&host, &req, RequestInit::default()).await.unwrap();
        assert_eq!(stub.requests()[0].method, "DELETE");
        assert!(!req.body_used());
    }
}
