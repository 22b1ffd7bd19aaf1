//! Inbound boundary between the host and a user handler.
//!
//! The host hands over one [`RawRequest`] and one completion callback per
//! inbound request. The [`Dispatcher`] turns the descriptor into a
//! [`Request`], runs the handler and reports back through the callback
//! exactly once: either a [`DispatchResult`] or the error that stopped it.
//! Handler errors, panics and non-`Response` results never escape into the
//! host; they all end up in the callback.
use crate::errors::FetchError;
use crate::host::{HeaderRecord, HostRef};
use crate::net::{BodyInit, Headers, Request, RequestInit, Response};
use futures::FutureExt;
use std::any::{type_name, Any};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;

/// Request descriptor delivered by the host.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderRecord,
    /// `None` and an empty buffer both mean "no body".
    pub body: Option<Vec<u8>>,
}

/// Flattened response handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub status: u16,
    pub headers: HeaderRecord,
    pub body: Option<Vec<u8>>,
}

/// Type-erased value a handler resolved to.
pub struct HandlerOutput {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl HandlerOutput {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    fn into_response(self) -> Result<Response, FetchError> {
        match self.value.downcast::<Response>() {
            Ok(response) => Ok(*response),
            Err(_) => Err(FetchError::ContractViolation(format!(
                "handler must resolve to a Response, got {}",
                self.type_name
            ))),
        }
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HandlerOutput, anyhow::Error>> + Send>>;

/// User code invoked once per inbound request.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = Result<T, E>>`
/// closure. `T` is expected to be a [`Response`]; any other type is reported
/// as a contract violation at dispatch time.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request) -> HandlerFuture;
}

impl<F, Fut, T, E> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Any + Send,
    E: Into<anyhow::Error>,
{
    fn call(&self, request: Request) -> HandlerFuture {
        let fut = self(request);
        Box::pin(async move { fut.await.map(HandlerOutput::new).map_err(Into::into) })
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    host: HostRef,
    handler: Arc<dyn Handler>,
}

impl Dispatcher {
    pub fn new(host: HostRef, handler: impl Handler) -> Self {
        Self {
            host,
            handler: Arc::new(handler),
        }
    }

    /// Runs the handler for `raw` and settles `complete` exactly once.
    pub async fn dispatch<C>(&self, raw: RawRequest, complete: C)
    where
        C: FnOnce(Result<DispatchResult, FetchError>) + Send,
    {
        let method = raw.method.clone();
        let url = raw.url.clone();

        let outcome = self.run(raw).await;
        match &outcome {
            Ok(res) => log::debug!("dispatch: {method} {url} -> {}", res.status),
            Err(e) => log::warn!("dispatch: {method} {url} failed: {e}"),
        }

        complete(outcome);
    }

    /// Same as [`dispatch`](Self::dispatch), on a detached tokio task.
    ///
    /// No task handle is handed out: the task always runs to the point where
    /// `complete` is called.
    pub fn spawn<C>(&self, raw: RawRequest, complete: C)
    where
        C: FnOnce(Result<DispatchResult, FetchError>) + Send + 'static,
    {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(raw, complete).await });
    }

    async fn run(&self, raw: RawRequest) -> Result<DispatchResult, FetchError> {
        let init = RequestInit {
            method: Some(raw.method),
            headers: Some(Headers::from(&raw.headers)),
            body: raw.body.filter(|b| !b.is_empty()).map(BodyInit::Bytes),
            ..Default::default()
        };
        let request = Request::new(&self.host, raw.url, init)?;

        // Panics while creating or polling the handler future count as handler failures
        let call = panic::catch_unwind(AssertUnwindSafe(|| self.handler.call(request))).map_err(panicked)?;
        let output = AssertUnwindSafe(call)
            .catch_unwind()
            .await
            .map_err(panicked)?
            .map_err(FetchError::UserHandler)?;

        let mut response = output.into_response()?;
        let headers = response.headers().to_record();
        let body = if response.body_ref().is_empty() {
            None
        } else {
            Some(response.array_buffer().await?)
        };

        Ok(DispatchResult {
            status: response.status(),
            headers,
            body,
        })
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> FetchError {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    log::error!("dispatch: handler panicked: {msg}");
    FetchError::UserHandler(anyhow::anyhow!("handler panicked: {msg}"))
}
