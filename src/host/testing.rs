//! Scriptable host used by the unit tests.

use crate::errors::HostError;
use crate::host::url_handle::NativeUrlHandle;
use crate::host::{Completion, HostBridge, HostRequest, HostResponse, UrlHandleRef};
use std::sync::{Arc, Mutex};

enum Script {
    Respond(HostResponse),
    Fail(String),
    Never,
}

/// URL and codec behave like [`NativeHost`](crate::host::NativeHost); network
/// calls are answered from a script and recorded.
pub(crate) struct StubHost {
    script: Mutex<Script>,
    settle_twice: Mutex<bool>,
    requests: Mutex<Vec<HostRequest>>,
    logs: Mutex<Vec<(log::Level, String)>>,
}

impl StubHost {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(Script::Respond(HostResponse { status: 200, ..Default::default() })),
            settle_twice: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn respond(&self, response: HostResponse) {
        *self.script.lock().unwrap() = Script::Respond(response);
    }

    pub(crate) fn fail_network(&self, message: &str) {
        *self.script.lock().unwrap() = Script::Fail(message.to_string());
    }

    /// Drops network completions without ever settling them.
    pub(crate) fn never_settle(&self) {
        *self.script.lock().unwrap() = Script::Never;
    }

    /// Settle every completion a second time with a conflicting result.
    pub(crate) fn settle_twice(&self, on: bool) {
        *self.settle_twice.lock().unwrap() = on;
    }

    pub(crate) fn requests(&self) -> Vec<HostRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn logs(&self) -> Vec<(log::Level, String)> {
        self.logs.lock().unwrap().clone()
    }
}

impl HostBridge for StubHost {
    fn encode(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    fn decode(&self, bytes: Vec<u8>, complete: Completion<String>) {
        complete.succeed(String::from_utf8_lossy(&bytes).into_owned());
        if *self.settle_twice.lock().unwrap() {
            complete.succeed("second decode".into());
        }
    }

    fn network_fetch(&self, request: HostRequest, complete: Completion<HostResponse>) {
        self.requests.lock().unwrap().push(request);

        match &*self.script.lock().unwrap() {
            Script::Respond(res) => {
                complete.succeed(res.clone());
            }
            Script::Fail(msg) => {
                complete.fail(HostError::new(msg.clone()));
            }
            Script::Never => return,
        }

        if *self.settle_twice.lock().unwrap() {
            complete.fail(HostError::new("second settlement"));
        }
    }

    fn url_parse(&self, absolute: &str) -> Result<UrlHandleRef, HostError> {
        Ok(Arc::new(NativeUrlHandle::parse(absolute)?))
    }

    fn url_parse_with_base(&self, relative: &str, base: &UrlHandleRef) -> Result<UrlHandleRef, HostError> {
        Ok(Arc::new(NativeUrlHandle::parse_with_base(relative, &base.href())?))
    }

    fn log(&self, level: log::Level, text: &str) {
        self.logs.lock().unwrap().push((level, text.to_string()));
    }
}
