//! Single-resolution bridge between host callbacks and futures.
//!
//! A [`Completion`] is the callback object handed to the host. It can be cloned
//! and called any number of times, but only the first settlement reaches the
//! paired [`Pending`] future; the rest are dropped with a warning.

use crate::errors::HostError;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

type Outcome<T> = Result<T, HostError>;

struct Slot<T> {
    operation: &'static str,
    settled: AtomicBool,
    tx: Mutex<Option<oneshot::Sender<Outcome<T>>>>,
}

/// Callback side of a host primitive call.
pub struct Completion<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self { slot: self.slot.clone() }
    }
}

impl<T> Completion<T> {
    /// Creates a completion and the future that resolves with its first
    /// settlement. `operation` names the primitive in diagnostics.
    pub fn channel(operation: &'static str) -> (Completion<T>, Pending<T>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Slot {
            operation,
            settled: AtomicBool::new(false),
            tx: Mutex::new(Some(tx)),
        });
        (Completion { slot }, Pending { rx, operation })
    }

    /// Settles with a value.
    pub fn succeed(&self, value: T) -> bool {
        self.complete(Ok(value))
    }

    /// Settles with a failure.
    pub fn fail(&self, err: HostError) -> bool {
        self.complete(Err(err))
    }

    /// Settles with `outcome`. Returns `false` (and has no effect) when the
    /// completion was already settled.
    pub fn complete(&self, outcome: Outcome<T>) -> bool {
        if self.slot.settled.swap(true, Ordering::AcqRel) {
            log::warn!(
                "host settled `{}` more than once; extra result ignored",
                self.slot.operation
            );
            return false;
        }

        let tx = self
            .slot
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(tx) = tx {
            // Receiver gone means nobody waits for the result anymore
            let _ = tx.send(outcome);
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        self.slot.settled.load(Ordering::Acquire)
    }
}

/// Future side of a host primitive call.
///
/// Resolves with a [`HostError`] when the host drops every clone of the
/// completion without settling it.
pub struct Pending<T> {
    rx: oneshot::Receiver<Outcome<T>>,
    operation: &'static str,
}

impl<T> Future for Pending<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let operation = self.operation;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(HostError::new(format!(
                "host dropped `{operation}` without settling it"
            )))),
            Poll::Pending => Poll::Pending,
        }
    }
}
