use std::sync::Arc;

use crate::error::ExecutionError;

/// Ordering marker that completes exactly once, successfully or with an error.
///
/// Events can be cloned and awaited by any number of waiters.
#[derive(Clone, Debug)]
pub struct Event {
    inner: Arc<EventInner>,
}

#[derive(Debug)]
struct EventInner {
    outcome: spin::Mutex<Option<Result<(), ExecutionError>>>,
    done: async_channel::Receiver<()>,
}

/// The producer side of an [event](Event).
///
/// Dropping the signal without [completing](EventSignal::complete) it completes the event with
/// [ExecutionError::Abandoned].
#[derive(Debug)]
pub struct EventSignal {
    inner: Arc<EventInner>,
    _sender: async_channel::Sender<()>,
}

impl Event {
    /// Create a pending event and the signal completing it.
    pub fn pending() -> (Self, EventSignal) {
        let (sender, receiver) = async_channel::bounded(1);
        let inner = Arc::new(EventInner {
            outcome: spin::Mutex::new(None),
            done: receiver,
        });

        (
            Self {
                inner: inner.clone(),
            },
            EventSignal {
                inner,
                _sender: sender,
            },
        )
    }

    /// Create an event that already completed successfully.
    pub fn completed() -> Self {
        let (event, signal) = Self::pending();
        signal.complete(Ok(()));
        event
    }

    /// Whether the event completed.
    pub fn is_done(&self) -> bool {
        self.inner.done.is_closed()
    }

    /// The outcome, if the event completed.
    pub fn outcome(&self) -> Option<Result<(), ExecutionError>> {
        match self.is_done() {
            true => Some(self.read_outcome()),
            false => None,
        }
    }

    /// Wait for the event to complete.
    pub async fn wait(&self) -> Result<(), ExecutionError> {
        // Nothing is ever sent: the channel closes when the signal is dropped.
        let _ = self.inner.done.recv().await;
        self.read_outcome()
    }

    fn read_outcome(&self) -> Result<(), ExecutionError> {
        self.inner
            .outcome
            .lock()
            .clone()
            .unwrap_or_else(|| {
                Err(ExecutionError::Abandoned {
                    reason: "The event was never signaled".into(),
                })
            })
    }
}

impl EventSignal {
    /// Complete the event with the given outcome.
    pub fn complete(self, outcome: Result<(), ExecutionError>) {
        *self.inner.outcome.lock() = Some(outcome);
    }
}

impl Drop for EventSignal {
    fn drop(&mut self) {
        let mut outcome = self.inner.outcome.lock();
        if outcome.is_none() {
            *outcome = Some(Err(ExecutionError::Abandoned {
                reason: "The work was dropped before it was executed".into(),
            }));
        }
    }
}
