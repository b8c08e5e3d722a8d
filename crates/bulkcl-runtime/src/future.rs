use bulkcl_common::future::block_on;

use crate::{error::ExecutionError, stream::Event};

/// State of a launch as observed through its [future](GroupFuture).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureStatus {
    /// The work is queued or running.
    Pending,
    /// The work completed successfully.
    Completed,
    /// The work completed with an error.
    Failed,
}

/// Handle tracking the completion of an asynchronous launch.
///
/// Clones share the same completion. Joining never re-executes the work and can be repeated.
#[derive(Clone, Debug)]
pub struct GroupFuture {
    event: Event,
}

impl GroupFuture {
    /// Track the completion of the given event.
    pub fn new(event: Event) -> Self {
        Self { event }
    }

    /// A future that already completed.
    pub fn ready() -> Self {
        Self::new(Event::completed())
    }

    /// Block the calling thread until the work completed.
    pub fn join(&self) -> Result<(), ExecutionError> {
        block_on(self.wait())
    }

    /// Wait asynchronously until the work completed.
    pub async fn wait(&self) -> Result<(), ExecutionError> {
        self.event.wait().await
    }

    /// The current state of the work, without blocking.
    pub fn status(&self) -> FutureStatus {
        match self.event.outcome() {
            None => FutureStatus::Pending,
            Some(Ok(())) => FutureStatus::Completed,
            Some(Err(_)) => FutureStatus::Failed,
        }
    }

    /// Whether the work completed, successfully or not.
    pub fn is_ready(&self) -> bool {
        self.event.is_done()
    }

    /// The event completing with the work.
    pub fn event(&self) -> &Event {
        &self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_idempotent() {
        let (event, signal) = Event::pending();
        let future = GroupFuture::new(event);

        assert_eq!(future.status(), FutureStatus::Pending);
        signal.complete(Ok(()));

        assert_eq!(future.join(), Ok(()));
        assert_eq!(future.join(), Ok(()));
        assert_eq!(future.clone().status(), FutureStatus::Completed);
    }

    #[test]
    fn ready_future_is_completed() {
        assert_eq!(GroupFuture::ready().status(), FutureStatus::Completed);
    }
}
