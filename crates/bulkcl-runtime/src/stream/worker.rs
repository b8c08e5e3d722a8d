use super::{Event, EventSignal};
use crate::error::ExecutionError;

/// Work executed by a stream worker.
pub type StreamJob = Box<dyn FnOnce() -> Result<(), ExecutionError> + Send + 'static>;

/// A task queued on a stream.
pub enum StreamTask {
    /// Run the job, then complete the signal with its outcome.
    Execute {
        /// The work to run.
        job: StreamJob,
        /// Completed once the work is done.
        signal: EventSignal,
    },
    /// Block the stream until the event completes.
    Wait(Event),
    /// Complete the signal once every previous task is done.
    Marker(EventSignal),
}

impl core::fmt::Debug for StreamTask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StreamTask::Execute { .. } => f.write_str("Execute"),
            StreamTask::Wait(_) => f.write_str("Wait"),
            StreamTask::Marker(_) => f.write_str("Marker"),
        }
    }
}

/// Serves the tasks of one stream in submission order, until every sender is dropped.
pub(crate) fn run_worker(index: usize, receiver: async_channel::Receiver<StreamTask>) {
    while let Ok(task) = receiver.recv_blocking() {
        log::trace!("Stream {index} runs {task:?}");

        match task {
            StreamTask::Execute { job, signal } => signal.complete(job()),
            StreamTask::Wait(event) => {
                if let Err(err) = bulkcl_common::future::block_on(event.wait()) {
                    log::warn!("Stream {index} waited on a failed event, continuing\n{err}");
                }
            }
            StreamTask::Marker(signal) => signal.complete(Ok(())),
        }
    }

    log::trace!("Stream {index} closed");
}
