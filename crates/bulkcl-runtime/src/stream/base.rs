use std::sync::Arc;

use bulkcl_common::stream_id::StreamId;

use super::{Event, StreamJob, StreamTask, run_worker};
use crate::config::{Logger, streaming::StreamingLogLevel};

/// Trait for creating streams, used by the stream pool to generate streams as needed.
pub trait StreamFactory {
    /// The type of stream produced by this factory.
    type Stream;
    /// Creates the stream at the given pool index.
    fn create(&mut self, index: usize) -> Self::Stream;
}

/// Represents a pool of streams, managing a collection of streams created by a factory.
#[derive(Debug)]
pub struct StreamPool<F: StreamFactory> {
    /// Vector storing optional streams, where None indicates an uninitialized stream.
    streams: Vec<Option<F::Stream>>,
    /// The factory used to create new streams when needed.
    factory: F,
    /// Maximum number of streams.
    max_streams: usize,
}

impl<F: StreamFactory> StreamPool<F> {
    /// Creates a new stream pool with the given factory and capacity.
    pub fn new(factory: F, max_streams: u8) -> Self {
        let max_streams = max_streams.max(1) as usize;

        Self {
            streams: (0..max_streams).map(|_| None).collect(),
            factory,
            max_streams,
        }
    }

    /// Retrieves a mutable reference to the stream serving the given stream ID, creating it
    /// if needed.
    pub fn get_mut(&mut self, stream_id: &StreamId) -> &mut F::Stream {
        let index = self.stream_index(stream_id);
        let factory = &mut self.factory;

        self.streams[index].get_or_insert_with(|| factory.create(index))
    }

    /// Calculates the index for a given stream ID, mapping it to the pool's capacity.
    pub fn stream_index(&self, id: &StreamId) -> usize {
        stream_index(id, self.max_streams)
    }

    /// Number of streams created so far.
    pub fn num_created(&self) -> usize {
        self.streams.iter().filter(|stream| stream.is_some()).count()
    }
}

/// Maps a stream ID to an index within the pool's capacity using modulo arithmetic.
pub fn stream_index(stream_id: &StreamId, max_streams: usize) -> usize {
    (stream_id.value % max_streams as u64) as usize
}

/// A FIFO queue of work served by its own worker thread.
#[derive(Debug)]
pub struct Stream {
    index: usize,
    sender: async_channel::Sender<StreamTask>,
}

impl Stream {
    /// Create the stream and spawn its worker.
    pub fn new(index: usize) -> Self {
        let (sender, receiver) = async_channel::unbounded();

        let spawned = std::thread::Builder::new()
            .name(format!("bulkcl-stream-{index}"))
            .spawn(move || run_worker(index, receiver));
        if let Err(err) = spawned {
            // Without a worker the receiver is dropped and every task is abandoned.
            log::error!("Can't spawn the worker of stream {index}: {err}");
        }

        Self { index, sender }
    }

    /// Index of the stream in its pool.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Enqueue a job; the returned event completes with the job's outcome.
    pub fn enqueue(&self, job: StreamJob) -> Event {
        let (event, signal) = Event::pending();
        self.send(StreamTask::Execute { job, signal });
        event
    }

    /// Record an event completing once every task enqueued so far is done.
    pub fn record_event(&self) -> Event {
        let (event, signal) = Event::pending();
        self.send(StreamTask::Marker(signal));
        event
    }

    /// Make every task enqueued after this call wait for the event.
    pub fn wait_event(&self, event: Event) {
        if !event.is_done() {
            self.send(StreamTask::Wait(event));
        }
    }

    fn send(&self, task: StreamTask) {
        // A closed channel drops the task, which abandons its signal.
        if let Err(err) = self.sender.send_blocking(task) {
            log::warn!("Stream {} is closed, dropping {:?}", self.index, err.0);
        }
    }
}

/// Creates [streams](Stream) with their worker threads.
#[derive(Debug, Default)]
pub struct WorkerFactory {
    logger: Option<Arc<spin::Mutex<Logger>>>,
}

impl WorkerFactory {
    /// A factory reporting every stream it creates to the streaming loggers.
    pub fn new(logger: Arc<spin::Mutex<Logger>>) -> Self {
        Self {
            logger: Some(logger),
        }
    }
}

impl StreamFactory for WorkerFactory {
    type Stream = Stream;

    fn create(&mut self, index: usize) -> Self::Stream {
        log::debug!("Creating stream {index}");

        if let Some(logger) = &self.logger {
            let mut logger = logger.lock();
            if logger.log_level_streaming() != StreamingLogLevel::Disabled {
                logger.log_streaming(&format!("Creating stream {index}"));
            }
        }

        Stream::new(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use crate::config::{GlobalConfig, LoggerConfig};
    use bulkcl_common::future::block_on;
    use std::sync::Mutex;

    #[test]
    fn stream_ids_share_streams_modulo_capacity() {
        let mut pool = StreamPool::new(WorkerFactory::default(), 2);

        assert_eq!(pool.get_mut(&StreamId::new(1)).index(), 1);
        assert_eq!(pool.get_mut(&StreamId::new(3)).index(), 1);
        assert_eq!(pool.get_mut(&StreamId::new(4)).index(), 0);
        assert_eq!(pool.num_created(), 2);
    }

    #[test]
    fn tasks_run_in_submission_order() {
        let stream = Stream::new(0);
        let order = Arc::new(Mutex::new(Vec::new()));

        let events = (0..8)
            .map(|i| {
                let order = order.clone();
                stream.enqueue(Box::new(move || {
                    order.lock().unwrap().push(i);
                    Ok(())
                }))
            })
            .collect::<Vec<_>>();

        block_on(stream.record_event().wait()).unwrap();

        assert!(events.iter().all(Event::is_done));
        assert_eq!(*order.lock().unwrap(), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn waiting_on_an_event_blocks_the_stream() {
        let stream = Stream::new(0);
        let (gate, signal) = Event::pending();

        stream.wait_event(gate);
        let marker = stream.record_event();

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!marker.is_done());

        signal.complete(Ok(()));
        assert_eq!(block_on(marker.wait()), Ok(()));
    }

    #[test]
    fn job_errors_complete_the_event() {
        let stream = Stream::new(0);
        let event = stream.enqueue(Box::new(|| {
            Err(ExecutionError::Abandoned {
                reason: "test".into(),
            })
        }));

        assert!(block_on(event.wait()).is_err());
    }

    #[test]
    fn stream_creation_is_logged_at_the_basic_level() {
        let path = std::env::temp_dir().join(format!(
            "bulkcl-stream-creation-{}.log",
            std::process::id()
        ));
        let mut config = GlobalConfig::default();
        config.streaming.logger = LoggerConfig {
            file: Some(path.clone()),
            append: false,
            level: StreamingLogLevel::Basic,
            ..Default::default()
        };
        let logger = Arc::new(spin::Mutex::new(Logger::from_config(Arc::new(config))));

        let mut pool = StreamPool::new(WorkerFactory::new(logger), 4);
        pool.get_mut(&StreamId::new(2));
        pool.get_mut(&StreamId::new(6));

        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(content, "Creating stream 2\n");
    }
}
