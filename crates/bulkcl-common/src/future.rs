use core::future::Future;

/// Block until the [future](Future) is completed and returns the result.
///
/// Only the calling thread is parked; work queued on streams keeps progressing.
pub fn block_on<O>(fut: impl Future<Output = O>) -> O {
    futures_lite::future::block_on(fut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_on_waits_for_other_threads() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let waker = std::thread::spawn(move || sender.send(3).unwrap());

        let value = block_on(async move { receiver.recv().unwrap() + 4 });

        waker.join().unwrap();
        assert_eq!(value, 7);
    }
}
