use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Panic payload used to unwind the units of a group after one of them faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupAborted;

/// Reusable barrier shared by the units of a group.
///
/// The barrier can be poisoned when a unit faults: units blocked in [wait](GroupBarrier::wait),
/// and units reaching it afterwards, unwind with a [GroupAborted] payload instead of waiting
/// forever for the faulted unit.
#[derive(Debug)]
pub struct GroupBarrier {
    participants: usize,
    state: Mutex<BarrierState>,
    condvar: Condvar,
}

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

impl GroupBarrier {
    /// Create a barrier for the given number of units.
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            state: Mutex::new(BarrierState::default()),
            condvar: Condvar::new(),
        }
    }

    /// Number of units that must reach the barrier before any of them is released.
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// Block until every unit reached the barrier.
    ///
    /// # Panics
    ///
    /// Unwinds with [GroupAborted] if the barrier is poisoned.
    pub fn wait(&self) {
        let mut state = self.lock();
        if state.poisoned {
            drop(state);
            abort_unit();
        }

        state.arrived += 1;
        if state.arrived >= self.participants {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.condvar.notify_all();
            return;
        }

        let generation = state.generation;
        while state.generation == generation && !state.poisoned {
            state = self
                .condvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.generation == generation {
            drop(state);
            abort_unit();
        }
    }

    /// Release every waiting unit with a [GroupAborted] unwind.
    pub fn poison(&self) {
        let mut state = self.lock();
        state.poisoned = true;
        self.condvar.notify_all();
    }

    /// Whether a unit of the group faulted.
    pub fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn abort_unit() -> ! {
    std::panic::resume_unwind(Box::new(GroupAborted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn barrier_separates_phases() {
        let barrier = GroupBarrier::new(4);
        let counter = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for phase in 1..=3 {
                        counter.fetch_add(1, Ordering::Relaxed);
                        barrier.wait();
                        assert_eq!(counter.load(Ordering::Relaxed), 4 * phase);
                        barrier.wait();
                    }
                });
            }
        });
    }

    #[test]
    fn poisoning_releases_waiting_units() {
        let barrier = GroupBarrier::new(3);

        std::thread::scope(|scope| {
            let waiters = (0..2)
                .map(|_| {
                    scope.spawn(|| {
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| barrier.wait()))
                    })
                })
                .collect::<Vec<_>>();

            while barrier.lock().arrived < 2 {
                std::thread::yield_now();
            }
            barrier.poison();

            for waiter in waiters {
                let payload = waiter.join().unwrap().unwrap_err();
                assert!(payload.is::<GroupAborted>());
            }
        });

        assert!(barrier.is_poisoned());
    }
}
