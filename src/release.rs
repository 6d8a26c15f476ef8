use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::constants::{
    INITIAL_RELEASE_DELAY_MS, INITIAL_RELEASE_GAP_MS, MAX_GHOSTS, STANDARD_RELEASE_GAP_MS,
};

#[derive(Clone, Debug, PartialEq, Eq)]
struct ReleaseState {
    next_release_at: u64,
    releases_since_reset: usize,
    ghost_count: usize,
}

/// Hands out house release times. The first wave after a reset leaves one gap apart, later
/// releases (revived ghosts) use the longer gap. Takes `&self` so it can sit beside the ghosts
/// while they are borrowed for the parallel update; all access goes through one lock.
#[derive(Debug)]
pub struct ReleaseScheduler {
    state: Mutex<ReleaseState>,
}

impl ReleaseScheduler {
    pub fn new(now_ms: u64, ghost_count: usize) -> Self {
        Self {
            state: Mutex::new(ReleaseState {
                next_release_at: now_ms + INITIAL_RELEASE_DELAY_MS,
                releases_since_reset: 0,
                ghost_count,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReleaseState> {
        // No update leaves the counters half-written, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn reset(&self, now_ms: u64, ghost_count: usize) {
        let mut state = self.lock();
        state.releases_since_reset = 0;
        state.ghost_count = ghost_count;
        state.next_release_at = now_ms + INITIAL_RELEASE_DELAY_MS;
    }

    /// Reserves the next release slot no earlier than `earliest_ms` and returns it.
    pub fn schedule(&self, earliest_ms: u64) -> u64 {
        let mut state = self.lock();
        let cap = if state.ghost_count == 0 {
            MAX_GHOSTS
        } else {
            state.ghost_count
        };
        let gap = if state.releases_since_reset < cap {
            INITIAL_RELEASE_GAP_MS
        } else {
            STANDARD_RELEASE_GAP_MS
        };
        let release_at = state.next_release_at.max(earliest_ms);
        state.next_release_at = release_at + gap;
        state.releases_since_reset += 1;
        debug!(
            release_at,
            releases = state.releases_since_reset,
            "ghost release scheduled"
        );
        release_at
    }

    pub fn next_release_at(&self) -> u64 {
        self.lock().next_release_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_wave_is_spaced_by_the_initial_gap() {
        let scheduler = ReleaseScheduler::new(10_000, 4);
        let times: Vec<u64> = (0..4).map(|_| scheduler.schedule(10_000)).collect();
        assert_eq!(times, vec![10_500, 11_500, 12_500, 13_500]);
    }

    #[test]
    fn releases_after_the_first_wave_use_the_standard_gap() {
        let scheduler = ReleaseScheduler::new(0, 2);
        scheduler.schedule(0);
        scheduler.schedule(0);
        let third = scheduler.schedule(0);
        let fourth = scheduler.schedule(0);
        assert_eq!(fourth - third, STANDARD_RELEASE_GAP_MS);
    }

    #[test]
    fn earliest_time_is_honored() {
        let scheduler = ReleaseScheduler::new(0, 4);
        assert_eq!(scheduler.schedule(50_000), 50_000);
        assert_eq!(scheduler.next_release_at(), 51_000);
    }

    #[test]
    fn reset_restarts_the_wave() {
        let scheduler = ReleaseScheduler::new(0, 4);
        for _ in 0..6 {
            scheduler.schedule(0);
        }
        scheduler.reset(20_000, 4);
        assert_eq!(scheduler.schedule(20_000), 20_500);
        assert_eq!(scheduler.schedule(20_000), 21_500);
    }

    #[test]
    fn concurrent_callers_get_distinct_slots() {
        let scheduler = ReleaseScheduler::new(0, 4);
        let mut times: Vec<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| scheduler.schedule(0)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("scheduler thread panicked"))
                .collect()
        });
        times.sort_unstable();
        times.dedup();
        assert_eq!(times.len(), 8);
    }

    proptest! {
        #[test]
        fn schedule_is_monotonic_and_bounded(
            start in 0u64..100_000,
            ghost_count in 0usize..6,
            earliest in proptest::collection::vec(0u64..200_000, 1..40),
        ) {
            let scheduler = ReleaseScheduler::new(start, ghost_count);
            let mut previous = 0u64;
            for earliest_ms in earliest {
                let release_at = scheduler.schedule(earliest_ms);
                prop_assert!(release_at >= earliest_ms);
                prop_assert!(release_at >= previous);
                previous = release_at;
            }
        }
    }
}
