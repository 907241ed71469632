#![forbid(unsafe_code)]

//! Trailing-edge debounce over host-driven time.
//!
//! Every call replaces the pending arguments and pushes the deadline to
//! `now + wait`. The wrapped function runs once the host polls at or after
//! that deadline, with the arguments of the latest call.

use core::time::Duration;

/// Deadline bookkeeping without a callback.
#[derive(Debug, Clone)]
pub struct Debouncer<A> {
    wait: Duration,
    pending: Option<(Duration, A)>,
}

impl<A> Debouncer<A> {
    #[must_use]
    pub const fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Record a call at `now`, cancelling whatever was pending.
    pub fn call(&mut self, now: Duration, args: A) {
        self.pending = Some((now.saturating_add(self.wait), args));
    }

    /// Take the pending arguments if their deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<A> {
        if self.next_deadline().is_some_and(|deadline| deadline <= now) {
            self.pending.take().map(|(_, args)| args)
        } else {
            None
        }
    }

    /// Drop the pending call. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// A debounced function.
pub struct Debounced<A, F>
where
    F: FnMut(A),
{
    state: Debouncer<A>,
    f: F,
}

impl<A, F> Debounced<A, F>
where
    F: FnMut(A),
{
    pub fn call(&mut self, now: Duration, args: A) {
        self.state.call(now, args);
    }

    /// Run the function if its quiet period has elapsed. Returns whether it
    /// ran.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.state.poll(now) {
            Some(args) => {
                (self.f)(args);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.state.cancel()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.next_deadline()
    }
}

/// Wrap `f` so it only runs after `wait` without further calls.
pub fn debounce<A, F>(f: F, wait: Duration) -> Debounced<A, F>
where
    F: FnMut(A),
{
    Debounced {
        state: Debouncer::new(wait),
        f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_runs_once_with_last_args() {
        let mut seen = Vec::new();
        {
            let mut d = debounce(|n: u32| seen.push(n), ms(200));
            for i in 0..5u32 {
                let now = ms(u64::from(i) * 50);
                d.call(now, i);
                assert!(!d.poll(now));
            }
            // last call at 200ms → fires at 400ms
            assert!(!d.poll(ms(399)));
            assert!(d.poll(ms(400)));
            assert!(!d.poll(ms(10_000)));
        }
        assert_eq!(seen, vec![4]);
    }

    #[test]
    fn separate_bursts_run_separately() {
        let mut seen = Vec::new();
        {
            let mut d = debounce(|s: &str| seen.push(s), ms(100));
            d.call(ms(0), "a");
            assert!(d.poll(ms(100)));
            d.call(ms(500), "b");
            assert_eq!(d.next_deadline(), Some(ms(600)));
            assert!(d.poll(ms(650)));
        }
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn latest_argument_list_is_forwarded_whole() {
        let mut d = Debouncer::new(ms(100));
        d.call(ms(0), (1u32, "first", false));
        d.call(ms(40), (2u32, "second", true));
        assert_eq!(d.poll(ms(139)), None);
        assert_eq!(d.poll(ms(140)), Some((2, "second", true)));
    }

    #[test]
    fn cancel_drops_pending_call() {
        let mut d = Debouncer::new(ms(50));
        d.call(ms(0), ());
        assert!(d.cancel());
        assert!(!d.cancel());
        assert_eq!(d.poll(ms(1_000)), None);
        assert!(!d.is_pending());
    }
}
