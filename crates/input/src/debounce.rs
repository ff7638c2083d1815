use std::time::Duration;

struct Pending<T> {
    deadline: Duration,
    args: T,
}

/// Cancel-and-reschedule debouncer around a commit function.
///
/// Times are offsets on the caller's clock. Each `call` replaces whatever was
/// pending and restarts the quiet period; `poll` runs the commit function once
/// with the last arguments when the deadline has passed.
pub struct Debounced<T, F> {
    delay: Duration,
    commit: F,
    pending: Option<Pending<T>>,
}

impl<T, C, F> Debounced<T, F>
where
    F: FnMut(T) -> C,
{
    pub fn wrap(commit: F, delay: Duration) -> Self {
        Self {
            delay,
            commit,
            pending: None,
        }
    }

    /// Schedule a commit of `args` at `now + delay`, dropping any earlier call.
    pub fn call(&mut self, now: Duration, args: T) {
        if self.pending.is_some() {
            tracing::trace!(delay_ms = self.delay.as_millis() as u64, "debounce rescheduled");
        }
        self.pending = Some(Pending {
            deadline: now + self.delay,
            args,
        });
    }

    /// Run the commit function if the pending call is due.
    pub fn poll(&mut self, now: Duration) -> Option<C> {
        let due = self.pending.as_ref().is_some_and(|p| p.deadline <= now);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        Some((self.commit)(pending.args))
    }

    /// Drop the pending call without committing. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn rapid_calls_commit_once_with_last_args() {
        let mut commits = Vec::new();
        let mut d = Debounced::wrap(|s: &'static str| s, ms(20));
        d.call(ms(0), "H");
        d.call(ms(5), "He");
        d.call(ms(10), "Hel");
        d.call(ms(19), "Hell");

        for t in 0..=38 {
            if let Some(v) = d.poll(ms(t)) {
                commits.push((t, v));
            }
        }
        assert!(commits.is_empty());

        if let Some(v) = d.poll(ms(39)) {
            commits.push((39, v));
        }
        assert_eq!(commits, vec![(39, "Hell")]);
        assert!(d.poll(ms(1000)).is_none());
    }

    #[test]
    fn spaced_calls_commit_each() {
        let mut d = Debounced::wrap(|n: u32| n * 2, ms(10));
        d.call(ms(0), 1);
        assert_eq!(d.poll(ms(10)), Some(2));
        d.call(ms(50), 2);
        assert_eq!(d.poll(ms(59)), None);
        assert_eq!(d.poll(ms(60)), Some(4));
    }

    #[test]
    fn cancel_drops_pending_call() {
        let mut d = Debounced::wrap(|n: u32| n, ms(10));
        d.call(ms(0), 7);
        assert!(d.cancel());
        assert!(!d.is_pending());
        assert_eq!(d.poll(ms(100)), None);
        assert!(!d.cancel());
    }

    #[test]
    fn deadline_tracks_last_call() {
        let mut d = Debounced::wrap(|n: u32| n, ms(600));
        assert_eq!(d.deadline(), None);
        d.call(ms(100), 1);
        d.call(ms(400), 2);
        assert_eq!(d.deadline(), Some(ms(1000)));
        assert_eq!(d.delay(), ms(600));
    }
}
