//! The coalescing buffer: a size/time-triggered batch queue that
//! decouples the realtime input path from storage I/O.

use std::time::{Duration, Instant};

use crate::model::KeystrokeEvent;

/// Default flush-on-size threshold.
pub const BUFFER_SIZE: usize = 50;

/// Default flush-on-time threshold.
pub const BUFFER_TIMEOUT: Duration = Duration::from_secs(100);

/// A bounded, single-producer/single-consumer event queue with two flush
/// triggers: size (`|pending| >= capacity`) and time (`now - window_start
/// >= timeout` while non-empty). Both predicates are meant to be checked
/// once per input-loop tick; see [`crate::input::handler::EventHandler::tick`].
#[derive(Debug)]
pub struct CoalescingBuffer {
    pending: Vec<KeystrokeEvent>,
    window_start: Instant,
    capacity: usize,
    timeout: Duration,
}

impl CoalescingBuffer {
    /// Builds a buffer with the normative default limits.
    pub fn new() -> Self {
        Self::with_limits(BUFFER_SIZE, BUFFER_TIMEOUT)
    }

    /// Builds a buffer with explicit limits, used by tests that exercise
    /// the size/time triggers without waiting on the real defaults.
    pub fn with_limits(capacity: usize, timeout: Duration) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            window_start: Instant::now(),
            capacity,
            timeout,
        }
    }

    /// Appends an event. Callers must check [`Self::should_flush`]
    /// immediately afterwards and flush before pushing again if it's true,
    /// to uphold the `|pending| <= capacity` invariant at observation points.
    pub fn push(&mut self, event: KeystrokeEvent) {
        self.pending.push(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True when the size trigger or the time trigger holds at `now`.
    pub fn should_flush(&self, now: Instant) -> bool {
        self.pending.len() >= self.capacity
            || (!self.pending.is_empty() && now.duration_since(self.window_start) >= self.timeout)
    }

    /// Drains all pending events and resets `window_start` to `now`. Called
    /// regardless of which trigger fired, and also on a forced flush with
    /// no trigger at all (shutdown drain).
    pub fn take(&mut self, now: Instant) -> Vec<KeystrokeEvent> {
        self.window_start = now;
        std::mem::take(&mut self.pending)
    }
}

impl Default for CoalescingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(scan_code: u32) -> KeystrokeEvent {
        KeystrokeEvent::at(scan_code, Some("KEY_A"), "2024-01-01".into())
    }

    #[test]
    fn flushes_exactly_at_capacity() {
        let mut buf = CoalescingBuffer::with_limits(3, Duration::from_secs(100));
        buf.push(event(30));
        assert!(!buf.should_flush(Instant::now()));
        buf.push(event(30));
        assert!(!buf.should_flush(Instant::now()));
        buf.push(event(30));
        assert!(buf.should_flush(Instant::now()));
    }

    #[test]
    fn does_not_flush_when_empty_and_time_elapsed() {
        let buf = CoalescingBuffer::with_limits(3, Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(!buf.should_flush(Instant::now()));
    }

    #[test]
    fn flushes_on_timeout_with_partial_batch() {
        let mut buf = CoalescingBuffer::with_limits(50, Duration::from_millis(5));
        buf.push(event(30));
        assert!(!buf.should_flush(Instant::now()));
        std::thread::sleep(Duration::from_millis(10));
        assert!(buf.should_flush(Instant::now()));
    }

    #[test]
    fn take_clears_and_resets_window() {
        let mut buf = CoalescingBuffer::with_limits(3, Duration::from_secs(100));
        buf.push(event(30));
        buf.push(event(31));
        let now = Instant::now();
        let drained = buf.take(now);
        assert_eq!(drained.len(), 2);
        assert!(buf.is_empty());
        assert!(!buf.should_flush(now));
    }

    #[test]
    fn never_exceeds_capacity_immediately_after_push() {
        let mut buf = CoalescingBuffer::with_limits(5, Duration::from_secs(100));
        for i in 0..5 {
            buf.push(event(i));
            assert!(buf.len() <= 5);
            if buf.should_flush(Instant::now()) {
                buf.take(Instant::now());
            }
        }
    }
}
