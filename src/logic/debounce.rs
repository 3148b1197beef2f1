//! Debounce timing
//!
//! A one-shot deadline pushed back by every touch. The caller polls it with
//! the current instant; it fires once when the quiet interval has elapsed and
//! then disarms until touched again.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record activity at `now`, restarting the quiet interval
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per burst, when `now` has reached the deadline
    ///
    /// # Examples
    /// ```
    /// use std::time::{Duration, Instant};
    /// use servicefinder::logic::debounce::Debouncer;
    ///
    /// let start = Instant::now();
    /// let mut d = Debouncer::new(Duration::from_millis(300));
    /// d.touch(start);
    /// assert!(!d.poll(start + Duration::from_millis(299)));
    /// assert!(d.poll(start + Duration::from_millis(300)));
    /// assert!(!d.poll(start + Duration::from_millis(900)));
    /// ```
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the deadline, for bounding an event poll
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
