use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::format::{format_megabytes, percent};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Used to drive throttling and
/// message expiry deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Whether a progress update may be shown at `now`.
pub fn should_emit(last: Option<Instant>, now: Instant, interval: Duration, force: bool) -> bool {
    if force {
        return true;
    }
    match last {
        None => true,
        Some(last) => now.saturating_duration_since(last) >= interval,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub loaded: u64,
    pub max: u64,
    pub percent: u8,
    pub text: String,
}

/// Byte accounting for one streaming download.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    loaded: u64,
    content_length: Option<u64>,
    max: u64,
    interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressTracker {
    pub fn new(content_length: Option<u64>, estimated_bytes: u64, interval: Duration) -> Self {
        Self {
            loaded: 0,
            content_length,
            max: content_length.unwrap_or(estimated_bytes),
            interval,
            last_emit: None,
        }
    }

    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    /// Counts a chunk; returns an update unless one was shown too recently.
    pub fn advance(&mut self, chunk_len: u64, now: Instant) -> Option<ProgressUpdate> {
        self.loaded += chunk_len;
        if self.loaded > self.max {
            self.max = self.loaded;
        }
        self.emit(now, false)
    }

    /// The terminal update, always emitted.
    pub fn finish(&mut self, now: Instant) -> ProgressUpdate {
        self.emit(now, true).unwrap_or_else(|| self.snapshot())
    }

    pub fn snapshot(&self) -> ProgressUpdate {
        let text = match self.content_length {
            Some(_) => format!("{}%", percent(self.loaded, self.max)),
            None => format_megabytes(self.loaded),
        };
        ProgressUpdate {
            loaded: self.loaded,
            max: self.max,
            percent: percent(self.loaded, self.max),
            text,
        }
    }

    fn emit(&mut self, now: Instant, force: bool) -> Option<ProgressUpdate> {
        if !should_emit(self.last_emit, now, self.interval, force) {
            return None;
        }
        self.last_emit = Some(now);
        Some(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_50: Duration = Duration::from_millis(50);

    #[test]
    fn throttle_is_pure() {
        let t0 = Instant::now();
        assert!(should_emit(None, t0, MS_50, false));
        assert!(!should_emit(Some(t0), t0 + Duration::from_millis(49), MS_50, false));
        assert!(should_emit(Some(t0), t0 + MS_50, MS_50, false));
        assert!(should_emit(Some(t0), t0, MS_50, true));
    }

    #[test]
    fn updates_are_rate_limited() {
        let clock = ManualClock::new();
        let mut tracker = ProgressTracker::new(Some(1000), 5000, MS_50);

        assert!(tracker.advance(100, clock.now()).is_some());
        clock.advance(Duration::from_millis(10));
        assert!(tracker.advance(100, clock.now()).is_none());
        clock.advance(Duration::from_millis(40));
        let update = tracker.advance(100, clock.now()).unwrap();
        assert_eq!(update.loaded, 300);
        assert_eq!(update.text, "30%");
    }

    #[test]
    fn finish_is_forced() {
        let clock = ManualClock::new();
        let mut tracker = ProgressTracker::new(Some(1_048_576), 5000, MS_50);
        tracker.advance(1_000_000, clock.now());
        tracker.advance(48_576, clock.now());
        let last = tracker.finish(clock.now());
        assert_eq!(last.percent, 100);
        assert_eq!(last.text, "100%");
    }

    #[test]
    fn unknown_length_reports_megabytes() {
        let clock = ManualClock::new();
        let mut tracker = ProgressTracker::new(None, 250 * 1024 * 1024, MS_50);
        tracker.advance(2_621_440, clock.now());
        let last = tracker.finish(clock.now());
        assert_eq!(last.text, "2.5 MB");
        assert_eq!(last.max, 250 * 1024 * 1024);
    }

    #[test]
    fn max_is_raised_past_estimate() {
        let clock = ManualClock::new();
        let mut tracker = ProgressTracker::new(Some(100), 5000, MS_50);
        let first = tracker.advance(80, clock.now()).unwrap();
        assert_eq!(first.max, 100);
        clock.advance(MS_50);
        let second = tracker.advance(70, clock.now()).unwrap();
        assert_eq!(second.max, 150);
        assert_eq!(second.percent, 100);
        assert_eq!(tracker.max(), tracker.loaded());
    }
}
