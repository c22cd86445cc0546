use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// Sliding window approximated from the current and previous fixed windows.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.current_window_start);
        if elapsed >= self.window_size * 2 {
            self.prev_count = 0;
            self.current_count = 0;
            self.current_window_start = now;
        } else if elapsed >= self.window_size {
            self.prev_count = self.current_count;
            self.current_count = 0;
            self.current_window_start += self.window_size;
        }
    }

    fn effective(&self, now: Instant) -> f64 {
        let elapsed = now.duration_since(self.current_window_start).as_secs_f64();
        let weight = (elapsed / self.window_size.as_secs_f64()).min(1.0);
        (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64)
    }

    /// Seconds until a slot frees up, or `None` if one is free now.
    fn retry_after(&mut self, now: Instant) -> Option<u64> {
        self.roll(now);
        self.last_seen = now;

        if self.effective(now) < self.limit as f64 {
            return None;
        }

        // worst case the caller waits for the current window to close
        let window_end = self.current_window_start + self.window_size;
        Some(window_end.saturating_duration_since(now).as_secs().max(1))
    }

    fn record(&mut self, now: Instant) {
        self.roll(now);
        self.last_seen = now;
        self.current_count += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

type Key = String;

/// Per-key sliding window limiter, e.g. keyed by sender email or client IP.
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl RateLimiterStore {
    pub fn new(window_size: Duration, limit: u64) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    pub fn per_hour(limit: u64) -> Self {
        Self::new(Duration::from_secs(60 * 60), limit)
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    /// Checks without spending a slot. Pair with [`record`](Self::record)
    /// once the limited action actually happened, so rejected or failed
    /// attempts cost nothing.
    pub fn peek(&self, key: &str) -> RateDecision {
        self.peek_at(key, Instant::now())
    }

    pub fn record(&self, key: &str) {
        self.record_at(key, Instant::now())
    }

    fn peek_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.get_window(key, now);
        let decision = window.lock().retry_after(now);
        match decision {
            None => RateDecision::Allowed,
            Some(retry_after_secs) => RateDecision::Limited { retry_after_secs },
        }
    }

    fn record_at(&self, key: &str, now: Instant) {
        self.get_window(key, now).lock().record(now);
    }

    /// Drops windows that have seen no traffic for two full windows.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let ttl = self.window_size * 2;
        let before = self.map.len();
        self.map.retain(|_, window| now.duration_since(window.lock().last_seen) <= ttl);
        before - self.map.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}
