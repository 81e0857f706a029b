use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: Instant,
}

/// Fixed-window event counter per session.
///
/// Best-effort abuse guard: state lives in memory only. Each session's window is
/// updated under its own map shard, so sessions never wait on each other.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: DashMap::new(),
        }
    }

    /// Returns `false` when the event must be dropped silently.
    pub fn admit(&self, session_id: &str) -> bool {
        self.admit_at(session_id, Instant::now())
    }

    pub fn admit_at(&self, session_id: &str, now: Instant) -> bool {
        let mut window = self
            .windows
            .entry(session_id.to_string())
            .or_insert(Window {
                count: 0,
                resets_at: now + self.window,
            });

        if now > window.resets_at {
            window.count = 0;
            window.resets_at = now + self.window;
        }
        if window.count >= self.limit {
            return false;
        }
        window.count += 1;
        true
    }

    /// Drops windows that have already expired.
    pub fn purge_expired(&self, now: Instant) {
        self.windows.retain(|_, window| window.resets_at >= now);
    }

    pub fn tracked_sessions(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::DEFAULT_WINDOW)
    }
}
