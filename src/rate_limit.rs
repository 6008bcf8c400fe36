use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Counts attempts per key inside a fixed window.
///
/// `check` only reads; callers decide which outcomes count by calling `record`.
pub struct AttemptLimiter {
    /// key -> (count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_attempts: u32,
    window: Duration,
}

impl AttemptLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_attempts,
            window,
        }
    }

    /// 5 failed logins per 15 minutes.
    pub fn for_login() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// 5 reset emails per address per 15 minutes.
    pub fn for_password_reset() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// Ok if another attempt is allowed, otherwise the seconds until the window resets.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let Some(entry) = self.entries.get(&key.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = *entry.value();
        if now.duration_since(start) > self.window {
            return Ok(());
        }

        if count >= self.max_attempts {
            let elapsed = now.duration_since(start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record(&self, key: &str) {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Drop entries whose window has passed.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) <= self.window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_attempts() {
        let limiter = AttemptLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check("a@test.com").is_ok());
        limiter.record("a@test.com");
        limiter.record("A@test.com");
        assert!(limiter.check("a@test.com").is_err());
        assert!(limiter.check("b@test.com").is_ok());
    }

    #[test]
    fn window_expiry_resets() {
        let limiter = AttemptLimiter::new(1, Duration::from_millis(10));
        limiter.record("key");
        assert!(limiter.check("key").is_err());
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("key").is_ok());
        limiter.cleanup();
        assert!(limiter.entries.is_empty());
    }
}
