use std::time::{Duration, Instant};

/// Wall-clock budget for one solver call. An inactive limit never expires.
pub struct TimeLimit {
    is_active: bool,
    start: Instant,
    max_duration: Duration,
}

impl TimeLimit {
    pub fn new(duration: Option<Duration>) -> Self {
        Self {
            is_active: duration.is_some(),
            start: Instant::now(),
            max_duration: duration.unwrap_or_default(),
        }
    }

    pub fn can_progress(&self) -> bool {
        if !self.is_active {
            return true;
        }
        self.start.elapsed() < self.max_duration
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_limit_never_expires() {
        let limit = TimeLimit::new(None);
        assert!(limit.can_progress());
    }

    #[test]
    fn zero_limit_is_expired() {
        let limit = TimeLimit::new(Some(Duration::ZERO));
        assert!(!limit.can_progress());
    }
}
