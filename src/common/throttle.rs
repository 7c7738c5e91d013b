use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Enforces a minimum gap between the end of one request and the start of
/// the next. Pairwise only: bursts are not smoothed beyond that gap.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request_at: Option<Instant>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request_at: None,
        }
    }

    /// Sleeps for whatever is left of the interval since the last request.
    pub async fn wait(&self) {
        if let Some(remaining) = self.remaining() {
            sleep(remaining).await;
        }
    }

    /// Marks the end of a request.
    pub fn mark(&mut self) {
        self.last_request_at = Some(Instant::now());
    }

    fn remaining(&self) -> Option<Duration> {
        let elapsed = self.last_request_at?.elapsed();
        self.min_interval
            .checked_sub(elapsed)
            .filter(|remaining| !remaining.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let throttle = RequestThrottle::new(Duration::from_millis(100));
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_requests_wait_full_interval() {
        let mut throttle = RequestThrottle::new(Duration::from_millis(100));
        throttle.mark();

        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_remainder_is_slept() {
        let mut throttle = RequestThrottle::new(Duration::from_millis(100));
        throttle.mark();
        tokio::time::advance(Duration::from_millis(60)).await;

        let start = Instant::now();
        throttle.wait().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(40));
        assert!(waited < Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_once_interval_has_passed() {
        let mut throttle = RequestThrottle::new(Duration::from_millis(100));
        throttle.mark();
        tokio::time::advance(Duration::from_millis(150)).await;

        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
