use std::time::{Duration, Instant};

/// Enforces a fixed pause between successive units of work of one kind
///
/// The gap runs from the moment the previous unit was marked complete, so a
/// slow fetch never eats into the pause before the next one. The first call
/// to [`Pacer::wait`] returns immediately.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    last_request_time: Option<Instant>,
}

impl Pacer {
    /// Creates a pacer with the given minimum gap
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request_time: None,
        }
    }

    /// Creates a pacer from a millisecond gap
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.duration_since(last);
        if elapsed < self.delay {
            Some(self.delay - elapsed)
        } else {
            None
        }
    }

    /// Sleeps until the pause after the previous unit has elapsed
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Pacing: sleeping {:?} of {:?}", remaining, self.delay);
            tokio::time::sleep(remaining).await;
        }
    }

    /// Marks the current unit of work finished; the pause starts now
    pub fn complete(&mut self) {
        self.record_request(Instant::now());
    }

    /// Records that a unit of work finished at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.last_request_time = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_immediate() {
        let pacer = Pacer::from_millis(1000);
        assert_eq!(pacer.time_until_next_request(Instant::now()), None);
    }

    #[test]
    fn test_time_until_next_request() {
        let mut pacer = Pacer::from_millis(1000);
        let start = Instant::now();
        pacer.record_request(start);

        let wait = pacer
            .time_until_next_request(start + Duration::from_millis(400))
            .unwrap();
        assert_eq!(wait, Duration::from_millis(600));

        assert_eq!(
            pacer.time_until_next_request(start + Duration::from_millis(1000)),
            None
        );
    }

    #[tokio::test]
    async fn test_wait_enforces_gap() {
        let mut pacer = Pacer::from_millis(50);

        let start = Instant::now();
        for _ in 0..3 {
            pacer.wait().await;
            pacer.complete();
        }

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_gap_counts_from_completion() {
        let mut pacer = Pacer::from_millis(80);

        pacer.wait().await;
        // a unit of work longer than the gap itself
        tokio::time::sleep(Duration::from_millis(120)).await;
        pacer.complete();

        let finished = Instant::now();
        pacer.wait().await;
        assert!(finished.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_wait_without_completion_does_not_pace() {
        let mut pacer = Pacer::from_millis(500);

        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
