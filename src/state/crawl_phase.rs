/// Phase definitions for the single-run crawl state machine
///
/// A run moves strictly forward: `Idle` → `Running` → `Done`.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Frontier seeded, nothing fetched yet
    Idle,

    /// Processing the frontier
    Running,

    /// Frontier exhausted or page budget reached
    Done,
}

impl CrawlPhase {
    /// Returns true if the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from this phase to `next` is legal
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Done) | (Self::Idle, Self::Done)
        )
    }

    /// Returns the lowercase name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CrawlPhase::Idle.can_transition_to(CrawlPhase::Running));
        assert!(CrawlPhase::Running.can_transition_to(CrawlPhase::Done));
        assert!(CrawlPhase::Idle.can_transition_to(CrawlPhase::Done));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!CrawlPhase::Done.can_transition_to(CrawlPhase::Running));
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Idle));
        assert!(!CrawlPhase::Done.can_transition_to(CrawlPhase::Idle));
    }

    #[test]
    fn test_self_transitions_rejected() {
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Running));
    }

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlPhase::Idle.is_terminal());
        assert!(!CrawlPhase::Running.is_terminal());
        assert!(CrawlPhase::Done.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Running), "running");
    }
}
