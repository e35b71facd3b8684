//! Core projection trait and position tracking.

use async_trait::async_trait;
use event_store::EventEnvelope;

use crate::Result;

/// How many events a projection has folded into its read model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    pub events_processed: u64,
}

impl ProjectionPosition {
    pub fn zero() -> Self {
        Self {
            events_processed: 0,
        }
    }

    pub fn advance(&self) -> Self {
        Self {
            events_processed: self.events_processed + 1,
        }
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.events_processed)
    }
}

/// A projection that folds events into a read model.
///
/// `handle` must tolerate the same event twice and events of one stream
/// arriving out of order: the processor replays the log on catch-up and
/// also forwards freshly committed events as soon as each writer returns.
#[async_trait]
pub trait Projection: Send + Sync {
    fn name(&self) -> &'static str;

    /// Aggregate types whose events this projection consumes.
    fn subscriptions(&self) -> &'static [&'static str];

    /// Returns true if `aggregate_type` is one of the subscriptions.
    fn accepts(&self, aggregate_type: &str) -> bool {
        self.subscriptions().contains(&aggregate_type)
    }

    /// Folds a single event into the read model.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    async fn position(&self) -> ProjectionPosition;

    /// Clears the read model back to its initial state.
    async fn reset(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_advances_from_zero() {
        let pos = ProjectionPosition::zero();
        assert_eq!(pos.events_processed, 0);
        let pos = pos.advance().advance();
        assert_eq!(pos.events_processed, 2);
    }

    #[test]
    fn position_display() {
        let pos = ProjectionPosition {
            events_processed: 42,
        };
        assert_eq!(pos.to_string(), "position(42)");
    }
}
