//! Price source trait definition.

use crate::error::DataError;
use crate::types::Snapshot;
use async_trait::async_trait;

/// A replayable feed of per-step price snapshots.
///
/// Sources turn their own failures (missing rows, vendor hiccups, outdated
/// quotes) into `Observation::Stale` / `Observation::Unavailable` for the
/// affected symbols. An `Err` means the whole step could not be produced.
#[async_trait]
pub trait PriceSource: Send {
    /// Produce the next step's snapshot for the requested symbols.
    ///
    /// # Returns
    /// * `Ok(Some(snapshot))` for the next step
    /// * `Ok(None)` once the source is exhausted
    async fn next_snapshot(&mut self, symbols: &[String]) -> Result<Option<Snapshot>, DataError>;

    /// Symbols this source has data for, if it knows them up front.
    fn symbols(&self) -> Vec<String> {
        Vec::new()
    }

    /// Get the source name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown {
        remaining: u64,
    }

    #[async_trait]
    impl PriceSource for Countdown {
        async fn next_snapshot(
            &mut self,
            symbols: &[String],
        ) -> Result<Option<Snapshot>, DataError> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            let mut snapshot = Snapshot::new(self.remaining);
            for symbol in symbols {
                snapshot = snapshot.with_price(symbol.clone(), 100.0);
            }
            Ok(Some(snapshot))
        }

        fn name(&self) -> &str {
            "countdown"
        }
    }

    #[tokio::test]
    async fn test_source_exhaustion() {
        let mut source = Countdown { remaining: 2 };
        let symbols = vec!["AAPL".to_string()];

        assert!(source.next_snapshot(&symbols).await.unwrap().is_some());
        assert!(source.next_snapshot(&symbols).await.unwrap().is_some());
        assert!(source.next_snapshot(&symbols).await.unwrap().is_none());
        assert!(source.symbols().is_empty());
    }
}
