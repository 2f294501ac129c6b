//! In-memory replay source.

use arena_core::error::DataError;
use arena_core::traits::PriceSource;
use arena_core::types::{Observation, Quote, Snapshot};
use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::restrict;

/// Replays a fixed list of snapshots in order.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl ReplaySource {
    /// Create a replay over prepared snapshots.
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Self {
            snapshots,
            cursor: 0,
        }
    }

    /// Build a replay from per-symbol last-price columns.
    ///
    /// Step `i` carries `prices[i]` for every symbol whose column is long
    /// enough; shorter columns read as unavailable. Non-finite or
    /// non-positive prices are reported as unavailable too.
    pub fn from_prices<S: AsRef<str>>(columns: &[(S, Vec<f64>)]) -> Self {
        let steps = columns.iter().map(|(_, p)| p.len()).max().unwrap_or(0);

        let snapshots = (0..steps)
            .map(|i| {
                columns
                    .iter()
                    .fold(Snapshot::new(i as u64), |snapshot, (symbol, prices)| {
                        let observation = match prices.get(i) {
                            Some(&price) if Quote::last(price).is_valid() => {
                                Observation::fresh(Quote::last(price))
                            }
                            _ => Observation::Unavailable,
                        };
                        snapshot.with(symbol.as_ref(), observation)
                    })
            })
            .collect();

        Self::new(snapshots)
    }

    /// Total number of steps.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if there are no steps at all.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Steps not yet replayed.
    pub fn remaining(&self) -> usize {
        self.snapshots.len() - self.cursor
    }

    /// Rewind to the first step.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

#[async_trait]
impl PriceSource for ReplaySource {
    async fn next_snapshot(&mut self, symbols: &[String]) -> Result<Option<Snapshot>, DataError> {
        let Some(snapshot) = self.snapshots.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        Ok(Some(restrict(snapshot, symbols)))
    }

    fn symbols(&self) -> Vec<String> {
        self.snapshots
            .iter()
            .flat_map(|s| s.observations.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn name(&self) -> &str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> Vec<String> {
        vec!["A".to_string(), "B".to_string()]
    }

    #[tokio::test]
    async fn test_replays_in_order() {
        let mut source =
            ReplaySource::from_prices(&[("A", vec![1.0, 2.0, 3.0]), ("B", vec![10.0])]);
        assert_eq!(source.len(), 3);
        assert_eq!(source.symbols(), symbols());

        let first = source.next_snapshot(&symbols()).await.unwrap().unwrap();
        assert_eq!(first.step, 0);
        assert_eq!(first.get("B").usable().map(|q| q.mid()), Some(10.0));

        let second = source.next_snapshot(&symbols()).await.unwrap().unwrap();
        assert_eq!(second.get("A").usable().map(|q| q.mid()), Some(2.0));
        assert_eq!(second.get("B"), Observation::Unavailable);

        source.next_snapshot(&symbols()).await.unwrap();
        assert!(source.next_snapshot(&symbols()).await.unwrap().is_none());
        assert_eq!(source.remaining(), 0);

        source.rewind();
        assert_eq!(source.remaining(), 3);
    }

    #[tokio::test]
    async fn test_invalid_prices_are_unavailable() {
        let mut source = ReplaySource::from_prices(&[("A", vec![0.0, f64::NAN, -1.0])]);
        let requested = vec!["A".to_string()];

        for _ in 0..3 {
            let snapshot = source.next_snapshot(&requested).await.unwrap().unwrap();
            assert_eq!(snapshot.get("A"), Observation::Unavailable);
        }
    }

    #[tokio::test]
    async fn test_empty_replay() {
        let mut source = ReplaySource::default();
        assert!(source.is_empty());
        assert!(source.next_snapshot(&symbols()).await.unwrap().is_none());
    }
}
