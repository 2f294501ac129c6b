//! Price sources for the strategy arena.
//!
//! Every source implements [`PriceSource`] and reports per-symbol problems
//! as `Stale` or `Unavailable` observations instead of failing the step.

mod csv_source;
mod replay;
mod synthetic;

pub use csv_source::CsvPriceSource;
pub use replay::ReplaySource;
pub use synthetic::{SyntheticConfig, SyntheticSource};

use arena_core::error::DataError;
use arena_core::traits::PriceSource;
use arena_core::types::{Observation, Snapshot};

/// Load a CSV replay file.
pub fn load_csv(path: &str) -> Result<CsvPriceSource, DataError> {
    CsvPriceSource::new(path)
}

/// Drain a source, collecting every snapshot it produces.
pub async fn collect_all(
    source: &mut dyn PriceSource,
    symbols: &[String],
) -> Result<Vec<Snapshot>, DataError> {
    let mut snapshots = Vec::new();
    while let Some(snapshot) = source.next_snapshot(symbols).await? {
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

/// Keep only the requested symbols; requested symbols the snapshot does
/// not mention become `Unavailable`.
pub(crate) fn restrict(snapshot: &Snapshot, symbols: &[String]) -> Snapshot {
    let observations = symbols
        .iter()
        .map(|symbol| (symbol.clone(), snapshot.get(symbol)))
        .collect();
    Snapshot {
        step: snapshot.step,
        timestamp: snapshot.timestamp,
        observations,
    }
}

/// True when a snapshot has nothing usable at all.
pub fn is_empty_step(snapshot: &Snapshot) -> bool {
    snapshot
        .observations
        .values()
        .all(|o| matches!(o, Observation::Unavailable))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restrict() {
        let snapshot = Snapshot::new(3)
            .with_timestamp(1_000)
            .with_price("AAPL", 10.0)
            .with_price("MSFT", 20.0);

        let symbols = vec!["AAPL".to_string(), "TSLA".to_string()];
        let restricted = restrict(&snapshot, &symbols);

        assert_eq!(restricted.step, 3);
        assert_eq!(restricted.timestamp, Some(1_000));
        assert_eq!(restricted.observations.len(), 2);
        assert!(restricted.get("AAPL").usable().is_some());
        assert_eq!(restricted.get("TSLA"), Observation::Unavailable);
        assert!(!is_empty_step(&restricted));
        assert!(is_empty_step(&Snapshot::unavailable(0, &symbols)));
    }
}
