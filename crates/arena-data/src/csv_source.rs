//! CSV replay source.
//!
//! Long format, one row per (step, symbol):
//!
//! ```text
//! step,symbol,price
//! 0,AAPL,189.20
//! 0,MSFT,411.05
//! ```
//!
//! Rows are grouped by `step` or, when absent, by `timestamp`. A row quotes
//! either `price` or `bid`/`ask`; an optional `stale` column (`true`/`false`)
//! marks outdated quotes.

use arena_core::error::DataError;
use arena_core::traits::PriceSource;
use arena_core::types::{Observation, Quote, Snapshot};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::ReplaySource;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Step", default)]
    step: Option<u64>,
    #[serde(alias = "Timestamp", alias = "date", alias = "Date", alias = "time", default)]
    timestamp: Option<String>,
    #[serde(alias = "Symbol", alias = "ticker")]
    symbol: String,
    #[serde(alias = "Price", alias = "mid", alias = "last", alias = "close", default)]
    price: Option<f64>,
    #[serde(alias = "Bid", default)]
    bid: Option<f64>,
    #[serde(alias = "Ask", default)]
    ask: Option<f64>,
    #[serde(alias = "Stale", default)]
    stale: Option<bool>,
}

impl CsvRecord {
    fn observation(&self) -> Observation {
        let quote = match (self.bid, self.ask, self.price) {
            (Some(bid), Some(ask), _) => Quote::bid_ask(bid, ask),
            (_, _, Some(price)) => Quote::last(price),
            _ => return Observation::Unavailable,
        };
        if !quote.is_valid() {
            return Observation::Unavailable;
        }
        if self.stale.unwrap_or(false) {
            Observation::stale(quote)
        } else {
            Observation::fresh(quote)
        }
    }
}

/// CSV price source for historical replays.
#[derive(Debug)]
pub struct CsvPriceSource {
    path: String,
    replay: ReplaySource,
    symbols: Vec<String>,
    skipped_rows: usize,
}

impl CsvPriceSource {
    /// Load a CSV replay file.
    ///
    /// Malformed rows are skipped and counted; the affected symbol simply
    /// reads as unavailable for that step.
    pub fn new(path: &str) -> Result<Self, DataError> {
        if !Path::new(path).exists() {
            return Err(DataError::NoDataAvailable);
        }

        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut source = Self::from_reader(reader)?;
        source.path = path.to_string();
        Ok(source)
    }

    /// Parse CSV text already in memory.
    pub fn from_csv_str(data: &str) -> Result<Self, DataError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, DataError> {
        let headers = reader
            .headers()
            .map_err(|e| DataError::ParseError(e.to_string()))?
            .clone();
        let has = |name: &str| headers.iter().any(|h| h.eq_ignore_ascii_case(name));
        if !has("symbol") && !has("ticker") {
            return Err(DataError::ParseError("missing symbol column".into()));
        }
        let has_step = has("step");
        let has_time = ["timestamp", "date", "time"].iter().any(|h| has(*h));
        if !has_step && !has_time {
            return Err(DataError::ParseError(
                "missing step or timestamp column".into(),
            ));
        }

        // key -> (timestamp, symbol -> observation)
        let mut steps: BTreeMap<i64, (Option<i64>, BTreeMap<String, Observation>)> =
            BTreeMap::new();
        let mut symbols = BTreeSet::new();
        let mut skipped_rows = 0;

        for (line, result) in reader.deserialize::<CsvRecord>().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!(line = line + 2, error = %e, "Skipping malformed CSV row");
                    skipped_rows += 1;
                    continue;
                }
            };

            let timestamp = match record.timestamp.as_deref() {
                Some(ts) if !ts.is_empty() => match parse_timestamp(ts) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        warn!(line = line + 2, error = %e, "Skipping CSV row with bad timestamp");
                        skipped_rows += 1;
                        continue;
                    }
                },
                _ => None,
            };

            let key = match (has_step, record.step, timestamp) {
                (true, Some(step), _) => match i64::try_from(step) {
                    Ok(key) => key,
                    Err(_) => {
                        warn!(line = line + 2, step, "Skipping CSV row with out-of-range step");
                        skipped_rows += 1;
                        continue;
                    }
                },
                (false, _, Some(ts)) => ts,
                _ => {
                    warn!(line = line + 2, "Skipping CSV row without a step key");
                    skipped_rows += 1;
                    continue;
                }
            };

            symbols.insert(record.symbol.clone());
            let entry = steps.entry(key).or_insert((timestamp, BTreeMap::new()));
            entry.1.insert(record.symbol.clone(), record.observation());
        }

        let snapshots: Vec<Snapshot> = steps
            .into_values()
            .enumerate()
            .map(|(i, (timestamp, observations))| Snapshot {
                step: i as u64,
                timestamp,
                observations,
            })
            .collect();

        debug!(
            steps = snapshots.len(),
            symbols = symbols.len(),
            skipped_rows,
            "Loaded CSV replay"
        );

        Ok(Self {
            path: String::new(),
            replay: ReplaySource::new(snapshots),
            symbols: symbols.into_iter().collect(),
            skipped_rows,
        })
    }

    /// Path the data was loaded from (empty for in-memory data).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of distinct steps in the file.
    pub fn len(&self) -> usize {
        self.replay.len()
    }

    /// Check if the file had no usable rows.
    pub fn is_empty(&self) -> bool {
        self.replay.is_empty()
    }

    /// Rows that could not be parsed.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn next_snapshot(&mut self, symbols: &[String]) -> Result<Option<Snapshot>, DataError> {
        self.replay.next_snapshot(symbols).await
    }

    fn symbols(&self) -> Vec<String> {
        self.symbols.clone()
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse various timestamp formats into Unix milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for format in date_formats {
        if let Some(dt) = NaiveDate::parse_from_str(date_str, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    // Unix timestamp; milliseconds if > 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!(
        "Could not parse timestamp: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> Vec<String> {
        vec!["AAPL".to_string(), "MSFT".to_string()]
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_ok());
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_step_format() {
        let data = "\
step,symbol,price
0,AAPL,100.0
0,MSFT,200.0
1,AAPL,101.0
";
        let mut source = CsvPriceSource::from_csv_str(data).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.symbols(), symbols());

        let first = source.next_snapshot(&symbols()).await.unwrap().unwrap();
        assert_eq!(first.get("MSFT").usable().map(|q| q.mid()), Some(200.0));

        let second = source.next_snapshot(&symbols()).await.unwrap().unwrap();
        assert_eq!(second.step, 1);
        assert_eq!(second.get("MSFT"), Observation::Unavailable);

        assert!(source.next_snapshot(&symbols()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bid_ask_and_stale() {
        let data = "\
timestamp,symbol,bid,ask,stale
2024-01-15 10:31:00,AAPL,99.5,100.5,true
2024-01-15 10:30:00,AAPL,99.0,100.0,false
2024-01-15 10:30:00,MSFT,,,
";
        let mut source = CsvPriceSource::from_csv_str(data).unwrap();
        assert_eq!(source.len(), 2);

        // Sorted by timestamp
        let first = source.next_snapshot(&symbols()).await.unwrap().unwrap();
        let quote = first.get("AAPL").usable().unwrap();
        assert_eq!(quote.bid(), Some(99.0));
        assert_eq!(quote.ask(), Some(100.0));
        assert!(first.timestamp.is_some());
        assert_eq!(first.get("MSFT"), Observation::Unavailable);

        let second = source.next_snapshot(&symbols()).await.unwrap().unwrap();
        assert!(matches!(second.get("AAPL"), Observation::Stale { .. }));
        assert!(second.get("AAPL").usable().is_none());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let data = "\
step,symbol,price
0,AAPL,100.0
1,AAPL,not-a-number
2,AAPL,-5
";
        let source = CsvPriceSource::from_csv_str(data).unwrap();
        assert_eq!(source.skipped_rows(), 1);
        assert_eq!(source.len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_step_is_skipped() {
        let data = "\
step,symbol,price
18446744073709551615,AAPL,1.0
0,AAPL,100.0
1,AAPL,101.0
";
        let mut source = CsvPriceSource::from_csv_str(data).unwrap();
        assert_eq!(source.skipped_rows(), 1);
        assert_eq!(source.len(), 2);

        let first = source.next_snapshot(&symbols()).await.unwrap().unwrap();
        assert_eq!(first.get("AAPL").usable().map(|q| q.mid()), Some(100.0));
    }

    #[tokio::test]
    async fn test_loads_shipped_sample() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/sample_prices.csv");
        let mut source = CsvPriceSource::new(path).unwrap();
        assert_eq!(source.len(), 60);
        assert_eq!(source.symbols(), symbols());
        assert_eq!(source.skipped_rows(), 0);
        assert_eq!(source.path(), path);

        let mut steps = 0;
        while let Some(snapshot) = source.next_snapshot(&symbols()).await.unwrap() {
            assert_eq!(snapshot.step, steps);
            assert!(snapshot.get("AAPL").usable().is_some());
            assert!(snapshot.get("MSFT").usable().is_some());
            steps += 1;
        }
        assert_eq!(steps, 60);
    }

    #[test]
    fn test_missing_columns() {
        assert!(CsvPriceSource::from_csv_str("step,price\n0,1.0\n").is_err());
        assert!(CsvPriceSource::from_csv_str("symbol,price\nAAPL,1.0\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvPriceSource::new("/nonexistent/prices.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }
}
