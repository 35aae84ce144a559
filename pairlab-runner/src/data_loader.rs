//! Price loading and pair alignment.
//!
//! Each leg is a CSV file with a `date` column and a `close` column
//! (`adj_close` is used when `close` is absent). Rows with a missing or
//! non-finite price are dropped. The two legs are inner-joined on date.
//!
//! Synthetic pairs are a developer-only mode for demos and smoke runs.
//! Results produced on synthetic data are tagged as such.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::{debug, warn};

use pairlab_core::series::{names, SeriesBundle};
use pairlab_core::synthetic::cointegrated_pair;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: String, column: String },

    #[error("{path} row {row}: cannot parse date '{value}'")]
    BadDate {
        path: String,
        row: usize,
        value: String,
    },

    #[error("{path} contains no usable prices")]
    Empty { path: String },

    #[error("the two legs share no dates")]
    NoOverlap,
}

/// One leg's price history, sorted by date with unique dates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Two aligned legs. `x` is the leg being hedged, `y` the hedge leg
/// (`spread = x - beta * y`).
#[derive(Debug, Clone, PartialEq)]
pub struct PairData {
    pub dates: Vec<NaiveDate>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Whether the prices were generated rather than loaded.
    pub synthetic: bool,
}

impl PairData {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Deterministic BLAKE3 hash over dates and both price legs.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for ((date, x), y) in self.dates.iter().zip(&self.x).zip(&self.y) {
            hasher.update(date.to_string().as_bytes());
            hasher.update(&x.to_le_bytes());
            hasher.update(&y.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Shared bundle for the engine: both legs and the dates.
    pub fn to_bundle(&self) -> SeriesBundle {
        SeriesBundle::new()
            .with_series(names::X, self.x.clone())
            .with_series(names::Y, self.y.clone())
            .with_dates(self.dates.clone())
    }
}

/// Load one leg from a CSV file.
pub fn load_price_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let path_str = path.display().to_string();
    let csv_err = |source| LoadError::Csv {
        path: path_str.clone(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

    let date_col = find("date").ok_or_else(|| LoadError::MissingColumn {
        path: path_str.clone(),
        column: "date".into(),
    })?;
    let price_col = find("close")
        .or_else(|| find("adj_close"))
        .ok_or_else(|| LoadError::MissingColumn {
            path: path_str.clone(),
            column: "close".into(),
        })?;

    // Later rows win on duplicate dates.
    let mut prices: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped = 0usize;
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let raw_date = record.get(date_col).unwrap_or("").trim();
        let date = parse_date(raw_date).ok_or_else(|| LoadError::BadDate {
            path: path_str.clone(),
            row: i + 2,
            value: raw_date.to_string(),
        })?;
        match record.get(price_col).and_then(|v| v.trim().parse::<f64>().ok()) {
            Some(price) if price.is_finite() => {
                if prices.insert(date, price).is_some() {
                    warn!(path = %path_str, %date, "duplicate date, keeping the later row");
                }
            }
            _ => dropped += 1,
        }
    }

    if prices.is_empty() {
        return Err(LoadError::Empty { path: path_str });
    }
    if dropped > 0 {
        debug!(path = %path_str, dropped, "dropped rows without a usable price");
    }

    let (dates, close) = prices.into_iter().unzip();
    Ok(PriceSeries { dates, close })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Inner join of two legs on date.
pub fn align_pair(x: &PriceSeries, y: &PriceSeries) -> Result<PairData, LoadError> {
    let y_by_date: BTreeMap<NaiveDate, f64> = y.dates.iter().copied().zip(y.close.iter().copied()).collect();

    let mut dates = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (date, &xv) in x.dates.iter().zip(&x.close) {
        if let Some(&yv) = y_by_date.get(date) {
            dates.push(*date);
            xs.push(xv);
            ys.push(yv);
        }
    }

    if dates.is_empty() {
        return Err(LoadError::NoOverlap);
    }
    debug!(
        x_rows = x.len(),
        y_rows = y.len(),
        aligned = dates.len(),
        "aligned pair on common dates"
    );
    Ok(PairData {
        dates,
        x: xs,
        y: ys,
        synthetic: false,
    })
}

/// Load both legs and align them.
pub fn load_pair(x_path: &Path, y_path: &Path) -> Result<PairData, LoadError> {
    let x = load_price_csv(x_path)?;
    let y = load_price_csv(y_path)?;
    align_pair(&x, &y)
}

/// Parameters of a generated pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticOptions {
    pub len: usize,
    pub hedge_ratio: f64,
    pub noise: f64,
    pub seed: u64,
    pub start: NaiveDate,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            len: 750,
            hedge_ratio: 1.2,
            noise: 0.5,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap_or_default(),
        }
    }
}

/// Deterministic cointegrated pair on a weekday calendar.
pub fn synthetic_pair(opts: &SyntheticOptions) -> PairData {
    let pair = cointegrated_pair(opts.len, opts.hedge_ratio, opts.noise, opts.seed);
    PairData {
        dates: weekdays(opts.start, opts.len),
        x: pair.x,
        y: pair.y,
        synthetic: true,
    }
}

fn weekdays(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start
        .iter_days()
        .filter(|d| !matches!(d.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun))
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loads_sorted_prices_and_drops_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "x.csv",
            "date,open,close\n2024-01-03,1,11.0\n2024-01-02,1,10.0\n2024-01-04,1,\n2024-01-05,1,nan\n",
        );
        let series = load_price_csv(&path).unwrap();
        assert_eq!(series.dates, vec![date(2024, 1, 2), date(2024, 1, 3)]);
        assert_eq!(series.close, vec![10.0, 11.0]);
    }

    #[test]
    fn duplicate_dates_keep_the_later_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "x.csv",
            "date,close\n2024-01-02,10.0\n2024-01-03,11.0\n2024-01-02,12.0\n",
        );
        let series = load_price_csv(&path).unwrap();
        assert_eq!(series.dates, vec![date(2024, 1, 2), date(2024, 1, 3)]);
        assert_eq!(series.close, vec![12.0, 11.0]);
    }

    #[test]
    fn falls_back_to_adj_close_and_accepts_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "x.csv",
            "Date,Adj_Close\n2024-01-02 00:00:00-05:00,10.5\n",
        );
        let series = load_price_csv(&path).unwrap();
        assert_eq!(series.dates, vec![date(2024, 1, 2)]);
        assert_eq!(series.close, vec![10.5]);
    }

    #[test]
    fn missing_columns_and_bad_dates_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let no_price = write_csv(dir.path(), "a.csv", "date,volume\n2024-01-02,5\n");
        assert!(matches!(
            load_price_csv(&no_price),
            Err(LoadError::MissingColumn { .. })
        ));

        let bad_date = write_csv(dir.path(), "b.csv", "date,close\nyesterday,5\n");
        let err = load_price_csv(&bad_date).unwrap_err();
        assert!(matches!(err, LoadError::BadDate { row: 2, .. }));

        let empty = write_csv(dir.path(), "c.csv", "date,close\n2024-01-02,\n");
        assert!(matches!(load_price_csv(&empty), Err(LoadError::Empty { .. })));

        assert!(matches!(
            load_price_csv(&dir.path().join("missing.csv")),
            Err(LoadError::Csv { .. })
        ));
    }

    #[test]
    fn align_keeps_only_common_dates() {
        let x = PriceSeries {
            dates: vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)],
            close: vec![1.0, 2.0, 3.0],
        };
        let y = PriceSeries {
            dates: vec![date(2024, 1, 3), date(2024, 1, 4), date(2024, 1, 5)],
            close: vec![20.0, 30.0, 40.0],
        };
        let pair = align_pair(&x, &y).unwrap();
        assert_eq!(pair.dates, vec![date(2024, 1, 3), date(2024, 1, 4)]);
        assert_eq!(pair.x, vec![2.0, 3.0]);
        assert_eq!(pair.y, vec![20.0, 30.0]);
        assert!(!pair.synthetic);
    }

    #[test]
    fn disjoint_legs_do_not_align() {
        let x = PriceSeries {
            dates: vec![date(2024, 1, 2)],
            close: vec![1.0],
        };
        let y = PriceSeries {
            dates: vec![date(2024, 1, 3)],
            close: vec![1.0],
        };
        assert!(matches!(align_pair(&x, &y), Err(LoadError::NoOverlap)));
    }

    #[test]
    fn synthetic_pair_is_deterministic_and_skips_weekends() {
        let opts = SyntheticOptions {
            len: 30,
            ..Default::default()
        };
        let a = synthetic_pair(&opts);
        let b = synthetic_pair(&opts);
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert!(a.synthetic);
        assert!(a
            .dates
            .iter()
            .all(|d| !matches!(d.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)));
        assert_eq!(a.dataset_hash(), b.dataset_hash());

        let other = synthetic_pair(&SyntheticOptions { seed: 7, ..opts });
        assert_ne!(a.dataset_hash(), other.dataset_hash());
    }
}
