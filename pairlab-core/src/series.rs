//! Shared data bundle for a walk-forward run.
//!
//! The bundle is an insertion-ordered collection of named entries (price
//! series, the spread, the date axis, scalar parameters). It is built once,
//! before the engine runs, and is read-only for the duration of a run.
//!
//! Modules never see the bundle directly. At each step the engine hands them
//! a [`StepData`] view whose series are truncated to `..=t`, so reading a
//! future index is impossible rather than merely discouraged.

use chrono::NaiveDate;

/// Well-known entry names used by the built-in modules.
pub mod names {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const SPREAD: &str = "spread";
    pub const BETA: &str = "beta";
    pub const DATES: &str = "dates";
}

/// One named entry in the shared bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum SharedValue {
    /// A numeric time series (NaN marks a missing observation).
    Series(Vec<f64>),
    /// The date axis.
    Dates(Vec<NaiveDate>),
    /// A scalar parameter. Has no length.
    Scalar(f64),
}

impl SharedValue {
    /// Length of the entry, if it has one.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Series(v) => Some(v.len()),
            Self::Dates(d) => Some(d.len()),
            Self::Scalar(_) => None,
        }
    }
}

/// Insertion-ordered mapping from entry name to shared value.
#[derive(Debug, Clone, Default)]
pub struct SeriesBundle {
    entries: Vec<(String, SharedValue)>,
}

impl SeriesBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: SharedValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with_series(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, SharedValue::Series(values));
        self
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.insert(names::DATES, SharedValue::Dates(dates));
        self
    }

    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, SharedValue::Scalar(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&SharedValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Full series by name (no truncation). Only for use outside a run.
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        match self.get(name)? {
            SharedValue::Series(v) => Some(v),
            _ => None,
        }
    }

    pub fn dates(&self) -> Option<&[NaiveDate]> {
        match self.get(names::DATES)? {
            SharedValue::Dates(d) => Some(d),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SharedValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timeline length: the length of the first entry that has one.
    pub fn infer_length(&self) -> Option<usize> {
        self.entries.iter().find_map(|(_, v)| v.len())
    }

    /// Causal view of the bundle at index `t`.
    pub fn view(&self, t: usize) -> StepData<'_> {
        StepData { t, bundle: self }
    }
}

/// Read-only view of the shared bundle at simulation index `t`.
///
/// Every series accessor returns a slice of length `t + 1` (or shorter if the
/// underlying series is shorter), so `slice[t]` is "now" and nothing past it
/// is reachable.
#[derive(Debug, Clone, Copy)]
pub struct StepData<'a> {
    t: usize,
    bundle: &'a SeriesBundle,
}

impl<'a> StepData<'a> {
    pub fn t(&self) -> usize {
        self.t
    }

    pub fn series(&self, name: &str) -> Option<&'a [f64]> {
        match self.bundle.get(name)? {
            SharedValue::Series(v) => Some(&v[..(self.t + 1).min(v.len())]),
            _ => None,
        }
    }

    pub fn dates(&self) -> Option<&'a [NaiveDate]> {
        match self.bundle.get(names::DATES)? {
            SharedValue::Dates(d) => Some(&d[..(self.t + 1).min(d.len())]),
            _ => None,
        }
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.bundle.get(name)? {
            SharedValue::Scalar(s) => Some(*s),
            _ => None,
        }
    }
}
