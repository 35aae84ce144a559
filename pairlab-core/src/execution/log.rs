//! Tabular execution log.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use super::accountant::ExecutionRecord;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Ordered execution records, optionally indexed by date.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionLog {
    records: Vec<ExecutionRecord>,
    dates: Option<Vec<NaiveDate>>,
}

pub const EXECUTION_COLUMNS: [&str; 7] = ["t", "position", "spread_return", "turnover", "cost", "pnl", "equity"];

impl ExecutionLog {
    pub fn new(records: Vec<ExecutionRecord>, dates: Option<Vec<NaiveDate>>) -> Self {
        Self { records, dates }
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.records.last().map(|r| r.equity)
    }

    pub fn equity_curve(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.equity).collect()
    }

    /// CSV with a leading `date` column when dates are attached.
    pub fn to_csv_string(&self) -> Result<String, LogError> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        let mut header: Vec<&str> = Vec::with_capacity(EXECUTION_COLUMNS.len() + 1);
        if self.dates.is_some() {
            header.push("date");
        }
        header.extend(EXECUTION_COLUMNS);
        wtr.write_record(&header)?;

        for (i, r) in self.records.iter().enumerate() {
            let mut row: Vec<String> = Vec::with_capacity(header.len());
            if let Some(dates) = &self.dates {
                row.push(dates[i].to_string());
            }
            row.extend([
                r.t.to_string(),
                r.position.to_string(),
                r.spread_return.to_string(),
                r.turnover.to_string(),
                r.cost.to_string(),
                r.pnl.to_string(),
                r.equity.to_string(),
            ]);
            wtr.write_record(&row)?;
        }

        let data = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(data)?)
    }

    /// Write the CSV to `path`, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<(), LogError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_csv_string()?)?;
        Ok(())
    }
}
