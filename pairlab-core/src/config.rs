//! Configuration validation shared by every module config.

use thiserror::Error;

/// A configuration value that cannot produce a meaningful run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be >= {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must lie in [0, 1], got {value}")]
    NotUnitInterval { field: &'static str, value: f64 },
    #[error("{field} ({value}) must not exceed {limit_field} ({limit})")]
    Exceeds {
        field: &'static str,
        value: f64,
        limit_field: &'static str,
        limit: f64,
    },
    #[error("{0}")]
    Invalid(String),
}

pub(crate) fn ensure_at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall {
            field,
            min: min as f64,
            value: value as f64,
        });
    }
    Ok(())
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::TooSmall {
            field,
            min: 0.0,
            value,
        });
    }
    Ok(())
}

pub(crate) fn ensure_unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::NotUnitInterval { field, value });
    }
    Ok(())
}

pub(crate) fn ensure_not_above(
    field: &'static str,
    value: usize,
    limit_field: &'static str,
    limit: usize,
) -> Result<(), ConfigError> {
    if value > limit {
        return Err(ConfigError::Exceeds {
            field,
            value: value as f64,
            limit_field,
            limit: limit as f64,
        });
    }
    Ok(())
}
