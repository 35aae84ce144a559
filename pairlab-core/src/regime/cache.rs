//! Throttled caching of expensive statistics.

/// Whether a cached statistic must be recomputed at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing cached yet.
    Missing,
    /// Cached, but this step is on the throttle grid.
    Stale,
    /// Cached and reusable.
    Fresh,
}

impl CacheStatus {
    pub fn needs_recompute(self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// A statistic recomputed only on `t % step == 0` (or when nothing is
/// cached), otherwise reused unchanged.
#[derive(Debug, Clone)]
pub struct ThrottledStat {
    step: usize,
    value: Option<f64>,
    recomputations: usize,
}

impl ThrottledStat {
    /// `step` must be at least 1 (enforced by config validation); 0 is
    /// treated as 1.
    pub fn new(step: usize) -> Self {
        Self {
            step: step.max(1),
            value: None,
            recomputations: 0,
        }
    }

    pub fn status(&self, t: usize) -> CacheStatus {
        match self.value {
            None => CacheStatus::Missing,
            Some(_) if t % self.step == 0 => CacheStatus::Stale,
            Some(_) => CacheStatus::Fresh,
        }
    }

    /// Cached value, recomputing it first if the status at `t` demands it.
    pub fn resolve(&mut self, t: usize, compute: impl FnOnce() -> f64) -> f64 {
        match (self.status(t), self.value) {
            (CacheStatus::Fresh, Some(v)) => v,
            _ => {
                let v = compute();
                self.value = Some(v);
                self.recomputations += 1;
                v
            }
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of times `compute` has run.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}
