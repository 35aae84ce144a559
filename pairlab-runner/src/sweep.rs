//! Parameter sweeps over the signal thresholds.
//!
//! Every grid point is an independent pair run on the same data, so the
//! sweep fans out across threads. Each run stays single-threaded.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::info;

use crate::config::PairConfig;
use crate::data_loader::PairData;
use crate::runner::{run_pair, PairRunResult, RunError};

/// Signal-parameter grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalGrid {
    pub windows: Vec<usize>,
    pub entry_z: Vec<f64>,
    pub exit_z: Vec<f64>,
}

impl Default for SignalGrid {
    /// Windows 20, 40, 60; entry 1.5, 2.0, 2.5; exit 0.0, 0.5, 1.0.
    fn default() -> Self {
        Self {
            windows: vec![20, 40, 60],
            entry_z: vec![1.5, 2.0, 2.5],
            exit_z: vec![0.0, 0.5, 1.0],
        }
    }
}

impl SignalGrid {
    /// Number of grid points, including ones later skipped as invalid.
    pub fn size(&self) -> usize {
        self.windows.len() * self.entry_z.len() * self.exit_z.len()
    }

    /// All configs in the grid. Combinations with `exit_z >= entry_z` are
    /// skipped.
    pub fn generate_configs(&self, base: &PairConfig) -> Vec<PairConfig> {
        let mut configs = Vec::new();
        for &window in &self.windows {
            for &entry in &self.entry_z {
                for &exit in &self.exit_z {
                    if exit >= entry {
                        continue;
                    }
                    let mut config = base.clone();
                    config.signal.window = window;
                    config.signal.entry_z = entry;
                    config.signal.exit_z = exit;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// Sweep executor over one pair's data.
pub struct ParamSweep<'a> {
    data: &'a PairData,
    parallel: bool,
}

impl<'a> ParamSweep<'a> {
    pub fn new(data: &'a PairData) -> Self {
        Self { data, parallel: true }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every config of `grid`. The first failing run aborts the sweep.
    pub fn sweep(&self, grid: &SignalGrid, base: &PairConfig) -> Result<SweepResults, RunError> {
        let configs = grid.generate_configs(base);
        info!(runs = configs.len(), parallel = self.parallel, "parameter sweep started");

        let results: Vec<PairRunResult> = if self.parallel {
            configs
                .par_iter()
                .map(|config| run_pair(config, self.data))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .map(|config| run_pair(config, self.data))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(results))
    }
}

/// Results of a sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    results: Vec<PairRunResult>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(results: Vec<PairRunResult>) -> Self {
        let by_run_id = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { results, by_run_id }
    }

    pub fn all(&self) -> &[PairRunResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&PairRunResult> {
        self.by_run_id.get(run_id).map(|&i| &self.results[i])
    }

    /// Results sorted by Sharpe ratio, best first.
    pub fn sorted_by_sharpe(&self) -> Vec<&PairRunResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| b.summary.sharpe.total_cmp(&a.summary.sharpe));
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&PairRunResult> {
        self.sorted_by_sharpe().into_iter().take(n).collect()
    }

    pub fn best(&self) -> Option<&PairRunResult> {
        self.sorted_by_sharpe().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_skips_inverted_thresholds() {
        let grid = SignalGrid {
            windows: vec![20],
            entry_z: vec![1.0, 2.0],
            exit_z: vec![0.5, 1.0, 1.5],
        };
        assert_eq!(grid.size(), 6);
        let configs = grid.generate_configs(&PairConfig::default());
        // (1.0, 0.5), (2.0, 0.5), (2.0, 1.0), (2.0, 1.5)
        assert_eq!(configs.len(), 4);
        assert!(configs.iter().all(|c| c.signal.exit_z < c.signal.entry_z));
        assert!(configs.iter().all(|c| c.signal.validate().is_ok()));
    }

    #[test]
    fn default_grid_has_27_points() {
        let grid = SignalGrid::default();
        assert_eq!(grid.size(), 27);
        assert_eq!(grid.generate_configs(&PairConfig::default()).len(), 27);
    }
}
