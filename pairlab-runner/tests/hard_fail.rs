//! Failure-mode tests: misconfiguration never produces output, and
//! parallel execution never changes results.

use pairlab_runner::{
    run_pair, synthetic_pair, ConfigError, PairConfig, ParamSweep, RunError, SignalGrid, SyntheticOptions,
};

fn data() -> pairlab_runner::PairData {
    synthetic_pair(&SyntheticOptions {
        len: 260,
        noise: 0.5,
        ..Default::default()
    })
}

#[test]
fn hard_fail_concurrency_torture() {
    let grid = SignalGrid {
        windows: vec![20, 40],
        entry_z: vec![1.5, 2.0],
        exit_z: vec![0.0, 0.5],
    };
    let data = data();
    let base = PairConfig::default();

    let serial = ParamSweep::new(&data).with_parallelism(false).sweep(&grid, &base).unwrap();
    let parallel = ParamSweep::new(&data).with_parallelism(true).sweep(&grid, &base).unwrap();

    assert_eq!(serial.len(), 8);
    assert_eq!(serial.len(), parallel.len());
    for (left, right) in serial.all().iter().zip(parallel.all()) {
        assert_eq!(left.run_id, right.run_id);
        assert_eq!(left.execution, right.execution);
        assert_eq!(left.summary, right.summary);
    }

    let best = serial.best().unwrap();
    assert!(serial.all().iter().all(|r| r.summary.sharpe <= best.summary.sharpe));
    assert!(serial.get(&best.run_id).is_some());
    assert_eq!(serial.top_n(3).len(), 3);
}

#[test]
fn hard_fail_invalid_sections() {
    let data = data();
    let cases: Vec<Box<dyn Fn(&mut PairConfig)>> = vec![
        Box::new(|c| c.signal.exit_z = c.signal.entry_z),
        Box::new(|c| c.signal.window = 1),
        Box::new(|c| c.kalman.r = 0.0),
        Box::new(|c| c.kalman.clip = (2.0, -2.0)),
        Box::new(|c| c.regime.adf_window = c.regime.min_window + 1),
        Box::new(|c| c.regime.adf_step = 0),
        Box::new(|c| c.execution.slippage = -0.01),
        Box::new(|c| c.hedge.window = 0),
        Box::new(|c| c.metrics.sharpe_window = 0),
    ];
    for (i, mutate) in cases.iter().enumerate() {
        let mut config = PairConfig::default();
        mutate(&mut config);
        match run_pair(&config, &data) {
            Err(RunError::Config(ConfigError::Invalid(_))) => {}
            other => panic!("case {i}: expected invalid config, got {other:?}"),
        }
    }
}

#[test]
fn hard_fail_sweep_aborts_on_bad_base() {
    let data = data();
    let mut base = PairConfig::default();
    base.execution.cost_per_turnover = -1.0;
    let result = ParamSweep::new(&data).sweep(&SignalGrid::default(), &base);
    assert!(matches!(result, Err(RunError::Config(_))));
}
