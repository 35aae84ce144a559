//! Criterion benchmarks for PairLab hot paths.
//!
//! Benchmarks:
//! 1. Walk-forward run (regime → signal → execution over a synthetic pair)
//! 2. Heavy statistics (ADF, Engle-Granger, Hurst on a single window)
//! 3. Kalman hedge-ratio filter
//! 4. Regime throttle step (effect of the recompute step on run time)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pairlab_core::engine::WalkForwardEngine;
use pairlab_core::execution::{ExecutionConfig, SpreadAccountant};
use pairlab_core::hedge::{KalmanBeta, KalmanConfig};
use pairlab_core::regime::{RegimeClassifier, RegimeConfig};
use pairlab_core::series::{names, SeriesBundle};
use pairlab_core::signal::{SignalConfig, ZScoreSignal};
use pairlab_core::stats::{StandardStatistics, StatisticsProvider};
use pairlab_core::synthetic::{cointegrated_pair, SyntheticPair};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bundle(pair: &SyntheticPair) -> SeriesBundle {
    SeriesBundle::new()
        .with_series(names::X, pair.x.clone())
        .with_series(names::Y, pair.y.clone())
        .with_series(names::SPREAD, pair.spread.clone())
}

fn run_pipeline(data: SeriesBundle, regime_config: &RegimeConfig) -> usize {
    let mut regime = RegimeClassifier::new(regime_config.clone()).unwrap();
    let mut signal = ZScoreSignal::new(SignalConfig::default()).unwrap();
    let mut accountant = SpreadAccountant::new(ExecutionConfig::default()).unwrap();
    let mut engine = WalkForwardEngine::new(data, 0);
    engine.register(&mut regime).register(&mut signal).register(&mut accountant);
    engine.run().unwrap().steps()
}

// ── 1. Walk-Forward Run ──────────────────────────────────────────────

fn bench_walk_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk_forward");
    group.sample_size(10);

    for &len in &[252, 756, 1260] {
        let pair = cointegrated_pair(len, 1.2, 0.05, 1);
        let config = RegimeConfig::default();
        group.bench_with_input(BenchmarkId::new("full_pipeline", len), &pair, |b, pair| {
            b.iter(|| run_pipeline(black_box(make_bundle(pair)), &config));
        });
    }

    group.finish();
}

// ── 2. Heavy Statistics ──────────────────────────────────────────────

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");
    let pair = cointegrated_pair(180, 1.2, 0.05, 2);
    let stats = StandardStatistics;

    group.bench_function("adf_120", |b| {
        b.iter(|| stats.stationarity_test(black_box(&pair.spread[60..])));
    });
    group.bench_function("engle_granger_180", |b| {
        b.iter(|| stats.cointegration_test(black_box(&pair.x), black_box(&pair.y)));
    });
    group.bench_function("hurst_100", |b| {
        b.iter(|| stats.hurst_exponent(black_box(&pair.spread[80..]), 20));
    });

    group.finish();
}

// ── 3. Kalman Filter ─────────────────────────────────────────────────

fn bench_kalman(c: &mut Criterion) {
    let mut group = c.benchmark_group("kalman");
    let pair = cointegrated_pair(2520, 1.2, 0.05, 3);

    group.bench_function("run_2520", |b| {
        b.iter(|| {
            let mut kf = KalmanBeta::new(KalmanConfig::default()).unwrap();
            kf.run(black_box(&pair.x), black_box(&pair.y))
        });
    });

    group.finish();
}

// ── 4. Regime Throttle ───────────────────────────────────────────────

fn bench_throttle(c: &mut Criterion) {
    let mut group = c.benchmark_group("regime_throttle");
    group.sample_size(10);
    let pair = cointegrated_pair(756, 1.2, 0.05, 4);

    for &step in &[1, 5, 20] {
        let config = RegimeConfig {
            adf_step: step,
            coint_step: step,
            hurst_step: step,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("step", step), &config, |b, config| {
            b.iter(|| run_pipeline(black_box(make_bundle(&pair)), config));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_walk_forward,
    bench_statistics,
    bench_kalman,
    bench_throttle,
);
criterion_main!(benches);
