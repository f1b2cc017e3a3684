//! Integration tests for the streaming statistics engine: exactness on
//! small streams, Welford moments, and P² convergence on large streams.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use winscan::error::WinscanError;
use winscan::stats::RunningStats;

/// Naive nearest-rank order statistic for cross-checking small streams.
fn order_statistic(values: &[f64], level: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (level / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

#[test]
fn quantiles_exact_for_streams_of_up_to_five_values() {
    let levels = [10.0, 25.0, 50.0, 75.0, 90.0];
    let streams: &[&[f64]] = &[
        &[1.0],
        &[2.0, 1.0],
        &[3.0, 1.0, 2.0],
        &[-1.0, 4.0, 0.5, 2.0],
        &[10.0, -3.0, 7.0, 0.0, 5.0],
        &[2.0, 2.0, 2.0, 2.0, 2.0],
    ];

    for values in streams {
        let mut stats = RunningStats::with_quantiles(&levels).unwrap();
        for &v in *values {
            stats.push(v).unwrap();
        }
        for &level in &levels {
            let estimate = stats.quantile(level).unwrap().unwrap();
            let exact = order_statistic(values, level);
            assert_eq!(
                estimate, exact,
                "level {level} over {values:?}: got {estimate}, expected {exact}"
            );
        }
    }
}

#[test]
fn count_tracks_only_successful_pushes() {
    let mut stats = RunningStats::with_quantiles(&[50.0]).unwrap();
    let mut expected = 0u64;
    for i in 0..100 {
        if i % 10 == 3 {
            assert!(stats.push(f64::NAN).is_err());
            assert!(stats.push(f64::NEG_INFINITY).is_err());
        } else {
            stats.push(i as f64).unwrap();
            expected += 1;
        }
        assert_eq!(stats.num_data_values(), expected);
    }
}

#[test]
fn welford_matches_closed_form() {
    let mut stats = RunningStats::new();
    for v in [0.0, 0.25, 0.5, 0.75] {
        stats.push(v).unwrap();
    }
    assert!((stats.mean().unwrap() - 0.375).abs() < 1e-9);
    assert!((stats.variance().unwrap() - 0.078125).abs() < 1e-9);
    assert!((stats.standard_deviation().unwrap() - 0.078125f64.sqrt()).abs() < 1e-9);
}

#[test]
fn large_uniform_stream_converges() {
    let n = 1_000_000u64;
    let mut stats = RunningStats::with_quantiles(&[1.0, 50.0, 90.0]).unwrap();
    for i in 0..n {
        stats.push(i as f64 / n as f64).unwrap();
    }

    assert_eq!(stats.num_data_values(), n);

    let median = stats.median().unwrap().unwrap();
    assert!((median - 0.5).abs() < 1e-4, "median {median}");

    let p1 = stats.quantile(1.0).unwrap().unwrap();
    assert!((p1 - 0.01).abs() < 1e-3, "p1 {p1}");

    let p90 = stats.quantile(90.0).unwrap().unwrap();
    assert!((p90 - 0.90).abs() < 1e-3, "p90 {p90}");

    // Exact moments of {0, 1/n, ..., (n-1)/n}.
    let expected_mean = (n - 1) as f64 / (2.0 * n as f64);
    assert!((stats.mean().unwrap() - expected_mean).abs() < 1e-9);
    assert_eq!(stats.min(), Some(0.0));
    assert_eq!(stats.max(), Some((n - 1) as f64 / n as f64));
}

#[test]
fn shuffled_uniform_stream_converges() {
    let n = 200_000usize;
    let mut values: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    values.shuffle(&mut rng);

    let mut stats = RunningStats::with_quantiles(&[50.0, 90.0]).unwrap();
    for v in values {
        stats.push(v).unwrap();
    }

    let median = stats.median().unwrap().unwrap();
    assert!((median - 0.5).abs() < 5e-3, "median {median}");
    let p90 = stats.quantile(90.0).unwrap().unwrap();
    assert!((p90 - 0.9).abs() < 5e-3, "p90 {p90}");
}

#[test]
fn clear_after_large_stream_resets_to_undefined() {
    let mut stats = RunningStats::with_quantiles(&[50.0]).unwrap();
    for i in 0..1_000_000u64 {
        stats.push(i as f64).unwrap();
    }
    stats.clear();

    assert_eq!(stats.num_data_values(), 0);
    assert_eq!(stats.mean(), None);
    assert_eq!(stats.variance(), None);
    assert_eq!(stats.sample_variance(), None);
    assert_eq!(stats.standard_deviation(), None);
    assert_eq!(stats.sample_standard_deviation(), None);
    assert_eq!(stats.min(), None);
    assert_eq!(stats.max(), None);
    assert_eq!(stats.median().unwrap(), None);
    assert_eq!(stats.all_quantiles(), vec![(50.0, None)]);
}

#[test]
fn unknown_quantile_fails_regardless_of_count() {
    let mut stats = RunningStats::with_quantiles(&[50.0]).unwrap();
    assert!(matches!(
        stats.quantile(25.0),
        Err(WinscanError::UnknownQuantile { level }) if level == 25.0
    ));

    for i in 0..10_000 {
        stats.push(i as f64).unwrap();
    }
    assert!(matches!(
        stats.quantile(25.0),
        Err(WinscanError::UnknownQuantile { level }) if level == 25.0
    ));
}
