//! Value-based reads: ordering, gap-fill and tolerance behavior.
mod common;

use common::chan_time;
use siglab::{AxisValues, Error, LabeledSignal};

#[test]
fn query_returns_channels_in_caller_order() {
    let data = chan_time(100.0, &["c0", "c1", "c2"], 16, |c, t| (c * 100 + t) as f64);

    let out = data.query().pick("chan", ["c2", "c0"]).one(0).unwrap();
    assert_eq!(out.shape(), &[2, 16]);
    for t in 0..16 {
        assert_eq!(out[[0, t]], (200 + t) as f64); // first slice is "c2"
        assert_eq!(out[[1, t]], t as f64); // second is "c0"
    }
}

#[test]
fn missing_channel_leaves_nan_row() {
    let data = chan_time(100.0, &["c0", "c1"], 8, |c, t| (c * 10 + t) as f64);

    let out = data.query().pick("chan", ["c0", "missing"]).one(0).unwrap();
    assert_eq!(out.shape(), &[2, 8]);
    for t in 0..8 {
        assert_eq!(out[[0, t]], t as f64);
        assert!(out[[1, t]].is_nan());
    }
}

#[test]
fn zero_match_is_soft_not_an_error() {
    let data = chan_time(100.0, &["c0"], 4, |_, t| t as f64);
    let out = data.query().pick("chan", ["zz"]).one(0).unwrap();
    assert!(out.iter().all(|v| v.is_nan()));
}

#[test]
fn tolerance_recovers_drifted_time_stamps() {
    let s_freq = 500.0;
    let data = chan_time(s_freq, &["c0"], 500, |_, t| t as f64);

    // Values nudged off the stored coordinates by far less than a sample.
    let stored = data.axis_values("time", 0).unwrap().points().unwrap().to_vec();
    let drifted: Vec<f64> = stored[..10].iter().map(|&t| t + 1e-12).collect();

    // Exact matching cannot find any of them...
    let strict = data
        .query()
        .pick("time", drifted.clone())
        .one(0)
        .unwrap();
    assert!(strict.iter().all(|v| v.is_nan()));

    // ...but a 1e-10 tolerance fills every position.
    let loose = data
        .query()
        .tolerance(1e-10)
        .pick("time", drifted)
        .one(0)
        .unwrap();
    assert!(loose.iter().all(|v| !v.is_nan()));

    // A coarse 0.05 s grid against 1/500 s spacing resolves fully as well.
    let grid: Vec<f64> = (0..20).map(|j| j as f64 * 0.05).collect();
    let out = data
        .query()
        .tolerance(1e-10)
        .pick("time", grid)
        .one(0)
        .unwrap();
    assert_eq!(out.shape(), &[1, 20]);
    assert!(out.iter().all(|v| !v.is_nan()));
}

#[test]
fn scalar_pick_squeezes_and_exact_values_match() {
    let data = chan_time(100.0, &["c0", "c1"], 8, |c, t| (c * 10 + t) as f64);
    let stored = data.axis_values("time", 0).unwrap().points().unwrap().to_vec();

    let out = data
        .query()
        .pick("chan", "c1")
        .pick("time", vec![stored[3], stored[1]])
        .one(0)
        .unwrap();
    assert_eq!(out.shape(), &[2]);
    assert_eq!(out[[0]], 13.0);
    assert_eq!(out[[1]], 11.0);
}

#[test]
fn ragged_trials_are_independent() {
    let mut data = LabeledSignal::<f64>::new(100.0, &["chan", "time"]);
    for n in [30usize, 50] {
        data.push_trial(
            ndarray::Array2::zeros((2, n)).into_dyn(),
            vec![
                AxisValues::from(vec!["c0", "c1"]),
                AxisValues::evenly_spaced(0.0, n, 100.0),
            ],
        )
        .unwrap();
    }
    assert_eq!(data.number_of("time").unwrap(), vec![30, 50]);
    assert_eq!(data.n_trials(), 2);

    let both = data.query().pick("chan", "c0").get().unwrap();
    assert_eq!(both[0].shape(), &[30]);
    assert_eq!(both[1].shape(), &[50]);
}

#[test]
fn unknown_axis_always_propagates() {
    let data = chan_time(100.0, &["c0"], 4, |_, t| t as f64);
    assert!(matches!(
        data.query().pick("freq", [1.0]).one(0),
        Err(Error::AxisNotFound(_))
    ));
    assert!(matches!(data.number_of("freq"), Err(Error::AxisNotFound(_))));
    assert!(matches!(data.index_of("freq"), Err(Error::AxisNotFound(_))));
}
