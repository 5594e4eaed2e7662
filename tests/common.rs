/// Shared builders for integration tests.
use ndarray::Array2;
use siglab::{AxisValues, LabeledSignal};

#[allow(unused)]
/// A single-trial chan × time signal filled by `f(chan, sample)`.
pub fn chan_time(
    s_freq: f64,
    labels: &[&str],
    n_time: usize,
    f: impl Fn(usize, usize) -> f64,
) -> LabeledSignal {
    let mut data = LabeledSignal::new(s_freq, &["chan", "time"]);
    data.push_trial(
        Array2::from_shape_fn((labels.len(), n_time), |(c, t)| f(c, t)).into_dyn(),
        vec![
            AxisValues::Labels(labels.iter().map(|s| s.to_string()).collect()),
            AxisValues::evenly_spaced(0.0, n_time, s_freq),
        ],
    )
    .unwrap();
    data
}

#[allow(unused)]
/// Deterministic noise in [-1, 1] without any RNG state.
pub fn pseudo_noise(c: usize, t: usize) -> f64 {
    let x = (c as f64 * 12.9898 + t as f64 * 78.233).sin() * 43758.5453;
    2.0 * (x - x.floor()) - 1.0
}
