//! Time-frequency representations: spectrogram, STFT and wavelets.
mod common;

use common::{chan_time, pseudo_noise};
use siglab::{
    magnitude, morlet_transform, spectrogram, stft, MorletOptions, SpectralOptions, Taper,
    TimeFrequencyOptions,
};
use std::f64::consts::PI;

fn no_detrend() -> SpectralOptions {
    SpectralOptions {
        detrend: None,
        ..SpectralOptions::default()
    }
}

#[test]
fn spectrogram_stacks_segments_along_time() {
    let s_freq = 256.0;
    let data = chan_time(s_freq, &["c0", "c1"], 512, |c, t| pseudo_noise(c, t));

    let tf = spectrogram(
        &data,
        &TimeFrequencyOptions {
            spectral: no_detrend(),
            duration: 1.0,
            overlap: 0.0,
        },
    )
    .unwrap();

    assert_eq!(tf.axis_names(), vec!["chan", "time", "freq"]);
    assert_eq!(tf.trial_data(0).unwrap().shape(), &[2, 2, 129]);

    // Time stamps are segment centers.
    let times = tf.axis_values("time", 0).unwrap().points().unwrap().to_vec();
    approx::assert_abs_diff_eq!(times[0], 0.5, epsilon = 1e-9);
    approx::assert_abs_diff_eq!(times[1], 1.5, epsilon = 1e-9);
}

#[test]
fn spectrogram_parseval_with_boxcar_and_no_overlap() {
    // Non-overlapping boxcar segments tile the trial, so the summed density
    // still accounts for all the energy.
    let s_freq = 256.0;
    let data = chan_time(s_freq, &["c0"], 512, |c, t| pseudo_noise(c, t));
    let sum_sq: f64 = data.trial_data(0).unwrap().iter().map(|v| v * v).sum();

    let tf = spectrogram(
        &data,
        &TimeFrequencyOptions {
            spectral: no_detrend(),
            duration: 1.0,
            overlap: 0.0,
        },
    )
    .unwrap();

    let total: f64 = tf.trial_data(0).unwrap().iter().sum();
    approx::assert_relative_eq!(total * s_freq, sum_sq, max_relative = 1e-8);
}

#[test]
fn stft_keeps_taper_and_segment_axes() {
    let s_freq = 256.0;
    let data = chan_time(s_freq, &["c0", "c1"], 768, |c, t| pseudo_noise(c, t));

    let tf = stft(
        &data,
        &TimeFrequencyOptions {
            spectral: SpectralOptions {
                taper: Some(Taper::Dpss),
                nw: Some(3.0),
                ..no_detrend()
            },
            duration: 1.0,
            overlap: 0.0,
        },
    )
    .unwrap();

    assert_eq!(tf.axis_names(), vec!["chan", "time", "freq", "taper"]);
    // 3 segments × full two-sided grid × 2·NW − 1 tapers.
    assert_eq!(tf.trial_data(0).unwrap().shape(), &[2, 3, 256, 5]);
}

#[test]
fn morlet_envelope_follows_the_rhythm() {
    let s_freq = 256.0;
    let n = 2048;
    // 10 Hz in the first half, 30 Hz in the second half.
    let data = chan_time(s_freq, &["c0"], n, |_, t| {
        let f = if t < n / 2 { 10.0 } else { 30.0 };
        (2.0 * PI * f * t as f64 / s_freq).sin()
    });

    let tf = morlet_transform(&data, &[10.0, 30.0], &MorletOptions::default()).unwrap();
    let env = magnitude(&tf).unwrap();
    assert_eq!(env.axis_names(), vec!["chan", "time", "freq"]);

    let arr = env.trial_data(0).unwrap();
    // Deep inside each half, the matching band dominates.
    let q1 = n / 4;
    let q3 = 3 * n / 4;
    assert!(arr[[0, q1, 0]] > 3.0 * arr[[0, q1, 1]]);
    assert!(arr[[0, q3, 1]] > 3.0 * arr[[0, q3, 0]]);
}
