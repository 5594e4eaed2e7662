//! Spectral analysis at the signal level: Parseval, scaling ratios, complex
//! output and the invalid-combination errors.
mod common;

use common::{chan_time, pseudo_noise};
use ndarray::Array2;
use siglab::{
    frequency, frequency_complex, reduce, AxisValues, Detrend, Error, FrequencyOptions,
    LabeledSignal, Reducer, Scaling, SpectralOptions, Taper,
};
use std::f64::consts::PI;

fn no_detrend() -> SpectralOptions {
    SpectralOptions {
        detrend: None,
        ..SpectralOptions::default()
    }
}

#[test]
fn parseval_holds_through_the_signal_level() {
    let s_freq = 512.0;
    let dur = 3.0;
    let n = (s_freq * dur) as usize;
    let data = chan_time(s_freq, &["c0"], n, |_, t| {
        2.0 * (2.0 * PI * 36.0 * t as f64 / s_freq).cos()
    });

    let sum_sq: f64 = data.trial_data(0).unwrap().iter().map(|v| v * v).sum();

    // Power scaling: Σx² = Σpsd · fs.
    let psd = frequency(
        &data,
        &FrequencyOptions {
            spectral: no_detrend(),
            ..FrequencyOptions::default()
        },
    )
    .unwrap();
    let total = reduce(&psd, Reducer::Sum, "freq").unwrap();
    approx::assert_relative_eq!(
        total.trial_data(0).unwrap()[[0]] * s_freq,
        sum_sq,
        max_relative = 1e-8
    );

    // Energy scaling: Σx² = Σesd · fs · dur.
    let esd = frequency(
        &data,
        &FrequencyOptions {
            spectral: SpectralOptions {
                scaling: Scaling::Energy,
                ..no_detrend()
            },
            ..FrequencyOptions::default()
        },
    )
    .unwrap();
    let total = reduce(&esd, Reducer::Sum, "freq").unwrap();
    approx::assert_relative_eq!(
        total.trial_data(0).unwrap()[[0]] * s_freq * dur,
        sum_sq,
        max_relative = 1e-8
    );
}

#[test]
fn five_to_one_amplitude_ratio_squares_in_power() {
    // Channel 0 is exactly 5× channel 1.
    let s_freq = 256.0;
    let n = 512;
    let mut data = LabeledSignal::new(s_freq, &["chan", "time"]);
    let mut values = Array2::zeros((2, n));
    for t in 0..n {
        let x = pseudo_noise(1, t);
        values[[0, t]] = 5.0 * x;
        values[[1, t]] = x;
    }
    data.push_trial(
        values.into_dyn(),
        vec![
            AxisValues::from(vec!["c0", "c1"]),
            AxisValues::evenly_spaced(0.0, n, s_freq),
        ],
    )
    .unwrap();

    for (taper, duration) in [
        (None, Some(1.0)),
        (Some(Taper::Hann), Some(1.0)),
        (Some(Taper::Dpss), None),
    ] {
        let psd = frequency(
            &data,
            &FrequencyOptions {
                spectral: SpectralOptions {
                    taper,
                    ..no_detrend()
                },
                duration,
                overlap: 0.5,
            },
        )
        .unwrap();
        let total = reduce(&psd, Reducer::Sum, "freq").unwrap();
        let arr = total.trial_data(0).unwrap();
        let ratio = arr[[0]] / arr[[1]];
        assert!(
            4.7 * 4.7 < ratio && ratio < 5.4 * 5.4,
            "ratio {ratio} out of range for taper {taper:?}"
        );
    }
}

#[test]
fn complex_output_appends_a_taper_axis() {
    let s_freq = 256.0;
    let n = 512;
    let data = chan_time(s_freq, &["c0", "c1"], n, |c, t| pseudo_noise(c, t));

    let coeffs = frequency_complex(
        &data,
        &FrequencyOptions {
            spectral: SpectralOptions {
                taper: Some(Taper::Dpss),
                nw: Some(3.0),
                ..no_detrend()
            },
            ..FrequencyOptions::default()
        },
    )
    .unwrap();

    assert_eq!(coeffs.axis_names(), vec!["chan", "freq", "taper"]);
    // 2 channels × full two-sided grid × (2·NW − 1) tapers.
    assert_eq!(coeffs.trial_data(0).unwrap().shape(), &[2, n, 5]);
    assert_eq!(coeffs.number_of("taper").unwrap(), vec![5]);
}

#[test]
fn welch_averaging_shrinks_the_grid() {
    let s_freq = 256.0;
    let data = chan_time(s_freq, &["c0"], 1024, |c, t| pseudo_noise(c, t));

    let psd = frequency(
        &data,
        &FrequencyOptions {
            spectral: no_detrend(),
            duration: Some(1.0),
            overlap: 0.5,
        },
    )
    .unwrap();
    // 1 s sub-epochs at 256 Hz → 129 one-sided bins.
    assert_eq!(psd.number_of("freq").unwrap(), vec![129]);
}

#[test]
fn complex_output_rejects_epoch_averaging() {
    let data = chan_time(256.0, &["c0"], 512, |c, t| pseudo_noise(c, t));
    let err = frequency_complex(
        &data,
        &FrequencyOptions {
            duration: Some(1.0),
            ..FrequencyOptions::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::ComplexAverage));
}

#[test]
fn time_must_be_the_last_axis() {
    // Build a freq-last signal by reducing "freq" is not possible; instead
    // construct axes in the wrong order directly.
    let mut data = LabeledSignal::new(100.0, &["time", "chan"]);
    data.push_trial(
        Array2::from_elem((16, 2), 1.0).into_dyn(),
        vec![
            AxisValues::evenly_spaced(0.0, 16, 100.0),
            AxisValues::from(vec!["c0", "c1"]),
        ],
    )
    .unwrap();

    assert!(matches!(
        frequency(&data, &FrequencyOptions::default()),
        Err(Error::TimeAxisNotLast)
    ));
}

#[test]
fn detrend_constant_removes_dc_peak() {
    let s_freq = 128.0;
    let data = chan_time(s_freq, &["c0"], 256, |_, t| {
        3.0 + (2.0 * PI * 20.0 * t as f64 / s_freq).sin()
    });

    let raw = frequency(
        &data,
        &FrequencyOptions {
            spectral: no_detrend(),
            ..FrequencyOptions::default()
        },
    )
    .unwrap();
    let detrended = frequency(
        &data,
        &FrequencyOptions {
            spectral: SpectralOptions {
                detrend: Some(Detrend::Constant),
                ..SpectralOptions::default()
            },
            ..FrequencyOptions::default()
        },
    )
    .unwrap();

    let dc_raw = raw.trial_data(0).unwrap()[[0, 0]];
    let dc_gone = detrended.trial_data(0).unwrap()[[0, 0]];
    assert!(dc_raw > 1.0);
    assert!(dc_gone < 1e-20, "dc after detrend = {dc_gone}");
}
