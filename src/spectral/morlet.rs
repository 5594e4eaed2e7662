//! Complex Morlet wavelets and the wavelet time-frequency transform.
//!
//! One wavelet per frequency of interest; the time/frequency trade-off is
//! set either by a family-wide `ratio` (σ_f = f / ratio, the common choice:
//! frequency resolution scales with the frequency) or by an explicit σ_f
//! shared by all frequencies.

use log::debug;
use ndarray::{Array1, ArrayD, IxDyn};
use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::axes::AxisValues;
use crate::error::{Error, Result};
use crate::signal::LabeledSignal;

/// Amplitude convention of the wavelet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorletNormalization {
    /// Unit energy.
    Area,
    /// Peak value 1.
    Peak,
    /// Convolution maximum independent of σ_f.
    Max,
}

#[derive(Debug, Clone)]
pub struct MorletOptions {
    /// Family ratio `freq / σ_f`; ignored when `sigma_f` is given.
    pub ratio: f64,
    /// Explicit frequency-domain standard deviation in Hz.
    pub sigma_f: Option<f64>,
    /// Wavelet half-duration in time-domain standard deviations.
    pub dur_in_sd: f64,
    /// Explicit total duration in seconds; overrides `dur_in_sd`.
    pub dur_in_s: Option<f64>,
    pub normalization: MorletNormalization,
    /// Subtract the oscillation's DC offset (only matters for ratio < 5).
    pub zero_mean: bool,
}

impl Default for MorletOptions {
    fn default() -> Self {
        MorletOptions {
            ratio: 5.0,
            sigma_f: None,
            dur_in_sd: 4.0,
            dur_in_s: None,
            normalization: MorletNormalization::Area,
            zero_mean: false,
        }
    }
}

/// Complex Morlet wavelet centered on `freq` Hz.
pub fn morlet(freq: f64, s_freq: f64, opts: &MorletOptions) -> Array1<Complex64> {
    let (sigma_f, ratio) = match opts.sigma_f {
        Some(sf) => (sf, freq / sf),
        None => (freq / opts.ratio, opts.ratio),
    };
    let sigma_t = 1.0 / (2.0 * std::f64::consts::PI * sigma_f);

    if ratio < 5.0 && !opts.zero_mean {
        debug!("wavelet at {freq} Hz does not have zero mean; set zero_mean to correct it");
    }

    let dur = opts.dur_in_s.unwrap_or(sigma_t * opts.dur_in_sd * 2.0);
    let n = (dur * s_freq).round().max(1.0) as usize;

    let dc = (-0.5 * ratio * ratio).exp();
    let mut w = Array1::from_iter((0..n).map(|i| {
        let t = -dur / 2.0 + i as f64 / s_freq;
        let phase = 2.0 * std::f64::consts::PI * freq * t;
        let mut osc = Complex64::new(phase.cos(), phase.sin());
        if opts.zero_mean {
            osc -= dc;
        }
        osc * (-t * t / (2.0 * sigma_t * sigma_t)).exp()
    }));

    match opts.normalization {
        MorletNormalization::Area => {
            let scale = (std::f64::consts::PI.sqrt() * sigma_t * s_freq).sqrt();
            w.mapv_inplace(|v| v / scale);
        }
        MorletNormalization::Max => {
            let scale = 2.0 * sigma_t * (2.0 * std::f64::consts::PI).sqrt() / (1.0 / s_freq);
            w.mapv_inplace(|v| v / scale);
        }
        MorletNormalization::Peak => {}
    }

    w
}

/// Convolve every time series with a bank of Morlet wavelets, one per
/// frequency of interest.
///
/// Output axes: the input's non-time axes, then `"time"` (unchanged
/// coordinates), then `"freq"` holding `foi`. Values are complex; take
/// [`magnitude`](crate::math::magnitude) for amplitude envelopes.
pub fn morlet_transform(
    data: &LabeledSignal<f64>,
    foi: &[f64],
    opts: &MorletOptions,
) -> Result<LabeledSignal<Complex64>> {
    let idx_time = data.index_of("time")?;
    if idx_time != data.axis_names().len() - 1 {
        return Err(Error::TimeAxisNotLast);
    }
    if foi.is_empty() {
        return Err(Error::InvalidArgument(
            "at least one frequency of interest is required".into(),
        ));
    }

    let names = data.axis_names();
    let lead: Vec<&str> = names[..names.len() - 1].to_vec();
    let mut out_names = lead.clone();
    out_names.push("time");
    out_names.push("freq");

    let wavelets: Vec<Array1<Complex64>> = foi
        .iter()
        .map(|&f| morlet(f, data.s_freq(), opts))
        .collect();

    let mut out: LabeledSignal<Complex64> = data.empty_like_as(&out_names);

    for i in 0..data.n_trials() {
        let array = data.trial_data(i)?;
        let shape = array.shape().to_vec();
        let n_time = *shape.last().unwrap();
        let n_lead: usize = shape[..shape.len() - 1].iter().product();

        let contiguous = array.as_standard_layout();
        let rows = contiguous.as_slice().unwrap();

        let mut values = vec![Complex64::default(); n_lead * n_time * foi.len()];
        for b in 0..n_lead {
            let row = &rows[b * n_time..(b + 1) * n_time];
            for (f, wavelet) in wavelets.iter().enumerate() {
                let conv = fft_convolve_same(row, wavelet.as_slice().unwrap());
                for (t, &v) in conv.iter().enumerate() {
                    values[(b * n_time + t) * foi.len() + f] = v;
                }
            }
        }

        let mut out_shape = shape[..shape.len() - 1].to_vec();
        out_shape.push(n_time);
        out_shape.push(foi.len());
        let trial = ArrayD::from_shape_vec(IxDyn(&out_shape), values)
            .expect("convolution output matches the declared shape");

        let mut coords = Vec::with_capacity(out_names.len());
        for name in &lead {
            coords.push(data.axis_values(name, i)?.clone());
        }
        coords.push(data.axis_values("time", i)?.clone());
        coords.push(AxisValues::Points(foi.to_vec()));

        out.push_trial(trial, coords)?;
    }

    Ok(out)
}

/// Complex FFT convolution, 'same' alignment: output has the length of `x`.
fn fft_convolve_same(x: &[f64], h: &[Complex64]) -> Vec<Complex64> {
    let n = x.len();
    let m = h.len();
    if n == 0 || m == 0 {
        return vec![Complex64::default(); n];
    }
    let n_conv = n + m - 1;
    let n_fft = n_conv.next_power_of_two();

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let ifft = planner.plan_fft_inverse(n_fft);

    let mut a: Vec<Complex64> = x
        .iter()
        .map(|&v| Complex64::new(v, 0.0))
        .chain(std::iter::repeat(Complex64::default()))
        .take(n_fft)
        .collect();
    let mut b: Vec<Complex64> = h
        .iter()
        .copied()
        .chain(std::iter::repeat(Complex64::default()))
        .take(n_fft)
        .collect();

    fft.process(&mut a);
    fft.process(&mut b);
    for (va, vb) in a.iter_mut().zip(&b) {
        *va *= vb;
    }
    ifft.process(&mut a);

    let scale = 1.0 / n_fft as f64;
    let start = (m - 1) / 2;
    a[start..start + n]
        .iter()
        .map(|&v| v * scale)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::f64::consts::PI;

    #[test]
    fn wavelet_peaks_in_the_middle() {
        let w = morlet(
            10.0,
            256.0,
            &MorletOptions {
                normalization: MorletNormalization::Peak,
                ..MorletOptions::default()
            },
        );
        let mid = w.len() / 2;
        let peak = w.iter().map(|v| v.norm()).fold(0.0, f64::max);
        approx::assert_abs_diff_eq!(w[mid].norm(), peak, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(peak, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn area_normalization_gives_unit_energy() {
        let w = morlet(12.0, 256.0, &MorletOptions::default());
        let energy: f64 = w.iter().map(|v| v.norm_sqr()).sum();
        approx::assert_abs_diff_eq!(energy, 1.0, epsilon = 5e-2);
    }

    #[test]
    fn zero_mean_correction_removes_offset() {
        let opts = MorletOptions {
            ratio: 2.0,
            zero_mean: true,
            normalization: MorletNormalization::Peak,
            ..MorletOptions::default()
        };
        let w = morlet(5.0, 256.0, &opts);
        let mean = w.iter().sum::<Complex64>() / w.len() as f64;
        assert!(mean.norm() < 1e-3);
    }

    #[test]
    fn transform_responds_at_matching_frequency() {
        let s_freq = 256.0;
        let n = 1024;
        let mut data = LabeledSignal::new(s_freq, &["chan", "time"]);
        data.push_trial(
            Array2::from_shape_fn((1, n), |(_, t)| {
                (2.0 * PI * 10.0 * t as f64 / s_freq).sin()
            })
            .into_dyn(),
            vec![
                AxisValues::from(vec!["c0"]),
                AxisValues::evenly_spaced(0.0, n, s_freq),
            ],
        )
        .unwrap();

        let tf = morlet_transform(&data, &[10.0, 40.0], &MorletOptions::default()).unwrap();
        assert_eq!(tf.axis_names(), vec!["chan", "time", "freq"]);
        let arr = tf.trial_data(0).unwrap();
        assert_eq!(arr.shape(), &[1, n, 2]);

        // Away from the edges, the 10 Hz band carries far more amplitude.
        let mid = n / 2;
        let on = arr[[0, mid, 0]].norm();
        let off = arr[[0, mid, 1]].norm();
        assert!(on > 5.0 * off, "on={on}, off={off}");
    }
}
