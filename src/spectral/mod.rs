//! Spectral analysis of labeled signals.
//!
//! - [`frequency`] / [`frequency_complex`]: power spectrum or per-taper
//!   Fourier coefficients of whole trials, with optional Welch-style
//!   sub-epoch averaging for the real-valued path.
//! - [`spectrogram`] / [`stft`]: one spectrum per overlapping sub-epoch,
//!   stacked along a fresh `"time"` axis.
//! - [`morlet_transform`]: wavelet convolution per frequency of interest.
//!
//! Every entry point requires `"time"` to be the last axis of the input and
//! returns a new signal; inputs are never touched.

pub mod dpss;
pub mod fft;
pub mod morlet;

pub use dpss::dpss_windows;
pub use fft::{
    fourier_coefficients, frequencies, spectral_density, Detrend, Scaling, Sides,
    SpectralOptions, Taper,
};
pub use morlet::{morlet, morlet_transform, MorletNormalization, MorletOptions};

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Slice};
use num_complex::Complex64;

use crate::axes::AxisValues;
use crate::error::{Error, Result};
use crate::signal::LabeledSignal;

/// Options for [`frequency`] and [`frequency_complex`].
#[derive(Debug, Clone)]
pub struct FrequencyOptions {
    pub spectral: SpectralOptions,
    /// Welch sub-epoch length in seconds; `None` transforms whole trials.
    pub duration: Option<f64>,
    /// Fractional overlap between sub-epochs, `0.0 ..= 1.0` exclusive of 1.
    pub overlap: f64,
}

impl Default for FrequencyOptions {
    fn default() -> Self {
        FrequencyOptions {
            spectral: SpectralOptions::default(),
            duration: None,
            overlap: 0.5,
        }
    }
}

/// Options for [`spectrogram`] and [`stft`].
#[derive(Debug, Clone)]
pub struct TimeFrequencyOptions {
    pub spectral: SpectralOptions,
    /// Sub-epoch length in seconds.
    pub duration: f64,
    /// Fractional overlap between sub-epochs.
    pub overlap: f64,
}

impl Default for TimeFrequencyOptions {
    fn default() -> Self {
        TimeFrequencyOptions {
            spectral: SpectralOptions::default(),
            duration: 1.0,
            overlap: 0.5,
        }
    }
}

/// Power (or energy) spectrum of each trial: the `"time"` axis is replaced
/// by `"freq"`.
///
/// With `duration` set, each trial is cut into overlapping sub-epochs
/// (views, no copy) whose spectra are averaged — Welch's method.
pub fn frequency(
    data: &LabeledSignal<f64>,
    opts: &FrequencyOptions,
) -> Result<LabeledSignal<f64>> {
    let lead = leading_axes(data)?;
    let mut out_names = lead.clone();
    out_names.push("freq".into());
    let out_names_ref: Vec<&str> = out_names.iter().map(|s| s.as_str()).collect();
    let mut out: LabeledSignal<f64> = data.empty_like_as(&out_names_ref);

    for i in 0..data.n_trials() {
        let array = data.trial_data(i)?;
        let (freqs, mean) = match opts.duration {
            None => spectral_density(&array.view(), data.s_freq(), &opts.spectral)?,
            Some(duration) => {
                let (starts, nperseg) =
                    segment_starts(*array.shape().last().unwrap(), duration, opts.overlap, data.s_freq())?;
                let mut acc: Option<ArrayD<f64>> = None;
                let mut freqs = None;
                for &start in &starts {
                    let view = epoch_view(array, start, nperseg);
                    let (f, psd) = spectral_density(&view, data.s_freq(), &opts.spectral)?;
                    freqs.get_or_insert(f);
                    acc = Some(match acc {
                        None => psd,
                        Some(a) => a + psd,
                    });
                }
                let mean = acc.unwrap() / starts.len() as f64;
                (freqs.unwrap(), mean)
            }
        };

        let mut coords = clone_axis_values(data, &lead, i)?;
        coords.push(AxisValues::Points(freqs.to_vec()));
        out.push_trial(mean, coords)?;
    }

    Ok(out)
}

/// Complex Fourier coefficients of each trial: `"time"` is replaced by
/// `"freq"`, and a trailing `"taper"` axis indexes the taper family.
///
/// Sub-epoch averaging is rejected: phases cannot be meaningfully averaged.
pub fn frequency_complex(
    data: &LabeledSignal<f64>,
    opts: &FrequencyOptions,
) -> Result<LabeledSignal<Complex64>> {
    if opts.duration.is_some() {
        return Err(Error::ComplexAverage);
    }
    let lead = leading_axes(data)?;
    let mut out_names = lead.clone();
    out_names.push("freq".into());
    out_names.push("taper".into());
    let out_names_ref: Vec<&str> = out_names.iter().map(|s| s.as_str()).collect();
    let mut out: LabeledSignal<Complex64> = data.empty_like_as(&out_names_ref);

    for i in 0..data.n_trials() {
        let array = data.trial_data(i)?;
        let (freqs, coeffs) =
            fourier_coefficients(&array.view(), data.s_freq(), &opts.spectral)?;
        let n_tapers = *coeffs.shape().last().unwrap();

        let mut coords = clone_axis_values(data, &lead, i)?;
        coords.push(AxisValues::Points(freqs.to_vec()));
        coords.push(AxisValues::Points((0..n_tapers).map(|t| t as f64).collect()));
        out.push_trial(coeffs, coords)?;
    }

    Ok(out)
}

/// Power spectrum of successive overlapping sub-epochs, stacked along a new
/// `"time"` axis (segment centers). Output axes: leading axes, `"time"`,
/// `"freq"`.
pub fn spectrogram(
    data: &LabeledSignal<f64>,
    opts: &TimeFrequencyOptions,
) -> Result<LabeledSignal<f64>> {
    let lead = leading_axes(data)?;
    let mut out_names = lead.clone();
    out_names.push("time".into());
    out_names.push("freq".into());
    let out_names_ref: Vec<&str> = out_names.iter().map(|s| s.as_str()).collect();
    let mut out: LabeledSignal<f64> = data.empty_like_as(&out_names_ref);

    for i in 0..data.n_trials() {
        let array = data.trial_data(i)?;
        let n_time = *array.shape().last().unwrap();
        let (starts, nperseg) = segment_starts(n_time, opts.duration, opts.overlap, data.s_freq())?;

        let mut freqs = None;
        let mut per_segment = Vec::with_capacity(starts.len());
        for &start in &starts {
            let view = epoch_view(array, start, nperseg);
            let (f, psd) = spectral_density(&view, data.s_freq(), &opts.spectral)?;
            freqs.get_or_insert(f);
            per_segment.push(psd);
        }
        let freqs = freqs.unwrap();

        let trial = stack_segments(&per_segment, 1)?;
        let mut coords = clone_axis_values(data, &lead, i)?;
        coords.push(segment_times(data, i, &starts, nperseg)?);
        coords.push(AxisValues::Points(freqs.to_vec()));
        out.push_trial(trial, coords)?;
    }

    Ok(out)
}

/// Short-time Fourier transform: complex coefficients of successive
/// overlapping sub-epochs. Output axes: leading axes, `"time"`, `"freq"`,
/// `"taper"`.
pub fn stft(
    data: &LabeledSignal<f64>,
    opts: &TimeFrequencyOptions,
) -> Result<LabeledSignal<Complex64>> {
    let lead = leading_axes(data)?;
    let mut out_names = lead.clone();
    out_names.push("time".into());
    out_names.push("freq".into());
    out_names.push("taper".into());
    let out_names_ref: Vec<&str> = out_names.iter().map(|s| s.as_str()).collect();
    let mut out: LabeledSignal<Complex64> = data.empty_like_as(&out_names_ref);

    for i in 0..data.n_trials() {
        let array = data.trial_data(i)?;
        let n_time = *array.shape().last().unwrap();
        let (starts, nperseg) = segment_starts(n_time, opts.duration, opts.overlap, data.s_freq())?;

        let mut freqs = None;
        let mut n_tapers = 0;
        let mut per_segment = Vec::with_capacity(starts.len());
        for &start in &starts {
            let view = epoch_view(array, start, nperseg);
            let (f, coeffs) =
                fourier_coefficients(&view, data.s_freq(), &opts.spectral)?;
            freqs.get_or_insert(f);
            n_tapers = *coeffs.shape().last().unwrap();
            per_segment.push(coeffs);
        }
        let freqs = freqs.unwrap();

        let trial = stack_segments(&per_segment, 2)?;
        let mut coords = clone_axis_values(data, &lead, i)?;
        coords.push(segment_times(data, i, &starts, nperseg)?);
        coords.push(AxisValues::Points(freqs.to_vec()));
        coords.push(AxisValues::Points((0..n_tapers).map(|t| t as f64).collect()));
        out.push_trial(trial, coords)?;
    }

    Ok(out)
}

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Names of all axes before the trailing `"time"` axis; errors if `"time"`
/// is missing or not last.
fn leading_axes(data: &LabeledSignal<f64>) -> Result<Vec<String>> {
    let idx_time = data.index_of("time")?;
    let names = data.axis_names();
    if idx_time != names.len() - 1 {
        return Err(Error::TimeAxisNotLast);
    }
    Ok(names[..names.len() - 1].iter().map(|s| s.to_string()).collect())
}

fn clone_axis_values(
    data: &LabeledSignal<f64>,
    names: &[String],
    trial: usize,
) -> Result<Vec<AxisValues>> {
    names
        .iter()
        .map(|name| data.axis_values(name, trial).map(|v| v.clone()))
        .collect()
}

/// Sub-epoch start indices and length for a duration/overlap pair.
fn segment_starts(
    n_time: usize,
    duration: f64,
    overlap: f64,
    s_freq: f64,
) -> Result<(Vec<usize>, usize)> {
    if !(0.0..1.0).contains(&overlap) {
        return Err(Error::InvalidArgument(format!(
            "overlap must be in [0, 1), got {overlap}"
        )));
    }
    let nperseg = (duration * s_freq).round() as usize;
    if nperseg == 0 || nperseg > n_time {
        return Err(Error::InvalidArgument(format!(
            "epoch of {nperseg} samples does not fit a trial of {n_time} samples"
        )));
    }
    let noverlap = (overlap * nperseg as f64) as usize;
    let step = (nperseg - noverlap).max(1);
    Ok(((0..=n_time - nperseg).step_by(step).collect(), nperseg))
}

/// A view of one sub-epoch along the last axis — constant-time, no copy.
fn epoch_view(array: &ArrayD<f64>, start: usize, nperseg: usize) -> ArrayViewD<'_, f64> {
    let last = Axis(array.ndim() - 1);
    array.slice_axis(last, Slice::from(start..start + nperseg))
}

/// Segment-center time stamps from the original time axis.
fn segment_times(
    data: &LabeledSignal<f64>,
    trial: usize,
    starts: &[usize],
    nperseg: usize,
) -> Result<AxisValues> {
    let time = data
        .axis_values("time", trial)?
        .points()
        .ok_or_else(|| Error::NotNumericAxis("time".into()))?;
    Ok(AxisValues::Points(
        starts.iter().map(|&s| time[s + nperseg / 2]).collect(),
    ))
}

/// Stack per-segment arrays of identical shape `lead… × tail…` into
/// `lead… × n_seg × tail…`. `n_appended` is the number of trailing dims the
/// per-segment transform appended (1 for a density spectrum, 2 for complex
/// coefficients with their taper axis); the new segment axis slots in just
/// before them.
fn stack_segments<T: Copy + Default>(
    segments: &[ArrayD<T>],
    n_appended: usize,
) -> Result<ArrayD<T>> {
    let n_seg = segments.len();
    let shape = segments[0].shape().to_vec();
    let split = shape.len() - n_appended;
    let n_lead: usize = shape[..split].iter().product();
    let tail: usize = shape[split..].iter().product();

    let mut values = vec![T::default(); n_lead * n_seg * tail];
    for (s, seg) in segments.iter().enumerate() {
        let flat = seg.as_slice().expect("segment spectra are contiguous");
        for l in 0..n_lead {
            let src = &flat[l * tail..(l + 1) * tail];
            let dst_start = (l * n_seg + s) * tail;
            values[dst_start..dst_start + tail].copy_from_slice(src);
        }
    }

    let mut out_shape = shape[..split].to_vec();
    out_shape.push(n_seg);
    out_shape.extend_from_slice(&shape[split..]);
    Ok(ArrayD::from_shape_vec(IxDyn(&out_shape), values)
        .expect("segment stack preserves the element count"))
}
