//! The Fourier engine: detrending, tapering, scaling conventions and one- or
//! two-sided output.
//!
//! The transform always runs along the last dimension; every leading
//! dimension is treated as an independent batch row. Two entry points cover
//! the two output families:
//!
//! - [`spectral_density`] — real-valued power/energy spectral density,
//!   averaged across tapers;
//! - [`fourier_coefficients`] — complex coefficients per taper (two-sided by
//!   construction, since a folded spectrum loses phase).
//!
//! Scaling conventions: `Power` (signal²/Hz) and `Energy` (signal²) satisfy
//! Parseval's theorem exactly for boxcar and Hann tapers and approximately
//! for multitaper; `FieldTrip` and `Chronux` reproduce those toolboxes'
//! outputs for cross-validation and are not internally consistent.

use std::str::FromStr;

use log::warn;
use ndarray::{Array1, Array2, ArrayD, ArrayViewD, IxDyn};
use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::{Error, Result};
use crate::windows;

use super::dpss::dpss_windows;

/// Per-row trend removal applied before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detrend {
    /// Subtract the mean.
    Constant,
    /// Subtract the least-squares line.
    Linear,
}

impl FromStr for Detrend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "constant" => Ok(Detrend::Constant),
            "linear" => Ok(Detrend::Linear),
            _ => Err(Error::UnknownName {
                kind: "detrend",
                name: s.to_string(),
            }),
        }
    }
}

/// One-sided (non-negative frequencies, folded) or two-sided spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sides {
    One,
    Two,
}

impl FromStr for Sides {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "one" => Ok(Sides::One),
            "two" => Ok(Sides::Two),
            _ => Err(Error::UnknownName {
                kind: "sides",
                name: s.to_string(),
            }),
        }
    }
}

/// Normalization convention of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    /// Density in signal²/Hz; for stationary signals.
    Power,
    /// Energy in signal²; for transients.
    Energy,
    /// FieldTrip's `mtmfft` convention.
    FieldTrip,
    /// Chronux's `mtspectrumc` convention.
    Chronux,
}

impl FromStr for Scaling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "power" => Ok(Scaling::Power),
            "energy" => Ok(Scaling::Energy),
            "fieldtrip" => Ok(Scaling::FieldTrip),
            "chronux" => Ok(Scaling::Chronux),
            _ => Err(Error::UnknownName {
                kind: "scaling",
                name: s.to_string(),
            }),
        }
    }
}

/// Window applied before the transform. `Dpss` expands into a family of
/// `2·NW − 1` orthogonal Slepian tapers; every other name is a single
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taper {
    Boxcar,
    Hann,
    Hamming,
    Blackman,
    Cosine,
    Dpss,
}

impl FromStr for Taper {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "boxcar" => Ok(Taper::Boxcar),
            "hann" => Ok(Taper::Hann),
            "hamming" => Ok(Taper::Hamming),
            "blackman" => Ok(Taper::Blackman),
            "cosine" => Ok(Taper::Cosine),
            "dpss" => Ok(Taper::Dpss),
            _ => Err(Error::UnknownName {
                kind: "taper",
                name: s.to_string(),
            }),
        }
    }
}

/// Configuration of the Fourier engine.
#[derive(Debug, Clone)]
pub struct SpectralOptions {
    pub detrend: Option<Detrend>,
    /// `None` means boxcar (no windowing).
    pub taper: Option<Taper>,
    pub sides: Sides,
    pub scaling: Scaling,
    /// Multitaper half bandwidth in Hz; ignored unless the taper is `Dpss`.
    pub halfbandwidth: f64,
    /// Normalized half bandwidth `NW`; overrides `halfbandwidth · duration`.
    pub nw: Option<f64>,
    /// Transform length: shorter than the input truncates, longer zero-pads.
    pub n_fft: Option<usize>,
}

impl Default for SpectralOptions {
    fn default() -> Self {
        SpectralOptions {
            detrend: Some(Detrend::Linear),
            taper: None,
            sides: Sides::One,
            scaling: Scaling::Power,
            halfbandwidth: 3.0,
            nw: None,
            n_fft: None,
        }
    }
}

/// Power or energy spectral density: `|X|²`, folded and normalized per the
/// scaling convention, averaged across tapers.
///
/// Returns the frequency axis and an array whose last dimension is
/// frequency; every leading dimension of `x` is preserved.
pub fn spectral_density(
    x: &ArrayViewD<'_, f64>,
    s_freq: f64,
    opts: &SpectralOptions,
) -> Result<(Array1<f64>, ArrayD<f64>)> {
    let n_orig = *x.shape().last().unwrap_or(&0);
    if n_orig == 0 {
        return Err(Error::InvalidArgument("empty signal".into()));
    }
    let n_fft = opts.n_fft.unwrap_or(n_orig);
    let (freqs, coeffs) = taper_fft(x, s_freq, opts, opts.sides)?;
    let k = coeffs.shape()[coeffs.ndim() - 2];
    let n_freq = *coeffs.shape().last().unwrap();

    let mut density = coeffs.mapv(|c| c.norm_sqr());

    // Fold the conjugate-symmetric half into the kept bins: double
    // everything except DC and, for even transform lengths, Nyquist.
    if opts.sides == Sides::One
        && matches!(opts.scaling, Scaling::Power | Scaling::Energy)
    {
        let stop = if n_fft % 2 == 0 { n_freq - 1 } else { n_freq };
        let flat = density.as_slice_mut().unwrap();
        for row in flat.chunks_mut(n_freq) {
            for v in &mut row[1..stop] {
                *v *= 2.0;
            }
        }
    }

    match opts.scaling {
        Scaling::Power => density.mapv_inplace(|v| v / s_freq),
        Scaling::Energy => density.mapv_inplace(|v| v / n_orig as f64),
        Scaling::FieldTrip | Scaling::Chronux => {}
    }

    // Average across the taper axis (second to last).
    let mut shape: Vec<usize> = density.shape().to_vec();
    shape.remove(density.ndim() - 2);
    let flat = density.as_slice().unwrap();
    let n_batch = flat.len() / (k * n_freq);
    let mut averaged = Vec::with_capacity(n_batch * n_freq);
    for b in 0..n_batch {
        let block = &flat[b * k * n_freq..(b + 1) * k * n_freq];
        for f in 0..n_freq {
            let mut acc = 0.0;
            for t in 0..k {
                acc += block[t * n_freq + f];
            }
            averaged.push(acc / k as f64);
        }
    }
    let out = ArrayD::from_shape_vec(IxDyn(&shape), averaged)
        .expect("taper average preserves the element count");

    Ok((freqs, out))
}

/// Complex Fourier coefficients, one spectrum per taper (trailing taper
/// axis). Always two-sided: a one-sided request is promoted with a warning,
/// since phase cannot survive folding. No averaging is performed.
pub fn fourier_coefficients(
    x: &ArrayViewD<'_, f64>,
    s_freq: f64,
    opts: &SpectralOptions,
) -> Result<(Array1<f64>, ArrayD<Complex64>)> {
    let n_orig = *x.shape().last().unwrap_or(&0);
    if n_orig == 0 {
        return Err(Error::InvalidArgument("empty signal".into()));
    }
    if opts.sides == Sides::One {
        warn!("complex output always returns the full two-sided spectrum");
    }

    let (freqs, coeffs) = taper_fft(x, s_freq, opts, Sides::Two)?;
    let ndim = coeffs.ndim();
    let k = coeffs.shape()[ndim - 2];
    let n_freq = *coeffs.shape().last().unwrap();

    let scale = match opts.scaling {
        Scaling::Power => 1.0 / s_freq.sqrt(),
        Scaling::Energy => 1.0 / (n_orig as f64).sqrt(),
        Scaling::FieldTrip | Scaling::Chronux => 1.0,
    };

    // Reorder ... × taper × freq  →  ... × freq × taper.
    let mut shape: Vec<usize> = coeffs.shape().to_vec();
    shape[ndim - 2] = n_freq;
    shape[ndim - 1] = k;
    let flat = coeffs.as_slice().unwrap();
    let n_batch = flat.len() / (k * n_freq);
    let mut reordered = Vec::with_capacity(flat.len());
    for b in 0..n_batch {
        let block = &flat[b * k * n_freq..(b + 1) * k * n_freq];
        for f in 0..n_freq {
            for t in 0..k {
                reordered.push(block[t * n_freq + f] * scale);
            }
        }
    }
    let out = ArrayD::from_shape_vec(IxDyn(&shape), reordered)
        .expect("reorder preserves the element count");

    Ok((freqs, out))
}

/// Shared worker: detrend, taper, transform. Output shape is
/// `batch… × n_tapers × n_freq`, unscaled except for the FieldTrip/Chronux
/// coefficient factors (which apply before squaring).
fn taper_fft(
    x: &ArrayViewD<'_, f64>,
    s_freq: f64,
    opts: &SpectralOptions,
    sides: Sides,
) -> Result<(Array1<f64>, ArrayD<Complex64>)> {
    let ndim = x.ndim();
    let n_orig = x.shape()[ndim - 1];
    let n_fft = opts.n_fft.unwrap_or(n_orig);
    let n_freq = match sides {
        Sides::One => n_fft / 2 + 1,
        Sides::Two => n_fft,
    };

    let tapers = build_tapers(opts, n_orig, s_freq);
    let k = tapers.nrows();

    let coeff_scale = match opts.scaling {
        Scaling::Chronux => Complex64::new(1.0 / s_freq, 0.0),
        Scaling::FieldTrip => Complex64::new((2.0 / n_orig as f64).sqrt(), 0.0),
        _ => Complex64::new(1.0, 0.0),
    };

    let n_batch: usize = x.shape()[..ndim - 1].iter().product();
    let detrended = detrend_rows(x, opts.detrend);
    let rows = detrended.as_slice().expect("detrended copy is contiguous");

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);

    let mut out = Vec::with_capacity(n_batch * k * n_freq);
    let mut buf = vec![Complex64::default(); n_fft];
    for b in 0..n_batch {
        let row = &rows[b * n_orig..(b + 1) * n_orig];
        for t in 0..k {
            let taper = tapers.row(t);
            for (i, slot) in buf.iter_mut().enumerate() {
                // Truncate or zero-pad the tapered row to the FFT length.
                *slot = if i < n_orig {
                    Complex64::new(row[i] * taper[i], 0.0)
                } else {
                    Complex64::default()
                };
            }
            fft.process(&mut buf);
            out.extend(buf[..n_freq].iter().map(|&c| c * coeff_scale));
        }
    }

    let mut shape: Vec<usize> = x.shape()[..ndim - 1].to_vec();
    shape.push(k);
    shape.push(n_freq);
    let coeffs = ArrayD::from_shape_vec(IxDyn(&shape), out)
        .expect("fft output matches the declared shape");

    Ok((frequencies(n_fft, s_freq, sides), coeffs))
}

/// Frequency axis matching the kept bins: `[0, fs/2]` one-sided, FFT bin
/// order (positive then negative) two-sided.
pub fn frequencies(n_fft: usize, s_freq: f64, sides: Sides) -> Array1<f64> {
    let df = s_freq / n_fft as f64;
    match sides {
        Sides::One => Array1::from_iter((0..=n_fft / 2).map(|i| i as f64 * df)),
        Sides::Two => Array1::from_iter((0..n_fft).map(|i| {
            if i <= (n_fft - 1) / 2 {
                i as f64 * df
            } else {
                (i as f64 - n_fft as f64) * df
            }
        })),
    }
}

/// Build the taper matrix (tapers × samples), normalized for the scaling
/// convention.
fn build_tapers(opts: &SpectralOptions, n: usize, s_freq: f64) -> Array2<f64> {
    match opts.taper {
        Some(Taper::Dpss) => {
            let nw = opts.nw.unwrap_or(opts.halfbandwidth * n as f64 / s_freq);
            let k = (((2.0 * nw).round() as i64) - 1).max(1) as usize;
            let mut tapers = dpss_windows(n, nw, k.min(n));
            if opts.scaling == Scaling::Chronux {
                tapers.mapv_inplace(|v| v * s_freq.sqrt());
            }
            tapers
        }
        simple => {
            let w = match simple.unwrap_or(Taper::Boxcar) {
                Taper::Boxcar => windows::boxcar(n),
                Taper::Hann => windows::hann(n),
                Taper::Hamming => windows::hamming(n),
                Taper::Blackman => windows::blackman(n),
                Taper::Cosine => windows::cosine(n),
                Taper::Dpss => unreachable!(),
            };
            let mut w = Array1::from(w);
            match opts.scaling {
                Scaling::Energy => {
                    // RMS-based normalization keeps the energy convention
                    // correct after windowing.
                    let rms = (w.iter().map(|v| v * v).sum::<f64>() / n as f64).sqrt();
                    w.mapv_inplace(|v| v / (rms * (n as f64).sqrt()));
                }
                Scaling::Power => {
                    let norm = w.iter().map(|v| v * v).sum::<f64>().sqrt();
                    w.mapv_inplace(|v| v / norm);
                }
                Scaling::Chronux => {
                    let norm = w.iter().map(|v| v * v).sum::<f64>().sqrt();
                    w.mapv_inplace(|v| v / norm * s_freq.sqrt());
                }
                // FieldTrip squares the raw window into its own factor.
                Scaling::FieldTrip => {}
            }
            w.insert_axis(ndarray::Axis(0))
        }
    }
}

/// Remove per-row trends along the last axis, returning an owned contiguous
/// copy.
fn detrend_rows(x: &ArrayViewD<'_, f64>, detrend: Option<Detrend>) -> ArrayD<f64> {
    let mut out = x.to_owned().as_standard_layout().to_owned();
    let n = *out.shape().last().unwrap();
    if n == 0 {
        return out;
    }
    if let Some(kind) = detrend {
        let flat = out.as_slice_mut().unwrap();
        for row in flat.chunks_mut(n) {
            match kind {
                Detrend::Constant => {
                    let mean = row.iter().sum::<f64>() / n as f64;
                    row.iter_mut().for_each(|v| *v -= mean);
                }
                Detrend::Linear => {
                    // Least-squares line over t = 0..n-1.
                    let nf = n as f64;
                    let t_mean = (nf - 1.0) / 2.0;
                    let y_mean = row.iter().sum::<f64>() / nf;
                    let mut num = 0.0;
                    let mut den = 0.0;
                    for (t, &y) in row.iter().enumerate() {
                        let dt = t as f64 - t_mean;
                        num += dt * (y - y_mean);
                        den += dt * dt;
                    }
                    let slope = if den > 0.0 { num / den } else { 0.0 };
                    for (t, v) in row.iter_mut().enumerate() {
                        *v -= y_mean + slope * (t as f64 - t_mean);
                    }
                }
            }
        }
    }
    out
}
