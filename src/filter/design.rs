//! Windowed-sinc FIR design.
//!
//! Lowpass kernels come from a Hamming-windowed sinc with unit DC gain;
//! highpass and band-stop kernels are obtained by spectral inversion. All
//! kernels have odd length so a zero-phase shift of `(N-1)/2` samples is
//! exact.

use std::f64::consts::PI;

use crate::windows::hamming;

/// Transition bandwidth for a cutoff at `freq` Hz:
/// `min(max(0.25 * freq, 2.0), freq)`.
pub fn auto_trans_bandwidth(freq: f64) -> f64 {
    (0.25 * freq).max(2.0).min(freq)
}

/// Number of FIR taps for a given transition bandwidth, rounded up to odd.
///
/// Formula: `ceil(3.3 / trans_bw * s_freq)`.
pub fn auto_filter_length(trans_bw: f64, s_freq: f64) -> usize {
    let n_raw = (3.3 / trans_bw * s_freq).ceil() as usize;
    if n_raw % 2 == 0 {
        n_raw + 1
    } else {
        n_raw
    }
}

/// Hamming-windowed sinc kernel of odd length `n`.
///
/// `pass_zero = true` gives a lowpass with unit DC gain and the -6 dB point
/// at `cutoff_hz`; `false` spectrally inverts it into a highpass.
pub fn firwin(n: usize, cutoff_hz: f64, s_freq: f64, pass_zero: bool) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let nyq = s_freq / 2.0;
    let fc = cutoff_hz / nyq; // normalised [0, 1]

    let win = hamming(n);

    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            // f(x) = sin(π·fc·x) / (π·x);  lim_{x→0} f(x) = fc
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    // Normalise so sum = 1 (unit DC gain for lowpass).
    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);

    if !pass_zero {
        // Highpass by spectral inversion.
        h.iter_mut().for_each(|v| *v = -*v);
        h[n / 2] += 1.0;
    }

    h
}

/// Anti-aliasing lowpass at `h_freq` Hz with automatic length, or an
/// explicit number of taps (rounded up to odd).
pub fn design_lowpass(h_freq: f64, s_freq: f64, n_taps: Option<usize>) -> Vec<f64> {
    let n = match n_taps {
        Some(n) if n % 2 == 1 => n,
        Some(n) => n + 1,
        None => auto_filter_length(auto_trans_bandwidth(h_freq), s_freq),
    };
    firwin(n, h_freq, s_freq, true)
}

/// Zero-phase highpass at `l_freq` Hz with automatic transition bandwidth
/// and length.
pub fn design_highpass(l_freq: f64, s_freq: f64) -> Vec<f64> {
    let trans_bw = auto_trans_bandwidth(l_freq);
    let n = auto_filter_length(trans_bw, s_freq);
    let l_stop = l_freq - trans_bw; // lower stop frequency (Hz)

    // Midpoint of transition band → firwin cutoff.
    let cutoff_hz = (l_stop + l_freq) / 2.0;

    firwin(n, cutoff_hz, s_freq, false)
}

/// Band-stop (notch) kernel centered on `center` Hz, rejecting
/// `center ± half_width` Hz.
///
/// Built as `δ − bandpass`, where the bandpass is the difference of two
/// lowpass kernels of equal length.
pub fn design_notch(center: f64, half_width: f64, s_freq: f64) -> Vec<f64> {
    let n = auto_filter_length(half_width, s_freq);
    let low = firwin(n, center - half_width, s_freq, true);
    let high = firwin(n, center + half_width, s_freq, true);

    let mut h: Vec<f64> = high.iter().zip(&low).map(|(a, b)| -(a - b)).collect();
    h[n / 2] += 1.0;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_length_is_odd() {
        for l_freq in [0.5_f64, 1.0, 2.0, 5.0] {
            let tb = auto_trans_bandwidth(l_freq);
            let n = auto_filter_length(tb, 256.0);
            assert!(n % 2 == 1, "N={n} is even for l_freq={l_freq}");
        }
    }

    #[test]
    fn highpass_sum_near_zero() {
        // A highpass filter should sum to ≈ 0 (no DC component passes).
        let h = design_highpass(0.5, 256.0);
        let s: f64 = h.iter().sum();
        assert!(s.abs() < 1e-9, "highpass sum = {s}");
    }

    #[test]
    fn highpass_is_symmetric() {
        // Linear-phase FIR must be symmetric.
        let h = design_highpass(0.5, 256.0);
        let n = h.len();
        for i in 0..n / 2 {
            approx::assert_abs_diff_eq!(h[i], h[n - 1 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn lowpass_dc_gain_unity() {
        let h = firwin(101, 10.0, 256.0, true);
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn notch_passes_dc() {
        // δ − bandpass: DC gain should remain ≈ 1.
        let h = design_notch(50.0, 2.0, 256.0);
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn notch_rejects_center_frequency() {
        let s_freq = 256.0;
        let h = design_notch(50.0, 2.0, s_freq);
        // Frequency response at 50 Hz via direct DTFT of the kernel.
        let omega = 2.0 * std::f64::consts::PI * 50.0 / s_freq;
        let (mut re, mut im) = (0.0, 0.0);
        for (i, &v) in h.iter().enumerate() {
            re += v * (omega * i as f64).cos();
            im -= v * (omega * i as f64).sin();
        }
        let gain = (re * re + im * im).sqrt();
        assert!(gain < 1e-2, "notch gain at center = {gain}");
    }
}
