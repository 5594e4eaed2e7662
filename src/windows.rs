//! Standard window functions shared by the filter designs and the spectral
//! tapers.
//!
//! All windows are returned unnormalized; callers apply whichever
//! normalization their scaling convention needs.

use std::f64::consts::PI;

/// Rectangular window (all ones).
pub fn boxcar(n: usize) -> Vec<f64> {
    vec![1.0; n]
}

/// Periodic Hann window (the DFT-even form used for spectral analysis).
pub fn hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Symmetric Hamming window (the filter-design form).
pub fn hamming(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Periodic Blackman window.
pub fn blackman(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = 2.0 * PI * i as f64 / n as f64;
            0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
        })
        .collect()
}

/// Periodic cosine (half-sine) window.
pub fn cosine(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (PI * (i as f64 + 0.5) / n as f64).sin())
        .collect()
}
