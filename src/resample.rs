//! Integer-factor downsampling with FIR anti-aliasing.
//!
//! The signal is low-pass filtered at the new Nyquist frequency
//! (zero-phase, overlap-add) and then decimated by keeping every q-th
//! sample. The decimated axis gets freshly interpolated coordinates between
//! the old first and last values, so the new maximum never exceeds the old
//! one.

use ndarray::{Axis, Slice};

use crate::axes::AxisValues;
use crate::error::{Error, Result};
use crate::filter::{design_lowpass, filter_1d};
use crate::signal::LabeledSignal;

/// Downsample along `axis` (normally `"time"`) to `s_freq` Hz.
///
/// The original rate must be an integer multiple (> 1) of the target rate;
/// anything else is rejected. `filter_order` overrides the anti-aliasing
/// FIR order (taps = order + 1, rounded to odd); the default is `10 * q`
/// taps for a decimation factor of `q`.
pub fn resample(
    data: &LabeledSignal<f64>,
    s_freq: f64,
    axis: &str,
    filter_order: Option<usize>,
) -> Result<LabeledSignal<f64>> {
    let ratio = data.s_freq() / s_freq;
    let q = ratio.round() as i64;
    if q < 2 || (ratio - q as f64).abs() > 1e-9 {
        return Err(Error::NonIntegerRatio {
            orig: data.s_freq(),
            target: s_freq,
        });
    }
    let q = q as usize;
    let ax = data.index_of(axis)?;

    let n_taps = filter_order.map(|n| n + 1).unwrap_or(10 * q);
    let h = design_lowpass(s_freq / 2.0, data.s_freq(), Some(n_taps));

    let mut out = data.empty_like(false);
    let axis_names = data.axis_names();
    let axis_names: Vec<String> = axis_names.iter().map(|s| s.to_string()).collect();

    for i in 0..data.n_trials() {
        let mut filtered = data.trial_data(i)?.to_owned();
        for mut lane in filtered.lanes_mut(Axis(ax)) {
            let x: Vec<f64> = lane.iter().copied().collect();
            let y = filter_1d(&x, &h)?;
            for (dst, src) in lane.iter_mut().zip(y) {
                *dst = src;
            }
        }

        let decimated = filtered
            .slice_axis(Axis(ax), Slice::new(0, None, q as isize))
            .to_owned();
        let n_new = decimated.shape()[ax];

        let mut coords = Vec::with_capacity(axis_names.len());
        for (k, name) in axis_names.iter().enumerate() {
            let values = data.axis_values(name, i)?;
            if k == ax {
                let old = values
                    .points()
                    .ok_or_else(|| Error::NotNumericAxis(name.clone()))?;
                coords.push(AxisValues::Points(linspace(
                    old.first().copied().unwrap_or(0.0),
                    old.last().copied().unwrap_or(0.0),
                    n_new,
                )));
            } else {
                coords.push(values.clone());
            }
        }

        out.push_trial(decimated, coords)?;
    }

    out.set_s_freq(s_freq);
    Ok(out)
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
