//! The labeled multi-dimensional signal container.
//!
//! A [`LabeledSignal`] holds one n-dimensional array per trial plus, for each
//! named axis, one coordinate array per trial whose length equals the
//! matching data dimension. Trials are stored independently, so different
//! trials may have different durations (ragged shapes).
//!
//! Axis order is load-bearing: the position of an axis name in the axis table
//! is the dimension index of that axis in every trial's array.
//!
//! Reading values back goes through [`LabeledSignal::query`], which selects
//! by axis *value* (channel name, time stamp, frequency bin) rather than by
//! raw index, preserves the caller's requested order, and fills positions
//! with no matching data point with NaN instead of failing.

use std::time::SystemTime;

use log::warn;
use ndarray::{ArrayD, Axis, IxDyn};
use num_complex::Complex64;

use crate::axes::{match_indices, AxisPick, AxisValues};
use crate::error::{Error, Result};

/// Element types a signal can hold.
///
/// Both real samples and complex Fourier coefficients need a NaN
/// representation, because unmatched query positions are gap-filled.
pub trait Sample: Copy + PartialEq + std::fmt::Debug + 'static {
    fn nan() -> Self;
    fn is_nan(self) -> bool;
}

impl Sample for f64 {
    fn nan() -> Self {
        f64::NAN
    }

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }
}

impl Sample for Complex64 {
    fn nan() -> Self {
        Complex64::new(f64::NAN, f64::NAN)
    }

    fn is_nan(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }
}

#[derive(Debug, Clone)]
struct AxisEntry {
    name: String,
    /// One coordinate array per trial.
    per_trial: Vec<AxisValues>,
}

/// Container for multi-channel recordings and their derived representations.
///
/// Standard axis names are `"chan"`, `"time"`, `"freq"` and `"taper"`, but
/// any name works; transforms look axes up by name, never by convention.
#[derive(Debug, Clone)]
pub struct LabeledSignal<T: Sample = f64> {
    s_freq: f64,
    start_time: Option<SystemTime>,
    axes: Vec<AxisEntry>,
    trials: Vec<ArrayD<T>>,
}

impl<T: Sample> LabeledSignal<T> {
    /// Create an empty signal with the given axis order; populate it with
    /// [`push_trial`](Self::push_trial).
    pub fn new(s_freq: f64, axis_names: &[&str]) -> Self {
        LabeledSignal {
            s_freq,
            start_time: None,
            axes: axis_names
                .iter()
                .map(|&name| AxisEntry {
                    name: name.to_string(),
                    per_trial: Vec::new(),
                })
                .collect(),
            trials: Vec::new(),
        }
    }

    /// Sampling frequency in Hz (one value for the whole instance).
    pub fn s_freq(&self) -> f64 {
        self.s_freq
    }

    pub(crate) fn set_s_freq(&mut self, s_freq: f64) {
        self.s_freq = s_freq;
    }

    /// Absolute start of the recording, when known.
    pub fn start_time(&self) -> Option<SystemTime> {
        self.start_time
    }

    pub fn set_start_time(&mut self, t: Option<SystemTime>) {
        self.start_time = t;
    }

    /// Append one trial. `coords` must hold one coordinate array per axis, in
    /// axis order, each as long as the matching data dimension.
    pub fn push_trial(&mut self, data: ArrayD<T>, coords: Vec<AxisValues>) -> Result<()> {
        if coords.len() != self.axes.len() || data.ndim() != self.axes.len() {
            return Err(Error::InvalidArgument(format!(
                "expected {} axes, got {} coordinate arrays for {}-d data",
                self.axes.len(),
                coords.len(),
                data.ndim()
            )));
        }
        for (k, values) in coords.iter().enumerate() {
            if values.len() != data.shape()[k] {
                return Err(Error::ShapeMismatch {
                    axis: self.axes[k].name.clone(),
                    axis_len: values.len(),
                    dim_len: data.shape()[k],
                });
            }
        }
        for (entry, values) in self.axes.iter_mut().zip(coords) {
            entry.per_trial.push(values);
        }
        self.trials.push(data);
        Ok(())
    }

    /// Number of stored trials (the implicit trial axis).
    pub fn n_trials(&self) -> usize {
        self.trials.len()
    }

    /// Per-trial length of the named axis.
    pub fn number_of(&self, axis: &str) -> Result<Vec<usize>> {
        let k = self.index_of(axis)?;
        Ok(self.axes[k].per_trial.iter().map(|v| v.len()).collect())
    }

    /// Dimension index of the named axis in every trial's array.
    pub fn index_of(&self, axis: &str) -> Result<usize> {
        self.axes
            .iter()
            .position(|e| e.name == axis)
            .ok_or_else(|| Error::AxisNotFound(axis.to_string()))
    }

    /// Axis names in dimension order.
    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(|e| e.name.as_str()).collect()
    }

    /// Coordinate values of one axis for one trial.
    pub fn axis_values(&self, axis: &str, trial: usize) -> Result<&AxisValues> {
        let k = self.index_of(axis)?;
        self.axes[k]
            .per_trial
            .get(trial)
            .ok_or(Error::TrialOutOfRange {
                trial,
                n_trials: self.n_trials(),
            })
    }

    /// Raw array of one trial.
    pub fn trial_data(&self, trial: usize) -> Result<&ArrayD<T>> {
        self.trials.get(trial).ok_or(Error::TrialOutOfRange {
            trial,
            n_trials: self.n_trials(),
        })
    }

    /// Begin a value-based read; see [`Query`].
    pub fn query(&self) -> Query<'_, T> {
        Query {
            signal: self,
            tolerance: None,
            picks: Vec::new(),
        }
    }

    /// Iterate over single-trial copies of this signal.
    ///
    /// Each item is a full [`LabeledSignal`] holding a deep copy of one
    /// trial's data and coordinates, so per-trial processing can never alias
    /// the source. Calling this again restarts from the first trial.
    pub fn iter_trials(&self) -> impl Iterator<Item = LabeledSignal<T>> + '_ {
        (0..self.n_trials()).map(move |i| {
            let mut one = self.empty_like(false);
            one.trials.push(self.trials[i].clone());
            for (dst, src) in one.axes.iter_mut().zip(&self.axes) {
                dst.per_trial.push(src.per_trial[i].clone());
            }
            one
        })
    }

    /// Attach the next trial's data to a signal built with
    /// `empty_like(true)`, whose coordinate arrays were carried over from
    /// the source; the shape invariant is still enforced.
    pub(crate) fn attach_trial(&mut self, data: ArrayD<T>) -> Result<()> {
        let i = self.trials.len();
        for (k, entry) in self.axes.iter().enumerate() {
            let values = entry.per_trial.get(i).ok_or(Error::TrialOutOfRange {
                trial: i,
                n_trials: entry.per_trial.len(),
            })?;
            if values.len() != data.shape()[k] {
                return Err(Error::ShapeMismatch {
                    axis: entry.name.clone(),
                    axis_len: values.len(),
                    dim_len: data.shape()[k],
                });
            }
        }
        self.trials.push(data);
        Ok(())
    }

    /// Copy of this signal without the trials; with `keep_axes` the axis
    /// coordinate arrays are carried over, otherwise only the axis names
    /// (the caller will push its own coordinates).
    pub(crate) fn empty_like(&self, keep_axes: bool) -> LabeledSignal<T> {
        LabeledSignal {
            s_freq: self.s_freq,
            start_time: self.start_time,
            axes: self
                .axes
                .iter()
                .map(|e| AxisEntry {
                    name: e.name.clone(),
                    per_trial: if keep_axes { e.per_trial.clone() } else { Vec::new() },
                })
                .collect(),
            trials: Vec::new(),
        }
    }

    /// Same layout, different element type (used when a transform changes the
    /// element type, e.g. real samples to complex coefficients).
    pub(crate) fn empty_like_as<U: Sample>(&self, axis_names: &[&str]) -> LabeledSignal<U> {
        let mut out = LabeledSignal::new(self.s_freq, axis_names);
        out.start_time = self.start_time;
        out
    }
}

/// Builder for value-based reads of a [`LabeledSignal`].
///
/// For every axis without a pick, all coordinate values pass through. A
/// picked axis is reordered to the request: output position `j` holds the
/// data point whose coordinate matched requested value `j`, or NaN if none
/// did. Multiple picks compose as an outer product. Scalar picks squeeze
/// their axis out of the result.
#[derive(Debug)]
pub struct Query<'a, T: Sample> {
    signal: &'a LabeledSignal<T>,
    tolerance: Option<f64>,
    picks: Vec<(String, AxisPick)>,
}

impl<'a, T: Sample> Query<'a, T> {
    /// Accept numeric coordinates within `tol` of the requested value
    /// (guards against floating-point drift in computed time stamps).
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Request values along one axis.
    pub fn pick(mut self, axis: &str, pick: impl Into<AxisPick>) -> Self {
        self.picks.push((axis.to_string(), pick.into()));
        self
    }

    /// Run the query on a single trial, returning the bare array.
    pub fn one(self, trial: usize) -> Result<ArrayD<T>> {
        self.check_axes()?;
        self.extract(trial)
    }

    /// Run the query on an explicit set of trials.
    pub fn trials(self, trials: &[usize]) -> Result<Vec<ArrayD<T>>> {
        self.check_axes()?;
        trials.iter().map(|&i| self.extract(i)).collect()
    }

    /// Run the query on every trial.
    pub fn get(self) -> Result<Vec<ArrayD<T>>> {
        self.check_axes()?;
        (0..self.signal.n_trials()).map(|i| self.extract(i)).collect()
    }

    fn check_axes(&self) -> Result<()> {
        for (name, _) in &self.picks {
            self.signal.index_of(name)?;
        }
        Ok(())
    }

    fn extract(&self, trial: usize) -> Result<ArrayD<T>> {
        let data = self.signal.trial_data(trial)?;
        let ndim = self.signal.axes.len();

        let mut out_shape = Vec::with_capacity(ndim);
        let mut idx_data: Vec<Vec<usize>> = Vec::with_capacity(ndim);
        let mut idx_out: Vec<Vec<usize>> = Vec::with_capacity(ndim);
        let mut squeeze = Vec::new();

        for (k, entry) in self.signal.axes.iter().enumerate() {
            match self.picks.iter().find(|(name, _)| name == &entry.name) {
                Some((_, pick)) => {
                    let (wanted, scalar) = pick.expand();
                    let (d, o) = match_indices(&entry.per_trial[trial], &wanted, self.tolerance);
                    if d.is_empty() {
                        warn!("no values selected on axis '{}'", entry.name);
                    }
                    out_shape.push(wanted.len());
                    idx_data.push(d);
                    idx_out.push(o);
                    if scalar {
                        squeeze.push(k);
                    }
                }
                None => {
                    let n = entry.per_trial[trial].len();
                    out_shape.push(n);
                    idx_data.push((0..n).collect());
                    idx_out.push((0..n).collect());
                }
            }
        }

        let mut out = ArrayD::from_elem(IxDyn(&out_shape), T::nan());

        // Outer-product copy, but only when every axis matched something;
        // otherwise the whole trial stays NaN (soft failure).
        if idx_data.iter().all(|v| !v.is_empty()) {
            let mut pos = vec![0usize; ndim];
            let mut src = vec![0usize; ndim];
            let mut dst = vec![0usize; ndim];
            let total: usize = idx_data.iter().map(|v| v.len()).product();
            for _ in 0..total {
                for k in 0..ndim {
                    src[k] = idx_data[k][pos[k]];
                    dst[k] = idx_out[k][pos[k]];
                }
                out[IxDyn(&dst)] = data[IxDyn(&src)];
                for k in (0..ndim).rev() {
                    pos[k] += 1;
                    if pos[k] < idx_data[k].len() {
                        break;
                    }
                    pos[k] = 0;
                }
            }
        }

        for &k in squeeze.iter().rev() {
            out = out.remove_axis(Axis(k));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn two_chan() -> LabeledSignal {
        let mut data = LabeledSignal::new(100.0, &["chan", "time"]);
        let values =
            Array2::from_shape_fn((2, 5), |(c, t)| (c * 10 + t) as f64).into_dyn();
        data.push_trial(
            values,
            vec![
                AxisValues::from(vec!["c0", "c1"]),
                AxisValues::evenly_spaced(0.0, 5, 100.0),
            ],
        )
        .unwrap();
        data
    }

    #[test]
    fn push_trial_rejects_mismatched_coords() {
        let mut data = LabeledSignal::<f64>::new(100.0, &["chan", "time"]);
        let values = Array2::zeros((2, 5)).into_dyn();
        let err = data
            .push_trial(
                values,
                vec![
                    AxisValues::from(vec!["c0", "c1", "c2"]),
                    AxisValues::evenly_spaced(0.0, 5, 100.0),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn index_of_and_number_of() {
        let data = two_chan();
        assert_eq!(data.index_of("time").unwrap(), 1);
        assert_eq!(data.number_of("chan").unwrap(), vec![2]);
        assert!(matches!(
            data.number_of("freq"),
            Err(Error::AxisNotFound(_))
        ));
    }

    #[test]
    fn full_passthrough_returns_everything() {
        let data = two_chan();
        let out = data.query().one(0).unwrap();
        assert_eq!(out.shape(), &[2, 5]);
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[1, 4]], 14.0);
    }

    #[test]
    fn scalar_pick_squeezes_axis() {
        let data = two_chan();
        let out = data.query().pick("chan", "c1").one(0).unwrap();
        assert_eq!(out.shape(), &[5]);
        assert_eq!(out[[0]], 10.0);
    }

    #[test]
    fn unknown_axis_is_an_error() {
        let data = two_chan();
        let err = data.query().pick("freq", [1.0]).one(0).unwrap_err();
        assert!(matches!(err, Error::AxisNotFound(_)));
    }

    #[test]
    fn outer_product_composition() {
        let data = two_chan();
        let out = data
            .query()
            .pick("chan", ["c1", "c0"])
            .pick("time", [0.04, 0.0])
            .one(0)
            .unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out[[0, 0]], 14.0); // c1 at 0.04 s
        assert_eq!(out[[0, 1]], 10.0); // c1 at 0.0 s
        assert_eq!(out[[1, 0]], 4.0); // c0 at 0.04 s
        assert_eq!(out[[1, 1]], 0.0); // c0 at 0.0 s
    }

    #[test]
    fn iter_trials_is_restartable() {
        let data = two_chan();
        assert_eq!(data.iter_trials().count(), 1);
        let copies: Vec<_> = data.iter_trials().collect();
        assert_eq!(copies[0].n_trials(), 1);
        assert_eq!(
            copies[0].axis_values("chan", 0).unwrap(),
            data.axis_values("chan", 0).unwrap()
        );
    }
}
