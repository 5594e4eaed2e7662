//! Point-wise and axis-reducing transforms on labeled signals.
//!
//! All functions copy the input (value semantics); axis-reducing operators
//! remove the axis from the output's axis table, so downstream code sees
//! one dimension less.

use log::debug;
use ndarray::Axis;
use num_complex::Complex64;

use crate::error::Result;
use crate::signal::LabeledSignal;

/// Point-wise operators: the output keeps every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Abs,
    Square,
    Sqrt,
    Log,
    Log10,
    /// 10 · log10(x)
    Db,
    Exp,
    Negate,
}

impl Operator {
    fn eval(self, x: f64) -> f64 {
        match self {
            Operator::Abs => x.abs(),
            Operator::Square => x * x,
            Operator::Sqrt => x.sqrt(),
            Operator::Log => x.ln(),
            Operator::Log10 => x.log10(),
            Operator::Db => 10.0 * x.log10(),
            Operator::Exp => x.exp(),
            Operator::Negate => -x,
        }
    }
}

/// Apply a point-wise operator to every sample.
pub fn apply(data: &LabeledSignal<f64>, op: Operator) -> Result<LabeledSignal<f64>> {
    debug!("running operator {op:?} on each datapoint");
    let mut out = data.empty_like(true);
    for i in 0..data.n_trials() {
        out.attach_trial(data.trial_data(i)?.mapv(|v| op.eval(v)))?;
    }
    Ok(out)
}

/// Magnitude of a complex signal, e.g. of Fourier coefficients or a Morlet
/// convolution.
pub fn magnitude(data: &LabeledSignal<Complex64>) -> Result<LabeledSignal<f64>> {
    let names = data.axis_names();
    let mut out: LabeledSignal<f64> = data.empty_like_as(&names);
    for i in 0..data.n_trials() {
        let coords = names
            .iter()
            .map(|name| data.axis_values(name, i).map(|v| v.clone()))
            .collect::<Result<Vec<_>>>()?;
        out.push_trial(data.trial_data(i)?.mapv(|v| v.norm()), coords)?;
    }
    Ok(out)
}

/// Phase angle (radians) of a complex signal.
pub fn phase(data: &LabeledSignal<Complex64>) -> Result<LabeledSignal<f64>> {
    let names = data.axis_names();
    let mut out: LabeledSignal<f64> = data.empty_like_as(&names);
    for i in 0..data.n_trials() {
        let coords = names
            .iter()
            .map(|name| data.axis_values(name, i).map(|v| v.clone()))
            .collect::<Result<Vec<_>>>()?;
        out.push_trial(data.trial_data(i)?.mapv(|v| v.arg()), coords)?;
    }
    Ok(out)
}

/// Axis-reducing operators: the output loses the reduced axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
    /// Population standard deviation (ddof = 0).
    Std,
    Min,
    Max,
}

impl Reducer {
    fn eval(self, lane: &[f64]) -> f64 {
        let n = lane.len() as f64;
        match self {
            Reducer::Sum => lane.iter().sum(),
            Reducer::Mean => lane.iter().sum::<f64>() / n,
            Reducer::Std => {
                let mean = lane.iter().sum::<f64>() / n;
                (lane.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt()
            }
            Reducer::Min => lane.iter().copied().fold(f64::INFINITY, f64::min),
            Reducer::Max => lane.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Collapse the named axis with a reducer; the axis disappears from the
/// output. Reducing an axis that does not exist (e.g. one already removed
/// by a previous reduction) is an error.
pub fn reduce(data: &LabeledSignal<f64>, r: Reducer, axis: &str) -> Result<LabeledSignal<f64>> {
    let ax = data.index_of(axis)?;
    debug!("running reducer {r:?} on axis {axis}");

    let names = data.axis_names();
    let kept: Vec<&str> = names
        .iter()
        .enumerate()
        .filter(|(k, _)| *k != ax)
        .map(|(_, n)| *n)
        .collect();

    let mut out: LabeledSignal<f64> = data.empty_like_as(&kept);
    for i in 0..data.n_trials() {
        let coords = kept
            .iter()
            .map(|name| data.axis_values(name, i).map(|v| v.clone()))
            .collect::<Result<Vec<_>>>()?;
        let reduced = data.trial_data(i)?.map_axis(Axis(ax), |lane| {
            let v: Vec<f64> = lane.iter().copied().collect();
            r.eval(&v)
        });
        out.push_trial(reduced, coords)?;
    }
    Ok(out)
}
