//! Re-referencing across the channel axis.
//!
//! `average_reference` subtracts the mean over all channels at each sample;
//! `reref` subtracts the mean of an explicit set of reference channels
//! (e.g. linked mastoids). Both return new signals.

use ndarray::Axis;

use crate::error::{Error, Result};
use crate::signal::LabeledSignal;

/// Subtract the per-sample mean across `"chan"` from every channel.
pub fn average_reference(data: &LabeledSignal<f64>) -> Result<LabeledSignal<f64>> {
    let ax = data.index_of("chan")?;

    let mut out = data.empty_like(true);
    for i in 0..data.n_trials() {
        let mut array = data.trial_data(i)?.to_owned();
        if array.shape()[ax] > 0 {
            let means = array.mean_axis(Axis(ax)).unwrap();
            for mut slab in array.axis_iter_mut(Axis(ax)) {
                slab -= &means;
            }
        }
        out.attach_trial(array)?;
    }
    Ok(out)
}

/// Subtract the per-sample mean of the named reference channels from every
/// channel. Reference channels must exist on the `"chan"` axis of every
/// trial.
pub fn reref(data: &LabeledSignal<f64>, ref_chans: &[&str]) -> Result<LabeledSignal<f64>> {
    let ax = data.index_of("chan")?;
    if ref_chans.is_empty() {
        return Err(Error::InvalidArgument(
            "at least one reference channel is required".into(),
        ));
    }

    let mut out = data.empty_like(true);
    for i in 0..data.n_trials() {
        let labels = data
            .axis_values("chan", i)?
            .labels()
            .ok_or_else(|| Error::InvalidArgument("'chan' axis must hold labels".into()))?
            .to_vec();

        let mut indices = Vec::with_capacity(ref_chans.len());
        for &name in ref_chans {
            let k = labels
                .iter()
                .position(|l| l == name)
                .ok_or_else(|| Error::AxisNotFound(name.to_string()))?;
            indices.push(k);
        }

        let mut array = data.trial_data(i)?.to_owned();
        let reference = array.select(Axis(ax), &indices).mean_axis(Axis(ax)).unwrap();
        for mut slab in array.axis_iter_mut(Axis(ax)) {
            slab -= &reference;
        }
        out.attach_trial(array)?;
    }
    Ok(out)
}
