//! Hard filtering of trials and axis ranges.
//!
//! [`select`] takes a signal and returns a new, smaller signal: unmatched
//! entries are *dropped*, unlike [`LabeledSignal::query`] which keeps the
//! requested layout and fills gaps with NaN. The two contracts are
//! intentionally different: query is for exploratory reads with
//! placeholders, select is for carving out the data a pipeline stage will
//! actually process.

use log::debug;

use crate::axes::AxisValues;
use crate::error::{Error, Result};
use crate::signal::{LabeledSignal, Sample};

/// One axis constraint inside a [`Selector`].
#[derive(Debug, Clone)]
enum AxisFilter {
    /// Categorical axes: explicit values to keep (or to drop with invert).
    Labels(Vec<String>),
    /// Numeric axes: half-open interval `[low, high)`; `None` is unbounded.
    Range { low: Option<f64>, high: Option<f64> },
}

/// Builder describing which trials and axis values survive a [`select`].
#[derive(Debug, Clone, Default)]
pub struct Selector {
    trials: Option<Vec<usize>>,
    invert: bool,
    axes: Vec<(String, AxisFilter)>,
}

impl Selector {
    pub fn new() -> Self {
        Selector::default()
    }

    /// Keep only these trial indices (or drop them, with [`invert`](Self::invert)).
    pub fn trials(mut self, trials: &[usize]) -> Self {
        self.trials = Some(trials.to_vec());
        self
    }

    /// Complement every constraint: drop what would have been kept.
    pub fn invert(mut self) -> Self {
        self.invert = true;
        self
    }

    /// Keep these values of a categorical axis, in the order given here.
    pub fn labels<S: AsRef<str>>(mut self, axis: &str, keep: &[S]) -> Self {
        self.axes.push((
            axis.to_string(),
            AxisFilter::Labels(keep.iter().map(|s| s.as_ref().to_string()).collect()),
        ));
        self
    }

    /// Keep values of a numeric axis inside `[low, high)`.
    pub fn range(mut self, axis: &str, low: Option<f64>, high: Option<f64>) -> Self {
        self.axes.push((axis.to_string(), AxisFilter::Range { low, high }));
        self
    }

    fn kept_indices(
        &self,
        name: &str,
        values: &AxisValues,
        filter: &AxisFilter,
    ) -> Result<Vec<usize>> {
        let kept = match (filter, values) {
            (AxisFilter::Labels(keep), AxisValues::Labels(have)) => {
                if self.invert {
                    // Complement keeps data order.
                    have.iter()
                        .enumerate()
                        .filter(|(_, label)| !keep.contains(label))
                        .map(|(i, _)| i)
                        .collect()
                } else {
                    // Requested order; values absent from the data are dropped.
                    keep.iter()
                        .filter_map(|label| have.iter().position(|x| x == label))
                        .collect()
                }
            }
            (AxisFilter::Range { low, high }, AxisValues::Points(have)) => {
                let inside = |x: f64| {
                    low.map_or(true, |lo| lo <= x) && high.map_or(true, |hi| x < hi)
                };
                have.iter()
                    .enumerate()
                    .filter(|(_, &x)| inside(x) != self.invert)
                    .map(|(i, _)| i)
                    .collect()
            }
            (AxisFilter::Labels(_), AxisValues::Points(_)) => {
                return Err(Error::InvalidArgument(format!(
                    "axis '{name}' is numeric; select it with a range"
                )))
            }
            (AxisFilter::Range { .. }, AxisValues::Labels(_)) => {
                return Err(Error::NotNumericAxis(name.to_string()))
            }
        };
        Ok(kept)
    }
}

/// Apply a [`Selector`], producing a new signal with recomputed coordinate
/// arrays and correspondingly filtered data. The input is never mutated.
///
/// An empty match is legal and yields a zero-length axis, not an error.
pub fn select<T: Sample>(data: &LabeledSignal<T>, sel: &Selector) -> Result<LabeledSignal<T>> {
    for (name, _) in &sel.axes {
        data.index_of(name)?;
    }

    let trials: Vec<usize> = match &sel.trials {
        None => (0..data.n_trials()).collect(),
        Some(wanted) => {
            for &t in wanted {
                if t >= data.n_trials() {
                    return Err(Error::TrialOutOfRange {
                        trial: t,
                        n_trials: data.n_trials(),
                    });
                }
            }
            if sel.invert {
                (0..data.n_trials()).filter(|t| !wanted.contains(t)).collect()
            } else {
                wanted.clone()
            }
        }
    };

    let axis_names = data.axis_names();
    let mut out = data.empty_like(false);

    for &i in &trials {
        debug!("selection on trial {i}");
        let mut array = data.trial_data(i)?.to_owned();
        let mut coords = Vec::with_capacity(axis_names.len());

        for (k, name) in axis_names.iter().enumerate() {
            let values = data.axis_values(name, i)?;
            match sel.axes.iter().find(|(n, _)| n == name) {
                Some((_, filter)) => {
                    let kept = sel.kept_indices(name, values, filter)?;
                    debug!("axis {name}: keeping {} of {} values", kept.len(), values.len());
                    array = array.select(ndarray::Axis(k), &kept);
                    coords.push(values.take(&kept));
                }
                None => coords.push(values.clone()),
            }
        }

        out.push_trial(array, coords)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::AxisValues;
    use ndarray::Array2;

    fn make() -> LabeledSignal {
        let mut data = LabeledSignal::new(10.0, &["chan", "time"]);
        for trial in 0..2 {
            let values = Array2::from_shape_fn((3, 10), |(c, t)| {
                (trial * 100 + c * 10 + t) as f64
            })
            .into_dyn();
            data.push_trial(
                values,
                vec![
                    AxisValues::from(vec!["a", "b", "c"]),
                    AxisValues::evenly_spaced(0.0, 10, 10.0),
                ],
            )
            .unwrap();
        }
        data
    }

    #[test]
    fn keeps_caller_order_for_labels() {
        let data = make();
        let out = select(&data, &Selector::new().labels("chan", &["c", "a"])).unwrap();
        assert_eq!(
            out.axis_values("chan", 0).unwrap(),
            &AxisValues::from(vec!["c", "a"])
        );
        assert_eq!(out.trial_data(0).unwrap()[[0, 0]], 20.0);
        assert_eq!(out.trial_data(0).unwrap()[[1, 0]], 0.0);
    }

    #[test]
    fn missing_labels_are_dropped_not_nan() {
        let data = make();
        let out = select(&data, &Selector::new().labels("chan", &["a", "nope"])).unwrap();
        assert_eq!(out.number_of("chan").unwrap(), vec![1, 1]);
    }

    #[test]
    fn half_open_time_range() {
        let data = make();
        let out = select(&data, &Selector::new().range("time", Some(0.2), Some(0.5))).unwrap();
        // 0.2, 0.3, 0.4 — the right edge is excluded.
        assert_eq!(out.number_of("time").unwrap(), vec![3, 3]);
        assert_eq!(out.trial_data(0).unwrap()[[0, 0]], 2.0);
    }

    #[test]
    fn unbounded_range_sides() {
        let data = make();
        let out = select(&data, &Selector::new().range("time", None, Some(0.3))).unwrap();
        assert_eq!(out.number_of("time").unwrap(), vec![3, 3]);
        let out = select(&data, &Selector::new().range("time", Some(0.7), None)).unwrap();
        assert_eq!(out.number_of("time").unwrap(), vec![3, 3]);
    }

    #[test]
    fn invert_complements_labels_in_data_order() {
        let data = make();
        let out = select(
            &data,
            &Selector::new().labels("chan", &["b"]).invert(),
        )
        .unwrap();
        assert_eq!(
            out.axis_values("chan", 0).unwrap(),
            &AxisValues::from(vec!["a", "c"])
        );
    }

    #[test]
    fn invert_trial_selection() {
        let data = make();
        let out = select(&data, &Selector::new().trials(&[0]).invert()).unwrap();
        assert_eq!(out.n_trials(), 1);
        assert_eq!(out.trial_data(0).unwrap()[[0, 0]], 100.0);
    }

    #[test]
    fn empty_selection_is_legal() {
        let data = make();
        let out = select(&data, &Selector::new().range("time", Some(5.0), None)).unwrap();
        assert_eq!(out.number_of("time").unwrap(), vec![0, 0]);
        assert_eq!(out.trial_data(0).unwrap().shape(), &[3, 0]);
    }

    #[test]
    fn never_mutates_input() {
        let data = make();
        let _ = select(&data, &Selector::new().labels("chan", &["a"])).unwrap();
        assert_eq!(data.number_of("chan").unwrap(), vec![3, 3]);
    }
}
