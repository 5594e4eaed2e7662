//! Axis coordinate arrays and the order-preserving index matcher.
//!
//! An axis is either categorical (channel labels) or numeric (time stamps,
//! frequency bins). The distinction decides how a requested value is matched
//! against the data: labels compare for equality, numeric values compare
//! exactly or within a caller-supplied tolerance.

/// Coordinate values along one axis of one trial.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValues {
    /// Categorical coordinates, e.g. channel names.
    Labels(Vec<String>),
    /// Numeric coordinates, e.g. time in seconds or frequency in Hz.
    Points(Vec<f64>),
}

impl AxisValues {
    /// Number of coordinate values.
    pub fn len(&self) -> usize {
        match self {
            AxisValues::Labels(v) => v.len(),
            AxisValues::Points(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The labels, if this axis is categorical.
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            AxisValues::Labels(v) => Some(v),
            AxisValues::Points(_) => None,
        }
    }

    /// The numeric values, if this axis is numeric.
    pub fn points(&self) -> Option<&[f64]> {
        match self {
            AxisValues::Labels(_) => None,
            AxisValues::Points(v) => Some(v),
        }
    }

    /// Evenly spaced numeric coordinates: `start + i / s_freq` for `i < n`.
    pub fn evenly_spaced(start: f64, n: usize, s_freq: f64) -> AxisValues {
        AxisValues::Points((0..n).map(|i| start + i as f64 / s_freq).collect())
    }

    /// Keep only the coordinates at `indices`, in that order.
    pub(crate) fn take(&self, indices: &[usize]) -> AxisValues {
        match self {
            AxisValues::Labels(v) => {
                AxisValues::Labels(indices.iter().map(|&i| v[i].clone()).collect())
            }
            AxisValues::Points(v) => {
                AxisValues::Points(indices.iter().map(|&i| v[i]).collect())
            }
        }
    }
}

impl From<Vec<String>> for AxisValues {
    fn from(v: Vec<String>) -> Self {
        AxisValues::Labels(v)
    }
}

impl From<Vec<&str>> for AxisValues {
    fn from(v: Vec<&str>) -> Self {
        AxisValues::Labels(v.into_iter().map(String::from).collect())
    }
}

impl From<Vec<f64>> for AxisValues {
    fn from(v: Vec<f64>) -> Self {
        AxisValues::Points(v)
    }
}

/// What a query requests along one axis.
///
/// Scalar variants squeeze the axis out of the result; vector variants keep
/// it, with the output ordered the way the caller ordered the request.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisPick {
    Label(String),
    Labels(Vec<String>),
    Point(f64),
    Points(Vec<f64>),
}

impl AxisPick {
    /// Requested values as coordinates plus the squeeze flag.
    pub(crate) fn expand(&self) -> (AxisValues, bool) {
        match self {
            AxisPick::Label(s) => (AxisValues::Labels(vec![s.clone()]), true),
            AxisPick::Labels(v) => (AxisValues::Labels(v.clone()), false),
            AxisPick::Point(x) => (AxisValues::Points(vec![*x]), true),
            AxisPick::Points(v) => (AxisValues::Points(v.clone()), false),
        }
    }
}

// A bare string is a scalar pick, never an iterable of characters.
impl From<&str> for AxisPick {
    fn from(s: &str) -> Self {
        AxisPick::Label(s.to_string())
    }
}

impl From<String> for AxisPick {
    fn from(s: String) -> Self {
        AxisPick::Label(s)
    }
}

impl From<f64> for AxisPick {
    fn from(x: f64) -> Self {
        AxisPick::Point(x)
    }
}

impl From<Vec<String>> for AxisPick {
    fn from(v: Vec<String>) -> Self {
        AxisPick::Labels(v)
    }
}

impl From<Vec<&str>> for AxisPick {
    fn from(v: Vec<&str>) -> Self {
        AxisPick::Labels(v.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AxisPick {
    fn from(v: [&str; N]) -> Self {
        AxisPick::Labels(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<f64>> for AxisPick {
    fn from(v: Vec<f64>) -> Self {
        AxisPick::Points(v)
    }
}

impl From<&[f64]> for AxisPick {
    fn from(v: &[f64]) -> Self {
        AxisPick::Points(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for AxisPick {
    fn from(v: [f64; N]) -> Self {
        AxisPick::Points(v.to_vec())
    }
}

/// Resolve requested coordinate values against the values present in the
/// data.
///
/// Returns paired index lists: `data_idx[j]` is the position in the data of
/// the j-th *matched* request, `out_idx[j]` its position in the output.
/// Requests with no match simply do not appear, which leaves a gap in the
/// output (filled with NaN by the caller). Order follows the request, and a
/// value requested twice appears twice.
///
/// Numeric matching is exact when `tolerance` is `None`; otherwise the first
/// data value within `tolerance` of the request wins.
pub(crate) fn match_indices(
    values: &AxisValues,
    wanted: &AxisValues,
    tolerance: Option<f64>,
) -> (Vec<usize>, Vec<usize>) {
    let mut data_idx = Vec::new();
    let mut out_idx = Vec::new();

    match (values, wanted) {
        (AxisValues::Labels(have), AxisValues::Labels(want)) => {
            for (j, label) in want.iter().enumerate() {
                if let Some(i) = have.iter().position(|x| x == label) {
                    data_idx.push(i);
                    out_idx.push(j);
                }
            }
        }
        (AxisValues::Points(have), AxisValues::Points(want)) => {
            for (j, &value) in want.iter().enumerate() {
                let hit = match tolerance {
                    None => have.iter().position(|&x| x == value),
                    Some(tol) => have.iter().position(|&x| (x - value).abs() <= tol),
                };
                if let Some(i) = hit {
                    data_idx.push(i);
                    out_idx.push(j);
                }
            }
        }
        // Kind mismatch (labels requested on a numeric axis or vice versa):
        // nothing matches, the caller warns and NaN-fills.
        _ => {}
    }

    (data_idx, out_idx)
}
