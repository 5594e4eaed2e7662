//! On-disk format for labeled signals.
//!
//! Single file: an 8-byte little-endian header length, a JSON header
//! describing sampling rate, axes (with per-trial coordinate values) and
//! per-trial shapes/byte offsets, then the raw f64 little-endian trial
//! payloads in order. Round-trips losslessly.

use std::fs::File;
use std::io::{Read as _, Write as _};
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use serde_json::{json, Value};

use crate::axes::AxisValues;
use crate::error::{Error, Result};
use crate::signal::LabeledSignal;

/// Write `data` to `path`, replacing any existing file.
pub fn save(data: &LabeledSignal<f64>, path: &Path) -> Result<()> {
    let names = data.axis_names();

    let mut axes = Vec::with_capacity(names.len());
    for name in &names {
        let mut per_trial = Vec::with_capacity(data.n_trials());
        let mut kind = "points";
        for i in 0..data.n_trials() {
            match data.axis_values(name, i)? {
                AxisValues::Labels(v) => {
                    kind = "labels";
                    per_trial.push(json!(v));
                }
                AxisValues::Points(v) => per_trial.push(json!(v)),
            }
        }
        axes.push(json!({ "name": name, "kind": kind, "values": per_trial }));
    }

    let mut trials = Vec::with_capacity(data.n_trials());
    let mut offset = 0usize;
    for i in 0..data.n_trials() {
        let array = data.trial_data(i)?;
        let n_bytes = array.len() * 8;
        trials.push(json!({
            "shape": array.shape(),
            "data_offsets": [offset, offset + n_bytes],
        }));
        offset += n_bytes;
    }

    let header = json!({
        "s_freq": data.s_freq(),
        "axes": axes,
        "trials": trials,
    });
    let header_bytes =
        serde_json::to_vec(&header).map_err(|e| Error::Malformed(e.to_string()))?;

    let mut f = File::create(path)?;
    f.write_all(&(header_bytes.len() as u64).to_le_bytes())?;
    f.write_all(&header_bytes)?;
    for i in 0..data.n_trials() {
        let array = data.trial_data(i)?;
        let contiguous = array.as_standard_layout();
        for &v in contiguous.iter() {
            f.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Read a signal previously written by [`save`].
pub fn load(path: &Path) -> Result<LabeledSignal<f64>> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    if bytes.len() < 8 {
        return Err(Error::Malformed("file shorter than its length field".into()));
    }

    let header_len = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    if bytes.len() < 8 + header_len {
        return Err(Error::Malformed("truncated header".into()));
    }
    let header: Value = serde_json::from_slice(&bytes[8..8 + header_len])
        .map_err(|e| Error::Malformed(e.to_string()))?;
    let data_start = 8 + header_len;

    let s_freq = header["s_freq"]
        .as_f64()
        .ok_or_else(|| Error::Malformed("missing s_freq".into()))?;

    let axes = header["axes"]
        .as_array()
        .ok_or_else(|| Error::Malformed("missing axes".into()))?;
    let names: Vec<String> = axes
        .iter()
        .map(|a| {
            a["name"]
                .as_str()
                .map(String::from)
                .ok_or_else(|| Error::Malformed("axis without a name".into()))
        })
        .collect::<Result<_>>()?;
    let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    let mut out = LabeledSignal::new(s_freq, &name_refs);

    let trials = header["trials"]
        .as_array()
        .ok_or_else(|| Error::Malformed("missing trials".into()))?;

    for (i, trial) in trials.iter().enumerate() {
        let shape: Vec<usize> = trial["shape"]
            .as_array()
            .ok_or_else(|| Error::Malformed("trial without a shape".into()))?
            .iter()
            .map(|v| v.as_u64().unwrap_or(0) as usize)
            .collect();
        let offsets = trial["data_offsets"]
            .as_array()
            .ok_or_else(|| Error::Malformed("trial without offsets".into()))?;
        let s = offsets[0].as_u64().unwrap_or(0) as usize;
        let e = offsets[1].as_u64().unwrap_or(0) as usize;
        if data_start + e > bytes.len() || e < s {
            return Err(Error::Malformed(format!("trial {i} payload out of bounds")));
        }

        let raw = &bytes[data_start + s..data_start + e];
        let values: Vec<f64> = raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
            .collect();
        let array = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| Error::Malformed(e.to_string()))?;

        let mut coords = Vec::with_capacity(axes.len());
        for axis in axes {
            let values = &axis["values"][i];
            let kind = axis["kind"].as_str().unwrap_or("points");
            let parsed = match kind {
                "labels" => AxisValues::Labels(
                    values
                        .as_array()
                        .ok_or_else(|| Error::Malformed("bad axis values".into()))?
                        .iter()
                        .map(|v| v.as_str().unwrap_or_default().to_string())
                        .collect(),
                ),
                _ => AxisValues::Points(
                    values
                        .as_array()
                        .ok_or_else(|| Error::Malformed("bad axis values".into()))?
                        .iter()
                        .map(|v| v.as_f64().unwrap_or(f64::NAN))
                        .collect(),
                ),
            };
            coords.push(parsed);
        }

        out.push_trial(array, coords)?;
    }

    Ok(out)
}
