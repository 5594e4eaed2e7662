//! Uniform contract with recording readers.
//!
//! Format decoders live outside this crate; whatever the container (EDF,
//! vendor binary, network stream), a reader only has to expose a header, a
//! channels × samples slab in physical units, and optional markers. The
//! [`Dataset`] wrapper turns reader output into [`LabeledSignal`] trials
//! with channel labels and a time axis in seconds relative to the recording
//! start.

use std::time::SystemTime;

use ndarray::Array2;

use crate::axes::AxisValues;
use crate::error::{Error, Result};
use crate::signal::LabeledSignal;

/// Fixed facts about one recording.
#[derive(Debug, Clone)]
pub struct RecordingInfo {
    pub subject_id: String,
    pub start_time: SystemTime,
    pub s_freq: f64,
    pub chan_names: Vec<String>,
    pub n_samples: usize,
}

/// An event or annotation attached to the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    /// Seconds from the recording start.
    pub start: f64,
    pub end: f64,
    /// Channels the marker applies to; `None` means all.
    pub chan: Option<Vec<String>>,
}

/// What every format decoder must provide.
pub trait Reader {
    fn header(&self) -> Result<RecordingInfo>;

    /// Samples `begsam..endsam` (begsam may be negative, endsam may run past
    /// the recording) for the given channel indices, in physical units.
    /// Out-of-range samples are NaN-filled, never an error.
    fn data(&self, chan_indices: &[usize], begsam: i64, endsam: i64) -> Result<Array2<f64>>;

    fn markers(&self) -> Result<Vec<Marker>> {
        Ok(Vec::new())
    }
}

/// A recording plus its cached header.
pub struct Dataset {
    reader: Box<dyn Reader>,
    info: RecordingInfo,
}

impl Dataset {
    pub fn new(reader: Box<dyn Reader>) -> Result<Self> {
        let info = reader.header()?;
        Ok(Dataset { reader, info })
    }

    pub fn info(&self) -> &RecordingInfo {
        &self.info
    }

    pub fn markers(&self) -> Result<Vec<Marker>> {
        self.reader.markers()
    }

    /// Read one trial per `(begsam, endsam)` pair into a chan × time signal.
    ///
    /// `chan` selects channels by name in the requested order; `None` reads
    /// all channels. The paired sample lists must have equal lengths.
    pub fn read_data(
        &self,
        chan: Option<&[&str]>,
        begsam: &[i64],
        endsam: &[i64],
    ) -> Result<LabeledSignal<f64>> {
        if begsam.len() != endsam.len() {
            return Err(Error::MismatchedBounds {
                n_beg: begsam.len(),
                n_end: endsam.len(),
            });
        }

        let (names, indices): (Vec<String>, Vec<usize>) = match chan {
            None => (
                self.info.chan_names.clone(),
                (0..self.info.chan_names.len()).collect(),
            ),
            Some(wanted) => {
                let mut names = Vec::with_capacity(wanted.len());
                let mut indices = Vec::with_capacity(wanted.len());
                for &name in wanted {
                    let k = self
                        .info
                        .chan_names
                        .iter()
                        .position(|c| c == name)
                        .ok_or_else(|| Error::AxisNotFound(name.to_string()))?;
                    names.push(name.to_string());
                    indices.push(k);
                }
                (names, indices)
            }
        };

        let mut out = LabeledSignal::new(self.info.s_freq, &["chan", "time"]);
        out.set_start_time(Some(self.info.start_time));

        for (&beg, &end) in begsam.iter().zip(endsam) {
            if end < beg {
                return Err(Error::InvalidArgument(format!(
                    "endsam {end} precedes begsam {beg}"
                )));
            }
            let slab = self.reader.data(&indices, beg, end)?;
            let n = (end - beg) as usize;
            let time = AxisValues::Points(
                (0..n)
                    .map(|i| (beg + i as i64) as f64 / self.info.s_freq)
                    .collect(),
            );
            out.push_trial(
                slab.into_dyn(),
                vec![AxisValues::Labels(names.clone()), time],
            )?;
        }

        Ok(out)
    }
}

/// In-memory reader over a channels × samples matrix; used by tests, demos
/// and anything that already holds its samples.
pub struct MemoryReader {
    pub info: RecordingInfo,
    pub samples: Array2<f64>,
}

impl MemoryReader {
    pub fn new(info: RecordingInfo, samples: Array2<f64>) -> Self {
        MemoryReader { info, samples }
    }
}

impl Reader for MemoryReader {
    fn header(&self) -> Result<RecordingInfo> {
        Ok(self.info.clone())
    }

    fn data(&self, chan_indices: &[usize], begsam: i64, endsam: i64) -> Result<Array2<f64>> {
        let n = (endsam - begsam).max(0) as usize;
        let n_total = self.samples.ncols() as i64;
        let mut out = Array2::from_elem((chan_indices.len(), n), f64::NAN);
        for (row, &c) in chan_indices.iter().enumerate() {
            for i in 0..n {
                let s = begsam + i as i64;
                if s >= 0 && s < n_total {
                    out[[row, i]] = self.samples[[c, s as usize]];
                }
            }
        }
        Ok(out)
    }
}
