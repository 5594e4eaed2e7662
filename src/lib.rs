//! # siglab — labeled signals and spectral analysis for EEG/ECoG/iEEG
//!
//! `siglab` holds multi-channel electrophysiology in a labeled,
//! trial-oriented container and provides the transforms that matter for
//! visual review and scoring pipelines: value-based selection, resampling,
//! FIR filtering, re-referencing, and a Fourier engine with multitaper
//! support. Pure Rust + [RustFFT](https://crates.io/crates/rustfft); no
//! BLAS, no Python.
//!
//! ## Pipeline overview
//!
//! ```text
//! reader (EDF, vendor binary, …)      — outside this crate
//!   │
//!   ├─ Dataset::read_data()      chan × time trials, NaN outside the record
//!   ├─ select()                  channels / time windows, [low, high)
//!   ├─ resample()                FIR anti-alias + decimate
//!   ├─ apply_fir() / notch_filter()
//!   ├─ average_reference()
//!   ├─ frequency()               chan × freq (Welch with `duration`)
//!   ├─ spectrogram() / stft()    chan × time × freq (× taper)
//!   └─ morlet_transform()        chan × time × freq, complex
//! ```
//!
//! Every transform consumes and produces a [`LabeledSignal`], so stages
//! compose freely: select a time window, compute its spectrum, then select
//! a frequency band from the result and reduce it to band power.
//!
//! ## Quick start
//!
//! ```
//! use siglab::{create_data, frequency, select, FrequencyOptions, Selector,
//!              SimulateOptions, Waveform};
//!
//! // 1. A synthetic 8-channel, 2-second recording with a 10 Hz rhythm.
//! let data = create_data(&SimulateOptions {
//!     time: (0.0, 2.0),
//!     waveform: Waveform::Sine { freq: 10.0 },
//!     ..SimulateOptions::default()
//! });
//!
//! // 2. Keep two channels and the first second.
//! let windowed = select(
//!     &data,
//!     &Selector::new()
//!         .labels("chan", &["chan00", "chan01"])
//!         .range("time", Some(0.0), Some(1.0)),
//! ).unwrap();
//!
//! // 3. Power spectrum; the "time" axis becomes "freq".
//! let psd = frequency(&windowed, &FrequencyOptions::default()).unwrap();
//! assert_eq!(psd.axis_names(), vec!["chan", "freq"]);
//!
//! // 4. Read one channel's spectrum back, in caller order.
//! let row = psd.query().pick("chan", "chan01").one(0).unwrap();
//! assert_eq!(row.len(), 129); // 256 samples → 129 one-sided bins
//! ```
//!
//! ## Reading values by coordinate
//!
//! [`LabeledSignal::query`] selects by axis *value* with caller-order
//! output and NaN gap-fill for unmatched requests; [`select`] is the hard
//! filter that drops what does not match. The two contracts are different
//! on purpose — see their docs.

pub mod axes;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod io;
pub mod math;
pub mod montage;
pub mod resample;
pub mod select;
pub mod signal;
pub mod simulate;
pub mod spectral;
pub mod windows;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `siglab::Foo` without having to know the internal module layout.

// container
pub use axes::{AxisPick, AxisValues};
pub use error::{Error, Result};
pub use signal::{LabeledSignal, Query, Sample};

// selection + resampling
pub use resample::resample;
pub use select::{select, Selector};

// filtering + referencing
pub use filter::{apply_fir, design_highpass, design_lowpass, design_notch, notch_filter};
pub use montage::{average_reference, reref};

// spectral core
pub use spectral::{
    fourier_coefficients, frequency, frequency_complex, morlet, morlet_transform,
    spectral_density, spectrogram, stft, Detrend, FrequencyOptions, MorletNormalization,
    MorletOptions, Scaling, Sides, SpectralOptions, Taper, TimeFrequencyOptions,
};

// math transforms
pub use math::{apply, magnitude, phase, reduce, Operator, Reducer};

// adapter contract + persistence + simulation
pub use dataset::{Dataset, Marker, MemoryReader, Reader, RecordingInfo};
pub use io::{load, save};
pub use simulate::{create_data, SimulateOptions, Waveform};
