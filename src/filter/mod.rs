//! FIR filter design and application.
//!
//! - [`design`]: Hamming-windowed sinc lowpass/highpass/band-stop kernels
//!   with automatic transition bandwidth and length.
//! - [`apply`]: overlap-add zero-phase convolution along any named axis of a
//!   [`LabeledSignal`](crate::LabeledSignal).

pub mod apply;
pub mod design;

pub use apply::{apply_fir, filter_1d, notch_filter};
pub use design::{
    auto_filter_length, auto_trans_bandwidth, design_highpass, design_lowpass, design_notch,
    firwin,
};
