//! Synthetic recordings for tests, demos and benchmarks.
//!
//! Deterministic by construction: the noise generator is a seeded xorshift,
//! so a given [`SimulateOptions`] always produces the same signal.

use ndarray::Array2;

use crate::axes::AxisValues;
use crate::signal::LabeledSignal;

/// Shape of the simulated signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// White noise.
    Noise,
    /// Sine at a fixed frequency, random phase per channel.
    Sine { freq: f64 },
    /// Constant value (useful for scaling checks).
    Constant { value: f64 },
}

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub n_trial: usize,
    pub chan_names: Vec<String>,
    pub s_freq: f64,
    /// Start and end of the time axis in seconds.
    pub time: (f64, f64),
    pub waveform: Waveform,
    /// Peak amplitude of the generated signal.
    pub amplitude: f64,
    pub seed: u64,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        SimulateOptions {
            n_trial: 1,
            chan_names: (0..8).map(|i| format!("chan{i:02}")).collect(),
            s_freq: 256.0,
            time: (0.0, 1.0),
            waveform: Waveform::Noise,
            amplitude: 1.0,
            seed: 0,
        }
    }
}

/// Build a chan × time signal from scratch.
pub fn create_data(opts: &SimulateOptions) -> LabeledSignal<f64> {
    let n_chan = opts.chan_names.len();
    let n_time = (((opts.time.1 - opts.time.0) * opts.s_freq).round() as usize).max(1);

    let mut rng = Xorshift::new(opts.seed);
    let mut data = LabeledSignal::new(
        opts.s_freq,
        &["chan", "time"],
    );

    for _ in 0..opts.n_trial {
        let values = match opts.waveform {
            Waveform::Noise => Array2::from_shape_fn((n_chan, n_time), |_| {
                opts.amplitude * rng.normal()
            }),
            Waveform::Sine { freq } => {
                let phases: Vec<f64> = (0..n_chan)
                    .map(|_| rng.uniform() * 2.0 * std::f64::consts::PI)
                    .collect();
                Array2::from_shape_fn((n_chan, n_time), |(c, t)| {
                    let time = opts.time.0 + t as f64 / opts.s_freq;
                    opts.amplitude
                        * (2.0 * std::f64::consts::PI * freq * time + phases[c]).sin()
                })
            }
            Waveform::Constant { value } => Array2::from_elem((n_chan, n_time), value),
        };

        let chan: Vec<&str> = opts.chan_names.iter().map(|s| s.as_str()).collect();
        data.push_trial(
            values.into_dyn(),
            vec![
                AxisValues::from(chan),
                AxisValues::evenly_spaced(opts.time.0, n_time, opts.s_freq),
            ],
        )
        .expect("simulated coordinates match the simulated data");
    }

    data
}

/// xorshift64* generator; good enough for test noise, no external state.
struct Xorshift {
    state: u64,
}

impl Xorshift {
    fn new(seed: u64) -> Self {
        Xorshift {
            state: seed.wrapping_mul(2685821657736338717).max(1),
        }
    }

    /// Uniform in [0, 1).
    fn uniform(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(2685821657736338717) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Approximately standard normal (sum of uniforms).
    fn normal(&mut self) -> f64 {
        (0..12).map(|_| self.uniform()).sum::<f64>() - 6.0
    }
}
