use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use siglab::{
    create_data, frequency, load, reduce, select, FrequencyOptions, Reducer, Selector,
    SimulateOptions, Waveform,
};

#[derive(Parser)]
#[command(name = "spectrum", about = "Per-channel band power of a recording")]
struct Args {
    /// Saved signal file (from siglab::save); simulates data when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Frequency of the simulated rhythm in Hz
    #[arg(long, default_value_t = 10.0)]
    sim_freq: f64,

    /// Duration of the simulated recording in seconds
    #[arg(long, default_value_t = 30.0)]
    sim_dur: f64,

    /// Welch sub-epoch length in seconds
    #[arg(long, default_value_t = 1.0)]
    duration: f64,

    /// Band of interest: low edge (Hz)
    #[arg(long, default_value_t = 8.0)]
    band_low: f64,

    /// Band of interest: high edge (Hz)
    #[arg(long, default_value_t = 12.0)]
    band_high: f64,

    /// Channels to analyze (comma-separated); all channels when empty
    #[arg(long, default_value = "")]
    chan: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data = match &args.input {
        Some(path) => load(path)?,
        None => create_data(&SimulateOptions {
            time: (0.0, args.sim_dur),
            waveform: Waveform::Sine { freq: args.sim_freq },
            ..SimulateOptions::default()
        }),
    };
    println!(
        "{} trial(s), {} channel(s) @ {} Hz",
        data.n_trials(),
        data.number_of("chan")?[0],
        data.s_freq()
    );

    let data = if args.chan.is_empty() {
        data
    } else {
        let wanted: Vec<&str> = args.chan.split(',').collect();
        select(&data, &Selector::new().labels("chan", &wanted))?
    };

    // Welch power spectrum, then band power by composing a frequency-range
    // selection with a sum over the "freq" axis.
    let psd = frequency(
        &data,
        &FrequencyOptions {
            duration: Some(args.duration),
            ..FrequencyOptions::default()
        },
    )?;
    let band = select(
        &psd,
        &Selector::new().range("freq", Some(args.band_low), Some(args.band_high)),
    )?;
    let power = reduce(&band, Reducer::Sum, "freq")?;

    for trial in 0..power.n_trials() {
        let labels = power.axis_values("chan", trial)?.labels().unwrap().to_vec();
        let values = power.trial_data(trial)?;
        println!("trial {trial}:");
        for (c, name) in labels.iter().enumerate() {
            println!(
                "  {name:>8}  {:.6} (signal²/Hz in {}–{} Hz)",
                values[[c]],
                args.band_low,
                args.band_high
            );
        }
    }

    Ok(())
}
