// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Workbench
//!
//! Command line access to the spectrogram core for checking plans and results without a renderer.
//! Nothing is drawn; every command prints a short report.
//!
//! ## Usage
//!
//! ```text
//! workbench pow2 100
//! workbench plan --samples 1000 --sample-rate 100
//! workbench sine --freq 12.5 --sample-rate 100 --seconds 20 --db-scale
//! workbench file trace.txt --sample-rate 40 --config specgram.toml
//! ```
//!
//! Pipeline options may come from a TOML file given with `--config`.  Flags on the command line win
//! over the file.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use specgram_lib::{
    axis::AxisDescriptor,
    dsp::{self, plan::WindowPlan, window::WindowFunction},
    spectrogram, SpecgramError, Spectrogram, SpectrogramArgs,
};

#[derive(Parser, Debug)]
#[command(name = "workbench")]
#[command(about = "Inspect spectrogram plans and results.", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Log debug detail from the pipeline
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, thiserror::Error)]
enum WorkbenchError {
    #[error("{0}")]
    Specgram(#[from] SpecgramError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: cannot read {text:?} as a sample")]
    Parse { line: usize, text: String },
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Round a length to the nearest power of two
    Pow2(Pow2Args),
    /// Show how a signal of some length would be segmented
    Plan(PlanArgs),
    /// Analyze a generated sine wave and locate its peak
    Sine(SineArgs),
    /// Analyze samples read from a text file
    File(FileArgs),
    /// Show the resolved pipeline options
    Config(ConfigArgs),
}

#[derive(clap::Args, Debug)]
struct Pow2Args {
    #[arg(index = 1, required = true)]
    x: f64,
}

#[derive(clap::Args, Debug)]
struct PlanArgs {
    /// Signal length in samples
    #[arg(long)]
    samples: usize,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(clap::Args, Debug)]
struct SineArgs {
    /// Sine frequency in Hz
    #[arg(long, default_value_t = 5.0)]
    freq: f64,

    /// Signal length in seconds
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(clap::Args, Debug)]
struct FileArgs {
    /// Whitespace separated samples.  Lines starting with `#` are skipped.
    #[arg(index = 1, required = true)]
    path: PathBuf,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(clap::Args, Debug)]
struct ConfigArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum WindowChoice {
    /// Rectangle, no taper
    Boxcar,
    Hann,
    Hamming,
    /// Triangle
    Bartlett,
    Welch,
}

impl From<WindowChoice> for WindowFunction {
    fn from(w: WindowChoice) -> Self {
        match w {
            WindowChoice::Boxcar => WindowFunction::BoxCar,
            WindowChoice::Hann => WindowFunction::Hann,
            WindowChoice::Hamming => WindowFunction::Hamming,
            WindowChoice::Bartlett => WindowFunction::Bartlett,
            WindowChoice::Welch => WindowFunction::Welch,
        }
    }
}

#[derive(clap::Args, Debug)]
struct PipelineArgs {
    /// TOML file with pipeline options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Samples per second
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Overlap fraction of neighboring segments, [0, 1)
    #[arg(long)]
    overlap: Option<f64>,

    /// FFT window length in seconds
    #[arg(long)]
    window_seconds: Option<f64>,

    /// Bin edges for a logarithmic frequency axis instead of an image extent
    #[arg(long)]
    log_frequency: bool,

    /// Decibel amplitudes instead of square roots
    #[arg(long)]
    db_scale: bool,

    /// Zero padding multiplier
    #[arg(long, conflicts_with = "no_pad")]
    pad_multiplier: Option<f64>,

    /// Disable zero padding
    #[arg(long)]
    no_pad: bool,

    /// Color clip fractions, `low,high`
    #[arg(long, value_delimiter = ',', num_args = 2)]
    clip: Option<Vec<f64>>,

    /// Segment taper
    #[arg(long, value_enum)]
    window: Option<WindowChoice>,
}

impl PipelineArgs {
    /// File values first, then flags.
    fn resolve(&self) -> Result<SpectrogramArgs, WorkbenchError> {
        let mut args = match &self.config {
            Some(path) => {
                info!("reading options from {}", path.display());
                SpectrogramArgs::from_toml(&std::fs::read_to_string(path)?)?
            }
            None => SpectrogramArgs::default(),
        };
        if let Some(fs) = self.sample_rate {
            args.sample_rate = fs;
        }
        if let Some(overlap) = self.overlap {
            args.overlap = overlap;
        }
        if self.window_seconds.is_some() {
            args.window_seconds = self.window_seconds;
        }
        args.log_frequency |= self.log_frequency;
        args.db_scale |= self.db_scale;
        if self.pad_multiplier.is_some() {
            args.pad_multiplier = self.pad_multiplier;
        }
        if self.no_pad {
            args.pad_multiplier = None;
        }
        if let Some([low, high]) = self.clip.as_deref() {
            args.clip = (*low, *high);
        }
        if let Some(w) = self.window {
            args.window = w.into();
        }
        Ok(args)
    }
}

fn main() -> Result<(), WorkbenchError> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        None => unreachable!(),
        Some(Command::Pow2(a)) => cmd_pow2(a)?,
        Some(Command::Plan(a)) => cmd_plan(a)?,
        Some(Command::Sine(a)) => cmd_sine(a)?,
        Some(Command::File(a)) => cmd_file(a)?,
        Some(Command::Config(a)) => cmd_config(a)?,
    }

    Ok(())
}

const INDENT: usize = 2;
const LABEL_W: usize = 28; // includes colon
const VALUE_W: usize = 26;

macro_rules! header {
    ($($arg:tt)*) => {{
        const WIDTH: usize = INDENT + LABEL_W + 1 + VALUE_W;
        let title = format!($($arg)*);
        println!("\n{title}");
        println!("{}", "=".repeat(WIDTH));
    }};
}

macro_rules! row {
    ($label:expr, $fmt:expr, $value:expr) => {{
        let value = format!($fmt, $value);
        println!(
            "{:indent$}{label:<label_w$} {:>value_w$}",
            "",
            value,
            indent = INDENT,
            label = format!("{}:", $label),
            label_w = LABEL_W,
            value_w = VALUE_W,
        );
    }};
}

fn cmd_pow2(args: Pow2Args) -> Result<(), WorkbenchError> {
    if !(args.x.is_finite() && args.x > 0.0) {
        return Err(SpecgramError::InvalidParameter(format!(
            "{} has no nearest power of two",
            args.x
        ))
        .into());
    }
    println!("{}", dsp::nearest_pow2(args.x));
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> Result<(), WorkbenchError> {
    let a = args.pipeline.resolve()?;

    header!("Specgram Workbench Options");
    row!("Sample rate", "{} Hz", a.sample_rate);
    row!("Overlap", "{:.3}", a.overlap);
    match a.window_seconds {
        Some(w) => row!("Window length", "{} s", w),
        None => row!("Window length", "{}", "sample rate / 100"),
    }
    row!("Pad multiplier", "{:?}", a.pad_multiplier);
    row!("Window", "{:?}", a.window);
    row!("Log frequency", "{}", a.log_frequency);
    row!("Decibel scale", "{}", a.db_scale);
    row!("Clip", "{:?}", a.clip);
    Ok(())
}

fn print_plan(plan: &WindowPlan, npts: usize) {
    row!("nfft", "{}", plan.nfft());
    row!("Overlap samples", "{}", plan.noverlap());
    row!("Step", "{}", plan.step());
    row!("Pad to", "{:?}", plan.pad_to());
    row!("Segments", "{}", plan.segments(npts));
    row!("Frequency rows (with DC)", "{}", plan.freq_rows());
}

fn cmd_plan(args: PlanArgs) -> Result<(), WorkbenchError> {
    let a = args.pipeline.resolve()?;
    let plan = WindowPlan::new(
        args.samples,
        a.sample_rate,
        a.window_seconds,
        a.overlap,
        a.pad_multiplier,
    )?;

    header!("Plan for {} samples at {} Hz", args.samples, a.sample_rate);
    print_plan(&plan, args.samples);
    Ok(())
}

fn report(sg: &Spectrogram, npts: usize) {
    header!("Segmentation");
    print_plan(&sg.plan, npts);

    header!("Result");
    row!("Grid (rows x cols)", "{}", format!("{} x {}", sg.grid.rows(), sg.grid.cols()));
    row!("Duration", "{:.3} s", sg.duration);
    row!("Amplitude scale", "{:?}", sg.scale);
    row!("Color min", "{:.6e}", sg.color.min);
    row!("Color max", "{:.6e}", sg.color.max);
    match &sg.axis {
        AxisDescriptor::Edges {
            freq_edges,
            time_edges,
        } => {
            row!("Frequency edges", "{}", freq_edges.len());
            row!("First frequency edge", "{:.4} Hz", freq_edges[0]);
            row!("Time edges", "{}", time_edges.len());
        }
        AxisDescriptor::Extent(e) => {
            row!("Time extent", "{}", format!("{:.3} .. {:.3} s", e.t_min, e.t_max));
            row!("Frequency extent", "{}", format!("{:.3} .. {:.3} Hz", e.f_min, e.f_max));
        }
    }
    if let Some(peak) = sg.peak_frequency() {
        row!("Loudest row", "{:.4} Hz", peak);
    }
}

fn cmd_sine(args: SineArgs) -> Result<(), WorkbenchError> {
    let mut a = args.pipeline.resolve()?;
    if a.sample_rate <= 0.0 {
        a.sample_rate = 100.0;
    }
    let npts = (args.seconds * a.sample_rate).round() as usize;
    let samples: Vec<f64> = dsp::sine_gen(args.freq, a.sample_rate).take(npts).collect();

    let sg = spectrogram(&samples, &a)?;
    report(&sg, npts);

    if let Some(peak) = sg.peak_frequency() {
        let df = sg.freq[1] - sg.freq[0];
        if (peak - args.freq).abs() > df {
            eprintln!(
                "warning: peak at {peak:.4} Hz is more than one bin ({df:.4} Hz) from {} Hz",
                args.freq
            );
        } else {
            println!("  peak within one bin of {} Hz", args.freq);
        }
    }
    Ok(())
}

fn read_samples(path: &Path) -> Result<Vec<f64>, WorkbenchError> {
    let text = std::fs::read_to_string(path)?;
    let mut samples = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        for word in line.split_whitespace() {
            let s = word.parse::<f64>().map_err(|_| WorkbenchError::Parse {
                line: i + 1,
                text: word.to_string(),
            })?;
            samples.push(s);
        }
    }
    info!("read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

fn cmd_file(args: FileArgs) -> Result<(), WorkbenchError> {
    let a = args.pipeline.resolve()?;
    let samples = read_samples(&args.path)?;
    let sg = spectrogram(&samples, &a)?;
    report(&sg, samples.len());
    Ok(())
}
