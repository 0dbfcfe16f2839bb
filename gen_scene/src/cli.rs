use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    /// Cross-section of the pyramid, with the rays its config enables
    #[default]
    Pyramid,
    /// The grand gallery and its probe rays
    Gallery,
    /// Random segments and rays
    Random,
}

/// Write a simulation file that `run_trace` can read
#[derive(Parser, Debug)]
#[command(name = "gen_scene")]
pub struct Args {
    /// Where to write the simulation JSON
    pub out: PathBuf,

    #[arg(short, long, value_enum, default_value = "pyramid")]
    pub kind: Kind,

    /// Pyramid config JSON file, defaults are used for missing fields
    #[arg(short, long, conflicts_with = "random_config")]
    pub config: Option<PathBuf>,

    /// Use a random pyramid config
    #[arg(long)]
    pub random_config: bool,

    /// Number of segments of a random scene
    #[arg(long, default_value = "12")]
    pub segments: usize,

    /// Number of rays of a random scene
    #[arg(long, default_value = "4")]
    pub rays: usize,

    /// Seed of the random generator, a random seed is used otherwise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also draw the built scene, with its reference points, to this SVG file
    #[arg(long)]
    pub svg: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
