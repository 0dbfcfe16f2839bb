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

/// Trace every ray of a simulation file through its scene
#[derive(Parser, Debug)]
#[command(name = "run_trace")]
pub struct Args {
    /// JSON file holding a "scene" and its "rays"
    pub file: PathBuf,

    /// Override the reflection budget of every ray
    #[arg(short, long)]
    pub max_reflections: Option<usize>,

    /// Draw the scene and the ray paths to this SVG file
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Width of the SVG drawing
    #[arg(long, default_value = "1200")]
    pub width: u32,

    /// Height of the SVG drawing
    #[arg(long, default_value = "900")]
    pub height: u32,

    /// Write the traced paths to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
