//! CLI Module
//!
//! Command-line interface for encoding audio tensors.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::tensor::audio::DEFAULT_SAMPLE_RATE;

/// DocArray CLI - encode audio tensors stored as JSON
#[derive(Parser, Debug)]
#[command(name = "docarray-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode samples as raw 16-bit little-endian PCM bytes
    #[command(name = "audio-bytes")]
    AudioBytes {
        /// JSON file: an array of samples or {"shape": [...], "data": [...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Destination for the raw bytes
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write samples to a 16-bit WAV file
    #[command(name = "wav")]
    Wav {
        /// JSON file: an array of samples or {"shape": [frames, channels], "data": [...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Destination WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Sample rate in Hz
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
    },
}
