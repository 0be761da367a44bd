use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Parser)]
#[command(name = "mintscore")]
#[command(version = "0.1.0")]
#[command(about = "Early-launch token scoring service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scoring API server
    Serve {
        /// Port override (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Train a model from JSON files of trades and token metadata
    Train {
        /// JSON array of trade events
        #[arg(long)]
        trades: PathBuf,
        /// JSON array of token metadata records
        #[arg(long)]
        tokens: PathBuf,
    },
    /// Score one mint from JSON files of its trades and metadata
    Predict {
        /// JSON array of the mint's trade events
        #[arg(long)]
        trades: PathBuf,
        /// JSON token metadata record
        #[arg(long)]
        token: PathBuf,
    },
}

/// Read and deserialize a JSON input file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
