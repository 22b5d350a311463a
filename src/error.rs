//! Recoverable errors
//!
//! Misuse of the console (double lock, percent out of range) is a
//! programming error and panics instead of showing up here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Failed to install handler for signal {signal}: {source}")]
    SignalInstall {
        signal: i32,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Failed to write config {}: {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Unknown color style: {0}")]
    UnknownStyle(String),

    #[error("Could not determine config path")]
    NoConfigPath,
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
