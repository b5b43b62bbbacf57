//! Command-Line Interface (CLI) argument parsing.
//!
//! The arguments are parsed at startup and then merged on top of the
//! configuration from `dingtalk.toml` and the environment.

use clap::{Parser, Subcommand};
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Delivers alert messages to a DingTalk robot webhook.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides `log_level` from the file).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Send a single message and exit.
    Send {
        /// The message text.
        message: String,
    },
    /// Send the canned test message using the configured token.
    Test,
    /// Read alert messages from stdin, one per line (the default).
    Run,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(timeout) = self.timeout_seconds {
            let mut http = Dict::new();
            http.insert("timeout_seconds".into(), Value::from(timeout));
            dict.insert("http".into(), Value::Dict(Tag::Default, http));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
