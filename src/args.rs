// Commandline argument parser for indoornav

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct NavArgs {
    #[command(subcommand)]
    /// Which task to perform
    pub command: NavCommand,

    /// Path to the TOML configuration file
    #[arg(short = 'c', long = "config", default_value = indoornav::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Debug, Subcommand, Clone)]
pub enum NavCommand {
    /// Rebuild the fingerprint database from exported scans
    #[command(about)]
    Update(UpdateCommand),

    /// Estimate the current grid cell from a WiFi scan
    #[command(about)]
    Locate(LocateCommand),

    /// Keep re-locating from a scan file that another process rewrites
    #[command(about)]
    Watch(WatchCommand),

    /// Resolve spoken or typed text to a destination
    #[command(about)]
    Resolve(ResolveCommand),

    /// List destinations whose name or alias contains the query
    #[command(about)]
    Search(SearchCommand),

    /// Show the door sign for a room
    #[command(about)]
    Signage(SignageCommand),
}

#[derive(Debug, Args, Clone)]
pub struct UpdateCommand {
    /// JSON file with a `scans` array
    #[arg(short = 's', long = "scans")]
    pub scans: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct LocateCommand {
    /// JSON file with a list of WiFi observations
    #[arg(short = 's', long = "scan")]
    pub scan: PathBuf,

    /// Also print the best matching fingerprints
    #[arg(short = 't', long = "top", default_value_t = 0)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct WatchCommand {
    /// JSON file with the latest list of WiFi observations
    #[arg(short = 's', long = "scan")]
    pub scan: PathBuf,

    /// Stop after this many estimates (runs until interrupted when omitted)
    #[arg(short = 'n', long = "count")]
    pub count: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct ResolveCommand {
    /// Recognized text, may span several words
    #[clap(num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SearchCommand {
    pub query: String,
}

#[derive(Debug, Args, Clone)]
pub struct SignageCommand {
    /// Room identifier, e.g. 04.2.010
    pub room: String,
}
