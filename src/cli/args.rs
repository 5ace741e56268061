//! Command-line argument parsing for the NationStates client
//!
//! This module defines the CLI structure using clap derive macros: raw
//! shard requests, dump streaming, and autologin retrieval.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// nsapi - probe the NationStates API
#[derive(Parser, Debug)]
#[command(
    name = "nsapi",
    version,
    about = "Rate-limited NationStates API client",
    long_about = "Send shard requests to the NationStates API, stream the daily data dumps,
and obtain autologin credentials. Every request respects the server's rate limit."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// User agent, overriding the config file and NSAPI_USER_AGENT
    #[arg(long, global = true, value_name = "AGENT")]
    pub user_agent: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request shards and print the raw XML response
    Shard(ShardArgs),

    /// Stream records from a data dump
    Dump(DumpArgs),

    /// Obtain an autologin credential for a nation
    Autologin(AutologinArgs),

    /// Write a commented default configuration file
    Init,
}

/// What a shard request is about
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Nation,
    Region,
    World,
    Wa,
}

/// Arguments for the shard command
#[derive(Args, Debug, Clone)]
pub struct ShardArgs {
    /// Entity kind
    #[arg(value_enum)]
    pub kind: EntityKind,

    /// Nation or region name, or WA council number; ignored for the world
    pub name: String,

    /// Shards to request; none requests the standard record
    pub shards: Vec<String>,

    /// Extra query parameters as key=value
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

/// Which dump to stream
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpTarget {
    Nations,
    Regions,
    Cards,
}

/// Arguments for the dump command
#[derive(Args, Debug, Clone)]
pub struct DumpArgs {
    /// Dump to stream
    #[arg(value_enum)]
    pub target: DumpTarget,

    /// Read the archived dump of this day (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Card season, required for the card list
    #[arg(short, long)]
    pub season: Option<u32>,

    /// Stop after this many records
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Dump directory, overriding the config file
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Do not refetch a stale daily dump
    #[arg(long)]
    pub no_update: bool,
}

/// Arguments for the autologin command
#[derive(Args, Debug, Clone)]
pub struct AutologinArgs {
    /// Nation to log in as
    pub nation: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl DumpArgs {
    /// Check argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        match self.target {
            DumpTarget::Cards if self.season.is_none() => {
                Err("The card list needs --season".to_string())
            }
            DumpTarget::Cards if self.date.is_some() => {
                Err("Card lists are not archived by date".to_string())
            }
            DumpTarget::Nations | DumpTarget::Regions if self.season.is_some() => {
                Err("--season only applies to the card list".to_string())
            }
            _ => Ok(()),
        }
    }
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{input}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump_args(target: DumpTarget) -> DumpArgs {
        DumpArgs {
            target,
            date: None,
            season: None,
            limit: None,
            dump_dir: None,
            no_update: false,
        }
    }

    #[test]
    fn test_dump_args_validation() {
        assert!(dump_args(DumpTarget::Nations).validate().is_ok());

        // Card list needs a season and has no archive
        let mut cards = dump_args(DumpTarget::Cards);
        assert!(cards.validate().is_err());
        cards.season = Some(3);
        assert!(cards.validate().is_ok());
        cards.date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(cards.validate().is_err());

        let regions = DumpArgs {
            season: Some(1),
            ..dump_args(DumpTarget::Regions)
        };
        assert!(regions.validate().is_err());
    }

    #[test]
    fn test_shard_command_parsing() {
        let cli = Cli::try_parse_from([
            "nsapi", "shard", "nation", "Testlandia", "census", "-p", "scale=all",
        ])
        .unwrap();

        match cli.command {
            Commands::Shard(args) => {
                assert_eq!(args.kind, EntityKind::Nation);
                assert_eq!(args.name, "Testlandia");
                assert_eq!(args.shards, vec!["census"]);
                assert_eq!(args.params, vec![("scale".to_string(), "all".to_string())]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_key_value_parsing() {
        assert_eq!(
            parse_key_value("mode=score").unwrap(),
            ("mode".to_string(), "score".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_log_level() {
        let cli_quiet = Cli::try_parse_from(["nsapi", "-q", "autologin", "x"]).unwrap();
        let cli_verbose = Cli::try_parse_from(["nsapi", "autologin", "x", "-v"]).unwrap();

        assert_eq!(cli_quiet.log_level(), tracing::Level::ERROR);
        assert_eq!(cli_verbose.log_level(), tracing::Level::INFO);
    }
}
