//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Tabula: statistics, anomalies and patterns for tabular data
#[derive(Parser)]
#[command(name = "tabula")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a CSV or JSON file and print a summary
    Analyze {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the full JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full JSON report to stdout instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP analysis API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["tabula", "analyze", "data.csv", "-o", "out.json", "-vv"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze { file, output, json } => {
                assert_eq!(file, PathBuf::from("data.csv"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(!json);
            }
            Commands::Serve { .. } => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["tabula", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 5000);
            }
            Commands::Analyze { .. } => panic!("expected serve"),
        }
    }
}
