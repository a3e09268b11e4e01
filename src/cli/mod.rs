//! CLI module for Scholar
//!
//! Provides command-line interface parsing for the scholar-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scholar - research assistant server
///
/// Searches arXiv, summarizes and scores papers with an LLM, and caches
/// the results per query.
#[derive(Parser, Debug)]
#[command(
    name = "scholar-server",
    version,
    about = "Scholar - arXiv research assistant server",
    long_about = "Searches arXiv for a research question, has a language model summarize\n\
                  and score each paper, and serves the ranked results over HTTP.\n\n\
                  Run without arguments to start the server, or use 'query' for a one-shot search.",
    after_help = "EXAMPLES:\n    \
                  scholar-server                                  # Start the server (reads scholar.toml if present)\n    \
                  scholar-server --config my.toml                 # Use a custom config file\n    \
                  scholar-server query \"graph neural networks\"    # One-shot search in the terminal\n    \
                  scholar-server config --validate                # Check the configuration file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "scholar.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single research query and print the results
    Query {
        /// Research question
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Order papers by matching score instead of analyst rank
        #[arg(short, long)]
        sort_by_score: bool,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::try_parse_from(["scholar-server"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("scholar.toml"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_query_joins_words() {
        let cli = Cli::try_parse_from([
            "scholar-server",
            "--no-color",
            "query",
            "graph",
            "neural",
            "networks",
            "--sort-by-score",
        ])
        .unwrap();

        assert!(cli.no_color);
        match cli.command {
            Some(Commands::Query {
                query,
                sort_by_score,
                json,
            }) => {
                assert_eq!(query.join(" "), "graph neural networks");
                assert!(sort_by_score);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_query_requires_text() {
        assert!(Cli::try_parse_from(["scholar-server", "query"]).is_err());
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["scholar-server", "config", "--validate", "-c", "other.toml"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                full: false,
                validate: true
            })
        );
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["scholar-server", "serve", "--port", "9001"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                host: None,
                port: Some(9001)
            })
        );
    }
}
