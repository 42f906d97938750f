//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// popatlas - a geo-linguistic atlas of the world dataset
///
/// Reads country.csv, city.csv and countrylanguage.csv (plus an optional
/// worldcities.csv gazetteer) and reports language statistics per country
/// and per language.
///
/// Examples:
///   popatlas overview
///   popatlas --data-dir ./world countries --format json
///   popatlas country DEU
///   popatlas language English --official-only
///   popatlas cities --country JPN --top 10
///   popatlas --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// View to render
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the dataset CSV files
    ///
    /// Defaults to the config file value, or ./data.
    #[arg(long, value_name = "DIR", env = "POPATLAS_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .popatlas.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(short, long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Row limit for top-N sections
    #[arg(long, value_name = "N", global = true)]
    pub top: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .popatlas.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report views.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dataset KPIs, top languages and most diverse countries
    Overview,

    /// Language statistics for every country
    Countries,

    /// Coverage statistics for every language
    Languages,

    /// Where one language is spoken
    Language {
        /// Exact (case-sensitive) language name
        name: String,

        /// Only list countries where the language is official
        #[arg(long)]
        official_only: bool,
    },

    /// Drill-down for one country
    Country {
        /// ISO-3 country code, e.g. DEU
        code: String,
    },

    /// Largest cities, plus gazetteer points when available
    Cities {
        /// Restrict to one ISO-3 country code
        #[arg(long, value_name = "ISO3")]
        country: Option<String>,
    },

    /// Find language names containing a substring (case-insensitive)
    Search {
        query: String,
    },
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        let Some(ref command) = self.command else {
            return Err("No view given; try 'popatlas overview' or --help".to_string());
        };

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        match command {
            Command::Country { code } if code.trim().is_empty() => {
                return Err("Country code must not be empty".to_string());
            }
            Command::Language { name, .. } if name.trim().is_empty() => {
                return Err("Language name must not be empty".to_string());
            }
            _ => {}
        }

        // Validate data directory if provided
        if let Some(ref dir) = self.data_dir {
            if !dir.is_dir() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` value from the config
    /// file; `--quiet` overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
