//! popatlas - command-line front end.
//!
//! Loads the dataset, builds the requested view, and prints it as
//! Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing files, schema error, unknown country, etc.)

use anyhow::{anyhow, Context, Result};
use popatlas::analysis;
use popatlas::cli::{Args, Command, OutputFormat};
use popatlas::config::{Config, CONFIG_FILE_NAME};
use popatlas::dataset::DataLoader;
use popatlas::report::{self, Report, ReportMetadata, View};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging starts so `[general] verbose` applies
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    debug!("popatlas v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(args, config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .popatlas.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to point at your data directory or add column aliases.");
    Ok(())
}

/// Initialize logging at the given level.
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset, build the view, and emit it.
fn run(args: Args, config: Config) -> Result<()> {
    let command = args
        .command
        .clone()
        .ok_or_else(|| anyhow!("No view given"))?;

    let loader = DataLoader::new(config.data.clone(), config.columns.clone());
    let dataset = loader
        .load()
        .with_context(|| format!("Failed to load dataset from {}", loader.data_dir().display()))?;

    let top_n = config.report.top_n;
    let view = build_view(&command, &dataset, top_n)?;

    let report = Report {
        metadata: ReportMetadata::new(loader.data_dir().display().to_string()),
        view,
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match &config.report.output {
        Some(path) => {
            report::write_report(&output, path)?;
            info!("Report saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Compute the view for a command.
fn build_view(command: &Command, dataset: &popatlas::Dataset, top_n: usize) -> Result<View> {
    let view = match command {
        Command::Overview => {
            let stats =
                analysis::compute_country_language_stats(&dataset.languages, &dataset.countries);
            let mut global =
                analysis::compute_global_language_stats(&dataset.languages, &dataset.countries);
            global.truncate(top_n);

            View::Overview {
                summary: analysis::dataset_summary(dataset, &stats),
                top_languages: global,
                most_diverse: analysis::most_diverse(&stats, top_n)
                    .into_iter()
                    .cloned()
                    .collect(),
            }
        }
        Command::Countries => {
            let stats =
                analysis::compute_country_language_stats(&dataset.languages, &dataset.countries);
            if !stats.iter().any(|s| s.entropy.is_some()) {
                warn!("No usable percentages; entropy is unavailable for every country");
            }
            View::Countries { stats }
        }
        Command::Languages => View::Languages {
            stats: analysis::compute_global_language_stats(&dataset.languages, &dataset.countries),
        },
        Command::Language {
            name,
            official_only,
        } => {
            let occurrences = analysis::language_occurrences(
                name,
                &dataset.languages,
                &dataset.countries,
                *official_only,
            )
            .ok_or_else(|| {
                let hints = analysis::search_languages(&dataset.languages, name);
                if hints.is_empty() {
                    anyhow!("Unknown language: {}", name)
                } else {
                    anyhow!(
                        "Unknown language: {} (did you mean: {})",
                        name,
                        hints.into_iter().take(5).collect::<Vec<_>>().join(", ")
                    )
                }
            })?;
            View::Language { occurrences }
        }
        Command::Country { code } => {
            let stats =
                analysis::compute_country_language_stats(&dataset.languages, &dataset.countries);
            let profile = analysis::country_profile(
                code,
                &dataset.countries,
                &dataset.cities,
                &dataset.languages,
                &stats,
                top_n,
            )
            .ok_or_else(|| anyhow!("Unknown country code: {}", code))?;
            View::Country { profile }
        }
        Command::Cities { country } => View::Cities {
            country: country.clone(),
            cities: analysis::top_cities(&dataset.cities, country.as_deref(), top_n)
                .into_iter()
                .cloned()
                .collect(),
            gazetteer: dataset.gazetteer.as_ref().map(|points| {
                analysis::gazetteer_points(points, country.as_deref(), top_n)
                    .into_iter()
                    .cloned()
                    .collect()
            }),
        },
        Command::Search { query } => View::Search {
            query: query.clone(),
            matches: analysis::search_languages(&dataset.languages, query),
        },
    };

    Ok(view)
}

/// Where the configuration came from, logged once the subscriber is up.
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    Unreadable(String),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(format!("{:#}", e)))),
    }
}
