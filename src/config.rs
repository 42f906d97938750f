//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.popatlas.toml` files, including the column alias mapping used to
//! resolve inconsistent source headers.

use crate::cli::OutputFormat;
use crate::dataset::fields;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".popatlas.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset location.
    #[serde(default)]
    pub data: DataConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Source header aliases per table.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where the CSV files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the dataset files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_countries_file")]
    pub countries: String,

    #[serde(default = "default_cities_file")]
    pub cities: String,

    #[serde(default = "default_languages_file")]
    pub languages: String,

    /// Optional lat/lon gazetteer; a missing file is not an error.
    #[serde(default = "default_gazetteer_file")]
    pub gazetteer: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            countries: default_countries_file(),
            cities: default_cities_file(),
            languages: default_languages_file(),
            gazetteer: default_gazetteer_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_countries_file() -> String {
    "country.csv".to_string()
}

fn default_cities_file() -> String {
    "city.csv".to_string()
}

fn default_languages_file() -> String {
    "countrylanguage.csv".to_string()
}

fn default_gazetteer_file() -> String {
    "worldcities.csv".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Row limit for "top N" sections.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Write the report here instead of stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            top_n: default_top_n(),
            output: None,
        }
    }
}

fn default_top_n() -> usize {
    20
}

/// Header aliases for every table.
///
/// Each canonical field maps to the list of source headers accepted for it,
/// tried in order. See [`crate::dataset::Table::canonicalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default)]
    pub countries: CountryColumns,

    #[serde(default)]
    pub cities: CityColumns,

    #[serde(default)]
    pub languages: LanguageColumns,

    #[serde(default)]
    pub gazetteer: GazetteerColumns,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryColumns {
    #[serde(default = "default_country_code_aliases")]
    pub code: Vec<String>,
    #[serde(default = "default_country_name_aliases")]
    pub name: Vec<String>,
    #[serde(default = "default_continent_aliases")]
    pub continent: Vec<String>,
    #[serde(default = "default_region_aliases")]
    pub region: Vec<String>,
    #[serde(default = "default_population_aliases")]
    pub population: Vec<String>,
}

impl Default for CountryColumns {
    fn default() -> Self {
        Self {
            code: default_country_code_aliases(),
            name: default_country_name_aliases(),
            continent: default_continent_aliases(),
            region: default_region_aliases(),
            population: default_population_aliases(),
        }
    }
}

impl CountryColumns {
    pub fn aliases(&self) -> Vec<(&'static str, &[String])> {
        vec![
            (fields::CODE, self.code.as_slice()),
            (fields::NAME, self.name.as_slice()),
            (fields::CONTINENT, self.continent.as_slice()),
            (fields::REGION, self.region.as_slice()),
            (fields::POPULATION, self.population.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityColumns {
    #[serde(default = "default_foreign_code_aliases")]
    pub country_code: Vec<String>,
    #[serde(default = "default_city_name_aliases")]
    pub name: Vec<String>,
    #[serde(default = "default_district_aliases")]
    pub district: Vec<String>,
    #[serde(default = "default_population_aliases")]
    pub population: Vec<String>,
}

impl Default for CityColumns {
    fn default() -> Self {
        Self {
            country_code: default_foreign_code_aliases(),
            name: default_city_name_aliases(),
            district: default_district_aliases(),
            population: default_population_aliases(),
        }
    }
}

impl CityColumns {
    pub fn aliases(&self) -> Vec<(&'static str, &[String])> {
        vec![
            (fields::COUNTRY_CODE, self.country_code.as_slice()),
            (fields::NAME, self.name.as_slice()),
            (fields::DISTRICT, self.district.as_slice()),
            (fields::POPULATION, self.population.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageColumns {
    #[serde(default = "default_foreign_code_aliases")]
    pub country_code: Vec<String>,
    #[serde(default = "default_language_aliases")]
    pub language: Vec<String>,
    #[serde(default = "default_official_aliases")]
    pub is_official: Vec<String>,
    #[serde(default = "default_percentage_aliases")]
    pub percentage: Vec<String>,
}

impl Default for LanguageColumns {
    fn default() -> Self {
        Self {
            country_code: default_foreign_code_aliases(),
            language: default_language_aliases(),
            is_official: default_official_aliases(),
            percentage: default_percentage_aliases(),
        }
    }
}

impl LanguageColumns {
    pub fn aliases(&self) -> Vec<(&'static str, &[String])> {
        vec![
            (fields::COUNTRY_CODE, self.country_code.as_slice()),
            (fields::LANGUAGE, self.language.as_slice()),
            (fields::IS_OFFICIAL, self.is_official.as_slice()),
            (fields::PERCENTAGE, self.percentage.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerColumns {
    #[serde(default = "default_gazetteer_name_aliases")]
    pub name: Vec<String>,
    #[serde(default = "default_lat_aliases")]
    pub lat: Vec<String>,
    #[serde(default = "default_lon_aliases")]
    pub lon: Vec<String>,
    #[serde(default = "default_gazetteer_population_aliases")]
    pub population: Vec<String>,
    #[serde(default = "default_gazetteer_code_aliases")]
    pub country_code: Vec<String>,
}

impl Default for GazetteerColumns {
    fn default() -> Self {
        Self {
            name: default_gazetteer_name_aliases(),
            lat: default_lat_aliases(),
            lon: default_lon_aliases(),
            population: default_gazetteer_population_aliases(),
            country_code: default_gazetteer_code_aliases(),
        }
    }
}

impl GazetteerColumns {
    pub fn aliases(&self) -> Vec<(&'static str, &[String])> {
        vec![
            (fields::NAME, self.name.as_slice()),
            (fields::LAT, self.lat.as_slice()),
            (fields::LON, self.lon.as_slice()),
            (fields::POPULATION, self.population.as_slice()),
            (fields::COUNTRY_CODE, self.country_code.as_slice()),
        ]
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_country_code_aliases() -> Vec<String> {
    // Code_x/Code_y are leftovers from earlier merges of the same table.
    strings(&["Code", "CountryCode", "country_code", "Code_x", "Code_y"])
}

fn default_country_name_aliases() -> Vec<String> {
    strings(&["Name", "Country", "Name_x", "Name_y"])
}

fn default_continent_aliases() -> Vec<String> {
    strings(&["Continent"])
}

fn default_region_aliases() -> Vec<String> {
    strings(&["Region"])
}

fn default_population_aliases() -> Vec<String> {
    strings(&["Population"])
}

fn default_foreign_code_aliases() -> Vec<String> {
    strings(&["CountryCode", "country_code", "Code", "CountryCode_x", "CountryCode_y"])
}

fn default_city_name_aliases() -> Vec<String> {
    strings(&["Name", "City"])
}

fn default_district_aliases() -> Vec<String> {
    strings(&["District"])
}

fn default_language_aliases() -> Vec<String> {
    strings(&["Language", "lang"])
}

fn default_official_aliases() -> Vec<String> {
    strings(&["IsOfficial", "is_official", "Official"])
}

fn default_percentage_aliases() -> Vec<String> {
    strings(&["Percentage", "percent", "pct"])
}

fn default_gazetteer_name_aliases() -> Vec<String> {
    strings(&["city", "city_ascii", "name"])
}

fn default_lat_aliases() -> Vec<String> {
    strings(&["lat", "latitude"])
}

fn default_lon_aliases() -> Vec<String> {
    strings(&["lng", "lon", "long", "longitude"])
}

fn default_gazetteer_population_aliases() -> Vec<String> {
    strings(&["population", "pop"])
}

fn default_gazetteer_code_aliases() -> Vec<String> {
    strings(&["iso3", "country_code", "CountryCode"])
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when the CLI provides an explicit value.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.data.dir = dir.clone();
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        if let Some(top) = args.top {
            self.report.top_n = top;
        }

        if let Some(ref output) = args.output {
            self.report.output = Some(output.clone());
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
