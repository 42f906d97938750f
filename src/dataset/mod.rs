//! Dataset loading.
//!
//! The loader reads the CSV files once, resolves column aliases, and hands
//! back a [`Dataset`] that callers pass explicitly to the analysis functions.

pub mod fields;
pub mod records;
pub mod table;

pub use table::{Row, Table};

use crate::config::{ColumnsConfig, DataConfig};
use crate::error::AtlasError;
use crate::models::{City, Country, GazetteerPoint, LanguageEntry};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything loaded for one run.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Canonical tables, kept for [`crate::analysis::country_language_stats`]
    /// and [`crate::analysis::global_language_stats`].
    pub countries_table: Table,
    pub languages_table: Table,
    pub countries: Vec<Country>,
    pub cities: Vec<City>,
    pub languages: Vec<LanguageEntry>,
    /// `None` when the gazetteer file is absent.
    pub gazetteer: Option<Vec<GazetteerPoint>>,
}

impl Dataset {
    /// Build a dataset from canonical tables.
    pub fn from_tables(
        countries_table: Table,
        cities_table: Table,
        languages_table: Table,
        gazetteer_table: Option<Table>,
    ) -> Result<Self, AtlasError> {
        let countries = Country::from_table(&countries_table)?;
        let cities = City::from_table(&cities_table)?;
        let languages = LanguageEntry::from_table(&languages_table)?;
        let gazetteer = gazetteer_table
            .as_ref()
            .map(GazetteerPoint::from_table)
            .transpose()?;

        Ok(Self {
            countries_table,
            languages_table,
            countries,
            cities,
            languages,
            gazetteer,
        })
    }
}

/// Reads the dataset files from a directory.
#[derive(Debug, Clone)]
pub struct DataLoader {
    data: DataConfig,
    columns: ColumnsConfig,
}

impl DataLoader {
    pub fn new(data: DataConfig, columns: ColumnsConfig) -> Self {
        Self { data, columns }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data.dir
    }

    fn path_of(&self, file: &str) -> PathBuf {
        self.data.dir.join(file)
    }

    /// Load all tables.
    ///
    /// Every missing required file is reported in a single error.
    pub fn load(&self) -> Result<Dataset, AtlasError> {
        let countries_path = self.path_of(&self.data.countries);
        let cities_path = self.path_of(&self.data.cities);
        let languages_path = self.path_of(&self.data.languages);
        let gazetteer_path = self.path_of(&self.data.gazetteer);

        let missing: Vec<PathBuf> = [&cities_path, &countries_path, &languages_path]
            .into_iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AtlasError::MissingFiles(missing));
        }

        info!("Loading dataset from {}", self.data.dir.display());

        let countries = read_table(
            fields::COUNTRIES_TABLE,
            &countries_path,
            &self.columns.countries.aliases(),
        )?;
        let cities = read_table(
            fields::CITIES_TABLE,
            &cities_path,
            &self.columns.cities.aliases(),
        )?;
        let languages = read_table(
            fields::LANGUAGES_TABLE,
            &languages_path,
            &self.columns.languages.aliases(),
        )?;

        let gazetteer = if gazetteer_path.exists() {
            Some(read_table(
                fields::GAZETTEER_TABLE,
                &gazetteer_path,
                &self.columns.gazetteer.aliases(),
            )?)
        } else {
            debug!("No gazetteer at {}", gazetteer_path.display());
            None
        };

        let dataset = Dataset::from_tables(countries, cities, languages, gazetteer)?;

        info!(
            "Loaded {} countries, {} cities, {} language rows{}",
            dataset.countries.len(),
            dataset.cities.len(),
            dataset.languages.len(),
            match &dataset.gazetteer {
                Some(points) => format!(", {} gazetteer points", points.len()),
                None => String::new(),
            }
        );

        Ok(dataset)
    }
}

/// Read one CSV file and rename its headers to canonical fields.
fn read_table(
    name: &str,
    path: &Path,
    aliases: &[(&str, &[String])],
) -> Result<Table, AtlasError> {
    let mut table = Table::from_path(name, path)?;
    table.canonicalize(aliases);
    debug!(
        "{}: {} rows, columns [{}]",
        table.name(),
        table.len(),
        table.headers().join(", ")
    );
    Ok(table)
}
