//! Data models for the atlas.
//!
//! This module contains the base records loaded from the dataset and the
//! derived statistics rows computed from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens (compared case-insensitively) that mark a language as official.
const OFFICIAL_TOKENS: [&str; 5] = ["T", "TRUE", "Y", "YES", "1"];

/// Official status of a language in a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficialFlag {
    Official,
    NotOfficial,
    /// The source row carried no flag at all.
    #[default]
    Unknown,
}

impl OfficialFlag {
    /// Resolve a raw cell into a flag.
    ///
    /// Missing or blank cells are `Unknown`; any of `T`, `TRUE`, `Y`, `YES`,
    /// `1` (any case) is `Official`; everything else is `NotOfficial`.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => OfficialFlag::Unknown,
            Some(token) => {
                if OFFICIAL_TOKENS
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(token))
                {
                    OfficialFlag::Official
                } else {
                    OfficialFlag::NotOfficial
                }
            }
        }
    }

    /// Only `Official` counts as official; `Unknown` does not.
    pub fn is_official(&self) -> bool {
        matches!(self, OfficialFlag::Official)
    }
}

impl From<bool> for OfficialFlag {
    fn from(value: bool) -> Self {
        if value {
            OfficialFlag::Official
        } else {
            OfficialFlag::NotOfficial
        }
    }
}

impl fmt::Display for OfficialFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfficialFlag::Official => write!(f, "official"),
            OfficialFlag::NotOfficial => write!(f, "not official"),
            OfficialFlag::Unknown => write!(f, "unknown"),
        }
    }
}

/// A country row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// ISO-3 code, trimmed.
    pub code: String,
    pub name: Option<String>,
    pub continent: Option<String>,
    pub region: Option<String>,
    pub population: Option<u64>,
}

impl Country {
    /// Creates a country with only its code set.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
            continent: None,
            region: None,
            population: None,
        }
    }

    /// Human-readable label, e.g. `Germany (DEU)`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.code),
            None => self.code.clone(),
        }
    }
}

/// A city row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub country_code: String,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub population: Option<u64>,
}

/// A single country/language association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub country_code: String,
    pub language: String,
    pub is_official: OfficialFlag,
    /// Share of the population in percent. Entries for one country need not
    /// sum to 100.
    pub percentage: Option<f64>,
}

impl LanguageEntry {
    /// Creates an entry with unknown status and no percentage.
    pub fn new(country_code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            language: language.into(),
            is_official: OfficialFlag::Unknown,
            percentage: None,
        }
    }

    pub fn with_official(mut self, flag: OfficialFlag) -> Self {
        self.is_official = flag;
        self
    }

    pub fn with_percentage(mut self, percentage: Option<f64>) -> Self {
        self.percentage = percentage;
        self
    }
}

/// A point from the optional lat/lon city gazetteer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerPoint {
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub population: Option<u64>,
    pub country_code: Option<String>,
}

/// Per-country language statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryLanguageStats {
    pub country_code: String,
    /// Distinct languages listed for the country.
    pub n_languages: usize,
    /// Distinct languages resolved official.
    pub n_official: usize,
    /// Shannon entropy in bits. `None` means "not computable", never zero.
    pub entropy: Option<f64>,
    pub top_language: Option<String>,
    pub top_pct: Option<f64>,
    pub name: Option<String>,
    pub continent: Option<String>,
    pub region: Option<String>,
    pub population: Option<u64>,
}

/// Per-language statistics across all countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalLanguageStats {
    pub language: String,
    /// Distinct countries listing the language.
    pub countries_spoken: usize,
    /// Distinct countries where at least one row is official.
    pub official_countries: usize,
    pub avg_percentage: Option<f64>,
    pub max_percentage: Option<f64>,
}

/// Headline counts for the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub countries: usize,
    pub cities: usize,
    pub language_rows: usize,
    pub unique_languages: usize,
    pub avg_languages_per_country: Option<f64>,
    pub entropy_available: bool,
    /// `None` when no gazetteer was loaded.
    pub gazetteer_points: Option<usize>,
}

/// A language as listed in one country's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileLanguage {
    pub language: String,
    pub percentage: Option<f64>,
}

/// Drill-down for a single country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub code: String,
    pub country: Option<Country>,
    pub stats: Option<CountryLanguageStats>,
    pub official_languages: Vec<ProfileLanguage>,
    pub other_languages: Vec<ProfileLanguage>,
    pub top_cities: Vec<City>,
    /// Total number of cities listed for the country.
    pub city_count: usize,
}

/// One country in which a language occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageOccurrence {
    pub country_code: String,
    pub name: Option<String>,
    pub continent: Option<String>,
    pub region: Option<String>,
    pub is_official: OfficialFlag,
    pub percentage: Option<f64>,
}

/// Every occurrence of one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageOccurrences {
    pub language: String,
    pub official_only: bool,
    pub countries_found: usize,
    pub official_entries: usize,
    pub occurrences: Vec<LanguageOccurrence>,
}
