//! Report views and rendering.

pub mod generator;

pub use generator::*;

use crate::models::{
    City, CountryLanguageStats, CountryProfile, DatasetSummary, GazetteerPoint,
    GlobalLanguageStats, LanguageOccurrences,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Directory the dataset was read from.
    pub data_dir: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Version of the tool that produced the report.
    pub version: String,
}

impl ReportMetadata {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// One rendered page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Overview {
        summary: DatasetSummary,
        top_languages: Vec<GlobalLanguageStats>,
        most_diverse: Vec<CountryLanguageStats>,
    },
    Countries {
        stats: Vec<CountryLanguageStats>,
    },
    Languages {
        stats: Vec<GlobalLanguageStats>,
    },
    Language {
        occurrences: LanguageOccurrences,
    },
    Country {
        profile: CountryProfile,
    },
    Cities {
        country: Option<String>,
        cities: Vec<City>,
        /// `None` when no gazetteer was loaded.
        gazetteer: Option<Vec<GazetteerPoint>>,
    },
    Search {
        query: String,
        matches: Vec<String>,
    },
}

impl View {
    /// Page title used in the Markdown heading.
    pub fn title(&self) -> String {
        match self {
            View::Overview { .. } => "Overview".to_string(),
            View::Countries { .. } => "Language Diversity by Country".to_string(),
            View::Languages { .. } => "Languages Worldwide".to_string(),
            View::Language { occurrences } => format!("Language: {}", occurrences.language),
            View::Country { profile } => match &profile.country {
                Some(country) => format!("Country: {}", country.label()),
                None => format!("Country: {}", profile.code),
            },
            View::Cities { country: Some(code), .. } => format!("Cities in {}", code),
            View::Cities { country: None, .. } => "Cities".to_string(),
            View::Search { query, .. } => format!("Language search: \"{}\"", query),
        }
    }
}

/// The complete report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub view: View,
}
