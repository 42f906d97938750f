//! Drill-down views over the loaded dataset.

use crate::dataset::Dataset;
use crate::models::{
    City, Country, CountryLanguageStats, CountryProfile, DatasetSummary, GazetteerPoint,
    LanguageEntry, LanguageOccurrence, LanguageOccurrences, ProfileLanguage,
};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

/// Descending by value with `None` last.
fn desc_nulls_last<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Headline counts for the overview.
pub fn dataset_summary(dataset: &Dataset, stats: &[CountryLanguageStats]) -> DatasetSummary {
    let unique_languages: HashSet<&str> =
        dataset.languages.iter().map(|e| e.language.trim()).collect();

    let avg_languages_per_country = if stats.is_empty() {
        None
    } else {
        let total: usize = stats.iter().map(|s| s.n_languages).sum();
        Some(total as f64 / stats.len() as f64)
    };

    DatasetSummary {
        countries: dataset.countries.len(),
        cities: dataset.cities.len(),
        language_rows: dataset.languages.len(),
        unique_languages: unique_languages.len(),
        avg_languages_per_country,
        entropy_available: stats.iter().any(|s| s.entropy.is_some()),
        gazetteer_points: dataset.gazetteer.as_ref().map(Vec::len),
    }
}

/// Countries with a computable entropy, most diverse first.
pub fn most_diverse(stats: &[CountryLanguageStats], n: usize) -> Vec<&CountryLanguageStats> {
    let mut ranked: Vec<&CountryLanguageStats> =
        stats.iter().filter(|s| s.entropy.is_some()).collect();

    ranked.sort_by(|a, b| desc_nulls_last(a.entropy, b.entropy));
    ranked.truncate(n);
    ranked
}

/// Cities sorted by population, optionally restricted to one country.
pub fn top_cities<'a>(cities: &'a [City], country: Option<&str>, n: usize) -> Vec<&'a City> {
    let country = country.map(str::trim);

    let mut selected: Vec<&City> = cities
        .iter()
        .filter(|c| country.map_or(true, |code| c.country_code.trim() == code))
        .collect();

    selected.sort_by(|a, b| desc_nulls_last(a.population, b.population));
    selected.truncate(n);
    selected
}

/// Gazetteer points sorted by population, optionally for one country.
pub fn gazetteer_points<'a>(
    points: &'a [GazetteerPoint],
    country: Option<&str>,
    n: usize,
) -> Vec<&'a GazetteerPoint> {
    let country = country.map(str::trim);

    let mut selected: Vec<&GazetteerPoint> = points
        .iter()
        .filter(|p| match country {
            Some(code) => p.country_code.as_deref().map(str::trim) == Some(code),
            None => true,
        })
        .collect();

    selected.sort_by(|a, b| desc_nulls_last(a.population, b.population));
    selected.truncate(n);
    selected
}

/// Drill-down for one country.
///
/// Returns `None` when the code appears in neither the country nor the
/// language table.
pub fn country_profile(
    code: &str,
    countries: &[Country],
    cities: &[City],
    languages: &[LanguageEntry],
    stats: &[CountryLanguageStats],
    top_n: usize,
) -> Option<CountryProfile> {
    let code = code.trim();

    let country = countries.iter().find(|c| c.code.trim() == code).cloned();
    let entries: Vec<&LanguageEntry> = languages
        .iter()
        .filter(|e| e.country_code.trim() == code)
        .collect();

    if country.is_none() && entries.is_empty() {
        return None;
    }

    let (official, other): (Vec<&LanguageEntry>, Vec<&LanguageEntry>) =
        entries.into_iter().partition(|e| e.is_official.is_official());

    let to_profile = |group: Vec<&LanguageEntry>| {
        let mut out: Vec<ProfileLanguage> = group
            .into_iter()
            .map(|e| ProfileLanguage {
                language: e.language.trim().to_string(),
                percentage: e.percentage,
            })
            .collect();
        out.sort_by(|a, b| desc_nulls_last(a.percentage, b.percentage));
        out
    };

    let city_count = cities
        .iter()
        .filter(|c| c.country_code.trim() == code)
        .count();

    Some(CountryProfile {
        code: code.to_string(),
        country,
        stats: stats.iter().find(|s| s.country_code == code).cloned(),
        official_languages: to_profile(official),
        other_languages: to_profile(other),
        top_cities: top_cities(cities, Some(code), top_n)
            .into_iter()
            .cloned()
            .collect(),
        city_count,
    })
}

/// Every country a language occurs in, joined with country metadata.
///
/// Returns `None` when the language does not occur at all. Matching is exact.
pub fn language_occurrences(
    language: &str,
    languages: &[LanguageEntry],
    countries: &[Country],
    official_only: bool,
) -> Option<LanguageOccurrences> {
    let language = language.trim();

    let matching: Vec<&LanguageEntry> = languages
        .iter()
        .filter(|e| e.language.trim() == language)
        .collect();
    if matching.is_empty() {
        return None;
    }

    let mut occurrences: Vec<LanguageOccurrence> = matching
        .into_iter()
        .filter(|e| !official_only || e.is_official.is_official())
        .map(|e| {
            let code = e.country_code.trim();
            let country = countries.iter().find(|c| c.code.trim() == code);
            LanguageOccurrence {
                country_code: code.to_string(),
                name: country.and_then(|c| c.name.clone()),
                continent: country.and_then(|c| c.continent.clone()),
                region: country.and_then(|c| c.region.clone()),
                is_official: e.is_official,
                percentage: e.percentage,
            }
        })
        .collect();

    occurrences.sort_by(|a, b| desc_nulls_last(a.percentage, b.percentage));

    let countries_found = occurrences
        .iter()
        .map(|o| o.country_code.as_str())
        .collect::<HashSet<_>>()
        .len();
    let official_entries = occurrences
        .iter()
        .filter(|o| o.is_official.is_official())
        .count();

    Some(LanguageOccurrences {
        language: language.to_string(),
        official_only,
        countries_found,
        official_entries,
        occurrences,
    })
}

/// Distinct language names containing `query`, ignoring case, sorted.
pub fn search_languages(languages: &[LanguageEntry], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();

    languages
        .iter()
        .map(|e| e.language.trim())
        .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}
