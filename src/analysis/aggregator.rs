//! Language statistics aggregation.
//!
//! Turns the base relations into per-country and per-language summary rows.
//! Every function here is pure: inputs are only borrowed and the same inputs
//! always give the same output.

use crate::dataset::Table;
use crate::error::AtlasError;
use crate::models::{Country, CountryLanguageStats, GlobalLanguageStats, LanguageEntry};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Shannon entropy, in bits, of a set of percentages.
///
/// Only finite, strictly positive values take part. They are divided by 100
/// and then renormalized to sum to 1, since reported shares often overlap or
/// leave gaps. Returns `None` when nothing usable remains.
pub fn shannon_entropy<I>(percentages: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let probs: Vec<f64> = percentages
        .into_iter()
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|p| p / 100.0)
        .collect();

    if probs.is_empty() {
        return None;
    }

    let total: f64 = probs.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let h: f64 = probs
        .iter()
        .map(|p| p / total)
        .filter(|p| *p > 0.0)
        .map(|p| p * p.log2())
        .sum();

    Some((-h).max(0.0))
}

/// Index countries by trimmed code. The first row for a code wins.
fn index_countries(countries: &[Country]) -> HashMap<&str, &Country> {
    let mut index: HashMap<&str, &Country> = HashMap::with_capacity(countries.len());

    for country in countries {
        let code = country.code.trim();
        if index.contains_key(code) {
            warn!("Duplicate country code '{}', keeping first row", code);
            continue;
        }
        index.insert(code, country);
    }

    index
}

/// Group entries by a trimmed key, keeping input order inside each group.
fn group_by<'a, F>(entries: &'a [LanguageEntry], key: F) -> BTreeMap<&'a str, Vec<&'a LanguageEntry>>
where
    F: Fn(&'a LanguageEntry) -> &'a str,
{
    let mut grouped: BTreeMap<&str, Vec<&LanguageEntry>> = BTreeMap::new();

    for entry in entries {
        grouped.entry(key(entry).trim()).or_default().push(entry);
    }

    grouped
}

fn count_orphans(languages: &[LanguageEntry], index: &HashMap<&str, &Country>) -> usize {
    languages
        .iter()
        .filter(|e| !index.contains_key(e.country_code.trim()))
        .count()
}

/// Highest-percentage entry. Ties keep the earliest entry.
fn top_language<'a>(entries: &[&'a LanguageEntry]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;

    for entry in entries {
        let Some(pct) = entry.percentage.filter(|p| p.is_finite()) else {
            continue;
        };
        if best.map_or(true, |(_, b)| pct > b) {
            best = Some((entry.language.trim(), pct));
        }
    }

    best
}

/// Per-country language statistics.
///
/// One row per country code present in `languages`, ordered by code.
/// Countries without language rows are left out entirely rather than
/// reported with zero languages.
pub fn compute_country_language_stats(
    languages: &[LanguageEntry],
    countries: &[Country],
) -> Vec<CountryLanguageStats> {
    let index = index_countries(countries);
    let grouped = group_by(languages, |e| e.country_code.as_str());

    let orphans = count_orphans(languages, &index);
    if orphans > 0 {
        debug!("{} language row(s) reference unknown countries", orphans);
    }

    grouped
        .into_iter()
        .map(|(code, entries)| {
            let distinct: HashSet<&str> = entries.iter().map(|e| e.language.trim()).collect();
            let official: HashSet<&str> = entries
                .iter()
                .filter(|e| e.is_official.is_official())
                .map(|e| e.language.trim())
                .collect();

            let entropy = shannon_entropy(entries.iter().filter_map(|e| e.percentage));
            let top = top_language(&entries);
            let country = index.get(code).copied();

            CountryLanguageStats {
                country_code: code.to_string(),
                n_languages: distinct.len(),
                n_official: official.len(),
                entropy,
                top_language: top.map(|(lang, _)| lang.to_string()),
                top_pct: top.map(|(_, pct)| pct),
                name: country.and_then(|c| c.name.clone()),
                continent: country.and_then(|c| c.continent.clone()),
                region: country.and_then(|c| c.region.clone()),
                population: country.and_then(|c| c.population),
            }
        })
        .collect()
}

/// Per-language statistics across all countries.
///
/// Ordered by `countries_spoken` descending, then `official_countries`
/// descending, then language name.
pub fn compute_global_language_stats(
    languages: &[LanguageEntry],
    countries: &[Country],
) -> Vec<GlobalLanguageStats> {
    let index = index_countries(countries);
    let orphans = count_orphans(languages, &index);
    if orphans > 0 {
        debug!("{} language row(s) reference unknown countries", orphans);
    }

    let grouped = group_by(languages, |e| e.language.as_str());

    let mut out: Vec<GlobalLanguageStats> = grouped
        .into_iter()
        .map(|(language, entries)| {
            let spoken: HashSet<&str> = entries.iter().map(|e| e.country_code.trim()).collect();
            let official: HashSet<&str> = entries
                .iter()
                .filter(|e| e.is_official.is_official())
                .map(|e| e.country_code.trim())
                .collect();

            let pcts: Vec<f64> = entries
                .iter()
                .filter_map(|e| e.percentage)
                .filter(|p| p.is_finite())
                .collect();
            let avg_percentage = if pcts.is_empty() {
                None
            } else {
                Some(pcts.iter().sum::<f64>() / pcts.len() as f64)
            };
            let max_percentage = pcts.iter().copied().reduce(f64::max);

            GlobalLanguageStats {
                language: language.to_string(),
                countries_spoken: spoken.len(),
                official_countries: official.len(),
                avg_percentage,
                max_percentage,
            }
        })
        .collect();

    // Stable sort keeps the alphabetical order from the BTreeMap for ties.
    out.sort_by(|a, b| {
        b.countries_spoken
            .cmp(&a.countries_spoken)
            .then_with(|| b.official_countries.cmp(&a.official_countries))
    });

    out
}

/// [`compute_country_language_stats`] over canonical tables.
///
/// Fails with a schema error when `languages` lacks `country_code` or
/// `language`, or `countries` lacks `code`.
pub fn country_language_stats(
    languages: &Table,
    countries: &Table,
) -> Result<Vec<CountryLanguageStats>, AtlasError> {
    let entries = LanguageEntry::from_table(languages)?;
    let countries = Country::from_table(countries)?;
    Ok(compute_country_language_stats(&entries, &countries))
}

/// [`compute_global_language_stats`] over canonical tables.
pub fn global_language_stats(
    languages: &Table,
    countries: &Table,
) -> Result<Vec<GlobalLanguageStats>, AtlasError> {
    let entries = LanguageEntry::from_table(languages)?;
    let countries = Country::from_table(countries)?;
    Ok(compute_global_language_stats(&entries, &countries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OfficialFlag;

    fn entry(code: &str, lang: &str, official: &str, pct: Option<f64>) -> LanguageEntry {
        LanguageEntry::new(code, lang)
            .with_official(OfficialFlag::resolve(Some(official)))
            .with_percentage(pct)
    }

    fn germany() -> Country {
        Country {
            code: "DEU".to_string(),
            name: Some("Germany".to_string()),
            continent: Some("Europe".to_string()),
            region: Some("Western Europe".to_string()),
            population: Some(83_000_000),
        }
    }

    fn stats_for<'a>(rows: &'a [CountryLanguageStats], code: &str) -> &'a CountryLanguageStats {
        rows.iter().find(|r| r.country_code == code).unwrap()
    }

    #[test]
    fn test_entropy_even_split_is_one_bit() {
        let h = shannon_entropy([50.0, 50.0]).unwrap();
        assert!((h - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_single_language_is_zero() {
        assert_eq!(shannon_entropy([100.0]), Some(0.0));
    }

    #[test]
    fn test_entropy_absent_without_usable_values() {
        assert_eq!(shannon_entropy(Vec::<f64>::new()), None);
        assert_eq!(shannon_entropy([0.0, -3.0, f64::NAN]), None);
    }

    #[test]
    fn test_entropy_renormalizes() {
        let h = shannon_entropy([30.0, 20.0]).unwrap();
        let expected = -(0.6f64 * 0.6f64.log2() + 0.4f64 * 0.4f64.log2());
        assert!((h - expected).abs() < 1e-12);
        assert!((h - 0.971).abs() < 1e-3);
    }

    #[test]
    fn test_end_to_end_germany() {
        let languages = vec![
            entry("DEU", "German", "T", Some(87.0)),
            entry("DEU", "Turkish", "F", Some(1.8)),
        ];
        let countries = vec![germany()];

        let stats = compute_country_language_stats(&languages, &countries);
        assert_eq!(stats.len(), 1);

        let deu = &stats[0];
        assert_eq!(deu.country_code, "DEU");
        assert_eq!(deu.n_languages, 2);
        assert_eq!(deu.n_official, 1);
        assert_eq!(deu.top_language.as_deref(), Some("German"));
        assert_eq!(deu.top_pct, Some(87.0));
        assert_eq!(deu.name.as_deref(), Some("Germany"));
        assert_eq!(deu.population, Some(83_000_000));

        let p1 = 0.87 / 0.888;
        let p2 = 0.018 / 0.888;
        let expected = -(p1 * f64::log2(p1) + p2 * f64::log2(p2));
        let h = deu.entropy.unwrap();
        assert!((h - expected).abs() < 1e-9);
        assert!(h > 0.14 && h < 0.15);
    }

    #[test]
    fn test_country_without_languages_is_absent() {
        let languages = vec![entry("DEU", "German", "T", Some(100.0))];
        let countries = vec![germany(), Country::new("FRA")];

        let stats = compute_country_language_stats(&languages, &countries);
        assert_eq!(stats.len(), 1);
        assert!(stats.iter().all(|s| s.country_code != "FRA"));
    }

    #[test]
    fn test_orphan_language_code_keeps_row() {
        let languages = vec![entry("ZZZ", "Klingon", "T", None)];
        let stats = compute_country_language_stats(&languages, &[germany()]);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].country_code, "ZZZ");
        assert_eq!(stats[0].name, None);
        assert_eq!(stats[0].population, None);
        assert_eq!(stats[0].entropy, None);
        assert_eq!(stats[0].top_language, None);
    }

    #[test]
    fn test_distinct_languages_and_official_bound() {
        let languages = vec![
            entry("CHE", "German", "T", Some(63.6)),
            entry("CHE", "French", "T", Some(19.2)),
            entry("CHE", "Italian", "T", Some(7.7)),
            entry("CHE", "Romansh", "T", Some(0.6)),
            entry("CHE", "German", "F", Some(1.0)),
            entry("CHE", "Portuguese", "F", None),
        ];

        let stats = compute_country_language_stats(&languages, &[]);
        let che = stats_for(&stats, "CHE");

        assert_eq!(che.n_languages, 5);
        assert_eq!(che.n_official, 4);
        assert!(che.n_official <= che.n_languages);
    }

    #[test]
    fn test_missing_percentages_give_absent_entropy() {
        let languages = vec![
            entry("AAA", "A", "T", None),
            entry("AAA", "B", "F", None),
            entry("BBB", "C", "T", Some(0.0)),
        ];

        let stats = compute_country_language_stats(&languages, &[]);
        assert_eq!(stats_for(&stats, "AAA").entropy, None);
        assert_eq!(stats_for(&stats, "BBB").entropy, None);
        // A zero percentage is still a usable value for the top language.
        assert_eq!(stats_for(&stats, "BBB").top_pct, Some(0.0));
    }

    #[test]
    fn test_top_language_tie_keeps_first() {
        let languages = vec![
            entry("BEL", "Dutch", "T", Some(40.0)),
            entry("BEL", "French", "T", Some(40.0)),
        ];

        let stats = compute_country_language_stats(&languages, &[]);
        assert_eq!(stats[0].top_language.as_deref(), Some("Dutch"));
    }

    #[test]
    fn test_malformed_country_does_not_leak() {
        let languages = vec![
            entry("AAA", "A", "T", Some(f64::NAN)),
            entry("BBB", "B", "T", Some(50.0)),
            entry("BBB", "C", "F", Some(50.0)),
        ];

        let stats = compute_country_language_stats(&languages, &[]);
        assert_eq!(stats_for(&stats, "AAA").entropy, None);
        assert_eq!(stats_for(&stats, "AAA").top_language, None);
        assert!((stats_for(&stats, "BBB").entropy.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_codes_are_trimmed_and_case_sensitive() {
        let languages = vec![
            entry(" DEU ", "German", "T", Some(90.0)),
            entry("deu", "German", "T", Some(90.0)),
        ];

        let stats = compute_country_language_stats(&languages, &[germany()]);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats_for(&stats, "DEU").name.as_deref(), Some("Germany"));
        assert_eq!(stats_for(&stats, "deu").name, None);
    }

    #[test]
    fn test_duplicate_country_first_wins() {
        let mut second = germany();
        second.name = Some("Deutschland".to_string());
        let languages = vec![entry("DEU", "German", "T", None)];

        let stats = compute_country_language_stats(&languages, &[germany(), second]);
        assert_eq!(stats[0].name.as_deref(), Some("Germany"));
    }

    #[test]
    fn test_country_stats_idempotent() {
        let languages = vec![
            entry("DEU", "German", "T", Some(87.0)),
            entry("AUT", "German", "T", Some(92.0)),
            entry("DEU", "Turkish", "F", Some(1.8)),
        ];
        let countries = vec![germany()];

        let first = compute_country_language_stats(&languages, &countries);
        let second = compute_country_language_stats(&languages, &countries);
        assert_eq!(first, second);
    }

    #[test]
    fn test_global_counts_distinct_countries() {
        let languages = vec![
            entry("USA", "English", "T", Some(86.2)),
            entry("USA", "English", "T", Some(1.0)),
            entry("GBR", "English", "T", Some(97.3)),
            entry("CAN", "English", "F", Some(60.4)),
            entry("CAN", "French", "T", Some(23.4)),
        ];

        let stats = compute_global_language_stats(&languages, &[]);
        let english = stats.iter().find(|s| s.language == "English").unwrap();

        assert_eq!(english.countries_spoken, 3);
        assert_eq!(english.official_countries, 2);
        assert_eq!(english.max_percentage, Some(97.3));
        let avg = english.avg_percentage.unwrap();
        assert!((avg - (86.2 + 1.0 + 97.3 + 60.4) / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_global_official_needs_one_official_row_per_country() {
        let languages = vec![
            entry("IND", "Hindi", "F", Some(10.0)),
            entry("IND", "Hindi", "T", Some(30.0)),
        ];

        let stats = compute_global_language_stats(&languages, &[]);
        assert_eq!(stats[0].countries_spoken, 1);
        assert_eq!(stats[0].official_countries, 1);
    }

    #[test]
    fn test_global_language_names_case_sensitive() {
        let languages = vec![
            entry("GBR", "English", "T", None),
            entry("IRL", "english", "T", None),
        ];

        let stats = compute_global_language_stats(&languages, &[]);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.avg_percentage.is_none()));
        assert!(stats.iter().all(|s| s.max_percentage.is_none()));
    }

    #[test]
    fn test_global_ordering() {
        let languages = vec![
            entry("A", "Zulu", "F", None),
            entry("B", "Zulu", "F", None),
            entry("A", "Xhosa", "T", None),
            entry("B", "Xhosa", "F", None),
            entry("C", "Arabic", "T", None),
            entry("A", "Afrikaans", "F", None),
        ];

        let stats = compute_global_language_stats(&languages, &[]);
        let order: Vec<&str> = stats.iter().map(|s| s.language.as_str()).collect();

        // Xhosa and Zulu tie on coverage; Xhosa has an official country.
        // Afrikaans and Arabic tie on coverage; Arabic is official.
        assert_eq!(order, vec!["Xhosa", "Zulu", "Arabic", "Afrikaans"]);
    }

    #[test]
    fn test_single_country_language_included() {
        let languages = vec![entry("ISL", "Icelandic", "T", Some(95.7))];
        let stats = compute_global_language_stats(&languages, &[]);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].countries_spoken, 1);
    }

    #[test]
    fn test_table_wrappers_fail_fast() {
        let languages = Table::new("languages", ["country_code", "pct"], vec![vec!["DEU", "1"]]);
        let countries = Table::new("countries", ["code"], vec![vec!["DEU"]]);

        let err = country_language_stats(&languages, &countries).unwrap_err();
        assert!(err.is_schema());
        let err = global_language_stats(&languages, &countries).unwrap_err();
        assert!(err.is_schema());

        let countries_without_code = Table::new("countries", ["name"], vec![vec!["Germany"]]);
        let languages = Table::new(
            "languages",
            ["country_code", "language"],
            vec![vec!["DEU", "German"]],
        );
        assert!(country_language_stats(&languages, &countries_without_code)
            .unwrap_err()
            .is_schema());
    }

    #[test]
    fn test_table_wrapper_end_to_end() {
        let languages = Table::new(
            "languages",
            ["country_code", "language", "is_official", "percentage"],
            vec![
                vec!["DEU", "German", "T", "87.0"],
                vec!["DEU", "Turkish", "F", "1.8"],
            ],
        );
        let countries = Table::new(
            "countries",
            ["code", "name", "population"],
            vec![vec!["DEU", "Germany", "83000000"]],
        );

        let stats = country_language_stats(&languages, &countries).unwrap();
        assert_eq!(stats[0].n_languages, 2);
        assert_eq!(stats[0].n_official, 1);
        assert_eq!(stats[0].population, Some(83_000_000));

        let global = global_language_stats(&languages, &countries).unwrap();
        assert_eq!(global.len(), 2);
        assert_eq!(global[0].language, "German");
    }
}
