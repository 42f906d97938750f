//! Markdown and JSON report generation.
//!
//! Absent values always render as an em dash so "no data" is never
//! confused with zero.

use super::{Report, ReportMetadata, View};
use crate::models::{
    City, CountryLanguageStats, CountryProfile, DatasetSummary, GazetteerPoint,
    GlobalLanguageStats, LanguageOccurrences, ProfileLanguage,
};
use anyhow::{Context, Result};
use std::path::Path;

const ABSENT: &str = "—";

/// Format an integer with thousands separators.
pub fn format_int(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Like [`format_int`] for nullable counts.
pub fn format_count(value: Option<u64>) -> String {
    value.map(format_int).unwrap_or_else(|| ABSENT.to_string())
}

fn format_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| ABSENT.to_string())
}

fn format_float(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| ABSENT.to_string())
}

/// Table cell text; pipes would break the row.
fn cell(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.replace('|', "\\|"),
        _ => ABSENT.to_string(),
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.view.title()));
    output.push_str(&generate_metadata_section(&report.metadata));

    let body = match &report.view {
        View::Overview {
            summary,
            top_languages,
            most_diverse,
        } => generate_overview(summary, top_languages, most_diverse),
        View::Countries { stats } => generate_country_stats_section(stats),
        View::Languages { stats } => generate_language_stats_section(stats),
        View::Language { occurrences } => generate_occurrences_section(occurrences),
        View::Country { profile } => generate_profile_section(profile),
        View::Cities {
            cities, gazetteer, ..
        } => generate_cities_section(cities, gazetteer.as_deref()),
        View::Search { matches, .. } => generate_search_section(matches),
    };
    output.push_str(&body);

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.data_dir));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

fn generate_overview(
    summary: &DatasetSummary,
    top_languages: &[GlobalLanguageStats],
    most_diverse: &[CountryLanguageStats],
) -> String {
    let mut section = String::new();

    section.push_str("## Dataset\n\n");
    section.push_str("| Countries | Cities | Language rows | Unique languages | Avg languages / country |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        format_int(summary.countries as u64),
        format_int(summary.cities as u64),
        format_int(summary.language_rows as u64),
        format_int(summary.unique_languages as u64),
        format_float(summary.avg_languages_per_country, 2),
    ));

    section.push_str(&format!(
        "- **Entropy available:** {}\n",
        if summary.entropy_available { "yes" } else { "no" }
    ));
    section.push_str(&format!(
        "- **Gazetteer points:** {}\n\n",
        format_count(summary.gazetteer_points.map(|n| n as u64))
    ));

    section.push_str("## Top Languages by Country Coverage\n\n");
    section.push_str(&generate_language_table(top_languages));

    section.push_str("## Most Evenly Distributed Countries\n\n");
    if most_diverse.is_empty() {
        section.push_str("Entropy is unavailable: the language table has no usable percentages.\n\n");
    } else {
        section.push_str("| Country | Languages | Entropy (bits) | Top language |\n");
        section.push_str("|:---|:---:|:---:|:---|\n");
        for row in most_diverse {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                country_cell(row),
                row.n_languages,
                format_float(row.entropy, 3),
                cell(row.top_language.as_deref()),
            ));
        }
        section.push('\n');
    }

    section
}

fn country_cell(row: &CountryLanguageStats) -> String {
    match &row.name {
        Some(name) => format!("{} ({})", cell(Some(name)), row.country_code),
        None => row.country_code.clone(),
    }
}

fn generate_country_stats_section(stats: &[CountryLanguageStats]) -> String {
    let mut section = String::new();

    section.push_str(&format!("{} countries with language data.\n\n", stats.len()));
    section.push_str("| Code | Name | Continent | Population | Languages | Official | Entropy (bits) | Top language | Top % |\n");
    section.push_str("|:---|:---|:---|---:|:---:|:---:|:---:|:---|---:|\n");

    for row in stats {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            row.country_code,
            cell(row.name.as_deref()),
            cell(row.continent.as_deref()),
            format_count(row.population),
            row.n_languages,
            row.n_official,
            format_float(row.entropy, 3),
            cell(row.top_language.as_deref()),
            format_pct(row.top_pct),
        ));
    }
    section.push('\n');

    section
}

fn generate_language_table(stats: &[GlobalLanguageStats]) -> String {
    let mut table = String::new();

    if stats.is_empty() {
        table.push_str("No languages listed.\n\n");
        return table;
    }

    table.push_str("| Language | Countries | Official in | Avg % | Max % |\n");
    table.push_str("|:---|:---:|:---:|---:|---:|\n");
    for row in stats {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            cell(Some(&row.language)),
            row.countries_spoken,
            row.official_countries,
            format_pct(row.avg_percentage),
            format_pct(row.max_percentage),
        ));
    }
    table.push('\n');

    table
}

fn generate_language_stats_section(stats: &[GlobalLanguageStats]) -> String {
    let mut section = format!("{} distinct languages.\n\n", stats.len());
    section.push_str(&generate_language_table(stats));
    section
}

fn generate_occurrences_section(occ: &LanguageOccurrences) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "- **Countries where found:** {}\n",
        occ.countries_found
    ));
    section.push_str(&format!("- **Official entries:** {}\n", occ.official_entries));
    if occ.official_only {
        section.push_str("- *Showing official occurrences only*\n");
    }
    section.push('\n');

    if occ.occurrences.is_empty() {
        section.push_str("No matching occurrences.\n\n");
        return section;
    }

    section.push_str("| Country | Continent | Region | Status | Percentage |\n");
    section.push_str("|:---|:---|:---|:---|---:|\n");
    for o in &occ.occurrences {
        let country = match &o.name {
            Some(name) => format!("{} ({})", cell(Some(name)), o.country_code),
            None => o.country_code.clone(),
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            country,
            cell(o.continent.as_deref()),
            cell(o.region.as_deref()),
            o.is_official,
            format_pct(o.percentage),
        ));
    }
    section.push('\n');

    section
}

fn generate_profile_languages(title: &str, languages: &[ProfileLanguage]) -> String {
    let mut block = format!("### {}\n\n", title);

    if languages.is_empty() {
        block.push_str(&format!("{}\n\n", ABSENT));
        return block;
    }

    block.push_str("| Language | Percentage |\n");
    block.push_str("|:---|---:|\n");
    for lang in languages {
        block.push_str(&format!(
            "| {} | {} |\n",
            cell(Some(&lang.language)),
            format_pct(lang.percentage)
        ));
    }
    block.push('\n');

    block
}

fn generate_profile_section(profile: &CountryProfile) -> String {
    let mut section = String::new();
    let country = profile.country.as_ref();

    section.push_str("## Details\n\n");
    section.push_str(&format!("- **ISO-3:** {}\n", profile.code));
    section.push_str(&format!(
        "- **Continent:** {}\n",
        cell(country.and_then(|c| c.continent.as_deref()))
    ));
    section.push_str(&format!(
        "- **Region:** {}\n",
        cell(country.and_then(|c| c.region.as_deref()))
    ));
    section.push_str(&format!(
        "- **Population:** {}\n",
        format_count(country.and_then(|c| c.population))
    ));
    if let Some(stats) = &profile.stats {
        section.push_str(&format!(
            "- **Languages:** {} ({} official)\n",
            stats.n_languages, stats.n_official
        ));
        section.push_str(&format!(
            "- **Entropy:** {} bits\n",
            format_float(stats.entropy, 3)
        ));
    }
    section.push('\n');

    section.push_str("## Languages\n\n");
    if profile.official_languages.is_empty() && profile.other_languages.is_empty() {
        section.push_str("No language rows found for this country.\n\n");
    } else {
        section.push_str(&generate_profile_languages("Official", &profile.official_languages));
        section.push_str(&generate_profile_languages("Other", &profile.other_languages));
    }

    section.push_str(&format!(
        "## Cities (top {} of {})\n\n",
        profile.top_cities.len(),
        profile.city_count
    ));
    if profile.top_cities.is_empty() {
        section.push_str("No cities found for this country.\n\n");
    } else {
        section.push_str(&generate_city_table(&profile.top_cities));
    }

    section
}

fn generate_city_table(cities: &[City]) -> String {
    let mut table = String::new();

    table.push_str("| City | Country | District | Population |\n");
    table.push_str("|:---|:---|:---|---:|\n");
    for city in cities {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(city.name.as_deref()),
            city.country_code,
            cell(city.district.as_deref()),
            format_count(city.population),
        ));
    }
    table.push('\n');

    table
}

fn generate_cities_section(cities: &[City], gazetteer: Option<&[GazetteerPoint]>) -> String {
    let mut section = String::new();

    section.push_str("## Top Cities by Population\n\n");
    if cities.is_empty() {
        section.push_str("No cities found.\n\n");
    } else {
        section.push_str(&generate_city_table(cities));
    }

    section.push_str("## Gazetteer\n\n");
    match gazetteer {
        None => section.push_str("No lat/lon gazetteer loaded.\n\n"),
        Some([]) => section.push_str("No gazetteer points match.\n\n"),
        Some(points) => {
            section.push_str("| City | Country | Lat | Lon | Population |\n");
            section.push_str("|:---|:---|---:|---:|---:|\n");
            for p in points {
                section.push_str(&format!(
                    "| {} | {} | {:.4} | {:.4} | {} |\n",
                    cell(p.name.as_deref()),
                    cell(p.country_code.as_deref()),
                    p.lat,
                    p.lon,
                    format_count(p.population),
                ));
            }
            section.push('\n');
        }
    }

    section
}

fn generate_search_section(matches: &[String]) -> String {
    if matches.is_empty() {
        return "No languages match.\n\n".to_string();
    }

    let mut section = format!("{} match(es):\n\n", matches.len());
    for name in matches {
        section.push_str(&format!("- {}\n", name));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by popatlas*\n".to_string()
}
