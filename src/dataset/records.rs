//! Typed record extraction from canonical tables.
//!
//! Missing identifying columns are schema errors. Everything else is a
//! data-quality gap and becomes `None`.

use super::fields;
use super::table::Table;
use crate::error::AtlasError;
use crate::models::{City, Country, GazetteerPoint, LanguageEntry, OfficialFlag};
use tracing::{debug, warn};

/// Parse a non-negative integer count, accepting float notation such as
/// `83000000.0` or `8.3e7`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && *v <= u64::MAX as f64)
            .map(|v| v.round() as u64)
    })
}

/// Parse a finite float.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn owned(cell: Option<&str>) -> Option<String> {
    cell.map(str::to_string)
}

fn report_skipped(table: &Table, skipped: usize, why: &str) {
    if skipped > 0 {
        warn!("Skipped {} row(s) in '{}': {}", skipped, table.name(), why);
    }
}

impl Country {
    /// Extract countries. Requires `code`.
    pub fn from_table(table: &Table) -> Result<Vec<Country>, AtlasError> {
        table.require(&[fields::CODE])?;

        let code = table.column(fields::CODE);
        let name = table.column(fields::NAME);
        let continent = table.column(fields::CONTINENT);
        let region = table.column(fields::REGION);
        let population = table.column(fields::POPULATION);

        let mut out = Vec::with_capacity(table.len());
        let mut skipped = 0;

        for row in table.rows() {
            let Some(code) = row.get_opt(code) else {
                skipped += 1;
                continue;
            };

            out.push(Country {
                code: code.to_string(),
                name: owned(row.get_opt(name)),
                continent: owned(row.get_opt(continent)),
                region: owned(row.get_opt(region)),
                population: row.get_opt(population).and_then(parse_count),
            });
        }

        report_skipped(table, skipped, "empty country code");
        debug!("Extracted {} countries", out.len());
        Ok(out)
    }
}

impl City {
    /// Extract cities. Requires `country_code`.
    pub fn from_table(table: &Table) -> Result<Vec<City>, AtlasError> {
        table.require(&[fields::COUNTRY_CODE])?;

        let country_code = table.column(fields::COUNTRY_CODE);
        let name = table.column(fields::NAME);
        let district = table.column(fields::DISTRICT);
        let population = table.column(fields::POPULATION);

        let mut out = Vec::with_capacity(table.len());
        let mut skipped = 0;

        for row in table.rows() {
            let Some(code) = row.get_opt(country_code) else {
                skipped += 1;
                continue;
            };

            out.push(City {
                country_code: code.to_string(),
                name: owned(row.get_opt(name)),
                district: owned(row.get_opt(district)),
                population: row.get_opt(population).and_then(parse_count),
            });
        }

        report_skipped(table, skipped, "empty country code");
        debug!("Extracted {} cities", out.len());
        Ok(out)
    }
}

impl LanguageEntry {
    /// Extract language entries. Requires `country_code` and `language`.
    pub fn from_table(table: &Table) -> Result<Vec<LanguageEntry>, AtlasError> {
        table.require(&[fields::COUNTRY_CODE, fields::LANGUAGE])?;

        let country_code = table.column(fields::COUNTRY_CODE);
        let language = table.column(fields::LANGUAGE);
        let is_official = table.column(fields::IS_OFFICIAL);
        let percentage = table.column(fields::PERCENTAGE);

        let mut out = Vec::with_capacity(table.len());
        let mut skipped = 0;

        for row in table.rows() {
            let (Some(code), Some(lang)) = (row.get_opt(country_code), row.get_opt(language))
            else {
                skipped += 1;
                continue;
            };

            out.push(
                LanguageEntry::new(code, lang)
                    .with_official(OfficialFlag::resolve(row.get_opt(is_official)))
                    .with_percentage(row.get_opt(percentage).and_then(parse_number)),
            );
        }

        report_skipped(table, skipped, "empty country code or language");
        debug!("Extracted {} language entries", out.len());
        Ok(out)
    }
}

impl GazetteerPoint {
    /// Extract gazetteer points. Requires `lat` and `lon`; rows with
    /// unusable coordinates are dropped.
    pub fn from_table(table: &Table) -> Result<Vec<GazetteerPoint>, AtlasError> {
        table.require(&[fields::LAT, fields::LON])?;

        let name = table.column(fields::NAME);
        let lat = table.column(fields::LAT);
        let lon = table.column(fields::LON);
        let population = table.column(fields::POPULATION);
        let country_code = table.column(fields::COUNTRY_CODE);

        let mut out = Vec::with_capacity(table.len());
        let mut skipped = 0;

        for row in table.rows() {
            let coords = row
                .get_opt(lat)
                .and_then(parse_number)
                .zip(row.get_opt(lon).and_then(parse_number))
                .filter(|(la, lo)| (-90.0..=90.0).contains(la) && (-180.0..=180.0).contains(lo));

            let Some((lat, lon)) = coords else {
                skipped += 1;
                continue;
            };

            out.push(GazetteerPoint {
                name: owned(row.get_opt(name)),
                lat,
                lon,
                population: row.get_opt(population).and_then(parse_count),
                country_code: owned(row.get_opt(country_code)),
            });
        }

        report_skipped(table, skipped, "missing or out-of-range coordinates");
        debug!("Extracted {} gazetteer points", out.len());
        Ok(out)
    }
}
