//! Canonical field names.
//!
//! Source headers are renamed to these at load time, so everything past the
//! loader only ever looks columns up by the names below.

pub const CODE: &str = "code";
pub const COUNTRY_CODE: &str = "country_code";
pub const NAME: &str = "name";
pub const CONTINENT: &str = "continent";
pub const REGION: &str = "region";
pub const POPULATION: &str = "population";
pub const DISTRICT: &str = "district";

pub const LANGUAGE: &str = "language";
pub const IS_OFFICIAL: &str = "is_official";
pub const PERCENTAGE: &str = "percentage";

pub const LAT: &str = "lat";
pub const LON: &str = "lon";

/// Table names used in error messages and logs.
pub const COUNTRIES_TABLE: &str = "countries";
pub const CITIES_TABLE: &str = "cities";
pub const LANGUAGES_TABLE: &str = "languages";
pub const GAZETTEER_TABLE: &str = "gazetteer";
