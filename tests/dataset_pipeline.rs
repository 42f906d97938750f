//! End-to-end: CSV files on disk through the loader, the aggregator and
//! the report renderers.

use popatlas::analysis;
use popatlas::config::{ColumnsConfig, Config, DataConfig};
use popatlas::report::{self, Report, ReportMetadata, View};
use popatlas::{AtlasError, DataLoader};
use std::path::Path;
use tempfile::TempDir;

const COUNTRY_CSV: &str = "\
Code,Name,Continent,Region,SurfaceArea,Population
DEU,Germany,Europe,Western Europe,357022,82164700
CHE,Switzerland,Europe,Western Europe,41284,7160400
ATA,Antarctica,Antarctica,Antarctica,13120000,0
";

const CITY_CSV: &str = "\
ID,Name,CountryCode,District,Population
3068,Berlin,DEU,Berliini,3386667
3069,Hamburg,DEU,Hamburg,1704735
3248,Zürich,CHE,Zürich,336800
3249,Geneve,CHE,Geneve,173500
";

const LANGUAGE_CSV: &str = "\
CountryCode,Language,IsOfficial,Percentage
DEU,German,T,87.0
DEU,Turkish,F,1.8
CHE,German,T,63.6
CHE,French,T,19.2
CHE,Italian,T,7.7
CHE,Romansh,T,0.6
XXX,Klingon,F,100.0
";

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn world_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "country.csv", COUNTRY_CSV);
    write(dir.path(), "city.csv", CITY_CSV);
    write(dir.path(), "countrylanguage.csv", LANGUAGE_CSV);
    dir
}

fn loader(dir: &Path) -> DataLoader {
    let data = DataConfig {
        dir: dir.to_path_buf(),
        ..DataConfig::default()
    };
    DataLoader::new(data, ColumnsConfig::default())
}

#[test]
fn country_stats_from_world_files() {
    let dir = world_dir();
    let dataset = loader(dir.path()).load().unwrap();

    let stats =
        analysis::country_language_stats(&dataset.languages_table, &dataset.countries_table)
            .unwrap();

    // ATA has no language rows; the orphan XXX row keeps its stats but
    // has no country metadata.
    let codes: Vec<&str> = stats.iter().map(|s| s.country_code.as_str()).collect();
    assert_eq!(codes, vec!["CHE", "DEU", "XXX"]);
    assert!(stats[2].name.is_none());
    assert!(stats[2].population.is_none());

    let deu = &stats[1];
    assert_eq!(deu.n_languages, 2);
    assert_eq!(deu.n_official, 1);
    assert_eq!(deu.top_language.as_deref(), Some("German"));
    assert_eq!(deu.top_pct, Some(87.0));
    assert_eq!(deu.population, Some(82_164_700));
    let h = deu.entropy.unwrap();
    assert!((h - 0.1430).abs() < 1e-3, "entropy was {h}");

    let che = &stats[0];
    assert_eq!(che.n_official, 4);
    assert!(che.entropy.unwrap() > h);
}

#[test]
fn loaded_records_match_table_wrappers() {
    let dir = world_dir();
    let dataset = loader(dir.path()).load().unwrap();

    assert_eq!(
        analysis::compute_country_language_stats(&dataset.languages, &dataset.countries),
        analysis::country_language_stats(&dataset.languages_table, &dataset.countries_table)
            .unwrap()
    );
    assert_eq!(
        analysis::compute_global_language_stats(&dataset.languages, &dataset.countries),
        analysis::global_language_stats(&dataset.languages_table, &dataset.countries_table)
            .unwrap()
    );
}

#[test]
fn global_stats_rank_by_coverage() {
    let dir = world_dir();
    let dataset = loader(dir.path()).load().unwrap();

    let global =
        analysis::compute_global_language_stats(&dataset.languages, &dataset.countries);

    assert_eq!(global[0].language, "German");
    assert_eq!(global[0].countries_spoken, 2);
    assert_eq!(global[0].official_countries, 2);
    assert_eq!(global[0].max_percentage, Some(87.0));

    let klingon = global.iter().find(|g| g.language == "Klingon").unwrap();
    assert_eq!(klingon.countries_spoken, 1);
    assert_eq!(klingon.official_countries, 0);
}

#[test]
fn markdown_and_json_render_country_view() {
    let dir = world_dir();
    let dataset = loader(dir.path()).load().unwrap();
    let stats = analysis::compute_country_language_stats(&dataset.languages, &dataset.countries);

    let report = Report {
        metadata: ReportMetadata::new(dir.path().display().to_string()),
        view: View::Countries { stats },
    };

    let markdown = report::generate_markdown_report(&report);
    assert!(markdown.contains("# Language Diversity by Country"));
    assert!(markdown.contains("| DEU | Germany | Europe | 82,164,700 | 2 | 1 | 0.143 | German | 87.00% |"));

    let json = report::generate_json_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["view"], "countries");
    assert_eq!(value["stats"][1]["country_code"], "DEU");
}

#[test]
fn profile_lists_cities_and_languages() {
    let dir = world_dir();
    let dataset = loader(dir.path()).load().unwrap();
    let stats = analysis::compute_country_language_stats(&dataset.languages, &dataset.countries);

    let profile = analysis::country_profile(
        "CHE",
        &dataset.countries,
        &dataset.cities,
        &dataset.languages,
        &stats,
        1,
    )
    .unwrap();

    assert_eq!(profile.city_count, 2);
    assert_eq!(profile.top_cities.len(), 1);
    assert_eq!(profile.top_cities[0].name.as_deref(), Some("Zürich"));
    assert_eq!(profile.official_languages.len(), 4);
    assert!(profile.other_languages.is_empty());

    assert!(analysis::country_profile(
        "NOPE",
        &dataset.countries,
        &dataset.cities,
        &dataset.languages,
        &stats,
        5
    )
    .is_none());
}

#[test]
fn aliases_from_config_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "country.csv",
        "iso3,Name\nDEU,Germany\n",
    );
    write(dir.path(), "city.csv", "CountryCode,Name\nDEU,Berlin\n");
    write(
        dir.path(),
        "countrylanguage.csv",
        "CountryCode,Language,IsOfficial,Percentage\nDEU,German,T,87.0\n",
    );

    let config_path = dir.path().join("atlas.toml");
    write(
        dir.path(),
        "atlas.toml",
        "[columns.countries]\ncode = [\"iso3\"]\n",
    );
    let config = Config::load(&config_path).unwrap();

    let data = DataConfig {
        dir: dir.path().to_path_buf(),
        ..config.data.clone()
    };
    let dataset = DataLoader::new(data, config.columns.clone()).load().unwrap();

    assert_eq!(dataset.countries[0].code, "DEU");
    assert_eq!(dataset.countries[0].name.as_deref(), Some("Germany"));
}

#[test]
fn missing_language_column_is_schema_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "country.csv", "Code\nDEU\n");
    write(dir.path(), "city.csv", "CountryCode\nDEU\n");
    write(dir.path(), "countrylanguage.csv", "CountryCode,Percentage\nDEU,87.0\n");

    let err = loader(dir.path()).load().unwrap_err();
    assert!(err.is_schema(), "unexpected error: {err}");
    match err {
        AtlasError::Schema { missing, .. } => assert_eq!(missing, vec!["language"]),
        other => panic!("unexpected error: {other}"),
    }
}
