//! popatlas - geo-linguistic statistics over the world dataset.
//!
//! The core is [`analysis::aggregator`], which derives per-country and
//! per-language statistics (including a Shannon-entropy diversity index)
//! from the `country`, `city` and `countrylanguage` tables. Loading is done
//! by [`dataset::DataLoader`]; rendering by [`report`].

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod report;

pub use analysis::{
    compute_country_language_stats, compute_global_language_stats, country_language_stats,
    global_language_stats, shannon_entropy,
};
pub use dataset::{DataLoader, Dataset, Table};
pub use error::AtlasError;
