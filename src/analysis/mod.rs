//! Analysis modules.
//!
//! `aggregator` holds the derived language statistics; `explorer` holds the
//! drill-down views built on top of them.

pub mod aggregator;
pub mod explorer;

pub use aggregator::*;
pub use explorer::*;
