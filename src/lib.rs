//! Reporting core of a sales/collection business-intelligence dashboard.
//!
//! The crate sits between raw fact records (sales, collection, product
//! comparison) and the rendered views: it filters the fetched slice, joins
//! and aggregates it, ranks products, sorts and searches report tables,
//! formats display values and serializes CSV exports. Everything downstream
//! of the data boundary is a pure function of (raw sets, filter).

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod format;
pub mod ranking;
pub mod service;
pub mod sort;
pub mod types;
pub mod views;
