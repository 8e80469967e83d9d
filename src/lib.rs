//! labtally: daily production reports for a dental lab
//!
//! Reports are cached locally, mirrored to a spreadsheet-backed report
//! store, and aggregated into a monthly item × day matrix and a 30-day
//! dashboard.

pub mod cli;
pub mod parsers;
pub mod services;
pub mod types;
