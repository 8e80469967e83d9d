//! Type definitions for labtally

mod department;
mod error;
mod report;
mod row;
mod stats;

pub use department::*;
pub use error::*;
pub use report::*;
pub use row::*;
pub use stats::*;

/// Local cache loading warning types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheWarning {
    /// Failed to open or read the cache file
    LoadFailed(String),
    /// Cache file was not a JSON array of reports (it has been cleared)
    Corrupted(String),
}

impl std::fmt::Display for CacheWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed(msg) | Self::Corrupted(msg) => f.write_str(msg),
        }
    }
}
