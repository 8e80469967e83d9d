//! Services for normalization, aggregation, persistence and export

pub mod aggregator;
pub mod backup;
pub mod bucketing;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod dedup;
pub mod export;
pub mod normalizer;
pub mod report_service;
pub mod store;

pub use aggregator::Aggregator;
pub use cache::{FileReportCache, MemoryReportCache, ReportRepository};
pub use calendar::HolidayCalendar;
pub use config::AppConfig;
pub use normalizer::{normalize_date, parse_work_date};
pub use report_service::{NewReport, ReportService, WriteOutcome};
pub use store::{HttpReportStore, ReportStore};
