//! Remote report store (spreadsheet web app)
//!
//! Saves append rows, so the store keeps every save-generation of a report;
//! readers reduce them with [`crate::services::dedup`].

use crate::parsers::parse_load_response;
use crate::types::{Report, SaveStamp, SheetRow, StoreFailure, StoreResult, SHEET_HEADERS};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Remote store seam for the report service
pub trait ReportStore {
    /// Append one save-generation of `report`
    fn save(&self, report: &Report, saved_at: &SaveStamp) -> StoreResult<()>;

    /// Remove every row of `id`
    fn delete(&self, id: &str) -> StoreResult<()>;

    /// Remove all rows
    fn clear(&self) -> StoreResult<()>;

    /// Every row currently stored (all generations)
    fn load(&self) -> StoreResult<Vec<SheetRow>>;
}

/// Body of a save request: header list plus one value row per item
pub fn save_body(report: &Report, saved_at: &SaveStamp) -> Value {
    let rows: Vec<Vec<Value>> = SheetRow::for_report(report, saved_at)
        .iter()
        .map(SheetRow::to_values)
        .collect();
    json!({
        "action": "save",
        "rows": rows,
        "headers": SHEET_HEADERS,
    })
}

pub fn delete_body(id: &str) -> Value {
    json!({ "action": "delete", "id": id })
}

pub fn clear_body() -> Value {
    json!({ "action": "clear" })
}

/// Store reached over HTTP with a blocking client
pub struct HttpReportStore {
    url: Option<String>,
    client: Client,
}

impl HttpReportStore {
    /// `url` of `None` (or blank) gives a store that always fails with
    /// `NotConfigured`.
    pub fn new(url: Option<String>) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreFailure::Unreachable(e.to_string()))?;
        let url = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        Ok(Self { url, client })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    fn endpoint(&self) -> StoreResult<&str> {
        self.url.as_deref().ok_or(StoreFailure::NotConfigured)
    }

    fn post(&self, body: &Value) -> StoreResult<()> {
        let url = self.endpoint()?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body.to_string())
            .send()
            .map_err(|e| StoreFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreFailure::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

impl ReportStore for HttpReportStore {
    fn save(&self, report: &Report, saved_at: &SaveStamp) -> StoreResult<()> {
        self.post(&save_body(report, saved_at))?;
        info!(id = %report.id, items = report.items.len(), "Saved report to store");
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.post(&delete_body(id))?;
        info!(id = %id, "Deleted report from store");
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.post(&clear_body())?;
        info!("Cleared report store");
        Ok(())
    }

    fn load(&self) -> StoreResult<Vec<SheetRow>> {
        let url = self.endpoint()?;
        let response = self
            .client
            .get(url)
            .query(&[("action", "load")])
            .send()
            .map_err(|e| StoreFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreFailure::Rejected {
                status: status.as_u16(),
            });
        }

        let mut body = response
            .bytes()
            .map_err(|e| StoreFailure::Unreachable(e.to_string()))?
            .to_vec();
        debug!(bytes = body.len(), "Received store load response");
        parse_load_response(&mut body)
    }
}
