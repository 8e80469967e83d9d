//! Parsers for inbound payloads (store load responses, backup files)

mod backup;
mod sheet;

pub use backup::parse_backup;
pub use sheet::{cell_count, cell_text, parse_load_response, row_from_record, STATUS_SUCCESS};
