//! Plain SQL helpers. Every function takes a connection (or a transaction
//! through `Deref`) and leaves transaction control to the caller.

pub mod category_ops;
pub mod counter_ops;
pub mod iteration_ops;
pub mod workspace_ops;

use chrono::{DateTime, Utc};

use sift_core::errors::SiftResult;

use crate::corrupt;

pub(crate) fn parse_timestamp(table: &str, raw: &str) -> SiftResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("bad timestamp '{raw}': {e}")))
}
