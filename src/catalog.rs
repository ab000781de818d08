use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::aggregate;
use crate::filter::{filter_records, FilterSpec};
use crate::models::{HandlerTally, Record, Summary};
use crate::normalize::{normalize_payload, PayloadError};
use crate::sort::{sort_records, SortSpec};

/// The current record snapshot. A refresh swaps the whole collection; it is
/// never patched in place.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
}

/// Everything the dashboard renders for one filter/sort selection.
#[derive(Debug, Clone)]
pub struct CatalogView<'a> {
    pub rows: Vec<&'a Record>,
    pub summary: Summary,
    pub handler_tallies: Vec<HandlerTally>,
    pub snapshot_len: usize,
}

impl Catalog {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Normalizes the payload before touching the snapshot, so a rejected
    /// payload leaves the previous records in place.
    pub fn refresh(&mut self, payload: Value) -> Result<usize, PayloadError> {
        let records = normalize_payload(payload)?;
        self.records = records;
        info!(records = self.records.len(), "catalog refreshed");
        Ok(self.records.len())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-empty handler names for the handler select.
    pub fn handler_options(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.handler.as_str())
            .filter(|handler| !handler.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn view(&self, filter: &FilterSpec, sort: &SortSpec, today: NaiveDate) -> CatalogView<'_> {
        let matching = filter_records(&self.records, filter);
        let summary = aggregate::summarize(&matching, today);
        let handler_tallies = aggregate::group_by_handler(&matching);

        CatalogView {
            rows: sort_records(&matching, sort),
            summary,
            handler_tallies,
            snapshot_len: self.records.len(),
        }
    }
}
