use chrono::{Datelike, NaiveDate};

use crate::fields::is_affirmative;
use crate::models::{DateField, Record, StatusLabel};

/// Status choices offered by the dashboard's status select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Completed,
    HandedToSupport,
    InProgress,
    Suspended,
}

impl StatusFilter {
    /// Unknown choices return `None` and constrain nothing.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "completed" | "concluido" | "concluído" => Some(StatusFilter::Completed),
            "handedtosupport" | "suporte" => Some(StatusFilter::HandedToSupport),
            "inprogress" | "andamento" => Some(StatusFilter::InProgress),
            "suspended" | "suspenso" => Some(StatusFilter::Suspended),
            _ => None,
        }
    }

    pub fn status_label(self) -> StatusLabel {
        match self {
            StatusFilter::Completed => StatusLabel::Completed,
            StatusFilter::HandedToSupport => StatusLabel::HandedToSupport,
            StatusFilter::InProgress => StatusLabel::InProgress,
            StatusFilter::Suspended => StatusLabel::Suspended,
        }
    }
}

/// Inclusive bounds. The upper bound covers the whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// An active range never admits a missing date, even when open-ended.
    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFilter {
    pub field: DateField,
    pub year: i32,
    pub month: u32,
}

impl MonthFilter {
    pub fn matches(&self, record: &Record) -> bool {
        record
            .date(self.field)
            .is_some_and(|date| date.year() == self.year && date.month() == self.month)
    }
}

/// Independent predicates, combined with AND. Defaults constrain nothing
/// except that suspended cases stay hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub handler: Option<String>,
    pub status: Option<StatusFilter>,
    pub show_suspended: bool,
    pub search: Option<String>,
    pub only_missing_actual_start: bool,
    pub only_closure_term: bool,
    pub start_range: DateRange,
    pub actual_start_range: DateRange,
    pub month: Option<MonthFilter>,
}

impl FilterSpec {
    pub fn matches(&self, record: &Record) -> bool {
        if !self.show_suspended && record.status_label == StatusLabel::Suspended {
            return false;
        }

        if let Some(handler) = self.handler.as_deref().filter(|h| !h.is_empty()) {
            if record.handler != handler {
                return false;
            }
        }

        if let Some(status) = self.status {
            if record.status_label != status.status_label() {
                return false;
            }
        }

        if self.only_missing_actual_start && !record.has_no_actual_start {
            return false;
        }

        if self.only_closure_term && !is_affirmative(&record.closure_term) {
            return false;
        }

        if let Some(needle) = self.search_needle() {
            let haystack = format!("{} {}", record.client, record.handler).to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        if !self.start_range.admits(record.start_date) {
            return false;
        }

        if !self.actual_start_range.admits(record.actual_start_date) {
            return false;
        }

        self.month.map_or(true, |month| month.matches(record))
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|text| text.trim().to_lowercase())
            .filter(|text| !text.is_empty())
    }
}

/// Keeps the records matching every predicate of `spec`, in input order.
pub fn filter_records<'a, I>(records: I, spec: &FilterSpec) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|record| spec.matches(record))
        .collect()
}
