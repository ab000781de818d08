use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

/// Payload keys as the spreadsheet API names them.
pub mod field {
    pub const CLIENT: &str = "cliente";
    pub const HANDLER: &str = "implantador";
    pub const COMPLETED: &str = "concluido";
    pub const START_DATE: &str = "data_inicio";
    pub const PROJECTED_START: &str = "previsao_start";
    pub const ACTUAL_START: &str = "start_real";
    pub const SUPPORT_PASSED: &str = "passado_suporte";
    pub const SUPPORT_TRANSITION: &str = "data_passagem_suporte";
    pub const CLOSURE_TERM: &str = "termo_encerramento";
    pub const COMMERCIAL_OWNER: &str = "comercial";
    pub const CLIENT_SIZE: &str = "porte";
    pub const LINK: &str = "link";
    pub const EMAIL_SENT: &str = "email_enviado";
    pub const NOTES: &str = "obs";
}

/// One row as delivered by the API. Every key is optional and unknown keys
/// are carried along untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    /// Rows that are not JSON objects carry no known fields.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusLabel {
    InProgress,
    Completed,
    HandedToSupport,
    Suspended,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 4] = [
        StatusLabel::InProgress,
        StatusLabel::Completed,
        StatusLabel::HandedToSupport,
        StatusLabel::Suspended,
    ];

    /// Label shown on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            StatusLabel::InProgress => "Em andamento",
            StatusLabel::Completed => "Concluído",
            StatusLabel::HandedToSupport => "Passado para suporte",
            StatusLabel::Suspended => "Suspenso",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Date-bearing fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DateField {
    Start,
    Projected,
    Actual,
    SupportTransition,
}

/// A normalized case. Serializes with the payload's own key names for the
/// text fields; parsed dates come out as ISO dates or null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "cliente")]
    pub client: String,
    #[serde(rename = "implantador")]
    pub handler: String,
    #[serde(rename = "concluido")]
    pub completed: String,
    #[serde(rename = "data_inicio")]
    pub start_date_text: String,
    #[serde(rename = "previsao_start")]
    pub projected_start_text: String,
    #[serde(rename = "start_real")]
    pub actual_start_text: String,
    #[serde(rename = "passado_suporte")]
    pub support_passed: String,
    #[serde(rename = "data_passagem_suporte")]
    pub support_transition_text: String,
    #[serde(rename = "termo_encerramento")]
    pub closure_term: String,
    #[serde(rename = "comercial")]
    pub commercial_owner: String,
    #[serde(rename = "porte")]
    pub client_size: String,
    pub link: String,
    #[serde(rename = "email_enviado")]
    pub email_sent: String,
    #[serde(rename = "obs")]
    pub notes: String,
    pub start_date: Option<NaiveDate>,
    pub projected_start_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub support_transition_date: Option<NaiveDate>,
    pub status_label: StatusLabel,
    pub has_no_actual_start: bool,
}

impl Record {
    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Start => self.start_date,
            DateField::Projected => self.projected_start_date,
            DateField::Actual => self.actual_start_date,
            DateField::SupportTransition => self.support_transition_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub counts_by_status: BTreeMap<StatusLabel, usize>,
    /// Records whose raw completion marker is not affirmative, whatever
    /// their derived status.
    pub open: usize,
    pub late: usize,
}

impl Summary {
    pub fn count(&self, status: StatusLabel) -> usize {
        self.counts_by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerTally {
    pub handler: String,
    pub count: usize,
    /// Share of the largest group, rounded, for bar widths.
    pub percent_of_top: u32,
}
