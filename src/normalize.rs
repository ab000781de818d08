use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::dates::parse_br_date;
use crate::fields::{is_no_start_text, normalize_text};
use crate::models::{field, RawRecord, Record};
use crate::status::classify;

#[derive(Error, Debug, PartialEq)]
pub enum PayloadError {
    #[error("{message}")]
    Rejected { message: String },

    #[error(
        "unexpected API response: expected an array or {{ok: true, data: [...]}}, received {type_tag}"
    )]
    UnexpectedShape { type_tag: &'static str },
}

pub fn normalize(raw: &RawRecord) -> Record {
    let text = |key: &str| normalize_text(raw.get(key));

    let client = text(field::CLIENT);
    let handler = text(field::HANDLER);
    let completed = text(field::COMPLETED);
    let start_date_text = text(field::START_DATE);
    let projected_start_text = text(field::PROJECTED_START);
    let actual_start_text = text(field::ACTUAL_START);
    let support_passed = text(field::SUPPORT_PASSED);
    let support_transition_text = text(field::SUPPORT_TRANSITION);

    let actual_start_date = parse_br_date(&actual_start_text);
    let status_label = classify(&completed, &support_passed);
    let has_no_actual_start = actual_start_date.is_none() || is_no_start_text(&actual_start_text);

    Record {
        start_date: parse_br_date(&start_date_text),
        projected_start_date: parse_br_date(&projected_start_text),
        support_transition_date: parse_br_date(&support_transition_text),
        actual_start_date,
        status_label,
        has_no_actual_start,
        closure_term: text(field::CLOSURE_TERM),
        commercial_owner: text(field::COMMERCIAL_OWNER),
        client_size: text(field::CLIENT_SIZE),
        link: text(field::LINK),
        email_sent: text(field::EMAIL_SENT),
        notes: text(field::NOTES),
        client,
        handler,
        completed,
        start_date_text,
        projected_start_text,
        actual_start_text,
        support_passed,
        support_transition_text,
    }
}

/// Output order matches input order.
pub fn normalize_all(rows: &[RawRecord]) -> Vec<Record> {
    rows.iter().map(normalize).collect()
}

/// Unwraps the accepted response envelopes into raw rows. Nothing is
/// ingested when the shape is not recognized.
pub fn extract_rows(payload: Value) -> Result<Vec<RawRecord>, PayloadError> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => {
            let ok = envelope.get("ok") == Some(&Value::Bool(true));
            match envelope.remove("data") {
                Some(Value::Array(rows)) if ok => rows,
                Some(Value::Object(mut inner)) if ok => match inner.remove("data") {
                    Some(Value::Array(rows)) => rows,
                    _ => return Err(rejection(envelope.get("error"), "object")),
                },
                _ => return Err(rejection(envelope.get("error"), "object")),
            }
        }
        other => return Err(rejection(None, type_tag(&other))),
    };

    debug!(rows = rows.len(), "payload rows extracted");
    Ok(rows.into_iter().map(RawRecord::from_value).collect())
}

pub fn normalize_payload(payload: Value) -> Result<Vec<Record>, PayloadError> {
    let rows = extract_rows(payload)?;
    Ok(normalize_all(&rows))
}

fn rejection(error: Option<&Value>, type_tag: &'static str) -> PayloadError {
    let message = match error {
        Some(Value::String(message)) if !message.trim().is_empty() => message.clone(),
        Some(Value::Null | Value::Bool(false)) | None => String::new(),
        Some(Value::String(_)) => String::new(),
        Some(other) => other.to_string(),
    };

    if message.is_empty() {
        PayloadError::UnexpectedShape { type_tag }
    } else {
        PayloadError::Rejected { message }
    }
}

fn type_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusLabel;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn normalizes_a_complete_row() {
        let raw = RawRecord::from_value(json!({
            "cliente": " Acme ",
            "implantador": "Ana",
            "concluido": "Sim",
            "passado_suporte": "Não",
            "data_inicio": "01/01/2024",
            "previsao_start": "03/01/2024",
            "start_real": "05/01/2024",
            "data_passagem_suporte": "",
            "termo_encerramento": "Sim",
            "comercial": "Bruno",
            "extra": "ignored"
        }));

        let record = normalize(&raw);
        assert_eq!(record.client, "Acme");
        assert_eq!(record.handler, "Ana");
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(
            record.projected_start_date,
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
        assert_eq!(record.actual_start_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(record.support_transition_date, None);
        assert_eq!(record.status_label, StatusLabel::Completed);
        assert!(!record.has_no_actual_start);
        assert_eq!(record.closure_term, "Sim");
        assert_eq!(record.commercial_owner, "Bruno");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let record = normalize(&RawRecord::default());
        assert_eq!(record.client, "");
        assert_eq!(record.start_date, None);
        assert_eq!(record.status_label, StatusLabel::InProgress);
        assert!(record.has_no_actual_start);
    }

    #[test]
    fn placeholder_actual_start_counts_as_missing() {
        let raw = RawRecord::from_value(json!({ "start_real": "Sem previsão" }));
        let record = normalize(&raw);
        assert_eq!(record.actual_start_date, None);
        assert!(record.has_no_actual_start);
        assert_eq!(record.actual_start_text, "Sem previsão");
    }

    #[test]
    fn accepts_every_envelope_and_keeps_order() {
        let rows = json!([{ "cliente": "A" }, { "cliente": "B" }]);
        let payloads = [
            rows.clone(),
            json!({ "ok": true, "data": rows.clone() }),
            json!({ "ok": true, "data": { "data": rows } }),
        ];

        for payload in payloads {
            let records = normalize_payload(payload).unwrap();
            let clients: Vec<&str> = records.iter().map(|r| r.client.as_str()).collect();
            assert_eq!(clients, vec!["A", "B"]);
        }
    }

    #[test]
    fn non_object_rows_become_empty_records() {
        let records = normalize_payload(json!([null, 3, { "cliente": "C" }])).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].client, "");
        assert_eq!(records[2].client, "C");
    }

    #[test]
    fn surfaces_embedded_error_message() {
        let err = extract_rows(json!({ "ok": false, "error": "Planilha não encontrada" }))
            .unwrap_err();
        assert_eq!(
            err,
            PayloadError::Rejected {
                message: "Planilha não encontrada".to_string()
            }
        );
        assert_eq!(err.to_string(), "Planilha não encontrada");
    }

    #[test]
    fn rejects_unrecognized_shapes_with_type_tag() {
        assert_eq!(
            extract_rows(json!("oops")).unwrap_err(),
            PayloadError::UnexpectedShape { type_tag: "string" }
        );
        assert_eq!(
            extract_rows(Value::Null).unwrap_err(),
            PayloadError::UnexpectedShape { type_tag: "null" }
        );
        assert_eq!(
            extract_rows(json!({ "ok": false, "data": [] })).unwrap_err(),
            PayloadError::UnexpectedShape { type_tag: "object" }
        );
        assert_eq!(
            extract_rows(json!({ "ok": true, "data": { "rows": [] } })).unwrap_err(),
            PayloadError::UnexpectedShape { type_tag: "object" }
        );

        let message = extract_rows(json!(42)).unwrap_err().to_string();
        assert!(message.contains("received number"), "{message}");
    }
}
