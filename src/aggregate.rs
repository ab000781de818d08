use std::collections::{BTreeMap, HashMap};

use chrono::{Local, NaiveDate};

use crate::fields::is_affirmative;
use crate::models::{HandlerTally, Record, StatusLabel, Summary};

pub const UNASSIGNED_HANDLER: &str = "(Sem implantador)";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Completed cases are never late.
pub fn is_late(record: &Record, today: NaiveDate) -> bool {
    record.status_label != StatusLabel::Completed
        && record.actual_start_date.is_some_and(|date| date < today)
}

pub fn summarize(records: &[&Record], today: NaiveDate) -> Summary {
    let mut counts_by_status: BTreeMap<StatusLabel, usize> =
        StatusLabel::ALL.iter().map(|status| (*status, 0)).collect();
    let mut marked_completed = 0usize;
    let mut late = 0usize;

    for record in records {
        *counts_by_status.entry(record.status_label).or_insert(0) += 1;
        if is_affirmative(&record.completed) {
            marked_completed += 1;
        }
        if is_late(record, today) {
            late += 1;
        }
    }

    let total = records.len();
    Summary {
        total,
        counts_by_status,
        open: total - marked_completed,
        late,
    }
}

/// Largest groups first; groups of equal size keep first-seen order.
pub fn group_by_handler(records: &[&Record]) -> Vec<HandlerTally> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, usize)> = Vec::new();

    for record in records {
        let name = if record.handler.is_empty() {
            UNASSIGNED_HANDLER
        } else {
            record.handler.as_str()
        };
        let position = *positions.entry(name).or_insert_with(|| {
            groups.push((name, 0));
            groups.len() - 1
        });
        groups[position].1 += 1;
    }

    groups.sort_by(|a, b| b.1.cmp(&a.1));
    let top = groups.first().map_or(1, |(_, count)| *count);

    groups
        .into_iter()
        .map(|(handler, count)| HandlerTally {
            handler: handler.to_string(),
            count,
            percent_of_top: ((count as f64 / top as f64) * 100.0).round() as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::normalize::normalize;
    use serde_json::json;

    fn record(handler: &str, completed: &str, support: &str, actual: &str) -> Record {
        normalize(&RawRecord::from_value(json!({
            "cliente": "Cliente",
            "implantador": handler,
            "concluido": completed,
            "passado_suporte": support,
            "start_real": actual,
        })))
    }

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn counts_are_consistent_with_total() {
        let records = vec![
            record("Ana", "Sim", "Não", "05/01/2024"),
            record("Ana", "Não", "Sim", ""),
            record("Caio", "Suspenso", "", ""),
            record("", "", "", "10/03/2024"),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let summary = summarize(&refs, day(2024, 6, 1));
        assert_eq!(summary.total, refs.len());
        assert_eq!(summary.counts_by_status.values().sum::<usize>(), summary.total);
        assert_eq!(summary.count(StatusLabel::Completed), 1);
        assert_eq!(summary.count(StatusLabel::HandedToSupport), 1);
        assert_eq!(summary.count(StatusLabel::Suspended), 1);
        assert_eq!(summary.count(StatusLabel::InProgress), 1);
        assert_eq!(summary.open, 3);
    }

    #[test]
    fn late_excludes_completed_and_undated_cases() {
        let today = day(2024, 3, 10);
        let records = vec![
            record("Ana", "Sim", "", "01/03/2024"),
            record("Ana", "", "", "01/03/2024"),
            record("Ana", "", "Sim", "09/03/2024"),
            record("Ana", "", "", "10/03/2024"),
            record("Ana", "", "", "20/03/2024"),
            record("Ana", "", "", "sem start real"),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        assert_eq!(summarize(&refs, today).late, 2);
    }

    #[test]
    fn open_follows_completion_marker_even_when_handed_to_support() {
        let records = vec![
            record("Ana", "Sim", "Sim", "01/01/2024"),
            record("Ana", "Não", "Sim", ""),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let summary = summarize(&refs, day(2024, 6, 1));
        assert_eq!(summary.count(StatusLabel::Completed), 0);
        assert_eq!(summary.count(StatusLabel::HandedToSupport), 2);
        assert_eq!(summary.open, 1);
        assert_eq!(summary.late, 1);
    }

    #[test]
    fn empty_selection_summarizes_to_zero() {
        let summary = summarize(&[], day(2024, 1, 1));
        assert_eq!(summary.total, 0);
        assert_eq!(summary.open, 0);
        assert_eq!(summary.counts_by_status.len(), StatusLabel::ALL.len());
        assert!(group_by_handler(&[]).is_empty());
    }

    #[test]
    fn groups_by_handler_with_sentinel_and_percentages() {
        let records = vec![
            record("Bia", "", "", ""),
            record("", "", "", ""),
            record("Ana", "", "", ""),
            record("Ana", "", "", ""),
            record("Ana", "", "", ""),
            record("Ana", "", "", ""),
            record("Bia", "", "", ""),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let tallies = group_by_handler(&refs);
        let flat: Vec<(&str, usize, u32)> = tallies
            .iter()
            .map(|t| (t.handler.as_str(), t.count, t.percent_of_top))
            .collect();
        assert_eq!(
            flat,
            vec![("Ana", 4, 100), ("Bia", 2, 50), (UNASSIGNED_HANDLER, 1, 25)]
        );
    }
}
