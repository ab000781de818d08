use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use chrono::NaiveDate;

use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Client,
    Handler,
    Status,
    StartDate,
    ProjectedStart,
    ActualStart,
    SupportPassed,
    SupportTransition,
    CommercialOwner,
}

impl SortKey {
    /// Accepts the column keys used by the table headers as well as the
    /// payload field names. Unknown keys return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "client" | "cliente" => Some(SortKey::Client),
            "handler" | "implantador" => Some(SortKey::Handler),
            "status" | "status_label" => Some(SortKey::Status),
            "start" | "data_inicio" => Some(SortKey::StartDate),
            "projected" | "previsao_start" => Some(SortKey::ProjectedStart),
            "actual" | "start_real" => Some(SortKey::ActualStart),
            "support" | "passado_suporte" => Some(SortKey::SupportPassed),
            "support-transition" | "data_passagem_suporte" => Some(SortKey::SupportTransition),
            "commercial" | "comercial" => Some(SortKey::CommercialOwner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// No key means the default order: actual start, then nominal start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Clicking the active column flips it; any other column starts ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == Some(key) {
            Self::by(key, self.direction.flip())
        } else {
            Self::by(key, SortDirection::Ascending)
        }
    }
}

enum SortValue<'a> {
    Text(&'a str),
    Date(Option<NaiveDate>),
}

fn sort_value(record: &Record, key: SortKey) -> SortValue<'_> {
    match key {
        SortKey::Client => SortValue::Text(&record.client),
        SortKey::Handler => SortValue::Text(&record.handler),
        SortKey::Status => SortValue::Text(record.status_label.label()),
        SortKey::StartDate => SortValue::Date(record.start_date),
        SortKey::ProjectedStart => SortValue::Date(record.projected_start_date),
        SortKey::ActualStart => SortValue::Date(record.actual_start_date),
        SortKey::SupportPassed => SortValue::Text(&record.support_passed),
        SortKey::SupportTransition => SortValue::Date(record.support_transition_date),
        SortKey::CommercialOwner => SortValue::Text(&record.commercial_owner),
    }
}

/// Missing values go last whatever the direction; the direction only orders
/// the present ones.
fn missing_last<T>(
    left: Option<T>,
    right: Option<T>,
    direction: SortDirection,
    compare: impl FnOnce(T, T) -> Ordering,
) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => direction.apply(compare(left, right)),
    }
}

fn compare_by_key(left: &Record, right: &Record, key: SortKey, direction: SortDirection) -> Ordering {
    match (sort_value(left, key), sort_value(right, key)) {
        (SortValue::Date(a), SortValue::Date(b)) => missing_last(a, b, direction, |a, b| a.cmp(&b)),
        (SortValue::Text(a), SortValue::Text(b)) => missing_last(
            Some(a).filter(|text| !text.is_empty()),
            Some(b).filter(|text| !text.is_empty()),
            direction,
            natural_cmp,
        ),
        // A key always resolves both sides to the same kind.
        _ => Ordering::Equal,
    }
}

fn default_order(left: &Record, right: &Record) -> Ordering {
    let ascending = SortDirection::Ascending;
    missing_last(left.actual_start_date, right.actual_start_date, ascending, |a, b| a.cmp(&b))
        .then_with(|| missing_last(left.start_date, right.start_date, ascending, |a, b| a.cmp(&b)))
}

/// Stable; the input slice is left untouched.
pub fn sort_records<'a>(records: &[&'a Record], spec: &SortSpec) -> Vec<&'a Record> {
    let mut sorted = records.to_vec();
    match spec.key {
        Some(key) => sorted.sort_by(|a, b| compare_by_key(a, b, key, spec.direction)),
        None => sorted.sort_by(|a, b| default_order(a, b)),
    }
    sorted
}

/// Case- and accent-insensitive comparison that orders digit runs by value,
/// so "Cliente 2" comes before "Cliente 10".
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut left = left.chars().peekable();
    let mut right = right.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                let a = take_digits(&mut left);
                let b = take_digits(&mut right);
                let ordering = compare_digit_runs(&a, &b);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(a), Some(b)) => {
                let ordering = fold_char(a).cmp(&fold_char(b));
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        digits.push(c);
    }
    digits
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

fn fold_char(c: char) -> char {
    match c.to_lowercase().next().unwrap_or(c) {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::normalize::normalize;
    use serde_json::json;

    fn record(client: &str, handler: &str, start: &str, actual: &str) -> Record {
        normalize(&RawRecord::from_value(json!({
            "cliente": client,
            "implantador": handler,
            "data_inicio": start,
            "start_real": actual,
        })))
    }

    fn clients(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.client.clone()).collect()
    }

    #[test]
    fn natural_comparison_handles_numbers_case_and_accents() {
        assert_eq!(natural_cmp("Cliente 2", "Cliente 10"), Ordering::Less);
        assert_eq!(natural_cmp("acme", "Beta"), Ordering::Less);
        assert_eq!(natural_cmp("ÁGUA", "agua"), Ordering::Equal);
        assert_eq!(natural_cmp("Loja 007", "Loja 7"), Ordering::Equal);
        assert_eq!(natural_cmp("Abc", "Ab"), Ordering::Greater);
    }

    #[test]
    fn sorts_text_naturally_in_both_directions() {
        let records = vec![
            record("Cliente 10", "", "", ""),
            record("cliente 2", "", "", ""),
            record("Cliente 1", "", "", ""),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let ascending = sort_records(&refs, &SortSpec::by(SortKey::Client, SortDirection::Ascending));
        assert_eq!(clients(&ascending), vec!["Cliente 1", "cliente 2", "Cliente 10"]);

        let descending =
            sort_records(&refs, &SortSpec::by(SortKey::Client, SortDirection::Descending));
        assert_eq!(clients(&descending), vec!["Cliente 10", "cliente 2", "Cliente 1"]);

        assert_eq!(clients(&refs), vec!["Cliente 10", "cliente 2", "Cliente 1"]);
    }

    #[test]
    fn duplicates_keep_their_relative_order() {
        let records = vec![
            record("A", "Ana", "", ""),
            record("B", "Caio", "", ""),
            record("C", "Ana", "", ""),
            record("D", "Caio", "", ""),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let sorted = sort_records(&refs, &SortSpec::by(SortKey::Handler, SortDirection::Ascending));
        assert_eq!(clients(&sorted), vec!["A", "C", "B", "D"]);

        let sorted = sort_records(&refs, &SortSpec::by(SortKey::Handler, SortDirection::Descending));
        assert_eq!(clients(&sorted), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn missing_dates_sort_last_in_either_direction() {
        let records = vec![
            record("none", "", "", "sem previsão"),
            record("march", "", "", "01/03/2024"),
            record("blank", "", "", ""),
            record("january", "", "", "01/01/2024"),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let ascending =
            sort_records(&refs, &SortSpec::by(SortKey::ActualStart, SortDirection::Ascending));
        assert_eq!(clients(&ascending), vec!["january", "march", "none", "blank"]);

        let descending =
            sort_records(&refs, &SortSpec::by(SortKey::ActualStart, SortDirection::Descending));
        assert_eq!(clients(&descending), vec!["march", "january", "none", "blank"]);
    }

    #[test]
    fn empty_text_sorts_last() {
        let records = vec![
            record("x", "", "", ""),
            record("y", "Bia", "", ""),
            record("z", "Ana", "", ""),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let sorted =
            sort_records(&refs, &SortSpec::by(SortKey::Handler, SortDirection::Descending));
        assert_eq!(clients(&sorted), vec!["y", "z", "x"]);
    }

    #[test]
    fn default_order_uses_actual_then_nominal_start() {
        let records = vec![
            record("no dates", "", "", ""),
            record("late start", "", "10/01/2024", "01/02/2024"),
            record("nominal only", "", "05/01/2024", ""),
            record("early nominal", "", "01/01/2024", "01/02/2024"),
            record("first", "", "", "15/01/2024"),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let sorted = sort_records(&refs, &SortSpec::default());
        assert_eq!(
            clients(&sorted),
            vec!["first", "early nominal", "late start", "nominal only", "no dates"]
        );
    }

    #[test]
    fn toggling_flips_active_key_and_resets_new_key() {
        let spec = SortSpec::default().toggle(SortKey::Client);
        assert_eq!(spec, SortSpec::by(SortKey::Client, SortDirection::Ascending));

        let spec = spec.toggle(SortKey::Client);
        assert_eq!(spec, SortSpec::by(SortKey::Client, SortDirection::Descending));

        let spec = spec.toggle(SortKey::StartDate);
        assert_eq!(spec, SortSpec::by(SortKey::StartDate, SortDirection::Ascending));
    }

    #[test]
    fn parses_column_keys() {
        assert_eq!(SortKey::parse("start_real"), Some(SortKey::ActualStart));
        assert_eq!(SortKey::parse("Client"), Some(SortKey::Client));
        assert_eq!(SortKey::parse("obs"), None);
    }
}
