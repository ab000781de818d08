use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::catalog::CatalogView;
use crate::dates::format_br_date;
use crate::fields::is_affirmative;
use crate::filter::{DateRange, FilterSpec};
use crate::models::{field, Record, StatusLabel};

const BAR_WIDTH: u32 = 20;

/// Dashboard cell text. Blank values show as a dash.
fn cell(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Markdown table cells cannot hold pipes or line breaks.
fn escape_cell(value: &str) -> String {
    cell(value)
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

pub fn support_passed_label(record: &Record) -> &str {
    if is_affirmative(&record.support_passed) {
        "Sim"
    } else if record.support_passed.is_empty() {
        "Não"
    } else {
        &record.support_passed
    }
}

pub fn bar(percent: u32) -> String {
    let filled = (percent.min(100) * BAR_WIDTH + 50) / 100;
    let mut bar = "█".repeat(filled as usize);
    bar.push_str(&"░".repeat((BAR_WIDTH - filled) as usize));
    bar
}

pub fn count_info(view: &CatalogView<'_>) -> String {
    format!(
        "Showing {} of {} records",
        view.rows.len(),
        view.snapshot_len
    )
}

pub fn kpi_lines(view: &CatalogView<'_>) -> Vec<String> {
    let summary = &view.summary;
    vec![
        format!("Total: {}", summary.total),
        format!("Completed: {}", summary.count(StatusLabel::Completed)),
        format!("Open: {}", summary.open),
        format!(
            "Handed to support: {}",
            summary.count(StatusLabel::HandedToSupport)
        ),
        format!("Suspended: {}", summary.count(StatusLabel::Suspended)),
        format!("Late: {}", summary.late),
    ]
}

pub fn row_line(record: &Record) -> String {
    format!(
        "{} | {} | {} | start {} | forecast {} | actual start {} | support {}",
        cell(&record.client),
        cell(&record.handler),
        record.status_label,
        cell(&record.start_date_text),
        cell(&record.projected_start_text),
        cell(&record.actual_start_text),
        support_passed_label(record)
    )
}

fn describe_range(label: &str, range: &DateRange) -> Option<String> {
    if !range.is_active() {
        return None;
    }
    let from = range.from.map(format_br_date).unwrap_or_else(|| "...".to_string());
    let to = range.to.map(format_br_date).unwrap_or_else(|| "...".to_string());
    Some(format!("{label} {from} to {to}"))
}

pub fn describe_filters(spec: &FilterSpec) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(handler) = spec.handler.as_deref().filter(|h| !h.is_empty()) {
        parts.push(format!("handler = {handler}"));
    }
    if let Some(status) = spec.status {
        parts.push(format!("status = {}", status.status_label()));
    }
    if let Some(search) = spec.search.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(format!("search \"{}\"", search.trim()));
    }
    if spec.show_suspended {
        parts.push("including suspended".to_string());
    }
    if spec.only_missing_actual_start {
        parts.push("only without actual start".to_string());
    }
    if spec.only_closure_term {
        parts.push("only with closure term".to_string());
    }
    parts.extend(describe_range("start", &spec.start_range));
    parts.extend(describe_range("actual start", &spec.actual_start_range));
    if let Some(month) = spec.month {
        parts.push(format!(
            "month {:02}/{} ({:?})",
            month.month, month.year, month.field
        ));
    }
    parts
}

pub fn build_report(view: &CatalogView<'_>, spec: &FilterSpec, generated_at: NaiveDateTime) -> String {
    let mut output = String::new();
    let filters = describe_filters(spec);

    let _ = writeln!(output, "# Client Onboarding Dashboard");
    let _ = writeln!(
        output,
        "Updated {} · {}",
        generated_at.format("%d/%m/%Y %H:%M:%S"),
        count_info(view)
    );
    if !filters.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Filters: {}", filters.join("; "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Indicators");
    for line in kpi_lines(view) {
        let _ = writeln!(output, "- {line}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Clients per Handler");
    if view.handler_tallies.is_empty() {
        let _ = writeln!(output, "No records match the current filters.");
    } else {
        for tally in &view.handler_tallies {
            let _ = writeln!(
                output,
                "- `{}` {} {} ({}%)",
                bar(tally.percent_of_top),
                tally.handler,
                tally.count,
                tally.percent_of_top
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Clients");
    if view.rows.is_empty() {
        let _ = writeln!(output, "No records match the current filters.");
        return output;
    }

    let _ = writeln!(
        output,
        "| Client | Handler | Status | Start | Forecast start | Actual start | Handed to support |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|---|");
    for record in &view.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} |",
            escape_cell(&record.client),
            escape_cell(&record.handler),
            record.status_label,
            escape_cell(&record.start_date_text),
            escape_cell(&record.projected_start_text),
            escape_cell(&record.actual_start_text),
            escape_cell(support_passed_label(record))
        );
    }

    output
}

/// Writes the visible rows with their source field names plus the derived
/// status, in display order.
pub fn export_csv<W: std::io::Write>(rows: &[&Record], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        field::CLIENT,
        field::HANDLER,
        "status",
        field::COMPLETED,
        field::START_DATE,
        field::PROJECTED_START,
        field::ACTUAL_START,
        field::SUPPORT_PASSED,
        field::SUPPORT_TRANSITION,
        field::CLOSURE_TERM,
        field::COMMERCIAL_OWNER,
        field::CLIENT_SIZE,
        field::LINK,
        field::EMAIL_SENT,
        field::NOTES,
    ])?;

    for record in rows {
        csv_writer.write_record([
            record.client.as_str(),
            record.handler.as_str(),
            record.status_label.label(),
            record.completed.as_str(),
            record.start_date_text.as_str(),
            record.projected_start_text.as_str(),
            record.actual_start_text.as_str(),
            record.support_passed.as_str(),
            record.support_transition_text.as_str(),
            record.closure_term.as_str(),
            record.commercial_owner.as_str(),
            record.client_size.as_str(),
            record.link.as_str(),
            record.email_sent.as_str(),
            record.notes.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn export_json<W: std::io::Write>(rows: &[&Record], writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}
