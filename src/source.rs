use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Where the raw payload comes from.
#[derive(Debug, Clone)]
pub enum Source {
    Api { url: String, timeout: Duration },
    JsonFile(PathBuf),
    Csv(PathBuf),
}

pub async fn load(source: &Source) -> anyhow::Result<Value> {
    match source {
        Source::Api { url, timeout } => fetch_payload(url, *timeout).await,
        Source::JsonFile(path) => read_payload_file(path),
        Source::Csv(path) => import_csv(path),
    }
}

pub async fn fetch_payload(url: &str, timeout: Duration) -> anyhow::Result<Value> {
    info!(%url, "fetching onboarding records");
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .context("API answered with an error status")?;

    let payload = response
        .json::<Value>()
        .await
        .context("API response is not valid JSON")?;
    Ok(payload)
}

pub fn read_payload_file(path: &Path) -> anyhow::Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let payload = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(payload)
}

/// Reads a spreadsheet CSV export into the same array shape the API serves,
/// one object per row keyed by the header line.
pub fn import_csv(path: &Path) -> anyhow::Result<Value> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_csv_rows(file)
}

pub fn read_csv_rows<R: Read>(input: R) -> anyhow::Result<Value> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result?;
        let mut fields = Map::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            if !header.is_empty() {
                fields.insert(header.clone(), Value::String(value.to_string()));
            }
        }
        rows.push(Value::Object(fields));
    }

    debug!(rows = rows.len(), "csv rows read");
    Ok(Value::Array(rows))
}
