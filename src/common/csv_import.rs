use crate::common::summary::sorted_counts;
use crate::common::types::{PelotonResult, Workout};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{error, info};

const TYPE_COLUMNS: [&str; 3] = ["Fitness Discipline", "Workout Type", "Type"];
const DATE_COLUMNS: [&str; 3] = ["Workout Timestamp", "Date", "Created At"];

/// Rows of a workout CSV export, one JSON object per row with the columns
/// in file order.
#[derive(Debug, Clone)]
pub struct CsvImport {
    pub columns: Vec<String>,
    pub records: Vec<Workout>,
}

pub fn import_csv(path: &Path) -> PelotonResult<CsvImport> {
    info!("Loading CSV from {}...", path.display());
    let file = File::open(path).inspect_err(|e| error!("Cannot open {}: {e}", path.display()))?;
    let import = read_csv(file)?;
    info!("Loaded {} workouts from CSV", import.records.len());
    info!("Columns found: {}", import.columns.join(", "));
    Ok(import)
}

pub fn read_csv<R: Read>(reader: R) -> PelotonResult<CsvImport> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let record: Map<String, Value> = columns
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| (column.clone(), cell_value(cell)))
            .collect();
        records.push(Value::Object(record));
    }

    Ok(CsvImport { columns, records })
}

fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(float) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(float);
    }
    Value::String(cell.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvSummary {
    pub total_workouts: usize,
    /// Column used for the breakdown and its counts, largest first.
    pub by_type: Option<(String, Vec<(String, usize)>)>,
    /// Column used for the range and its earliest/latest values.
    pub date_range: Option<(String, NaiveDateTime, NaiveDateTime)>,
}

impl CsvSummary {
    pub fn from_import(import: &CsvImport) -> Self {
        let by_type = first_present(&import.columns, &TYPE_COLUMNS).map(|column| {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for value in column_values(&import.records, column) {
                *counts.entry(value).or_default() += 1;
            }
            (column.to_string(), sorted_counts(counts))
        });

        let date_range = first_present(&import.columns, &DATE_COLUMNS).and_then(|column| {
            let dates = column_values(&import.records, column)
                .map(|value| parse_timestamp(&value))
                .collect::<Option<Vec<_>>>()?;
            let min = dates.iter().min()?;
            let max = dates.iter().max()?;
            Some((column.to_string(), *min, *max))
        });

        Self {
            total_workouts: import.records.len(),
            by_type,
            date_range,
        }
    }
}

fn first_present<'a>(columns: &[String], candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|candidate| columns.iter().any(|c| c == candidate))
}

/// Non-null values of a column rendered as text.
fn column_values<'a>(records: &'a [Workout], column: &'a str) -> impl Iterator<Item = String> + 'a {
    records
        .iter()
        .filter_map(move |record| record.get(column))
        .filter_map(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

/// Accepts the export's `2021-01-03 08:15 (EST)` style as well as RFC 3339
/// and plain dates. The zone suffix is dropped.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = match raw.find(" (") {
        Some(idx) => &raw[..idx],
        None => raw,
    }
    .trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
