//! Writes result tables as JSON or CSV artifacts.

use super::aggregate::{ResultRow, ResultTable};
use crate::common::Metric;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Descriptive columns preceding the `<Metric>_Sum` columns.
pub const DESCRIPTIVE_COLUMNS: [&str; 8] = [
    "Pathway",
    "Life-Cycle Stage",
    "Category",
    "Resource",
    "End Use",
    "Type",
    "Unit",
    "Amount",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

fn descriptive_cells(row: &ResultRow) -> [String; 7] {
    [
        row.pathway.clone(),
        row.stage.clone(),
        row.category_label.clone(),
        row.resource.clone(),
        row.end_use.clone(),
        row.entry_type.as_str().to_string(),
        row.unit.clone(),
    ]
}

fn row_object(row: &ResultRow) -> Value {
    let mut object = Map::new();
    for (column, cell) in DESCRIPTIVE_COLUMNS.iter().zip(descriptive_cells(row)) {
        object.insert((*column).to_string(), Value::String(cell));
    }
    object.insert("Amount".to_string(), number(row.amount));
    for metric in Metric::ALL {
        object.insert(metric.sum_column(), number(row.total(metric)));
    }
    Value::Object(object)
}

/// Non-finite values have no JSON form and are written as null.
fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// The table as a JSON array of row objects.
pub fn to_json(table: &ResultTable) -> serde_json::Result<String> {
    let rows: Vec<Value> = table.rows.iter().map(row_object).collect();
    serde_json::to_string_pretty(&rows)
}

fn csv_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// The table as CSV with a header row and a fixed column order.
pub fn to_csv(table: &ResultTable) -> String {
    let mut header: Vec<String> = DESCRIPTIVE_COLUMNS
        .iter()
        .map(|column| (*column).to_string())
        .collect();
    header.extend(Metric::ALL.iter().map(|metric| csv_cell(&metric.sum_column())));

    let mut lines = vec![header.join(",")];
    for row in &table.rows {
        let mut cells: Vec<String> = descriptive_cells(row)
            .iter()
            .map(|cell| csv_cell(cell))
            .collect();
        cells.push(row.amount.to_string());
        cells.extend(Metric::ALL.iter().map(|metric| row.total(*metric).to_string()));
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

pub fn render_report(table: &ResultTable, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Json => to_json(table),
        ReportFormat::Csv => Ok(to_csv(table)),
    }
}
