//! Loading of pathway workbooks exported as JSON.
//!
//! A workbook holds one sheet per process. Each sheet carries its co-product
//! method, the final-process flag, a default urban share and the inventory
//! rows keyed by their spreadsheet column headers. The headers form a fixed
//! schema: unknown or missing required columns fail at load time.

use crate::domain::{
    Category, CoproductMethod, EntryType, LcaError, LcaResult, LciEntry, ProcessNetwork,
    ProcessTable, ProductTrain,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Informational sheets that never hold a process inventory.
pub const EXCLUDED_SHEETS: [&str; 8] = [
    "Introduction",
    "SI - Co-products",
    "SI - Resources",
    "SI - End Use",
    "SI - Units",
    "SI - Payload",
    "Template",
    "INL Data",
];

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("failed to read workbook '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("workbook '{}' does not match the inventory schema: {source}", path.display())]
    Schema {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<WorkbookError> for LcaError {
    fn from(error: WorkbookError) -> Self {
        match &error {
            WorkbookError::Read { .. } => {
                LcaError::io_system("IO.WORKBOOK_READ", error.to_string())
            }
            WorkbookError::Schema { .. } => {
                LcaError::validation("INPUT.WORKBOOK_SCHEMA", error.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Workbook {
    pub sheets: Vec<SheetRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SheetRecord {
    pub name: String,
    pub coproduct_method: String,
    pub final_process: String,
    #[serde(default)]
    pub urban_share: Option<f64>,
    pub rows: Vec<RawLciRow>,
}

/// One inventory row as it appears in the sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLciRow {
    #[serde(rename = "Type")]
    pub entry_type: String,
    #[serde(rename = "Process", default)]
    pub process: Option<String>,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Resource")]
    pub resource: String,
    #[serde(rename = "End Use", default)]
    pub end_use: Option<String>,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Moisture", default)]
    pub moisture: Option<f64>,
    #[serde(rename = "Urban Share", default)]
    pub urban_share: Option<f64>,
    #[serde(rename = "Previous Stage", default)]
    pub previous_stage: Option<String>,
    #[serde(rename = "Always Use Displacement Method for Co-Product?", default)]
    pub always_displacement: Option<String>,
    #[serde(rename = "Product Train", default)]
    pub product_train: Option<String>,
    #[serde(rename = "Incumbent Product", default)]
    pub incumbent_product: Option<String>,
    #[serde(rename = "End Use of Incumbent Product", default)]
    pub incumbent_end_use: Option<String>,
    #[serde(rename = "Market Price", default)]
    pub market_price: Option<f64>,
    #[serde(rename = "Market Price Unit", default)]
    pub market_price_unit: Option<String>,
    #[serde(rename = "Payload", default)]
    pub payload: Option<f64>,
    #[serde(rename = "Payload Unit", default)]
    pub payload_unit: Option<String>,
}

impl Workbook {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WorkbookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| WorkbookError::Schema {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Builds the process network from the process sheets, in sheet order.
    pub fn into_network(self) -> LcaResult<ProcessNetwork> {
        let processes = self
            .sheets
            .into_iter()
            .filter(|sheet| !EXCLUDED_SHEETS.contains(&sheet.name.as_str()))
            .map(SheetRecord::into_process)
            .collect::<LcaResult<Vec<_>>>()?;

        debug!(processes = processes.len(), "workbook loaded");
        Ok(ProcessNetwork::new(processes))
    }
}

impl SheetRecord {
    pub fn into_process(self) -> LcaResult<ProcessTable> {
        let method = CoproductMethod::parse(&self.coproduct_method).ok_or_else(|| {
            LcaError::validation(
                "INPUT.COPRODUCT_METHOD",
                format!(
                    "Process \"{}\" has an unrecognized co-product handling method \"{}\".",
                    self.name, self.coproduct_method
                ),
            )
        })?;
        let is_final = parse_yes_no(&self.final_process).ok_or_else(|| {
            LcaError::validation(
                "INPUT.FINAL_PROCESS_FLAG",
                format!(
                    "Please answer \"Yes\" or \"No\" to whether Process \"{}\" produces the end product.",
                    self.name
                ),
            )
        })?;
        let default_urban_share = self.urban_share.unwrap_or(0.0);

        let mut entries = Vec::with_capacity(self.rows.len());
        let mut stage = self.name.clone();
        for row in self.rows {
            if let Some(process) = row.process.as_deref().map(str::trim)
                && !process.is_empty()
            {
                stage = process.to_string();
            }
            entries.push(row.into_entry(&self.name, &stage, default_urban_share)?);
        }

        let mut charged_here: Vec<LciEntry> = entries
            .iter()
            .filter(|entry| entry.is(EntryType::InputFromAnotherStage) && has_end_use(entry))
            .cloned()
            .collect();
        if !is_final {
            charged_here.extend(
                entries
                    .iter()
                    .filter(|entry| entry.is(EntryType::MainProduct) && has_end_use(entry))
                    .cloned(),
            );
        }
        for entry in &mut charged_here {
            entry.entry_type = EntryType::IntermediateProduct;
        }
        entries.extend(charged_here);

        let table = ProcessTable::new(self.name, method, entries);
        Ok(if is_final { table.final_process() } else { table })
    }
}

fn has_end_use(entry: &LciEntry) -> bool {
    !entry.end_use.trim().is_empty()
}

fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

fn unrecognized(sheet: &str, column: &str, value: &str) -> LcaError {
    LcaError::validation(
        "INPUT.UNRECOGNIZED_VALUE",
        format!(
            "Process \"{}\" has an unrecognized {} \"{}\".",
            sheet, column, value
        ),
    )
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl RawLciRow {
    fn into_entry(self, sheet: &str, stage: &str, default_urban_share: f64) -> LcaResult<LciEntry> {
        let entry_type = EntryType::parse(&self.entry_type)
            .ok_or_else(|| unrecognized(sheet, "type", &self.entry_type))?;
        let category = Category::parse(&self.category)
            .ok_or_else(|| unrecognized(sheet, "category", &self.category))?;

        let always_displacement = match non_empty(self.always_displacement) {
            Some(answer) => parse_yes_no(&answer)
                .ok_or_else(|| unrecognized(sheet, "displacement flag", &answer))?,
            None => false,
        };
        let product_train = match non_empty(self.product_train) {
            Some(train) => Some(
                ProductTrain::parse(&train)
                    .ok_or_else(|| unrecognized(sheet, "product train", &train))?,
            ),
            None => None,
        };

        let mut entry = LciEntry::new(
            entry_type,
            category,
            self.resource,
            self.unit.trim(),
            self.amount,
        )
        .with_stage(stage)
        .with_end_use(self.end_use.unwrap_or_default())
        .with_moisture(self.moisture.unwrap_or(0.0))
        .with_urban_share(self.urban_share.unwrap_or(default_urban_share))
        .with_always_displacement(always_displacement)
        .with_incumbent(
            self.incumbent_product.unwrap_or_default(),
            self.incumbent_end_use.unwrap_or_default(),
        );
        entry.previous_stage = non_empty(self.previous_stage);
        entry.product_train = product_train;
        entry.market_price = self.market_price;
        entry.market_price_unit = non_empty(self.market_price_unit);
        entry.payload = self.payload;
        entry.payload_unit = non_empty(self.payload_unit);
        Ok(entry)
    }
}
