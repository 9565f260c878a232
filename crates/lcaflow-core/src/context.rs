//! Immutable lookup data shared by every computation.
//!
//! An [`EngineContext`] is built once at startup from a data directory and
//! handed to the pipeline by reference. Nothing in it changes afterwards, so
//! concurrent computations may share one context without locking.

use crate::background::{BackgroundTables, RawBackgroundTables};
use crate::domain::LcaError;
use crate::modules::transport::TransportTables;
use crate::units::{PropertyTable, UnitTables};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const UNITS_FILE: &str = "units.json";
pub const PROPERTIES_FILE: &str = "properties.json";
pub const BACKGROUND_FILE: &str = "background.json";
pub const TRANSPORTATION_FILE: &str = "transportation.json";

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to read data table '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse data table '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid data table '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl From<DataLoadError> for LcaError {
    fn from(error: DataLoadError) -> Self {
        match &error {
            DataLoadError::Read { .. } => LcaError::io_system("IO.DATA_READ", error.to_string()),
            DataLoadError::Parse { .. } => {
                LcaError::io_system("IO.DATA_PARSE", error.to_string())
            }
            DataLoadError::Invalid { .. } => {
                LcaError::validation("DATA.INVALID_TABLE", error.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineContext {
    pub units: UnitTables,
    pub properties: PropertyTable,
    pub background: BackgroundTables,
    pub transport: TransportTables,
}

impl EngineContext {
    pub fn new(
        units: UnitTables,
        properties: PropertyTable,
        background: BackgroundTables,
        transport: TransportTables,
    ) -> Self {
        Self {
            units,
            properties,
            background,
            transport,
        }
    }

    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let data_dir = data_dir.as_ref();

        let units_path = data_dir.join(UNITS_FILE);
        let units: UnitTables = read_json(&units_path)?;
        units
            .validate()
            .map_err(|message| DataLoadError::Invalid {
                path: units_path.clone(),
                message,
            })?;

        let properties: PropertyTable = read_json(&data_dir.join(PROPERTIES_FILE))?;
        let properties = properties.normalized();

        let background_path = data_dir.join(BACKGROUND_FILE);
        let raw_background: RawBackgroundTables = read_json(&background_path)?;
        let background = BackgroundTables::from_raw(raw_background, &units).map_err(
            |message| DataLoadError::Invalid {
                path: background_path.clone(),
                message,
            },
        )?;

        let transport_path = data_dir.join(TRANSPORTATION_FILE);
        let transport: TransportTables = read_json(&transport_path)?;
        transport
            .validate()
            .map_err(|message| DataLoadError::Invalid {
                path: transport_path.clone(),
                message,
            })?;

        debug!(
            data_dir = %data_dir.display(),
            properties = properties.len(),
            resources = background.resource_count(),
            "loaded engine context"
        );

        Ok(Self::new(units, properties, background, transport))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let source = fs::read_to_string(path).map_err(|source| DataLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| DataLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
