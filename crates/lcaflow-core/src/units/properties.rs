use serde::Deserialize;
use std::collections::HashMap;

/// Physical and market properties of one resource.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceProperties {
    /// kg per m3.
    #[serde(default)]
    pub density: Option<f64>,
    /// Lower heating value, MJ per kg.
    #[serde(default)]
    pub lhv: Option<f64>,
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub market_price_unit: Option<String>,
    /// Display name to restore when the resource stands in for another one.
    #[serde(default)]
    pub surrogate_for: Option<String>,
}

impl ResourceProperties {
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_lhv(mut self, lhv: f64) -> Self {
        self.lhv = Some(lhv);
        self
    }
}

/// Resource properties keyed by lower-case resource name.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct PropertyTable {
    by_resource: HashMap<String, ResourceProperties>,
}

impl PropertyTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ResourceProperties)>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (resource, properties) in entries {
            table.insert(resource, properties);
        }
        table
    }

    pub fn insert(&mut self, resource: impl Into<String>, properties: ResourceProperties) {
        let key = resource.into().trim().to_lowercase();
        self.by_resource.insert(key, properties);
    }

    pub fn lookup(&self, resource: &str) -> Option<&ResourceProperties> {
        self.by_resource.get(&resource.trim().to_lowercase())
    }

    /// Properties for `resource`, or an empty record when the table has none.
    pub fn properties_for(&self, resource: &str) -> ResourceProperties {
        self.lookup(resource).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_resource.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_resource.is_empty()
    }

    /// Lower-cases keys loaded verbatim from JSON.
    pub(crate) fn normalized(self) -> Self {
        Self::new(self.by_resource)
    }
}
