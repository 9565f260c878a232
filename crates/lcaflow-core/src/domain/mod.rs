pub mod errors;

pub use errors::{ExitPlaceholder, LcaError, LcaErrorCategory, LcaResult};

use crate::units::ResourceProperties;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    MainProduct,
    Coproduct,
    Input,
    IntermediateProduct,
    InputFromAnotherStage,
}

impl EntryType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainProduct => "Main Product",
            Self::Coproduct => "Co-product",
            Self::Input => "Input",
            Self::IntermediateProduct => "Intermediate Product",
            Self::InputFromAnotherStage => "Input from Another Stage",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "main product" => Some(Self::MainProduct),
            "co-product" | "coproduct" => Some(Self::Coproduct),
            "input" => Some(Self::Input),
            "intermediate product" => Some(Self::IntermediateProduct),
            "input from another stage" => Some(Self::InputFromAnotherStage),
            _ => None,
        }
    }
}

impl Display for EntryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Biomass,
    ProcessFuel,
    Electricity,
    ChemicalsAndCatalysts,
    Water,
    Transportation,
    Waste,
    Infrastructure,
    EmissionsAndSequestration,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Biomass,
        Self::ProcessFuel,
        Self::Electricity,
        Self::ChemicalsAndCatalysts,
        Self::Water,
        Self::Transportation,
        Self::Waste,
        Self::Infrastructure,
        Self::EmissionsAndSequestration,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Biomass => "Biomass",
            Self::ProcessFuel => "Process fuel",
            Self::Electricity => "Electricity",
            Self::ChemicalsAndCatalysts => "Chemicals and catalysts",
            Self::Water => "Water",
            Self::Transportation => "Transportation",
            Self::Waste => "Waste",
            Self::Infrastructure => "Infrastructure",
            Self::EmissionsAndSequestration => "Emissions and sequestration",
            Self::Other => "Other",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Unit in which amounts are carried through the emission calculation.
    ///
    /// Background factors are tabulated per g, per mmBTU, or per gal, so every
    /// category maps onto one of those.
    pub const fn primary_unit(self) -> &'static str {
        match self {
            Self::ProcessFuel | Self::Electricity | Self::Transportation => "mmBTU",
            Self::Water => "gal",
            Self::Biomass
            | Self::ChemicalsAndCatalysts
            | Self::Waste
            | Self::Infrastructure
            | Self::EmissionsAndSequestration
            | Self::Other => "g",
        }
    }

    /// Unit of the functional unit in the final results.
    pub const fn display_unit(self) -> &'static str {
        match self {
            Self::ProcessFuel | Self::Electricity => "MJ",
            Self::Biomass => "ton",
            Self::Water => "gal",
            Self::Transportation => "mmBTU",
            _ => "g",
        }
    }

    /// Unit used to sum several main-product rows under displacement.
    pub const fn combination_basis(self) -> &'static str {
        match self {
            Self::Biomass | Self::ChemicalsAndCatalysts => "kg",
            Self::ProcessFuel | Self::Electricity => "mmBTU",
            other => other.primary_unit(),
        }
    }

    pub const fn is_energy_like(self) -> bool {
        matches!(self, Self::ProcessFuel | Self::Electricity)
    }

    pub const fn is_mass_like(self) -> bool {
        matches!(self, Self::Biomass)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Routes the allocation factor onto a non-product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProductTrain {
    MainProduct,
    Coproduct,
    #[default]
    Both,
}

impl ProductTrain {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainProduct => "Main Product",
            Self::Coproduct => "Co-product",
            Self::Both => "Both",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "main product" => Some(Self::MainProduct),
            "co-product" | "coproduct" => Some(Self::Coproduct),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub const fn swapped(self) -> Self {
        match self {
            Self::MainProduct => Self::Coproduct,
            Self::Coproduct => Self::MainProduct,
            Self::Both => Self::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationBasis {
    Mass,
    Energy,
    Value,
}

impl AllocationBasis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mass => "mass",
            Self::Energy => "energy",
            Self::Value => "value",
        }
    }

    /// Unit the allocatable products are converted into before summing.
    /// Value allocation takes the unit from each row's market-price unit.
    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::Mass => Some("kg"),
            Self::Energy => Some("mmBTU"),
            Self::Value => None,
        }
    }
}

impl Display for AllocationBasis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationLevel {
    Process,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoproductMethod {
    Displacement,
    ProcessMass,
    ProcessEnergy,
    ProcessValue,
    SystemMass,
    SystemEnergy,
    SystemValue,
}

impl CoproductMethod {
    /// Parses the free-text method cell, e.g. "Process Level Mass-Based Allocation".
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.to_ascii_lowercase();
        if lowered.contains("displacement") {
            return Some(Self::Displacement);
        }

        let level = if lowered.contains("process") {
            AllocationLevel::Process
        } else if lowered.contains("system") {
            AllocationLevel::System
        } else {
            return None;
        };
        let basis = if lowered.contains("mass") {
            AllocationBasis::Mass
        } else if lowered.contains("energy") {
            AllocationBasis::Energy
        } else if lowered.contains("value") {
            AllocationBasis::Value
        } else {
            return None;
        };

        Some(Self::from_parts(level, basis))
    }

    pub const fn from_parts(level: AllocationLevel, basis: AllocationBasis) -> Self {
        match (level, basis) {
            (AllocationLevel::Process, AllocationBasis::Mass) => Self::ProcessMass,
            (AllocationLevel::Process, AllocationBasis::Energy) => Self::ProcessEnergy,
            (AllocationLevel::Process, AllocationBasis::Value) => Self::ProcessValue,
            (AllocationLevel::System, AllocationBasis::Mass) => Self::SystemMass,
            (AllocationLevel::System, AllocationBasis::Energy) => Self::SystemEnergy,
            (AllocationLevel::System, AllocationBasis::Value) => Self::SystemValue,
        }
    }

    pub const fn level(self) -> Option<AllocationLevel> {
        match self {
            Self::Displacement => None,
            Self::ProcessMass | Self::ProcessEnergy | Self::ProcessValue => {
                Some(AllocationLevel::Process)
            }
            Self::SystemMass | Self::SystemEnergy | Self::SystemValue => {
                Some(AllocationLevel::System)
            }
        }
    }

    pub const fn basis(self) -> Option<AllocationBasis> {
        match self {
            Self::Displacement => None,
            Self::ProcessMass | Self::SystemMass => Some(AllocationBasis::Mass),
            Self::ProcessEnergy | Self::SystemEnergy => Some(AllocationBasis::Energy),
            Self::ProcessValue | Self::SystemValue => Some(AllocationBasis::Value),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Displacement => "Displacement Method",
            Self::ProcessMass => "Process Level Mass-Based Allocation",
            Self::ProcessEnergy => "Process Level Energy-Based Allocation",
            Self::ProcessValue => "Process Level Value-Based Allocation",
            Self::SystemMass => "System Level Mass-Based Allocation",
            Self::SystemEnergy => "System Level Energy-Based Allocation",
            Self::SystemValue => "System Level Value-Based Allocation",
        }
    }
}

impl Display for CoproductMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).label())
    }
}

/// One row of a process's life-cycle inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct LciEntry {
    pub entry_type: EntryType,
    /// Life-cycle stage the row is charged to. Resolved upstream rows keep
    /// the stage they came from.
    pub stage: String,
    pub category: Category,
    pub resource: String,
    pub end_use: String,
    pub unit: String,
    pub amount: f64,
    pub moisture: f64,
    pub urban_share: f64,
    pub previous_stage: Option<String>,
    pub always_displacement: bool,
    pub product_train: Option<ProductTrain>,
    pub incumbent_product: String,
    pub incumbent_end_use: String,
    pub market_price: Option<f64>,
    pub market_price_unit: Option<String>,
    pub payload: Option<f64>,
    pub payload_unit: Option<String>,
    pub properties: ResourceProperties,
}

impl LciEntry {
    pub fn new(
        entry_type: EntryType,
        category: Category,
        resource: impl Into<String>,
        unit: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            entry_type,
            stage: String::new(),
            category,
            resource: resource.into(),
            end_use: String::new(),
            unit: unit.into(),
            amount,
            moisture: 0.0,
            urban_share: 0.0,
            previous_stage: None,
            always_displacement: false,
            product_train: None,
            incumbent_product: String::new(),
            incumbent_end_use: String::new(),
            market_price: None,
            market_price_unit: None,
            payload: None,
            payload_unit: None,
            properties: ResourceProperties::default(),
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn with_end_use(mut self, end_use: impl Into<String>) -> Self {
        self.end_use = end_use.into();
        self
    }

    pub fn with_moisture(mut self, moisture: f64) -> Self {
        self.moisture = moisture;
        self
    }

    pub fn with_urban_share(mut self, urban_share: f64) -> Self {
        self.urban_share = urban_share;
        self
    }

    pub fn with_previous_stage(mut self, stage: impl Into<String>) -> Self {
        self.previous_stage = Some(stage.into());
        self
    }

    pub fn with_always_displacement(mut self, always: bool) -> Self {
        self.always_displacement = always;
        self
    }

    pub fn with_product_train(mut self, train: ProductTrain) -> Self {
        self.product_train = Some(train);
        self
    }

    pub fn with_incumbent(
        mut self,
        product: impl Into<String>,
        end_use: impl Into<String>,
    ) -> Self {
        self.incumbent_product = product.into();
        self.incumbent_end_use = end_use.into();
        self
    }

    pub fn with_market_price(mut self, price: f64, unit: impl Into<String>) -> Self {
        self.market_price = Some(price);
        self.market_price_unit = Some(unit.into());
        self
    }

    pub fn with_payload(mut self, payload: f64, unit: impl Into<String>) -> Self {
        self.payload = Some(payload);
        self.payload_unit = Some(unit.into());
        self
    }

    pub fn with_properties(mut self, properties: ResourceProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn is(&self, entry_type: EntryType) -> bool {
        self.entry_type == entry_type
    }

    pub fn is_resource(&self, resource: &str) -> bool {
        self.resource == resource
    }
}

/// A named production stage with its inventory and co-product policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessTable {
    pub name: String,
    pub method: CoproductMethod,
    pub is_final: bool,
    pub entries: Vec<LciEntry>,
}

impl ProcessTable {
    pub fn new(name: impl Into<String>, method: CoproductMethod, entries: Vec<LciEntry>) -> Self {
        Self {
            name: name.into(),
            method,
            is_final: false,
            entries,
        }
    }

    pub fn final_process(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn entries_of(&self, entry_type: EntryType) -> impl Iterator<Item = &LciEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.entry_type == entry_type)
    }

    pub fn main_product(&self) -> Option<&LciEntry> {
        self.entries_of(EntryType::MainProduct).next()
    }

    pub fn has_external_inputs(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.is(EntryType::InputFromAnotherStage))
    }

    /// Names of the processes this table draws inputs from, in row order.
    pub fn upstream_references(&self) -> Vec<&str> {
        let mut references: Vec<&str> = Vec::new();
        for stage in self
            .entries_of(EntryType::InputFromAnotherStage)
            .filter_map(|entry| entry.previous_stage.as_deref())
        {
            if !references.contains(&stage) {
                references.push(stage);
            }
        }
        references
    }
}

/// The processes of one pathway, kept in workbook order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessNetwork {
    pub processes: Vec<ProcessTable>,
}

impl ProcessNetwork {
    pub fn new(processes: Vec<ProcessTable>) -> Self {
        Self { processes }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ProcessTable> {
        self.processes.iter().find(|process| process.name == name)
    }

    pub fn final_processes(&self) -> impl Iterator<Item = &ProcessTable> {
        self.processes.iter().filter(|process| process.is_final)
    }
}
