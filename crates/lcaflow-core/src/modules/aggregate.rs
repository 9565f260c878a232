//! Turns a resolved network inventory into per-row, per-functional-unit
//! impact totals.

use super::emission::emission_factor;
use super::normalize::missing_main_product;
use super::postprocess::title_case;
use crate::common::constants::{CH4_GWP, CO_CARBON, CO2_CARBON, CO2_GWP, N2O_GWP, VOC_CARBON};
use crate::common::numerics::stable_sum;
use crate::common::{Metric, MetricVector};
use crate::context::EngineContext;
use crate::domain::{Category, EntryType, LcaError, LcaResult, LciEntry};
use crate::units::Dimension;
use tracing::{debug, warn};

/// One inventory row with its impact totals per functional unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub pathway: String,
    pub stage: String,
    pub entry_type: EntryType,
    pub category: Category,
    /// Display label for the category; starts as the category name.
    pub category_label: String,
    pub resource: String,
    pub end_use: String,
    pub unit: String,
    /// Amount per functional unit, in `unit`.
    pub amount: f64,
    pub totals: MetricVector,
}

impl ResultRow {
    pub fn total(&self, metric: Metric) -> f64 {
        self.totals[metric]
    }

    pub fn is_incumbent(&self) -> bool {
        self.pathway.ends_with(INCUMBENT_SUFFIX)
    }
}

const MODELED_SUFFIX: &str = " (Modeled)";
const INCUMBENT_SUFFIX: &str = " (Incumbent)";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
    /// Category of the functional unit.
    pub main_category: Category,
    /// Unit in which the functional unit is expressed.
    pub functional_unit: String,
}

impl ResultTable {
    /// Pathway labels in first-appearance order.
    pub fn pathways(&self) -> Vec<&str> {
        let mut pathways: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !pathways.contains(&row.pathway.as_str()) {
                pathways.push(&row.pathway);
            }
        }
        pathways
    }

    /// Sum of `metric` over each pathway, in first-appearance order.
    pub fn pathway_totals(&self, metric: Metric) -> Vec<(String, f64)> {
        self.pathways()
            .into_iter()
            .map(|pathway| {
                let total = stable_sum(
                    self.rows
                        .iter()
                        .filter(|row| row.pathway == pathway)
                        .map(|row| row.total(metric)),
                );
                (pathway.to_string(), total)
            })
            .collect()
    }

    pub fn total(&self, pathway: &str, metric: Metric) -> Option<f64> {
        self.pathway_totals(metric)
            .into_iter()
            .find(|(label, _)| label == pathway)
            .map(|(_, total)| total)
    }

    pub fn modeled_pathway(&self) -> Option<&str> {
        self.pathways()
            .into_iter()
            .find(|pathway| pathway.ends_with(MODELED_SUFFIX))
    }

    pub fn incumbent_pathway(&self) -> Option<&str> {
        self.pathways()
            .into_iter()
            .find(|pathway| pathway.ends_with(INCUMBENT_SUFFIX))
    }
}

/// Adds the two derived metrics: CO2 with the carbon in VOC and CO, and GHG.
pub fn with_composites(mut factors: MetricVector) -> MetricVector {
    let co2_with_carbon = factors[Metric::Co2]
        + factors[Metric::Co] * CO_CARBON / CO2_CARBON
        + factors[Metric::Voc] * VOC_CARBON / CO2_CARBON;
    factors[Metric::Co2WithCarbonInVocCo] = co2_with_carbon;
    factors[Metric::Ghg] = co2_with_carbon * CO2_GWP
        + factors[Metric::BiogenicCo2] * CO2_GWP
        + factors[Metric::Ch4] * CH4_GWP
        + factors[Metric::N2o] * N2O_GWP;
    factors
}

/// Computes the impact table of one resolved network inventory.
///
/// With `include_incumbent`, one row for the main product's incumbent (one
/// primary unit, same urban share) is added under its own pathway.
pub fn calculate_lca(
    entries: &[LciEntry],
    include_incumbent: bool,
    context: &EngineContext,
) -> LcaResult<ResultTable> {
    let main = entries
        .iter()
        .find(|entry| entry.is(EntryType::MainProduct))
        .ok_or_else(|| missing_main_product("final"))?;
    let main_category = main.category;
    let modeled = format!("{}{MODELED_SUFFIX}", title_case(&main.resource));

    let mut labeled: Vec<(String, LciEntry)> = entries
        .iter()
        .map(|entry| (modeled.clone(), entry.clone()))
        .collect();

    if include_incumbent {
        if main.incumbent_product.is_empty() {
            warn!(
                main_product = %main.resource,
                "main product names no incumbent; comparison row skipped"
            );
        } else {
            let incumbent = &main.incumbent_product;
            let row = LciEntry::new(
                EntryType::Input,
                main_category,
                incumbent.clone(),
                main_category.primary_unit(),
                1.0,
            )
            .with_stage(format!("{incumbent}{INCUMBENT_SUFFIX}"))
            .with_end_use(main.incumbent_end_use.clone())
            .with_urban_share(main.urban_share);
            labeled.push((format!("{}{INCUMBENT_SUFFIX}", title_case(incumbent)), row));
        }
    }

    let units = &context.units;
    let mut converted = Vec::with_capacity(labeled.len());
    for (_, entry) in &labeled {
        let primary = entry.category.primary_unit();
        converted.push(units.convert(entry.amount, &entry.unit, primary, &entry.properties)?);
    }

    let main_total = stable_sum(
        labeled
            .iter()
            .zip(&converted)
            .filter(|((_, entry), _)| entry.is(EntryType::MainProduct))
            .map(|(_, amount)| *amount),
    );
    if main_total == 0.0 || !main_total.is_finite() {
        return Err(LcaError::validation(
            "INPUT.MAIN_PRODUCT_AMOUNT",
            "The main product amount of the final process must be a nonzero number.",
        ));
    }

    let mj_per_btu = units.factor(Dimension::Energy, "BTU", "MJ")?;
    let calculation_unit = main_category.primary_unit();
    let target_unit = main_category.display_unit();
    let display_divisor = if main_category.is_energy_like() {
        Some(units.factor(Dimension::Energy, calculation_unit, target_unit)?)
    } else if main_category.is_mass_like() {
        Some(units.factor(Dimension::Mass, calculation_unit, target_unit)?)
    } else {
        None
    };
    let rescaled = display_divisor.is_some();

    let mut rows = Vec::with_capacity(labeled.len());
    for ((pathway, entry), amount) in labeled.into_iter().zip(converted) {
        let factors = with_composites(emission_factor(&entry, context)?);
        let amount = if pathway.ends_with(INCUMBENT_SUFFIX) {
            1.0
        } else {
            amount / main_total
        };

        let mut totals = factors * amount;
        for metric in Metric::ENERGY {
            totals[metric] *= mj_per_btu;
        }
        if let Some(divisor) = display_divisor {
            totals = totals.scaled(1.0 / divisor);
        }

        let unit = if rescaled
            && matches!(
                entry.entry_type,
                EntryType::MainProduct | EntryType::IntermediateProduct
            ) {
            target_unit
        } else {
            entry.category.primary_unit()
        };

        rows.push(ResultRow {
            pathway,
            stage: entry.stage,
            entry_type: entry.entry_type,
            category: entry.category,
            category_label: entry.category.as_str().to_string(),
            resource: entry.resource,
            end_use: entry.end_use,
            unit: unit.to_string(),
            amount,
            totals,
        });
    }

    debug!(rows = rows.len(), functional_unit = target_unit, "calculated LCA");

    Ok(ResultTable {
        rows,
        main_category,
        functional_unit: if rescaled {
            target_unit.to_string()
        } else {
            calculation_unit.to_string()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::{calculate_lca, with_composites};
    use crate::common::{Metric, MetricVector};
    use crate::domain::{Category, EntryType, LciEntry};
    use crate::modules::test_support::sample_context;

    #[test]
    fn ghg_combines_gwp_weighted_gases() {
        let factors = with_composites(MetricVector::from_pairs([
            (Metric::Co2, 100.0),
            (Metric::Ch4, 1.0),
            (Metric::N2o, 0.01),
        ]));
        assert!((factors[Metric::Ghg] - 132.65).abs() < 1.0e-9);
        assert_eq!(factors[Metric::Co2WithCarbonInVocCo], 100.0);
    }

    #[test]
    fn carbon_in_voc_and_co_counts_toward_co2() {
        let factors = with_composites(MetricVector::from_pairs([
            (Metric::Co, 28.0),
            (Metric::Voc, 12.0),
            (Metric::BiogenicCo2, 5.0),
        ]));
        let expected = 44.0 + 0.85 * 12.0 * 44.0 / 12.0;
        assert!((factors[Metric::Co2WithCarbonInVocCo] - expected).abs() < 1.0e-9);
        assert!((factors[Metric::Ghg] - expected - 5.0).abs() < 1.0e-9);
    }

    fn fuel_inventory() -> Vec<LciEntry> {
        vec![
            LciEntry::new(
                EntryType::MainProduct,
                Category::ProcessFuel,
                "ethanol",
                "mmBTU",
                2.0,
            )
            .with_stage("Conversion")
            .with_incumbent("gasoline", "")
            .with_urban_share(0.4),
            LciEntry::new(
                EntryType::Input,
                Category::ChemicalsAndCatalysts,
                "sulfuric acid",
                "kg",
                4.0,
            )
            .with_stage("Conversion"),
        ]
    }

    #[test]
    fn totals_are_per_display_unit_of_main_product() {
        let context = sample_context();
        let table =
            calculate_lca(&fuel_inventory(), true, &context).expect("calculation should succeed");

        assert_eq!(table.functional_unit, "MJ");
        assert_eq!(table.rows.len(), 3);

        let acid = &table.rows[1];
        assert_eq!(acid.unit, "g");
        // 4000 g per 2 mmBTU, 0.05 g CO2 per g, per MJ
        assert!((acid.amount - 2000.0).abs() < 1.0e-9);
        assert!((acid.total(Metric::Co2) - 100.0 / 1055.056).abs() < 1.0e-12);
        // 1 Btu per g, reported in MJ
        assert!((acid.total(Metric::TotalEnergy) - 2000.0 * 0.001055056 / 1055.056).abs() < 1.0e-12);

        let main = &table.rows[0];
        assert_eq!(main.unit, "MJ");
        assert_eq!(main.pathway, "Ethanol (Modeled)");
        assert!(main.totals.is_zero());
    }

    #[test]
    fn incumbent_row_is_one_functional_unit_under_its_own_pathway() {
        let context = sample_context();
        let table =
            calculate_lca(&fuel_inventory(), true, &context).expect("calculation should succeed");

        let incumbent = table.rows.last().expect("incumbent row should be appended");
        assert!(incumbent.is_incumbent());
        assert_eq!(incumbent.pathway, "Gasoline (Incumbent)");
        assert_eq!(incumbent.stage, "gasoline (Incumbent)");
        assert_eq!(incumbent.amount, 1.0);
        assert!((incumbent.total(Metric::Co2) - 15000.0 / 1055.056).abs() < 1.0e-9);

        assert_eq!(table.modeled_pathway(), Some("Ethanol (Modeled)"));
        assert_eq!(table.incumbent_pathway(), Some("Gasoline (Incumbent)"));
        let totals = table.pathway_totals(Metric::Co2);
        assert_eq!(totals.len(), 2);
        assert!((totals[0].1 - 100.0 / 1055.056).abs() < 1.0e-12);

        let without =
            calculate_lca(&fuel_inventory(), false, &context).expect("calculation should succeed");
        assert_eq!(without.rows.len(), 2);
        assert_eq!(without.incumbent_pathway(), None);
    }

    #[test]
    fn biomass_results_are_reported_per_ton() {
        let context = sample_context();
        let entries = vec![
            LciEntry::new(
                EntryType::MainProduct,
                Category::Biomass,
                "corn stover",
                "kg",
                1.0,
            ),
            LciEntry::new(EntryType::Input, Category::ProcessFuel, "diesel", "mmBTU", 0.001),
        ];
        let table = calculate_lca(&entries, false, &context).expect("calculation should succeed");

        assert_eq!(table.functional_unit, "ton");
        assert_eq!(table.rows[0].unit, "ton");
        // 0.001 mmBTU diesel per kg is 0.90718474 mmBTU per ton
        let expected = 17000.0 * 0.001 * 907.18474;
        assert!((table.rows[1].total(Metric::Co2) - expected).abs() < 1.0e-6);
    }
}
