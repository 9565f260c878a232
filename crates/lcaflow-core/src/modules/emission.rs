//! Maps one resolved inventory row onto its burden vector.

use crate::common::MetricVector;
use crate::common::constants::{DEFAULT_GRID_MIX, ELECTRICITY, FUEL_DISTRIBUTION};
use crate::context::EngineContext;
use crate::domain::{Category, EntryType, LcaError, LcaResult, LciEntry};

/// Burden per primary unit of `entry`.
///
/// Inputs carry their production burden plus any end-use increment. Main and
/// intermediate products carry only their end-use increment. A co-product is
/// credited with its incumbent's burden net of its own end use.
pub fn emission_factor(entry: &LciEntry, context: &EngineContext) -> LcaResult<MetricVector> {
    let lookup = FactorLookup { context };

    match entry.entry_type {
        EntryType::Input => {
            if entry.resource == ELECTRICITY {
                lookup.grid_mix(&entry.end_use)
            } else if entry.category == Category::EmissionsAndSequestration {
                Ok(lookup
                    .resource(&entry.resource)?
                    .with_urban_share(entry.urban_share))
            } else if entry.end_use.is_empty() {
                lookup.resource(&entry.resource)
            } else {
                Ok(lookup.resource(&entry.resource)?
                    + lookup.end_use(&entry.resource, &entry.end_use, entry.urban_share)?)
            }
        }
        EntryType::IntermediateProduct => {
            if entry.resource == ELECTRICITY || entry.end_use.is_empty() {
                Ok(MetricVector::zero())
            } else {
                lookup.end_use(&entry.resource, &entry.end_use, entry.urban_share)
            }
        }
        EntryType::MainProduct => {
            if entry.end_use.is_empty() {
                Ok(MetricVector::zero())
            } else {
                lookup.end_use(&entry.resource, &entry.end_use, entry.urban_share)
            }
        }
        EntryType::Coproduct => coproduct_factor(entry, &lookup),
        EntryType::InputFromAnotherStage => Err(LcaError::internal(
            "RUN.UNRESOLVED_INPUT",
            format!(
                "\"{}\" from \"{}\" reached emission lookup before cross-stage resolution",
                entry.resource,
                entry.previous_stage.as_deref().unwrap_or_default()
            ),
        )),
    }
}

fn coproduct_factor(entry: &LciEntry, lookup: &FactorLookup<'_>) -> LcaResult<MetricVector> {
    let incumbent = entry.incumbent_product.as_str();
    if incumbent.is_empty() {
        return Err(LcaError::validation(
            "INPUT.COPRODUCT_INCUMBENT",
            format!(
                "Please specify the incumbent product displaced by co-product \"{}\".",
                entry.resource
            ),
        ));
    }
    if incumbent == ELECTRICITY {
        return lookup.grid_mix(&entry.incumbent_end_use);
    }

    let mut credit = lookup.resource(incumbent)?;
    if !entry.incumbent_end_use.is_empty() {
        credit = credit + lookup.end_use(incumbent, &entry.incumbent_end_use, entry.urban_share)?;
    }
    if !entry.end_use.is_empty() {
        credit = credit - lookup.end_use(&entry.resource, &entry.end_use, entry.urban_share)?;
    }
    Ok(credit)
}

struct FactorLookup<'a> {
    context: &'a EngineContext,
}

impl FactorLookup<'_> {
    fn resource(&self, resource: &str) -> LcaResult<MetricVector> {
        self.context
            .background
            .resource_factor(resource)
            .copied()
            .ok_or_else(|| missing_factor(resource))
    }

    fn grid_mix(&self, mix: &str) -> LcaResult<MetricVector> {
        let mix = if mix.is_empty() { DEFAULT_GRID_MIX } else { mix };
        self.context
            .background
            .grid_mix(mix)
            .copied()
            .ok_or_else(|| missing_factor(&format!("{ELECTRICITY} ({mix})")))
    }

    /// Fuel distribution carries its own urban increment, so no share applies.
    fn end_use(&self, resource: &str, end_use: &str, urban_share: f64) -> LcaResult<MetricVector> {
        let background = &self.context.background;
        if end_use == FUEL_DISTRIBUTION {
            return background
                .fuel_distribution_factor(resource)
                .copied()
                .ok_or_else(|| missing_factor(&format!("{resource} ({end_use})")));
        }
        background
            .end_use_factor(resource, end_use)
            .map(|factors| factors.with_urban_share(urban_share))
            .ok_or_else(|| missing_factor(&format!("{resource} ({end_use})")))
    }
}

fn missing_factor(name: &str) -> LcaError {
    LcaError::validation(
        "DATA.MISSING_FACTOR",
        format!("No background emission factor is available for \"{}\".", name),
    )
}

#[cfg(test)]
mod tests {
    use super::emission_factor;
    use crate::common::Metric;
    use crate::domain::{Category, EntryType, LcaErrorCategory, LciEntry};
    use crate::modules::test_support::sample_context;

    #[test]
    fn electricity_inputs_use_the_grid_mix_with_national_default() {
        let context = sample_context();
        let default_mix = LciEntry::new(
            EntryType::Input,
            Category::Electricity,
            "electricity",
            "kWh",
            1.0,
        );
        let renewable = default_mix.clone().with_end_use("renewable");

        let us = emission_factor(&default_mix, &context).expect("u.s. mix should exist");
        let green = emission_factor(&renewable, &context).expect("renewable mix should exist");
        assert_eq!(
            us,
            *context
                .background
                .grid_mix("u.s. mix")
                .expect("mix present")
        );
        assert!(green[Metric::Co2] < us[Metric::Co2]);
    }

    #[test]
    fn fuel_inputs_add_urban_scaled_end_use_increment() {
        let context = sample_context();
        let entry = LciEntry::new(
            EntryType::Input,
            Category::ProcessFuel,
            "natural gas",
            "mmBTU",
            1.0,
        )
        .with_end_use("industrial boiler")
        .with_urban_share(0.5);

        let factors = emission_factor(&entry, &context).expect("factor should resolve");
        let production = context
            .background
            .resource_factor("natural gas")
            .expect("natural gas present");
        let combustion = context
            .background
            .end_use_factor("natural gas", "industrial boiler")
            .expect("boiler present");

        assert!((factors[Metric::Co2] - (production[Metric::Co2] + combustion[Metric::Co2])).abs() < 1.0e-9);
        assert!(
            (factors[Metric::UrbanNox]
                - (production[Metric::UrbanNox] + 0.5 * combustion[Metric::UrbanNox]))
                .abs()
                < 1.0e-9
        );
    }

    #[test]
    fn emission_items_scale_only_urban_metrics() {
        let context = sample_context();
        let entry = LciEntry::new(
            EntryType::Input,
            Category::EmissionsAndSequestration,
            "voc",
            "g",
            1.0,
        )
        .with_urban_share(0.25);

        let factors = emission_factor(&entry, &context).expect("factor should resolve");
        assert_eq!(factors[Metric::Voc], 1.0);
        assert_eq!(factors[Metric::UrbanVoc], 0.25);
    }

    #[test]
    fn products_without_end_use_carry_no_burden() {
        let context = sample_context();
        for entry_type in [EntryType::MainProduct, EntryType::IntermediateProduct] {
            let entry = LciEntry::new(entry_type, Category::ProcessFuel, "ethanol", "kg", 1.0);
            let factors = emission_factor(&entry, &context).expect("zero factor");
            assert!(factors.is_zero());
        }

        let intermediate = LciEntry::new(
            EntryType::IntermediateProduct,
            Category::Electricity,
            "electricity",
            "kWh",
            1.0,
        )
        .with_end_use("u.s. mix");
        assert!(
            emission_factor(&intermediate, &context)
                .expect("electricity intermediate is zero")
                .is_zero()
        );
    }

    #[test]
    fn coproduct_credit_is_incumbent_burden_net_of_own_end_use() {
        let context = sample_context();
        let coproduct = LciEntry::new(EntryType::Coproduct, Category::Other, "lignin", "kg", -1.0)
            .with_end_use("combustion")
            .with_incumbent("natural gas", "industrial boiler")
            .with_urban_share(1.0);

        let factors = emission_factor(&coproduct, &context).expect("credit should resolve");
        let background = &context.background;
        let expected = background.resource_factor("natural gas").expect("ng")[Metric::Co2]
            + background
                .end_use_factor("natural gas", "industrial boiler")
                .expect("boiler")[Metric::Co2]
            - background
                .end_use_factor("lignin", "combustion")
                .expect("lignin combustion")[Metric::Co2];
        assert!((factors[Metric::Co2] - expected).abs() < 1.0e-9);

        let power = LciEntry::new(
            EntryType::Coproduct,
            Category::Electricity,
            "electricity",
            "kWh",
            -1.0,
        )
        .with_incumbent("electricity", "");
        assert_eq!(
            emission_factor(&power, &context).expect("grid credit"),
            *background.grid_mix("u.s. mix").expect("mix present")
        );
    }

    #[test]
    fn missing_background_factor_is_reported_by_name() {
        let context = sample_context();
        let entry = LciEntry::new(EntryType::Input, Category::Other, "unobtainium", "kg", 1.0);
        let error = emission_factor(&entry, &context).expect_err("lookup should fail");
        assert_eq!(error.category(), LcaErrorCategory::ValidationError);
        assert!(error.message().contains("unobtainium"));

        let orphan = LciEntry::new(EntryType::Coproduct, Category::Other, "lignin", "kg", -1.0);
        let error = emission_factor(&orphan, &context).expect_err("incumbent is required");
        assert_eq!(error.placeholder(), "INPUT.COPRODUCT_INCUMBENT");
    }
}
