//! Small in-memory engine context shared by the unit tests.

use crate::background::tests::record;
use crate::background::{BackgroundTables, RawBackgroundTables};
use crate::context::EngineContext;
use crate::modules::transport::{FuelEconomy, TransportTables};
use crate::units::tests::sample_units;
use crate::units::{PropertyTable, ResourceProperties};
use std::collections::BTreeMap;

fn properties() -> PropertyTable {
    let mut table = PropertyTable::new([
        (
            "diesel",
            ResourceProperties::default().with_density(840.0).with_lhv(42.8),
        ),
        (
            "ethanol",
            ResourceProperties::default().with_density(789.0).with_lhv(26.8),
        ),
        (
            "renewable diesel",
            ResourceProperties::default().with_density(780.0).with_lhv(44.0),
        ),
        (
            "gasoline",
            ResourceProperties::default().with_density(745.0).with_lhv(43.4),
        ),
        ("natural gas", ResourceProperties::default().with_lhv(47.1)),
        (
            "renewable natural gas",
            ResourceProperties::default().with_lhv(47.1),
        ),
        ("water", ResourceProperties::default().with_density(1000.0)),
        ("corn stover", ResourceProperties::default().with_lhv(16.0)),
        ("hydrogen", ResourceProperties::default().with_lhv(120.0)),
    ]);
    table.insert(
        "lignin",
        ResourceProperties {
            lhv: Some(23.4),
            market_price: Some(0.05),
            market_price_unit: Some("$/kg".to_string()),
            ..ResourceProperties::default()
        },
    );
    table
}

fn background() -> BackgroundTables {
    let mut raw = RawBackgroundTables::default();

    let resources = [
        (
            "corn stover",
            record(
                "kg",
                &[
                    ("Total energy, Btu", 500.0),
                    ("Fossil fuels, Btu", 450.0),
                    ("CO2", 50.0),
                    ("CH4", 0.1),
                    ("N2O", 0.02),
                    ("NOx", 0.2),
                    ("Urban NOx", 0.02),
                ],
            ),
        ),
        (
            "diesel",
            record(
                "mmBTU",
                &[
                    ("Total energy, Btu", 1.2e6),
                    ("Fossil fuels, Btu", 1.19e6),
                    ("Petroleum, Btu", 1.1e6),
                    ("CO2", 17000.0),
                    ("CH4", 100.0),
                    ("N2O", 0.3),
                    ("NOx", 20.0),
                    ("Urban NOx", 2.0),
                ],
            ),
        ),
        (
            "natural gas",
            record(
                "mmBTU",
                &[
                    ("Total energy, Btu", 1.1e6),
                    ("Fossil fuels, Btu", 1.09e6),
                    ("Natural gas, Btu", 1.08e6),
                    ("CO2", 5000.0),
                    ("CH4", 300.0),
                    ("NOx", 10.0),
                    ("Urban NOx", 1.0),
                ],
            ),
        ),
        (
            "renewable natural gas",
            record(
                "mmBTU",
                &[("Total energy, Btu", 1.3e6), ("CO2", 1000.0), ("CH4", 50.0)],
            ),
        ),
        (
            "gasoline",
            record(
                "mmBTU",
                &[
                    ("Total energy, Btu", 1.25e6),
                    ("Fossil fuels, Btu", 1.2e6),
                    ("Petroleum, Btu", 1.15e6),
                    ("CO2", 15000.0),
                    ("CH4", 110.0),
                    ("N2O", 0.5),
                ],
            ),
        ),
        (
            "water",
            record("gal", &[("Water consumption: gallons", 1.0)]),
        ),
        (
            "sulfuric acid",
            record("g", &[("Total energy, Btu", 1.0), ("CO2", 0.05)]),
        ),
        ("voc", record("g", &[("VOC", 1.0), ("Urban VOC", 1.0)])),
        ("co2", record("g", &[("CO2", 1.0)])),
    ];
    for (name, factors) in resources {
        raw.resources.insert(name.to_string(), factors);
    }

    raw.grid_mixes.insert(
        "u.s. mix".to_string(),
        record(
            "mmBTU",
            &[
                ("Total energy, Btu", 2.5e6),
                ("Fossil fuels, Btu", 1.8e6),
                ("Coal, Btu", 0.6e6),
                ("Natural gas, Btu", 1.0e6),
                ("CO2", 130000.0),
                ("CH4", 280.0),
                ("N2O", 2.0),
            ],
        ),
    );
    raw.grid_mixes.insert(
        "renewable".to_string(),
        record("mmBTU", &[("Total energy, Btu", 1.05e6), ("CO2", 1000.0)]),
    );

    let combustion = |factors: &[(&str, f64)], unit: &str| record(unit, factors);
    let end_uses = [
        (
            "natural gas",
            "industrial boiler",
            combustion(
                &[
                    ("CO2", 59000.0),
                    ("CH4", 1.0),
                    ("N2O", 0.7),
                    ("NOx", 35.0),
                    ("VOC", 2.0),
                    ("CO", 30.0),
                ],
                "mmBTU",
            ),
        ),
        (
            "diesel",
            "loaded",
            combustion(
                &[("CO2", 78000.0), ("CH4", 2.0), ("N2O", 0.5), ("NOx", 300.0)],
                "mmBTU",
            ),
        ),
        (
            "diesel",
            "empty",
            combustion(
                &[("CO2", 78000.0), ("CH4", 2.0), ("N2O", 0.5), ("NOx", 300.0)],
                "mmBTU",
            ),
        ),
        (
            "lignin",
            "combustion",
            combustion(
                &[("Biogenic CO2", 1800.0), ("CH4", 0.05), ("NOx", 1.0)],
                "kg",
            ),
        ),
    ];
    for (resource, end_use, factors) in end_uses {
        raw.end_use
            .entry(resource.to_string())
            .or_insert_with(BTreeMap::new)
            .insert(end_use.to_string(), factors);
    }

    for (resource, co2) in [
        ("gasoline", 800.0),
        ("renewable diesel", 700.0),
        ("ethanol", 650.0),
    ] {
        raw.fuel_distribution.insert(
            resource.to_string(),
            record(
                "mmBTU",
                &[("Total energy, Btu", 1.0e4), ("CO2", co2), ("Urban VOC", 5.0)],
            ),
        );
    }

    match BackgroundTables::from_raw(raw, &sample_units()) {
        Ok(tables) => tables,
        Err(message) => panic!("sample background should load: {message}"),
    }
}

/// Context backed by the sample unit tables and a handful of resources.
pub(crate) fn sample_context() -> EngineContext {
    EngineContext::new(
        sample_units(),
        properties(),
        background(),
        TransportTables::single(
            "Heavy Heavy-Duty Truck",
            FuelEconomy {
                loaded_btu_per_mile: 20000.0,
                empty_btu_per_mile: 15000.0,
            },
        ),
    )
}
