use lcaflow_core::EngineContext;
use lcaflow_core::common::Metric;
use lcaflow_core::domain::{
    AllocationBasis, Category, CoproductMethod, EntryType, LcaErrorCategory, LciEntry,
    ProcessNetwork, ProcessTable,
};
use lcaflow_core::modules::allocation::allocation_ratio;
use lcaflow_core::modules::normalize::format_input;
use lcaflow_core::modules::sensitivity::renewable_electricity;
use lcaflow_core::modules::{RunOptions, run_lca};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn context() -> EngineContext {
    EngineContext::load(workspace_root().join("data")).expect("shipped data tables should load")
}

fn emission(resource: &str, grams: f64) -> LciEntry {
    LciEntry::new(
        EntryType::Input,
        Category::EmissionsAndSequestration,
        resource,
        "g",
        grams,
    )
}

#[test]
fn ghg_weights_methane_and_nitrous_oxide_by_gwp() {
    let network = ProcessNetwork::new(vec![
        ProcessTable::new(
            "Synthesis",
            CoproductMethod::Displacement,
            vec![
                LciEntry::new(
                    EntryType::MainProduct,
                    Category::ChemicalsAndCatalysts,
                    "hydrogen",
                    "g",
                    1.0,
                ),
                emission("CO2", 100.0),
                emission("CH4", 1.0),
                emission("N2O", 0.01),
            ],
        )
        .final_process(),
    ]);

    let options = RunOptions {
        include_incumbent: false,
        ..RunOptions::default()
    };
    let table = run_lca(&network, &options, &context()).expect("pathway should compute");

    assert_eq!(table.functional_unit, "g");
    assert_eq!(table.pathways(), vec!["Hydrogen (Modeled)"]);
    let ghg = table
        .total("Hydrogen (Modeled)", Metric::Ghg)
        .expect("modeled total");
    assert!((ghg - 132.65).abs() < 1.0e-9, "GHG was {ghg}");
}

#[test]
fn mutually_dependent_processes_are_reported_as_a_cycle() {
    let network = ProcessNetwork::new(vec![
        ProcessTable::new(
            "A",
            CoproductMethod::Displacement,
            vec![
                LciEntry::new(EntryType::MainProduct, Category::Biomass, "pellets", "kg", 1.0),
                LciEntry::new(
                    EntryType::InputFromAnotherStage,
                    Category::Biomass,
                    "chips",
                    "kg",
                    1.0,
                )
                .with_previous_stage("B"),
            ],
        )
        .final_process(),
        ProcessTable::new(
            "B",
            CoproductMethod::Displacement,
            vec![
                LciEntry::new(EntryType::MainProduct, Category::Biomass, "chips", "kg", 1.0),
                LciEntry::new(
                    EntryType::InputFromAnotherStage,
                    Category::Biomass,
                    "pellets",
                    "kg",
                    0.5,
                )
                .with_previous_stage("A"),
            ],
        ),
    ]);

    let error = run_lca(&network, &RunOptions::default(), &context())
        .expect_err("cycle should be detected");
    assert_eq!(error.category(), LcaErrorCategory::CyclicDependencyError);
}

#[test]
fn allocation_ratio_stays_in_unit_interval_for_positive_products() {
    let context = context();
    let main = LciEntry::new(
        EntryType::MainProduct,
        Category::ProcessFuel,
        "renewable diesel",
        "kg",
        100.0,
    )
    .with_properties(context.properties.properties_for("renewable diesel"));

    for basis in [AllocationBasis::Mass, AllocationBasis::Energy] {
        let alone = allocation_ratio("Upgrading", std::slice::from_ref(&main), basis, &context)
            .expect("ratio should compute");
        assert_eq!(alone, 1.0, "{basis}");

        for coproduct_kg in [0.1, 5.0, 250.0] {
            let naphtha = LciEntry::new(
                EntryType::Coproduct,
                Category::ProcessFuel,
                "gasoline",
                "kg",
                coproduct_kg,
            )
            .with_properties(context.properties.properties_for("gasoline"));
            let ratio = allocation_ratio("Upgrading", &[main.clone(), naphtha], basis, &context)
                .expect("ratio should compute");
            assert!(ratio > 0.0 && ratio <= 1.0, "{basis}: {ratio}");
        }
    }
}

#[test]
fn normalization_is_idempotent() {
    let context = context();
    let raw = vec![
        LciEntry::new(
            EntryType::MainProduct,
            Category::Biomass,
            " Corn Stover ",
            "ton",
            2.5,
        )
        .with_moisture(0.2),
        LciEntry::new(EntryType::Input, Category::ProcessFuel, "Diesel", "gal", 3.0)
            .with_end_use("Stationary Reciprocating Engine"),
        LciEntry::new(EntryType::Input, Category::Water, "water", "gal", 40.0),
    ];

    let once = format_input("Harvest", &raw, None, &context).expect("first pass");
    let twice = format_input("Harvest", &once, None, &context).expect("second pass");
    assert_eq!(once, twice);
    let main = once
        .iter()
        .find(|entry| entry.is(EntryType::MainProduct))
        .expect("main product should survive");
    assert_eq!(main.resource, "corn stover");
    assert_eq!(main.moisture, 0.0);
    assert!((main.amount - 1.0).abs() < 1.0e-12);
}

#[test]
fn renewable_split_keeps_total_electricity() {
    let entries = vec![
        LciEntry::new(
            EntryType::MainProduct,
            Category::ProcessFuel,
            "ethanol",
            "MJ",
            1.0,
        ),
        LciEntry::new(
            EntryType::Input,
            Category::Electricity,
            "electricity",
            "kWh",
            100.0,
        )
        .with_end_use("u.s. mix"),
    ];

    let split = renewable_electricity(entries, 0.3).expect("split should succeed");
    let amounts: Vec<(String, f64)> = split
        .iter()
        .filter(|entry| entry.resource == "electricity")
        .map(|entry| (entry.end_use.clone(), entry.amount))
        .collect();
    assert_eq!(amounts.len(), 2);
    assert_eq!(amounts[0].0, "u.s. mix");
    assert!((amounts[0].1 - 70.0).abs() < 1.0e-12);
    assert_eq!(amounts[1].0, "renewable");
    assert!((amounts[1].1 - 30.0).abs() < 1.0e-12);
}
