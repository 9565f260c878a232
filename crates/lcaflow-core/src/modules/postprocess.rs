//! Display labels for a computed result table.

use super::aggregate::{ResultRow, ResultTable};
use crate::domain::{Category, EntryType};
use crate::units::PropertyTable;

const STAGE_ACRONYMS: [(&str, &str); 3] = [("Htl", "HTL"), ("Cfp", "CFP"), ("Idl", "IDL")];
const RESOURCE_ACRONYMS: [(&str, &str); 4] = [
    ("Co2", "CO2"),
    ("Wwt", "WWT"),
    ("Fgd", "FGD"),
    ("Bdo", "BDO"),
];

pub const COPRODUCT_CREDITS: &str = "Co-product Credits";
pub const CARBON_SEQUESTRATION: &str = "Carbon sequestration";

/// Upper-cases the first letter of every run of letters and lower-cases the
/// rest, so "u.s. mix" becomes "U.S. Mix" and "co2" becomes "Co2".
pub fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut in_word = false;
    for character in text.chars() {
        if character.is_alphabetic() {
            if in_word {
                titled.extend(character.to_lowercase());
            } else {
                titled.extend(character.to_uppercase());
            }
            in_word = true;
        } else {
            titled.push(character);
            in_word = false;
        }
    }
    titled
}

fn restore_acronyms(text: String, acronyms: &[(&str, &str)]) -> String {
    acronyms
        .iter()
        .fold(text, |text, (titled, acronym)| text.replace(*titled, acronym))
}

/// Rewrites stage, resource, pathway and category labels for presentation.
pub fn postprocess(mut table: ResultTable, properties: &PropertyTable) -> ResultTable {
    for row in &mut table.rows {
        relabel(row, properties);
    }
    table
}

fn relabel(row: &mut ResultRow, properties: &PropertyTable) {
    let surrogate = properties
        .lookup(&row.resource)
        .and_then(|found| found.surrogate_for.clone());

    row.stage = restore_acronyms(title_case(&row.stage), &STAGE_ACRONYMS);
    row.resource = restore_acronyms(title_case(&row.resource), &RESOURCE_ACRONYMS);
    row.pathway = restore_acronyms(std::mem::take(&mut row.pathway), &RESOURCE_ACRONYMS);

    if row.entry_type == EntryType::Coproduct {
        row.category_label = COPRODUCT_CREDITS.to_string();
    } else if row.category == Category::EmissionsAndSequestration {
        if row.resource.contains("Sequestration") {
            row.category_label = CARBON_SEQUESTRATION.to_string();
        } else {
            row.resource = format!("Other {} emission", row.resource);
        }
    }

    if let Some(surrogate) = surrogate {
        row.resource = surrogate;
    }
}

#[cfg(test)]
mod tests {
    use super::{CARBON_SEQUESTRATION, COPRODUCT_CREDITS, postprocess, title_case};
    use crate::common::MetricVector;
    use crate::domain::{Category, EntryType};
    use crate::modules::aggregate::{ResultRow, ResultTable};
    use crate::units::{PropertyTable, ResourceProperties};

    fn row(entry_type: EntryType, category: Category, stage: &str, resource: &str) -> ResultRow {
        ResultRow {
            pathway: "Bdo Diesel (Modeled)".to_string(),
            stage: stage.to_string(),
            entry_type,
            category,
            category_label: category.as_str().to_string(),
            resource: resource.to_string(),
            end_use: String::new(),
            unit: "g".to_string(),
            amount: 1.0,
            totals: MetricVector::zero(),
        }
    }

    #[test]
    fn title_case_starts_each_letter_run() {
        assert_eq!(title_case("u.s. mix"), "U.S. Mix");
        assert_eq!(title_case("co2 sequestration"), "Co2 Sequestration");
        assert_eq!(title_case("SLUDGE htl"), "Sludge Htl");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn labels_restore_acronyms_and_relabel_credits_and_emissions() {
        let table = ResultTable {
            rows: vec![
                row(EntryType::Input, Category::ProcessFuel, "sludge htl", "wwt sludge"),
                row(EntryType::Coproduct, Category::Other, "cfp upgrading", "lignin"),
                row(
                    EntryType::Input,
                    Category::EmissionsAndSequestration,
                    "conversion",
                    "co2 sequestration",
                ),
                row(
                    EntryType::Input,
                    Category::EmissionsAndSequestration,
                    "conversion",
                    "voc",
                ),
            ],
            main_category: Category::ProcessFuel,
            functional_unit: "MJ".to_string(),
        };

        let labeled = postprocess(table, &PropertyTable::default());
        let rows = &labeled.rows;

        assert_eq!(rows[0].stage, "Sludge HTL");
        assert_eq!(rows[0].resource, "WWT Sludge");
        assert_eq!(rows[0].pathway, "BDO Diesel (Modeled)");
        assert_eq!(rows[1].stage, "CFP Upgrading");
        assert_eq!(rows[1].category_label, COPRODUCT_CREDITS);
        assert_eq!(rows[2].resource, "CO2 Sequestration");
        assert_eq!(rows[2].category_label, CARBON_SEQUESTRATION);
        assert_eq!(rows[3].resource, "Other Voc emission");
        assert_eq!(rows[3].category_label, "Emissions and sequestration");
    }

    #[test]
    fn surrogate_names_replace_the_resource_label() {
        let properties = PropertyTable::new([(
            "natural gas",
            ResourceProperties {
                surrogate_for: Some("Landfill Gas".to_string()),
                ..ResourceProperties::default()
            },
        )]);
        let table = ResultTable {
            rows: vec![row(
                EntryType::Input,
                Category::ProcessFuel,
                "conversion",
                "natural gas",
            )],
            main_category: Category::ProcessFuel,
            functional_unit: "MJ".to_string(),
        };

        let labeled = postprocess(table, &properties);
        assert_eq!(labeled.rows[0].resource, "Landfill Gas");
    }
}
