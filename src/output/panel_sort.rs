use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::Record;
use crate::output::csv;
use crate::output::sort::sorted_path;
use crate::Result;

/// First match wins, so materials earlier in the list shadow later ones when
/// a name mentions several.
const MATERIALS: [&str; 17] = [
    "Birch",
    "Pine",
    "Maple",
    "Oak",
    "Walnut",
    "Mahogany",
    "Spruce",
    "Cedar",
    "Fir",
    "Aspen",
    "Poplar",
    "HDF",
    "MDF",
    "OSB",
    "Hardboard",
    "Melamine",
    "Particle Board",
];

const PANEL_TYPES: [&str; 5] = ["Plywood", "Handy Panel", "Pegboard", "Slotwall", "Sheathing"];

/// Orders a sheet-goods export alphabetically by a standardized name. Stores
/// word the same panel a dozen ways; the sorter rebuilds each name from its
/// dimensions, material, and panel type, appends recognized features, and
/// writes the rebuilt name in place of the original.
pub struct PanelSorter {
    dimension: Regex,
    melamine_color: Regex,
}

impl PanelSorter {
    pub fn new() -> Self {
        PanelSorter {
            dimension: Regex::new(r#"(?i)(\d+/\d+|\d+\.?\d*)\s*[-"]?\s*(inch|in|ft|feet|mm|cm|")?"#)
                .unwrap(),
            melamine_color: Regex::new(r"(?i)Melamine\s*-\s*(\w+)").unwrap(),
        }
    }

    /// Rebuilds a name as `<dims> <material> <type>` with any recognized
    /// features appended after a dash. Dimensions keep their unit as a
    /// `-unit` suffix; the type falls back to `Plywood` when the name does
    /// not carry one.
    pub fn standardize(&self, name: &str) -> String {
        let lower = name.to_lowercase();

        let material = MATERIALS
            .iter()
            .find(|m| lower.contains(&m.to_lowercase()))
            .copied()
            .unwrap_or("");
        let panel_type = PANEL_TYPES
            .iter()
            .find(|t| lower.contains(&t.to_lowercase()))
            .copied()
            .unwrap_or("Plywood");

        let size_part = self
            .dimension
            .captures_iter(name)
            .map(|caps| match caps.get(2) {
                Some(unit) => format!("{}-{}", &caps[1], unit.as_str()),
                None => caps[1].to_string(),
            })
            .collect::<Vec<_>>()
            .join(" x ");

        let mut features: Vec<String> = Vec::new();
        for flag in ["Sanded", "Fire Retardant", "Pressure Treated"] {
            if name.contains(flag) {
                features.push(flag.to_string());
            }
        }
        if name.contains("Melamine") {
            let color = self
                .melamine_color
                .captures(name)
                .map(|caps| caps[1].to_string())
                .unwrap_or_else(|| "Melamine".to_string());
            // A bare mention is the material itself, not a color finish
            if color != material {
                features.push(format!("Melamine - {}", color));
            }
        }
        if name.contains("Tongue & Groove") || name.contains("T&G") {
            features.push("Tongue & Groove".to_string());
        }
        if name.contains("Handy Panel") {
            features.push("Handy Panel".to_string());
        }
        features.sort();

        let mut standardized = [size_part.as_str(), material, panel_type]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if !features.is_empty() {
            standardized.push_str(" - ");
            standardized.push_str(&features.join(" "));
        }
        standardized
    }

    /// Reads a CSV export, standardizes every name, sorts alphabetically on
    /// the standardized names, and writes them next to the input under the
    /// same `sorted` naming convention the dimension sorter uses. Prices
    /// pass through untouched.
    pub fn sort_file(&self, input: &Path) -> Result<PathBuf> {
        let rows = csv::read_rows(input)?;
        let output = sorted_path(input);

        let mut standardized: Vec<Record> = rows
            .into_iter()
            .map(|record| Record::new(self.standardize(&record.name), record.price))
            .collect();
        // Stable sort keeps page order within equal names
        standardized.sort_by(|a, b| a.name.cmp(&b.name));

        csv::write_records(&output, &standardized)?;
        info!(rows = standardized.len(), "Sorted file written to {:?}", output);
        Ok(output)
    }
}

impl Default for PanelSorter {
    fn default() -> Self {
        Self::new()
    }
}
