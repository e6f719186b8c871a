//! Code for reading tariff tables from TOML.
use super::{input_err_msg, read_toml};
use crate::id::HasID;
use crate::tariff::{TariffID, TariffMap, TariffSchedule, Tier};
use crate::units::{Energy, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

/// The contents of a tariff file
#[derive(Debug, Deserialize, PartialEq)]
struct TariffFile {
    tariff: Vec<TariffRaw>,
}

/// A tariff as it appears in a tariff file
#[derive(Debug, Deserialize, PartialEq)]
struct TariffRaw {
    id: TariffID,
    description: String,
    tier: Vec<TierRaw>,
}

/// A tier as it appears in a tariff file
#[derive(Debug, Deserialize, PartialEq)]
struct TierRaw {
    start_kwh: Energy,
    end_kwh: Option<Energy>,
    rate: MoneyPerEnergy,
}

impl From<TierRaw> for Tier {
    fn from(raw: TierRaw) -> Self {
        Tier {
            start: raw.start_kwh,
            end: raw.end_kwh,
            rate: raw.rate,
        }
    }
}

/// Read a tariff table from the specified TOML file.
///
/// # Arguments
///
/// * `file_path` - Path to the tariff file
///
/// # Returns
///
/// A map of validated tariff schedules or an error
pub fn read_tariffs(file_path: &Path) -> Result<TariffMap> {
    let file: TariffFile = read_toml(file_path)?;
    create_tariff_map(file).with_context(|| input_err_msg(file_path))
}

/// Parse a tariff table from a TOML string
pub fn parse_tariffs(toml_str: &str) -> Result<TariffMap> {
    let file: TariffFile = toml::from_str(toml_str)?;
    create_tariff_map(file)
}

fn create_tariff_map(file: TariffFile) -> Result<TariffMap> {
    let mut map = TariffMap::new();
    for raw in file.tariff {
        let tiers = raw.tier.into_iter().map(Tier::from).collect();
        let schedule = TariffSchedule::new(raw.id, raw.description, tiers)?;
        let id = schedule.get_id().clone();
        ensure!(
            map.insert(id.clone(), schedule).is_none(),
            "Duplicate tariff ID found: {id}"
        );
    }

    ensure!(!map.is_empty(), "No tariffs defined");

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs;
    use tempfile::tempdir;

    const FLAT_TARIFF: &str = r#"
[[tariff]]
id = "flat"
description = "Flat rate"

[[tariff.tier]]
start_kwh = 0.0
rate = 0.1
"#;

    #[test]
    fn test_parse_tariffs() {
        let tariffs = parse_tariffs(FLAT_TARIFF).unwrap();
        let flat = &tariffs["flat"];
        assert_eq!(flat.description, "Flat rate");
        assert_eq!(
            flat.tiers,
            vec![Tier {
                start: Energy(0.0),
                end: None,
                rate: MoneyPerEnergy(0.1)
            }]
        );
    }

    #[test]
    fn test_parse_tariffs_duplicate_id() {
        let toml_str = format!("{FLAT_TARIFF}{FLAT_TARIFF}");
        assert_error!(parse_tariffs(&toml_str), "Duplicate tariff ID found: flat");
    }

    #[test]
    fn test_parse_tariffs_empty() {
        assert_error!(parse_tariffs("tariff = []"), "No tariffs defined");
    }

    #[test]
    fn test_read_tariffs_invalid_tiers() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("tariffs.toml");
        fs::write(&file_path, FLAT_TARIFF.replace("start_kwh = 0.0", "start_kwh = 5.0")).unwrap();

        let err = read_tariffs(&file_path).unwrap_err();
        assert_eq!(err.to_string(), input_err_msg(&file_path));
        assert_eq!(
            err.root_cause().to_string(),
            "The first tier must start at 0 kWh"
        );
    }

    #[test]
    fn test_read_tariffs() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("tariffs.toml");
        fs::write(&file_path, FLAT_TARIFF).unwrap();
        assert!(read_tariffs(&file_path).unwrap().contains_key("flat"));
    }
}
