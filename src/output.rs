//! The module responsible for writing analysis results to disk.
use crate::analysis::{HouseholdAnalysis, PvAnalysis};
use crate::bill::BillResult;
use crate::scenario::ScenarioResult;
use crate::tariff::TariffID;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which household-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "bill_xray_results";

/// The output file name for per-tier bill breakdowns
const BILL_BREAKDOWN_FILE_NAME: &str = "bill_breakdown.csv";

/// The output file name for scenario summaries
const SCENARIOS_FILE_NAME: &str = "scenarios.csv";

/// The output file name for PV results
const PV_FILE_NAME: &str = "pv.csv";

/// Get the default output directory for the specified household file
pub fn get_output_dir(household_path: &Path) -> Result<PathBuf> {
    let household_name = household_path
        .file_stem()
        .context("Household path has no file name")?
        .to_str()
        .context("Invalid chars in household file name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, household_name].iter().collect())
}

/// Create a new output directory, if it doesn't already exist.
///
/// # Arguments
///
/// * `output_dir` - The directory to create
/// * `allow_overwrite` - Whether an existing, non-empty directory may be reused
///
/// # Returns
///
/// Whether existing files will be overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        let is_empty = fs::read_dir(output_dir)?.next().is_none();
        if is_empty {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Pass --overwrite to replace it."
        );

        fs::remove_dir_all(output_dir)?;
        fs::create_dir_all(output_dir)?;
        return Ok(true);
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// Represents a row in the bill breakdown CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct BillBreakdownRow {
    scenario: String,
    tier: usize,
    kwh_in_tier: f64,
    rate: f64,
    cost: f64,
}

/// Represents a row in the scenarios CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ScenarioRow {
    scenario: String,
    tariff_id: TariffID,
    description: String,
    consumption_kwh: f64,
    bill: f64,
    savings: f64,
}

/// Represents the single row of the PV CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PvRow {
    offset: f64,
    system_size_kwp: f64,
    panel_count: u32,
    monthly_generation_kwh: f64,
    billed_after_pv_kwh: f64,
    bill_after_pv: f64,
    savings: f64,
    required_area_m2: f64,
    usable_area_m2: f64,
    roof_sufficient: bool,
    shortfall_m2: f64,
}

impl From<&PvAnalysis> for PvRow {
    fn from(pv: &PvAnalysis) -> Self {
        Self {
            offset: pv.offset.value(),
            system_size_kwp: pv.sizing.system_size.value(),
            panel_count: pv.sizing.panel_count,
            monthly_generation_kwh: pv.sizing.monthly_generation.value(),
            billed_after_pv_kwh: pv.sizing.billed_after_pv.value(),
            bill_after_pv: pv.sizing.bill_after_pv.total_cost.value(),
            savings: pv.sizing.savings.value(),
            required_area_m2: pv.roof.required_area.value(),
            usable_area_m2: pv.roof.usable_area.value(),
            roof_sufficient: pv.roof.sufficient,
            shortfall_m2: pv.roof.shortfall.value(),
        }
    }
}

/// An object for writing analysis results to CSV files
pub struct DataWriter {
    breakdown_writer: csv::Writer<File>,
    scenarios_writer: csv::Writer<File>,
    pv_writer: Option<csv::Writer<File>>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `include_pv` - Whether to create a file for PV results
    pub fn create(output_path: &Path, include_pv: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let pv_writer = if include_pv {
            Some(new_writer(PV_FILE_NAME)?)
        } else {
            None
        };

        Ok(Self {
            breakdown_writer: new_writer(BILL_BREAKDOWN_FILE_NAME)?,
            scenarios_writer: new_writer(SCENARIOS_FILE_NAME)?,
            pv_writer,
        })
    }

    /// Write all results of a household analysis
    pub fn write_analysis(&mut self, analysis: &HouseholdAnalysis) -> Result<()> {
        let tariff_id = &analysis.tariff.id;

        self.write_breakdown("baseline", &analysis.baseline)?;
        self.write_scenario_row(ScenarioRow {
            scenario: "baseline".into(),
            tariff_id: tariff_id.clone(),
            description: "Current consumption".into(),
            consumption_kwh: analysis.consumption.value(),
            bill: analysis.baseline.total_cost.value(),
            savings: 0.0,
        })?;

        self.write_scenario(
            "action",
            tariff_id,
            analysis.action.description(),
            &analysis.action_scenario,
        )?;

        let description = format!("Reduce consumption by {}", analysis.reduction);
        self.write_scenario(
            "reduction",
            tariff_id,
            &description,
            &analysis.reduction_scenario,
        )?;

        if let Some(pv) = &analysis.pv {
            self.write_breakdown("pv", &pv.sizing.bill_after_pv)?;
            let description = format!("PV covering {:.0}% of consumption", pv.offset.value() * 100.0);
            self.write_scenario_row(ScenarioRow {
                scenario: "pv".into(),
                tariff_id: tariff_id.clone(),
                description,
                consumption_kwh: pv.sizing.billed_after_pv.value(),
                bill: pv.sizing.bill_after_pv.total_cost.value(),
                savings: pv.sizing.savings.value(),
            })?;
            self.write_pv(pv)?;
        }

        Ok(())
    }

    /// Write the per-tier breakdown of a bill
    fn write_breakdown(&mut self, scenario: &str, bill: &BillResult) -> Result<()> {
        for charge in &bill.breakdown {
            let row = BillBreakdownRow {
                scenario: scenario.into(),
                tier: charge.tier,
                kwh_in_tier: charge.kwh_in_tier.value(),
                rate: charge.rate.value(),
                cost: charge.cost.value(),
            };
            self.breakdown_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write a scenario summary along with its bill breakdown
    fn write_scenario(
        &mut self,
        scenario: &str,
        tariff_id: &TariffID,
        description: &str,
        result: &ScenarioResult,
    ) -> Result<()> {
        self.write_breakdown(scenario, &result.new_bill)?;
        self.write_scenario_row(ScenarioRow {
            scenario: scenario.into(),
            tariff_id: tariff_id.clone(),
            description: description.into(),
            consumption_kwh: result.new_consumption.value(),
            bill: result.new_bill.total_cost.value(),
            savings: result.savings.value(),
        })
    }

    fn write_scenario_row(&mut self, row: ScenarioRow) -> Result<()> {
        self.scenarios_writer.serialize(row)?;
        Ok(())
    }

    /// Write PV sizing and roof check results
    fn write_pv(&mut self, pv: &PvAnalysis) -> Result<()> {
        if let Some(wtr) = &mut self.pv_writer {
            wtr.serialize(PvRow::from(pv))?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.breakdown_writer.flush()?;
        self.scenarios_writer.flush()?;
        if let Some(wtr) = &mut self.pv_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

/// Write the results of an analysis to CSV files in `output_path`
pub fn write_results(output_path: &Path, analysis: &HouseholdAnalysis) -> Result<()> {
    let mut writer = DataWriter::create(output_path, analysis.pv.is_some())?;
    writer.write_analysis(analysis)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{household, tariffs};
    use crate::input::household::{Household, PvOptions, RoofOptions};
    use crate::pv::SiteConstants;
    use crate::tariff::TariffMap;
    use crate::units::Dimensionless;
    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::tempdir;

    fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
        csv::Reader::from_path(path)
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    #[test]
    fn test_get_output_dir() {
        assert_eq!(
            get_output_dir(Path::new("some/dir/household.toml")).unwrap(),
            PathBuf::from("bill_xray_results/household")
        );
    }

    #[test]
    fn test_create_output_directory() {
        let root = tempdir().unwrap();

        // New directory, with parents
        let output_dir = root.path().join("a").join("b");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Empty directory can be reused
        assert!(!create_output_directory(&output_dir, false).unwrap());

        // Non-empty directory needs permission to overwrite
        fs::write(output_dir.join("old.csv"), "x").unwrap();
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(!output_dir.join("old.csv").exists());
    }

    #[rstest]
    fn test_write_results(household: Household, tariffs: TariffMap) {
        let analysis = HouseholdAnalysis::new(&household, &tariffs).unwrap();
        let dir = tempdir().unwrap();
        write_results(dir.path(), &analysis).unwrap();

        let breakdown: Vec<BillBreakdownRow> =
            read_rows(&dir.path().join(BILL_BREAKDOWN_FILE_NAME));
        assert_eq!(
            breakdown[..2],
            [
                BillBreakdownRow {
                    scenario: "baseline".into(),
                    tier: 1,
                    kwh_in_tier: 300.0,
                    rate: 0.05,
                    cost: 15.0,
                },
                BillBreakdownRow {
                    scenario: "baseline".into(),
                    tier: 2,
                    kwh_in_tier: 100.0,
                    rate: 0.1,
                    cost: 10.0,
                },
            ]
        );

        let scenarios: Vec<ScenarioRow> = read_rows(&dir.path().join(SCENARIOS_FILE_NAME));
        assert_eq!(
            scenarios.iter().map(|row| row.scenario.as_str()).collect_vec(),
            ["baseline", "action", "reduction"]
        );
        assert_eq!(scenarios[1].consumption_kwh, 385.0);
        assert_eq!(scenarios[1].savings, 1.5);
        assert_eq!(scenarios[2].savings, 4.0);

        assert!(!dir.path().join(PV_FILE_NAME).exists());
    }

    #[rstest]
    fn test_write_results_with_pv(mut household: Household, tariffs: TariffMap) {
        household.pv = Some(PvOptions {
            offset: Dimensionless(1.0),
            site: SiteConstants::default(),
            roof: RoofOptions::default(),
        });
        let analysis = HouseholdAnalysis::new(&household, &tariffs).unwrap();
        let dir = tempdir().unwrap();
        write_results(dir.path(), &analysis).unwrap();

        let pv: Vec<PvRow> = read_rows(&dir.path().join(PV_FILE_NAME));
        assert_eq!(pv.len(), 1);
        assert_eq!(pv[0].panel_count, 6);
        assert_eq!(pv[0].billed_after_pv_kwh, 0.0);
        assert_eq!(pv[0].savings, 25.0);
        assert!(pv[0].roof_sufficient);

        let scenarios: Vec<ScenarioRow> = read_rows(&dir.path().join(SCENARIOS_FILE_NAME));
        assert_eq!(scenarios.last().unwrap().scenario, "pv");
    }
}
