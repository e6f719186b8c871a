//! Combines the billing engine and the what-if calculators into one analysis of a household.
use crate::ac::{AcImpact, ac_impact};
use crate::bill::{BillResult, TierStatus, classify_tier, compute_bill, tier_message};
use crate::id::get_by_id;
use crate::input::household::Household;
use crate::pv::{PvSizingResult, SiteConstants, size_pv};
use crate::roof::{RoofCheckResult, check_roof};
use crate::scenario::{
    Action, ReductionLevel, ScenarioResult, simulate_action, simulate_percentage_reduction,
};
use crate::tariff::{TariffMap, TariffSchedule};
use crate::units::{Dimensionless, Energy, Money};
use anyhow::{Context, Result};
use log::{debug, warn};

/// The results of sizing a PV system and checking it fits on the roof
#[derive(Debug, Clone, PartialEq)]
pub struct PvAnalysis {
    /// Fraction of consumption the system was sized for
    pub offset: Dimensionless,
    /// Constants describing the site
    pub site: SiteConstants,
    /// The PV system and the bill after PV
    pub sizing: PvSizingResult,
    /// Whether the panels fit on the roof
    pub roof: RoofCheckResult,
}

/// A complete analysis of a household's bill
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdAnalysis {
    /// The tariff the household is billed under
    pub tariff: TariffSchedule,
    /// Monthly consumption
    pub consumption: Energy,
    /// The bill for the household's current consumption
    pub baseline: BillResult,
    /// Which tier the current consumption falls into
    pub tier_status: TierStatus,
    /// Advice about the current tier
    pub tier_message: String,
    /// Air-conditioning load
    pub ac: AcImpact,
    /// The simulated energy-saving action
    pub action: Action,
    /// The outcome of taking `action`
    pub action_scenario: ScenarioResult,
    /// The simulated percentage reduction
    pub reduction: ReductionLevel,
    /// The outcome of reducing consumption by `reduction`
    pub reduction_scenario: ScenarioResult,
    /// PV results, if PV was requested
    pub pv: Option<PvAnalysis>,
}

impl HouseholdAnalysis {
    /// Run every calculation for a household.
    ///
    /// # Arguments
    ///
    /// * `household` - The household to analyse
    /// * `tariffs` - The available tariff schedules
    pub fn new(household: &Household, tariffs: &TariffMap) -> Result<Self> {
        let tariff = get_by_id(tariffs, &household.tariff.0, "tariff")?;
        let consumption = household.consumption;

        let baseline = compute_bill(tariff, consumption)?;
        let tier_status = classify_tier(tariff, consumption)?;
        debug!(
            "Baseline bill for {consumption} kWh under tariff {}: {:.2} JOD ({tier_status} tier)",
            tariff.id,
            baseline.total_cost.value()
        );

        let ac = ac_impact(household.ac_hours_per_day, household.ac_load, consumption)
            .context("Failed to estimate AC load")?;

        let action_scenario = simulate_action(tariff, consumption, household.action)?;
        warn_if_costlier("action", action_scenario.savings);

        let reduction_scenario =
            simulate_percentage_reduction(tariff, consumption, household.reduction.fraction())?;
        warn_if_costlier("percentage reduction", reduction_scenario.savings);

        let pv = household
            .pv
            .as_ref()
            .map(|opts| -> Result<PvAnalysis> {
                let sizing = size_pv(tariff, consumption, opts.offset, &opts.site)
                    .context("Failed to size PV system")?;
                debug!(
                    "Sized PV system at {:.2} kWp ({} panels)",
                    sizing.system_size.value(),
                    sizing.panel_count
                );
                warn_if_costlier("PV", sizing.savings);

                let roof = check_roof(
                    sizing.panel_count,
                    opts.roof.panel_area,
                    opts.roof.roof_area,
                    opts.roof.usable_factor,
                )
                .context("Failed to check roof area")?;

                Ok(PvAnalysis {
                    offset: opts.offset,
                    site: opts.site,
                    sizing,
                    roof,
                })
            })
            .transpose()?;

        Ok(Self {
            tariff: tariff.clone(),
            consumption,
            baseline,
            tier_status,
            tier_message: tier_message(tariff, consumption)?,
            ac,
            action: household.action,
            action_scenario,
            reduction: household.reduction,
            reduction_scenario,
            pv,
        })
    }
}

/// Scenarios are allowed to cost more than the baseline, but the user should know about it
fn warn_if_costlier(scenario: &str, savings: Money) {
    if savings < Money(0.0) {
        warn!(
            "The {scenario} scenario increases the bill by {:.2} JOD",
            -savings.value()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, household, tariffs};
    use crate::input::household::{PvOptions, RoofOptions};
    use rstest::rstest;

    #[rstest]
    fn test_household_analysis(household: Household, tariffs: TariffMap) {
        let analysis = HouseholdAnalysis::new(&household, &tariffs).unwrap();
        assert_eq!(analysis.baseline.total_cost, Money(25.0));
        assert_eq!(analysis.tier_status, TierStatus::Mid);
        assert_eq!(analysis.ac.monthly_consumption, Energy(180.0));
        assert_eq!(analysis.action_scenario.new_consumption, Energy(385.0));
        assert_eq!(analysis.action_scenario.savings, Money(1.5));
        assert_eq!(analysis.reduction_scenario.new_consumption, Energy(360.0));
        assert_eq!(analysis.reduction_scenario.savings, Money(4.0));
        assert!(analysis.pv.is_none());
    }

    #[rstest]
    fn test_household_analysis_with_pv(mut household: Household, tariffs: TariffMap) {
        household.pv = Some(PvOptions {
            offset: Dimensionless(1.0),
            site: SiteConstants::default(),
            roof: RoofOptions::default(),
        });

        let analysis = HouseholdAnalysis::new(&household, &tariffs).unwrap();
        let pv = analysis.pv.unwrap();
        assert_eq!(pv.sizing.panel_count, 6);
        assert_eq!(pv.sizing.savings, Money(25.0));
        assert!(pv.roof.sufficient);
    }

    #[rstest]
    fn test_household_analysis_unknown_tariff(mut household: Household, tariffs: TariffMap) {
        household.tariff = "commercial".into();
        assert_error!(
            HouseholdAnalysis::new(&household, &tariffs),
            "Unknown tariff ID commercial found"
        );
    }
}
