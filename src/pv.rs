//! Sizing of a rooftop PV system to offset part of a household's consumption.
use crate::bill::{BillResult, check_consumption};
use crate::input::{define_param_default, deserialise_proportion_nonzero};
use crate::scenario::simulate_pv;
use crate::tariff::TariffSchedule;
use crate::units::{Capacity, DAYS_PER_MONTH, Dimensionless, Energy, EnergyPerCapacity, Hours, Money};
use anyhow::{Result, ensure};
use serde::Deserialize;

define_param_default!(default_peak_sun_hours, Hours, Hours(5.711));
define_param_default!(default_system_derate, Dimensionless, Dimensionless(0.7721));
define_param_default!(default_panel_wattage, f64, 540.0);

/// Constants describing the site at which PV is installed.
///
/// The defaults describe a reference site in Amman (Khalda).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SiteConstants {
    /// Average daily peak sun hours (kWh generated per kWp per day before losses)
    #[serde(default = "default_peak_sun_hours")]
    pub peak_sun_hours: Hours,
    /// Efficiency factor accounting for real-world losses
    #[serde(default = "default_system_derate")]
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    pub system_derate: Dimensionless,
    /// Rated power of a single panel in watts
    #[serde(default = "default_panel_wattage")]
    pub panel_wattage: f64,
}

impl Default for SiteConstants {
    fn default() -> Self {
        Self {
            peak_sun_hours: default_peak_sun_hours(),
            system_derate: default_system_derate(),
            panel_wattage: default_panel_wattage(),
        }
    }
}

impl SiteConstants {
    /// Check that all constants are positive, finite numbers
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.peak_sun_hours.is_finite() && self.peak_sun_hours > Hours(0.0),
            "peak_sun_hours must be a finite number greater than zero"
        );
        ensure!(
            self.system_derate.is_finite() && self.system_derate > Dimensionless(0.0),
            "system_derate must be a finite number greater than zero"
        );
        ensure!(
            self.panel_wattage.is_finite() && self.panel_wattage > 0.0,
            "panel_wattage must be a finite number greater than zero"
        );

        Ok(())
    }

    /// Expected generation per kWp of installed capacity over a month
    pub fn monthly_yield(&self) -> EnergyPerCapacity {
        EnergyPerCapacity(self.peak_sun_hours.value() * DAYS_PER_MONTH * self.system_derate.value())
    }

    /// The number of panels needed to provide at least `capacity`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn panels_for(&self, capacity: Capacity) -> u32 {
        (capacity.value() * 1000.0 / self.panel_wattage).ceil() as u32
    }
}

/// The outcome of sizing a PV system
#[derive(Debug, Clone, PartialEq)]
pub struct PvSizingResult {
    /// Required system size
    pub system_size: Capacity,
    /// Number of panels needed, rounded up
    pub panel_count: u32,
    /// Expected monthly generation of the system
    pub monthly_generation: Energy,
    /// Consumption still drawn from the grid
    pub billed_after_pv: Energy,
    /// The bill for `billed_after_pv`
    pub bill_after_pv: BillResult,
    /// Baseline bill minus the bill after PV
    pub savings: Money,
}

/// Size a PV system to cover a fraction of monthly consumption and bill what is left over.
///
/// # Arguments
///
/// * `schedule` - The tariff to bill under
/// * `baseline` - Monthly consumption without PV
/// * `offset` - Fraction of consumption the system should generate, in (0, 1]
/// * `site` - Constants describing the site
pub fn size_pv(
    schedule: &TariffSchedule,
    baseline: Energy,
    offset: Dimensionless,
    site: &SiteConstants,
) -> Result<PvSizingResult> {
    check_consumption(baseline)?;
    ensure!(
        offset.is_finite() && offset > Dimensionless(0.0) && offset <= Dimensionless(1.0),
        "PV offset must be greater than 0 and at most 1 (got {offset})"
    );
    site.validate()?;

    let target = baseline * offset;
    let monthly_yield = site.monthly_yield();
    let system_size = target / monthly_yield;
    let panel_count = site.panels_for(system_size);

    // Don't let floating-point residue leave generation a hair below the target
    let monthly_generation = (system_size * monthly_yield).max(target);
    let billed_after_pv = (baseline - monthly_generation).max(Energy(0.0));

    let scenario = simulate_pv(schedule, baseline, billed_after_pv)?;

    Ok(PvSizingResult {
        system_size,
        panel_count,
        monthly_generation,
        billed_after_pv,
        bill_after_pv: scenario.new_bill,
        savings: scenario.savings,
    })
}
