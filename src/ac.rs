//! Estimates of how much of a household's consumption goes on air conditioning.
use crate::bill::check_consumption;
use crate::units::{DAYS_PER_MONTH, Dimensionless, Energy, Hours, Power};
use anyhow::{Result, ensure};

/// The most hours per day of AC use which can be entered
pub const MAX_AC_HOURS_PER_DAY: u32 = 12;

/// Air-conditioning load relative to total consumption
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcImpact {
    /// Estimated monthly consumption of the AC
    pub monthly_consumption: Energy,
    /// AC consumption as a fraction of total consumption (zero if total consumption is zero)
    pub share: Dimensionless,
}

/// Estimate monthly AC consumption and its share of total consumption.
///
/// # Arguments
///
/// * `hours_per_day` - Hours of AC use per day
/// * `load` - Average electrical load of the AC while running
/// * `consumption` - Total monthly consumption of the household
pub fn ac_impact(hours_per_day: u32, load: Power, consumption: Energy) -> Result<AcImpact> {
    ensure!(
        hours_per_day <= MAX_AC_HOURS_PER_DAY,
        "AC usage must be at most {MAX_AC_HOURS_PER_DAY} hours per day (got {hours_per_day})"
    );
    ensure!(
        load.is_finite() && load > Power(0.0),
        "AC load must be a finite number greater than zero"
    );
    check_consumption(consumption)?;

    let monthly_consumption = load * Hours(f64::from(hours_per_day) * DAYS_PER_MONTH);
    let share = if consumption > Energy(0.0) {
        monthly_consumption / consumption
    } else {
        Dimensionless(0.0)
    };

    Ok(AcImpact {
        monthly_consumption,
        share,
    })
}
