//! The tariff engine: computes monthly bills from consumption and classifies consumption by tier.
use crate::tariff::TariffSchedule;
use crate::units::{Energy, Money, MoneyPerEnergy};
use anyhow::{Result, ensure};
use std::fmt;

/// The charge for the consumption falling into a single tier
#[derive(Debug, Clone, PartialEq)]
pub struct TierCharge {
    /// The (1-based) number of the tier in its schedule
    pub tier: usize,
    /// The amount of consumption charged at this tier's rate
    pub kwh_in_tier: Energy,
    /// The tier's rate
    pub rate: MoneyPerEnergy,
    /// `kwh_in_tier` priced at `rate`
    pub cost: Money,
}

/// A monthly bill
#[derive(Debug, Clone, PartialEq)]
pub struct BillResult {
    /// The sum of the costs of all tiers (unrounded)
    pub total_cost: Money,
    /// Charges for each tier actually consumed into, in tier order
    pub breakdown: Vec<TierCharge>,
}

/// A qualitative label for which tier a household's consumption falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierStatus {
    /// The cheapest tier
    Low,
    /// A tier between the cheapest and the most expensive
    Mid,
    /// The most expensive tier
    High,
}

impl fmt::Display for TierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        };
        write!(f, "{label}")
    }
}

/// Check that a monthly consumption is valid
pub fn check_consumption(kwh: Energy) -> Result<()> {
    ensure!(
        kwh.is_finite() && kwh >= Energy(0.0),
        "Consumption must be a finite, non-negative number of kWh (got {kwh})"
    );

    Ok(())
}

/// Compute the monthly bill for a given consumption.
///
/// Each tier charges for the part of the consumption which lies above the tier's start, up to its
/// (inclusive) end. Tiers which are not reached are left out of the breakdown, so zero consumption
/// gives an empty breakdown.
///
/// # Arguments
///
/// * `schedule` - The tariff to bill under
/// * `kwh` - Monthly consumption
pub fn compute_bill(schedule: &TariffSchedule, kwh: Energy) -> Result<BillResult> {
    check_consumption(kwh)?;

    let breakdown: Vec<_> = schedule
        .tiers
        .iter()
        .enumerate()
        .filter_map(|(idx, tier)| {
            let quantity = tier.quantity(kwh)?;
            Some(TierCharge {
                tier: idx + 1,
                kwh_in_tier: quantity,
                rate: tier.rate,
                cost: tier.charge(quantity),
            })
        })
        .collect();
    let total_cost = breakdown.iter().map(|charge| charge.cost).sum();

    Ok(BillResult {
        total_cost,
        breakdown,
    })
}

/// Classify a monthly consumption according to which tier of the schedule it falls into.
///
/// Tier boundaries are the same as for [`compute_bill`]: a consumption equal to a tier's upper
/// bound belongs to that tier.
pub fn classify_tier(schedule: &TariffSchedule, kwh: Energy) -> Result<TierStatus> {
    check_consumption(kwh)?;

    let idx = schedule.tier_index(kwh);
    let status = if idx == 0 {
        TierStatus::Low
    } else if idx == schedule.tiers.len() - 1 {
        TierStatus::High
    } else {
        TierStatus::Mid
    };

    Ok(status)
}

/// An advisory message describing the tier which a monthly consumption falls into
pub fn tier_message(schedule: &TariffSchedule, kwh: Energy) -> Result<String> {
    let status = classify_tier(schedule, kwh)?;
    let tier = &schedule.tiers[schedule.tier_index(kwh)];
    let message = match (status, tier.end) {
        (TierStatus::Low, None) => "All consumption is charged at a single rate.".to_string(),
        (TierStatus::Low, Some(end)) => {
            format!("You are in the cheapest tier (1-{end} kWh).")
        }
        (TierStatus::Mid, Some(end)) => format!(
            "You entered the {}-{end} kWh tier (higher price).",
            tier.start.value() + 1.0
        ),
        (TierStatus::High, _) | (TierStatus::Mid, None) => format!(
            "You are above {} kWh (highest price tier). Consider reducing consumption.",
            tier.start
        ),
    };

    Ok(message)
}
