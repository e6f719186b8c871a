//! What-if scenarios which re-bill a hypothetical consumption and compare it with the baseline.
use crate::bill::{BillResult, check_consumption, compute_bill};
use crate::tariff::TariffSchedule;
use crate::units::{Dimensionless, Energy, Money};
use anyhow::{Result, ensure};
use serde::{Deserialize, Deserializer};
use serde_string_enum::DeserializeLabeledStringEnum;
use std::fmt;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// The outcome of billing a hypothetical consumption
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    /// The hypothetical monthly consumption
    pub new_consumption: Energy,
    /// The bill for `new_consumption`
    pub new_bill: BillResult,
    /// Baseline bill minus new bill. Negative if the scenario costs more than the baseline.
    pub savings: Money,
}

/// An energy-saving action from a fixed catalogue, with its estimated monthly saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// Run the air conditioning one hour less per day
    #[default]
    #[strum(serialize = "reduce_ac_1h")]
    ReduceAc1h,
    /// Run the air conditioning two hours less per day
    #[strum(serialize = "reduce_ac_2h")]
    ReduceAc2h,
    /// Put the water heater on a timer
    WaterHeaterTimer,
    /// Replace all bulbs with LEDs
    LedReplacement,
    /// Unplug devices on standby
    UnplugStandby,
}

impl Action {
    /// Estimated reduction in monthly consumption
    pub fn savings(self) -> Energy {
        let kwh = match self {
            Self::ReduceAc1h => 30.0,
            Self::ReduceAc2h => 60.0,
            Self::WaterHeaterTimer => 40.0,
            Self::LedReplacement => 15.0,
            Self::UnplugStandby => 10.0,
        };
        Energy(kwh)
    }

    /// Human-readable description of the action
    pub fn description(self) -> &'static str {
        match self {
            Self::ReduceAc1h => "Reduce AC usage by 1 hour/day",
            Self::ReduceAc2h => "Reduce AC usage by 2 hours/day",
            Self::WaterHeaterTimer => "Use water heater timer",
            Self::LedReplacement => "Replace all bulbs with LED",
            Self::UnplugStandby => "Unplug standby devices",
        }
    }

    /// The key used for the action in input files
    pub fn key(self) -> &'static str {
        self.into()
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse()
            .map_err(|_| serde::de::Error::custom(format!("Unknown action: {key}")))
    }
}

/// A percentage reduction in consumption, from a fixed catalogue
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, DeserializeLabeledStringEnum, EnumIter,
)]
pub enum ReductionLevel {
    /// Reduce consumption by 5%
    #[default]
    #[string = "5%"]
    FivePercent,
    /// Reduce consumption by 10%
    #[string = "10%"]
    TenPercent,
    /// Reduce consumption by 20%
    #[string = "20%"]
    TwentyPercent,
}

impl ReductionLevel {
    /// The fraction by which consumption is reduced
    pub fn fraction(self) -> Dimensionless {
        match self {
            Self::FivePercent => Dimensionless(0.05),
            Self::TenPercent => Dimensionless(0.10),
            Self::TwentyPercent => Dimensionless(0.20),
        }
    }
}

impl fmt::Display for ReductionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.fraction().value() * 100.0)
    }
}

/// Bill a hypothetical consumption (floored at zero) and compare it with the baseline bill
fn simulate_consumption(
    schedule: &TariffSchedule,
    baseline_bill: &BillResult,
    new_consumption: Energy,
) -> Result<ScenarioResult> {
    let new_consumption = new_consumption.max(Energy(0.0));
    let new_bill = compute_bill(schedule, new_consumption)?;
    let savings = baseline_bill.total_cost - new_bill.total_cost;

    Ok(ScenarioResult {
        new_consumption,
        new_bill,
        savings,
    })
}

/// Simulate taking an energy-saving action.
///
/// The reduced consumption is truncated to whole kWh before being billed.
pub fn simulate_action(
    schedule: &TariffSchedule,
    baseline: Energy,
    action: Action,
) -> Result<ScenarioResult> {
    let baseline_bill = compute_bill(schedule, baseline)?;
    let new_consumption = Energy((baseline - action.savings()).value().floor());
    simulate_consumption(schedule, &baseline_bill, new_consumption)
}

/// Simulate reducing consumption by a fraction between 0 and 1.
///
/// The reduced consumption is truncated to whole kWh before being billed.
pub fn simulate_percentage_reduction(
    schedule: &TariffSchedule,
    baseline: Energy,
    fraction: Dimensionless,
) -> Result<ScenarioResult> {
    ensure!(
        fraction.is_finite() && (0.0..=1.0).contains(&fraction.value()),
        "Reduction fraction must be between 0 and 1 (got {fraction})"
    );

    let baseline_bill = compute_bill(schedule, baseline)?;
    let new_consumption = Energy((baseline * (Dimensionless(1.0) - fraction)).value().floor());
    simulate_consumption(schedule, &baseline_bill, new_consumption)
}

/// Simulate the consumption still billed once PV generation has been netted off.
///
/// Unlike the other scenarios, fractional kWh are billed as they are.
pub fn simulate_pv(
    schedule: &TariffSchedule,
    baseline: Energy,
    billed_after_pv: Energy,
) -> Result<ScenarioResult> {
    let baseline_bill = compute_bill(schedule, baseline)?;
    check_consumption(billed_after_pv)?;
    simulate_consumption(schedule, &baseline_bill, billed_after_pv)
}
