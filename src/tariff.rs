//! Tariff schedules: ordered tiers of consumption, each with its own price per kWh.
use crate::id::{define_id_getter, define_id_type};
use crate::input::tariff::parse_tariffs;
use crate::units::{Energy, Money, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;

define_id_type! {TariffID}

/// ID of the residential supported tariff in the default table
pub const SUPPORTED_TARIFF_ID: &str = "supported";

/// ID of the residential non-supported tariff in the default table
pub const NON_SUPPORTED_TARIFF_ID: &str = "non_supported";

/// The tariff table used when no custom table is supplied
const DEFAULT_TARIFFS_TOML: &str = include_str!("../data/tariffs.toml");

/// Rates are fixed-precision decimals with this many subdivisions of a JOD per kWh
const RATE_SUBDIVISIONS: f64 = 1000.0;

/// A map of tariff schedules, keyed by ID, in the order they were defined
pub type TariffMap = IndexMap<TariffID, TariffSchedule>;

/// A consumption band with its own per-kWh rate
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    /// Consumption at which the tier starts (exclusive)
    pub start: Energy,
    /// Consumption at which the tier ends (inclusive). `None` for the final, unbounded tier.
    pub end: Option<Energy>,
    /// The price of each kWh consumed within this tier
    pub rate: MoneyPerEnergy,
}

impl Tier {
    /// The amount of `kwh` which is charged at this tier's rate, if any
    pub fn quantity(&self, kwh: Energy) -> Option<Energy> {
        if kwh <= self.start {
            return None;
        }

        let upper = self.end.map_or(kwh, |end| kwh.min(end));
        Some(upper - self.start)
    }

    /// The cost of consuming `quantity` kWh at this tier's rate.
    ///
    /// The rate is applied in whole thousandths of a JOD, so that exact tier boundaries are priced
    /// without binary floating-point residue (e.g. 300 kWh at 0.100 is exactly 30 JOD).
    pub fn charge(&self, quantity: Energy) -> Money {
        let rate_subunits = (self.rate.value() * RATE_SUBDIVISIONS).round();
        Money(quantity.value() * rate_subunits / RATE_SUBDIVISIONS)
    }

    /// Check that the tier is well formed in isolation
    fn validate(&self) -> Result<()> {
        ensure!(
            self.start.is_finite() && self.start >= Energy(0.0),
            "Tier start must be a finite, non-negative number"
        );
        if let Some(end) = self.end {
            ensure!(
                end.is_finite() && end > self.start,
                "Tier end ({end}) must be finite and greater than tier start ({})",
                self.start
            );
        }

        ensure!(
            self.rate.is_finite() && self.rate >= MoneyPerEnergy(0.0),
            "Tier rate must be a finite, non-negative number"
        );
        let subunits = self.rate.value() * RATE_SUBDIVISIONS;
        ensure!(
            (subunits - subunits.round()).abs() < 1e-6,
            "Tier rate ({}) must have at most three decimal places",
            self.rate
        );

        Ok(())
    }
}

/// An ordered set of tiers defining how total cost is computed from consumption
#[derive(Debug, Clone, PartialEq)]
pub struct TariffSchedule {
    /// Unique identifier for the tariff (e.g. "supported")
    pub id: TariffID,
    /// Human-readable name (e.g. "Residential Supported")
    pub description: String,
    /// The tiers, ordered by consumption
    pub tiers: Vec<Tier>,
}
define_id_getter! {TariffSchedule, TariffID}

impl TariffSchedule {
    /// Create a new tariff schedule, checking that the tiers are valid
    pub fn new(id: TariffID, description: String, tiers: Vec<Tier>) -> Result<Self> {
        let schedule = Self {
            id,
            description,
            tiers,
        };
        schedule
            .validate()
            .with_context(|| format!("Invalid tiers for tariff {}", schedule.id))?;

        Ok(schedule)
    }

    /// Check that the tiers are contiguous, ordered and have non-decreasing rates
    fn validate(&self) -> Result<()> {
        let first = self.tiers.first().context("Tariff must have at least one tier")?;
        ensure!(first.start == Energy(0.0), "The first tier must start at 0 kWh");

        for tier in &self.tiers {
            tier.validate()?;
        }

        for (prev, next) in self.tiers.iter().tuple_windows() {
            ensure!(
                prev.end == Some(next.start),
                "Tiers must be contiguous: tier ending at {:?} kWh is followed by one starting at {} kWh",
                prev.end.map(Energy::value),
                next.start
            );
            ensure!(
                next.rate >= prev.rate,
                "Tier rates must not decrease ({} followed by {})",
                prev.rate,
                next.rate
            );
        }

        ensure!(
            self.last_tier().end.is_none(),
            "The last tier must not have an upper bound"
        );

        Ok(())
    }

    /// The final, unbounded tier
    pub fn last_tier(&self) -> &Tier {
        // Schedules can only be constructed with at least one tier
        self.tiers.last().unwrap()
    }

    /// The index of the tier which a monthly consumption of `kwh` falls into.
    ///
    /// Upper bounds are inclusive and zero consumption falls into the first tier.
    pub fn tier_index(&self, kwh: Energy) -> usize {
        self.tiers
            .iter()
            .position(|tier| tier.end.is_none_or(|end| kwh <= end))
            .unwrap_or(self.tiers.len() - 1)
    }
}

/// Get the built-in tariff table (the Jordan residential tariffs)
pub fn default_tariffs() -> Result<TariffMap> {
    parse_tariffs(DEFAULT_TARIFFS_TOML).context("Invalid built-in tariff table")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, supported_tariff};
    use rstest::rstest;

    fn tier(start: f64, end: Option<f64>, rate: f64) -> Tier {
        Tier {
            start: Energy(start),
            end: end.map(Energy),
            rate: MoneyPerEnergy(rate),
        }
    }

    fn schedule(tiers: Vec<Tier>) -> Result<TariffSchedule> {
        TariffSchedule::new("test".into(), "Test".into(), tiers)
    }

    #[test]
    fn test_default_tariffs() {
        let tariffs = default_tariffs().unwrap();
        assert_eq!(tariffs.len(), 2);
        assert_eq!(tariffs[SUPPORTED_TARIFF_ID].tiers.len(), 3);
        assert_eq!(tariffs[NON_SUPPORTED_TARIFF_ID].tiers.len(), 2);
        assert_eq!(
            tariffs[NON_SUPPORTED_TARIFF_ID].tiers[1],
            tier(1000.0, None, 0.15)
        );
    }

    #[rstest]
    #[case(0.0, None)]
    #[case(150.0, Some(150.0))]
    #[case(300.0, Some(300.0))]
    #[case(450.0, Some(300.0))]
    fn test_tier_quantity(#[case] kwh: f64, #[case] expected: Option<f64>) {
        let first = tier(0.0, Some(300.0), 0.05);
        assert_eq!(first.quantity(Energy(kwh)), expected.map(Energy));
    }

    #[test]
    fn test_tier_charge_is_exact_at_boundaries() {
        assert_eq!(tier(300.0, Some(600.0), 0.1).charge(Energy(300.0)), Money(30.0));
        assert_eq!(tier(0.0, Some(300.0), 0.05).charge(Energy(300.0)), Money(15.0));
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(300.0, 0)]
    #[case(300.5, 1)]
    #[case(600.0, 1)]
    #[case(601.0, 2)]
    #[case(1e6, 2)]
    fn test_tier_index(supported_tariff: TariffSchedule, #[case] kwh: f64, #[case] expected: usize) {
        assert_eq!(supported_tariff.tier_index(Energy(kwh)), expected);
    }

    #[test]
    fn test_schedule_single_unbounded_tier() {
        assert!(schedule(vec![tier(0.0, None, 0.1)]).is_ok());
    }

    #[test]
    fn test_schedule_no_tiers() {
        assert_error!(schedule(vec![]), "Invalid tiers for tariff test");
        let err = schedule(vec![]).unwrap_err();
        assert_eq!(
            err.chain().nth(1).unwrap().to_string(),
            "Tariff must have at least one tier"
        );
    }

    #[rstest]
    #[case(vec![tier(10.0, None, 0.1)], "The first tier must start at 0 kWh")]
    #[case(
        vec![tier(0.0, Some(300.0), 0.1), tier(400.0, None, 0.2)],
        "Tiers must be contiguous: tier ending at Some(300.0) kWh is followed by one starting at 400 kWh"
    )]
    #[case(
        vec![tier(0.0, Some(300.0), 0.2), tier(300.0, None, 0.1)],
        "Tier rates must not decrease (0.2 followed by 0.1)"
    )]
    #[case(vec![tier(0.0, Some(300.0), 0.1)], "The last tier must not have an upper bound")]
    #[case(
        vec![tier(0.0, Some(0.0), 0.1), tier(0.0, None, 0.1)],
        "Tier end (0) must be finite and greater than tier start (0)"
    )]
    #[case(vec![tier(0.0, None, -0.1)], "Tier rate must be a finite, non-negative number")]
    #[case(
        vec![tier(0.0, None, 0.0505)],
        "Tier rate (0.0505) must have at most three decimal places"
    )]
    fn test_schedule_invalid(#[case] tiers: Vec<Tier>, #[case] msg: &str) {
        let err = schedule(tiers).unwrap_err();
        assert_eq!(err.chain().nth(1).unwrap().to_string(), msg);
    }

    #[test]
    fn test_schedule_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TariffSchedule>();
        assert_send_sync::<TariffMap>();
    }
}
