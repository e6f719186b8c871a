//! Human-readable rendering of bills and household analyses.
//!
//! Money is shown to two decimal places and rates to three.
use crate::analysis::{HouseholdAnalysis, PvAnalysis};
use crate::bill::BillResult;
use crate::scenario::ScenarioResult;
use crate::units::Energy;
use std::fmt::{self, Write};

/// The width of the longest bar in the tier cost chart
const CHART_WIDTH: usize = 40;

/// Format a consumption without trailing zeros, to at most two decimal places
fn kwh(value: Energy) -> String {
    let rounded = (value.value() * 100.0).round() / 100.0;
    format!("{}", rounded + 0.0)
}

/// Write the per-tier breakdown of a bill, one line per tier
pub fn write_breakdown<W: Write>(out: &mut W, bill: &BillResult) -> fmt::Result {
    if bill.breakdown.is_empty() {
        writeln!(out, "  No consumption")?;
    }
    for charge in &bill.breakdown {
        writeln!(
            out,
            "  Tier {}: {} kWh x {:.3} JOD = {:.2} JOD",
            charge.tier,
            kwh(charge.kwh_in_tier),
            charge.rate.value(),
            charge.cost.value()
        )?;
    }

    Ok(())
}

/// Write a bar chart of the cost contributed by each tier
pub fn write_cost_chart<W: Write>(out: &mut W, bill: &BillResult) -> fmt::Result {
    let max_cost = bill
        .breakdown
        .iter()
        .map(|charge| charge.cost.value())
        .fold(0.0, f64::max);

    for charge in &bill.breakdown {
        let bar = if max_cost > 0.0 {
            bar_width(charge.cost.value() / max_cost)
        } else {
            0
        };
        writeln!(
            out,
            "  Tier {} | {:<width$} {:.2} JOD",
            charge.tier,
            "#".repeat(bar),
            charge.cost.value(),
            width = CHART_WIDTH
        )?;
    }

    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar_width(fraction: f64) -> usize {
    (fraction * CHART_WIDTH as f64).round() as usize
}

fn write_scenario<W: Write>(out: &mut W, scenario: &ScenarioResult) -> fmt::Result {
    writeln!(
        out,
        "  New consumption: {} kWh",
        kwh(scenario.new_consumption)
    )?;
    writeln!(
        out,
        "  New estimated bill: {:.2} JOD",
        scenario.new_bill.total_cost.value()
    )?;
    writeln!(
        out,
        "  Estimated savings: {:.2} JOD/month",
        scenario.savings.value()
    )
}

fn write_pv<W: Write>(out: &mut W, pv: &PvAnalysis) -> fmt::Result {
    let sizing = &pv.sizing;
    writeln!(
        out,
        "PV system ({:.0}% of consumption)",
        pv.offset.value() * 100.0
    )?;
    writeln!(out, "  PV size needed: {:.2} kWp", sizing.system_size.value())?;
    writeln!(
        out,
        "  Estimated panels: {} panels (~{} W each)",
        sizing.panel_count, pv.site.panel_wattage
    )?;
    writeln!(
        out,
        "  Estimated PV generation: {:.0} kWh/month",
        sizing.monthly_generation.value()
    )?;
    writeln!(
        out,
        "  New billed consumption: {:.0} kWh/month",
        sizing.billed_after_pv.value()
    )?;
    writeln!(
        out,
        "  New estimated bill: {:.2} JOD/month",
        sizing.bill_after_pv.total_cost.value()
    )?;
    writeln!(
        out,
        "  Estimated savings: {:.2} JOD/month",
        sizing.savings.value()
    )?;

    let roof = &pv.roof;
    writeln!(out)?;
    writeln!(out, "Roof check")?;
    writeln!(
        out,
        "  Estimated required panel area: {:.1} m2",
        roof.required_area.value()
    )?;
    writeln!(out, "  Usable roof area: {:.1} m2", roof.usable_area.value())?;
    if roof.sufficient {
        writeln!(
            out,
            "  Roof area looks sufficient for the estimated number of panels."
        )
    } else {
        writeln!(
            out,
            "  Roof area may be insufficient by about {:.1} m2. Consider higher-watt panels, \
            a smaller offset or another roof section.",
            roof.shortfall.value()
        )
    }
}

impl fmt::Display for HouseholdAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tariff: {}", self.tariff.description)?;
        writeln!(f, "{}", self.tier_message)?;
        writeln!(f)?;
        writeln!(
            f,
            "Estimated monthly bill: {:.2} JOD",
            self.baseline.total_cost.value()
        )?;
        writeln!(f)?;

        writeln!(f, "AC impact")?;
        writeln!(
            f,
            "  Estimated AC consumption: {} kWh/month",
            kwh(self.ac.monthly_consumption)
        )?;
        writeln!(
            f,
            "  AC represents approximately {:.1}% of your total consumption.",
            self.ac.share.value() * 100.0
        )?;
        writeln!(f)?;

        writeln!(f, "Bill breakdown")?;
        write_breakdown(f, &self.baseline)?;
        writeln!(f)?;
        writeln!(f, "Cost contribution by tier")?;
        write_cost_chart(f, &self.baseline)?;
        writeln!(f)?;

        writeln!(
            f,
            "Savings action: {} (~{} kWh/month)",
            self.action.description(),
            kwh(self.action.savings())
        )?;
        write_scenario(f, &self.action_scenario)?;
        writeln!(f)?;

        writeln!(f, "Savings simulator: reduce consumption by {}", self.reduction)?;
        write_scenario(f, &self.reduction_scenario)?;

        if let Some(pv) = &self.pv {
            writeln!(f)?;
            write_pv(f, pv)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HouseholdAnalysis;
    use crate::bill::compute_bill;
    use crate::fixture::{household, supported_tariff, tariffs};
    use crate::input::household::{Household, PvOptions, RoofOptions};
    use crate::pv::SiteConstants;
    use crate::tariff::{TariffMap, TariffSchedule};
    use crate::units::Dimensionless;
    use rstest::rstest;

    #[rstest]
    #[case(300.0, "300")]
    #[case(250.5, "250.5")]
    #[case(199.999_999_9, "200")]
    #[case(0.0, "0")]
    fn test_kwh(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(kwh(Energy(value)), expected);
    }

    #[rstest]
    fn test_write_breakdown(supported_tariff: TariffSchedule) {
        let bill = compute_bill(&supported_tariff, Energy(400.0)).unwrap();
        let mut out = String::new();
        write_breakdown(&mut out, &bill).unwrap();
        assert_eq!(
            out,
            "  Tier 1: 300 kWh x 0.050 JOD = 15.00 JOD\n  Tier 2: 100 kWh x 0.100 JOD = 10.00 JOD\n"
        );
    }

    #[rstest]
    fn test_write_cost_chart(supported_tariff: TariffSchedule) {
        let bill = compute_bill(&supported_tariff, Energy(400.0)).unwrap();
        let mut out = String::new();
        write_cost_chart(&mut out, &bill).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&format!("  Tier 1 | {}", "#".repeat(CHART_WIDTH))));
        assert!(lines[1].contains(&format!("| {} ", "#".repeat(27))));
    }

    #[rstest]
    fn test_display_analysis(mut household: Household, tariffs: TariffMap) {
        household.pv = Some(PvOptions {
            offset: Dimensionless(0.5),
            site: SiteConstants::default(),
            roof: RoofOptions::default(),
        });
        let report = HouseholdAnalysis::new(&household, &tariffs)
            .unwrap()
            .to_string();

        for line in [
            "Tariff: Residential Supported",
            "Estimated monthly bill: 25.00 JOD",
            "  AC represents approximately 45.0% of your total consumption.",
            "Savings action: Replace all bulbs with LED (~15 kWh/month)",
            "  Estimated savings: 1.50 JOD/month",
            "Savings simulator: reduce consumption by 10%",
            "PV system (50% of consumption)",
            "  Estimated panels: 3 panels (~540 W each)",
            "  Roof area looks sufficient for the estimated number of panels.",
        ] {
            assert!(report.contains(line), "Missing line: {line}\n{report}");
        }
    }
}
