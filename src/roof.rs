//! Checks whether a PV array fits on the usable part of a roof.
use crate::units::{Area, Dimensionless};
use anyhow::{Result, ensure};

/// The smallest fraction of a roof which may be counted as usable
const MIN_USABLE_FACTOR: f64 = 0.5;

/// The outcome of a roof area check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofCheckResult {
    /// Area covered by the panels
    pub required_area: Area,
    /// Roof area available once shading, spacing and obstacles are accounted for
    pub usable_area: Area,
    /// Whether the panels fit in the usable area
    pub sufficient: bool,
    /// How much usable area is missing (zero if sufficient)
    pub shortfall: Area,
}

/// Compare the area needed for `panel_count` panels with the usable area of the roof.
///
/// # Arguments
///
/// * `panel_count` - Number of panels
/// * `panel_area` - Area of a single panel
/// * `roof_area` - Total roof area
/// * `usable_factor` - Fraction of the roof usable for panels, between 0.5 and 1
pub fn check_roof(
    panel_count: u32,
    panel_area: Area,
    roof_area: Area,
    usable_factor: Dimensionless,
) -> Result<RoofCheckResult> {
    ensure!(
        panel_area.is_finite() && panel_area > Area(0.0),
        "Panel area must be a finite number greater than zero"
    );
    ensure!(
        roof_area.is_finite() && roof_area >= Area(0.0),
        "Roof area must be a finite, non-negative number"
    );
    ensure!(
        usable_factor.is_finite() && (MIN_USABLE_FACTOR..=1.0).contains(&usable_factor.value()),
        "Usable roof factor must be between {MIN_USABLE_FACTOR} and 1 (got {usable_factor})"
    );

    let required_area = panel_area * Dimensionless(f64::from(panel_count));
    let usable_area = roof_area * usable_factor;
    let sufficient = required_area <= usable_area;
    let shortfall = if sufficient {
        Area(0.0)
    } else {
        required_area - usable_area
    };

    Ok(RoofCheckResult {
        required_area,
        usable_area,
        sufficient,
        shortfall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn test_check_roof_insufficient() {
        let result = check_roof(12, Area(2.6), Area(30.0), Dimensionless(0.8)).unwrap();
        assert_approx_eq!(Area, result.required_area, Area(31.2), epsilon = 1e-9);
        assert_approx_eq!(Area, result.usable_area, Area(24.0), epsilon = 1e-9);
        assert!(!result.sufficient);
        assert_approx_eq!(Area, result.shortfall, Area(7.2), epsilon = 1e-9);
    }

    #[test]
    fn test_check_roof_sufficient() {
        let result = check_roof(3, Area(2.6), Area(30.0), Dimensionless(0.8)).unwrap();
        assert!(result.sufficient);
        assert_eq!(result.shortfall, Area(0.0));
    }

    #[test]
    fn test_check_roof_exact_fit() {
        let result = check_roof(4, Area(2.5), Area(20.0), Dimensionless(0.5)).unwrap();
        assert!(result.sufficient);
        assert_eq!(result.shortfall, Area(0.0));
    }

    #[test]
    fn test_check_roof_no_panels() {
        let result = check_roof(0, Area(2.6), Area(0.0), Dimensionless(1.0)).unwrap();
        assert!(result.sufficient);
    }

    #[rstest]
    #[case(0.49)]
    #[case(1.01)]
    #[case(f64::NAN)]
    fn test_check_roof_invalid_usable_factor(#[case] factor: f64) {
        assert!(check_roof(12, Area(2.6), Area(30.0), Dimensionless(factor)).is_err());
    }

    #[test]
    fn test_check_roof_invalid_areas() {
        assert_error!(
            check_roof(12, Area(0.0), Area(30.0), Dimensionless(0.8)),
            "Panel area must be a finite number greater than zero"
        );
        assert_error!(
            check_roof(12, Area(2.6), Area(-1.0), Dimensionless(0.8)),
            "Roof area must be a finite, non-negative number"
        );
    }
}
