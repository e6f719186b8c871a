//! Code for reading a household description from a TOML file.
use super::{define_param_default, deserialise_proportion_nonzero, input_err_msg, read_toml};
use crate::ac::MAX_AC_HOURS_PER_DAY;
use crate::bill::check_consumption;
use crate::pv::SiteConstants;
use crate::scenario::{Action, ReductionLevel};
use crate::tariff::TariffID;
use crate::units::{Area, Dimensionless, Energy, Power};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

/// The smallest fraction of consumption which a PV system can be sized for
const MIN_PV_OFFSET: f64 = 0.1;

define_param_default!(default_ac_load, Power, Power(1.0));
define_param_default!(default_roof_area, Area, Area(30.0));
define_param_default!(default_usable_factor, Dimensionless, Dimensionless(0.8));
define_param_default!(default_panel_area, Area, Area(2.6));

/// A household's consumption and the what-if options to evaluate for it
#[derive(Debug, Deserialize, PartialEq)]
pub struct Household {
    /// Average monthly consumption
    #[serde(rename = "consumption_kwh")]
    pub consumption: Energy,
    /// The tariff the household is billed under
    pub tariff: TariffID,
    /// Hours of air conditioning use per day
    #[serde(default)]
    pub ac_hours_per_day: u32,
    /// Average electrical load of the air conditioning while running
    #[serde(rename = "ac_load_kw", default = "default_ac_load")]
    pub ac_load: Power,
    /// The energy-saving action to simulate
    #[serde(default)]
    pub action: Action,
    /// The percentage reduction in consumption to simulate
    #[serde(default)]
    pub reduction: ReductionLevel,
    /// Options for PV sizing. If absent, no PV analysis is done.
    pub pv: Option<PvOptions>,
}

/// Options for sizing a PV system
#[derive(Debug, Deserialize, PartialEq)]
pub struct PvOptions {
    /// Fraction of consumption the PV system should cover
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    pub offset: Dimensionless,
    /// Constants describing the site
    #[serde(default)]
    pub site: SiteConstants,
    /// The roof on which the panels will be installed
    #[serde(default)]
    pub roof: RoofOptions,
}

/// A description of the roof available for PV
#[derive(Debug, Deserialize, PartialEq)]
pub struct RoofOptions {
    /// Total roof area
    #[serde(rename = "roof_area_m2", default = "default_roof_area")]
    pub roof_area: Area,
    /// Fraction of the roof usable for panels after shading, spacing and obstacles
    #[serde(default = "default_usable_factor")]
    pub usable_factor: Dimensionless,
    /// Area of a single panel
    #[serde(rename = "panel_area_m2", default = "default_panel_area")]
    pub panel_area: Area,
}

impl Default for RoofOptions {
    fn default() -> Self {
        Self {
            roof_area: default_roof_area(),
            usable_factor: default_usable_factor(),
            panel_area: default_panel_area(),
        }
    }
}

impl Household {
    /// Read a household file from the specified path.
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path to the household TOML file
    ///
    /// # Returns
    ///
    /// The household or an error if the file is invalid
    pub fn from_path(file_path: &Path) -> Result<Household> {
        let household: Household = read_toml(file_path)?;
        household
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(household)
    }

    /// Validate the household after reading in file
    fn validate(&self) -> Result<()> {
        check_consumption(self.consumption)?;

        ensure!(
            self.ac_hours_per_day <= MAX_AC_HOURS_PER_DAY,
            "ac_hours_per_day must be at most {MAX_AC_HOURS_PER_DAY}"
        );
        ensure!(
            self.ac_load.is_finite() && self.ac_load > Power(0.0),
            "ac_load_kw must be a finite number greater than zero"
        );

        if let Some(pv) = &self.pv {
            // offset already checked to be in (0, 1] by deserialise_proportion_nonzero
            ensure!(
                pv.offset.value() >= MIN_PV_OFFSET,
                "PV offset must be at least {MIN_PV_OFFSET} (got {})",
                pv.offset
            );
            pv.site.validate().context("Invalid PV site constants")?;
        }

        Ok(())
    }
}
