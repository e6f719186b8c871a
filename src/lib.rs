//! Household electricity bill estimates, savings scenarios and rooftop PV sizing for tiered tariffs.
#![warn(missing_docs)]
use anyhow::{Context, Result};
use std::path::PathBuf;

pub mod ac;
pub mod analysis;
pub mod bill;
pub mod cli;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod pv;
pub mod report;
pub mod roof;
pub mod scenario;
pub mod settings;
pub mod tariff;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the path to the bill-xray config directory (e.g. `~/.config/bill_xray` on Linux)
pub fn get_bill_xray_config_dir() -> Result<PathBuf> {
    let mut config_dir = dirs::config_dir().context("Could not get path to config directory")?;
    config_dir.push("bill_xray");

    Ok(config_dir)
}
