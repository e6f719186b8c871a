//! Code for loading program settings.
use crate::get_bill_xray_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::Result;
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# This file contains the program settings for bill-xray.
# Uncomment a line to change the setting from its default value.
";

/// Optional settings which have no default value, with an example value to show in the default file
const OPTIONAL_SETTING_EXAMPLES: [(&str, &str); 1] = [("tariffs_file", "\"my_tariffs.toml\"")];

/// Default log level for program
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> Result<PathBuf> {
    let mut path = get_bill_xray_config_dir()?;
    path.push(SETTINGS_FILE_NAME);

    Ok(path)
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// The default program log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether to overwrite output files by default
    #[serde(default)]
    pub overwrite: bool,
    /// A TOML file with a custom tariff table to use instead of the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariffs_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            overwrite: false,
            tariffs_file: None,
        }
    }
}

impl Settings {
    /// Read the settings file from the user's config directory.
    ///
    /// If the file is not present, default values for settings will be used
    ///
    /// # Returns
    ///
    /// The program settings as a `Settings` struct or an error if the file is invalid
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path()?)
    }

    /// Read from the specified path, falling back to defaults if the file doesn't exist
    pub fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        read_toml(file_path)
    }

    /// The contents of the default settings file
    pub fn default_file_contents() -> String {
        let settings_raw =
            toml::to_string(&Settings::default()).expect("Could not convert settings to TOML");

        // Comment out every setting and document it with its doc comment
        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        let fields = settings_raw
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(field, value)| (field.trim().to_string(), value.trim().to_string()))
            .chain(
                OPTIONAL_SETTING_EXAMPLES
                    .iter()
                    .map(|(field, value)| (field.to_string(), value.to_string())),
            );
        for (field, value) in fields {
            // All fields should have doc comments
            let docs = Settings::get_field_docs(&field).expect("Missing doc comment for field");
            for line in docs.lines() {
                write!(&mut out, "\n# # {}\n", line.trim()).unwrap();
            }

            writeln!(&mut out, "# {field} = {value}").unwrap();
        }

        out
    }
}
