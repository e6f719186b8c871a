//! Integration tests for the `run` command.
use bill_xray::cli::{RunOpts, handle_run_command};
use bill_xray::settings::Settings;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to a bundled household file.
fn get_household_path() -> PathBuf {
    PathBuf::from("demos/supported_household/household.toml")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    // SAFETY: This is the only test in this binary, so nothing else reads the environment
    unsafe { std::env::set_var("BILL_XRAY_LOG_LEVEL", "off") };

    {
        // Save results to non-existent directory to check that directory creation works
        let tempdir = tempdir().unwrap();
        let output_dir = tempdir.path().join("results");
        let opts = RunOpts {
            output_dir: Some(output_dir.clone()),
            ..RunOpts::default()
        };
        handle_run_command(&get_household_path(), &opts, Some(Settings::default())).unwrap();

        for file_name in [
            "bill_breakdown.csv",
            "scenarios.csv",
            "metadata.toml",
            "bill_xray_info.log",
            "bill_xray_error.log",
        ] {
            assert!(output_dir.join(file_name).is_file(), "Missing {file_name}");
        }

        // No PV options in this household
        assert!(!output_dir.join("pv.csv").exists());
    }

    // Second time will fail because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(tempdir().unwrap().path().to_path_buf()),
        ..RunOpts::default()
    };
    assert_eq!(
        handle_run_command(&get_household_path(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
