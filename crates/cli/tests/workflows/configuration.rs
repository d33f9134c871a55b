//! System config and display options commands

use crate::common::TestProfile;
use crate::trimless;
use anyhow::Result;

#[test]
fn test_config_set_get_validates() -> Result<()> {
    let profile = TestProfile::new()?;

    let result = trimless!(&profile, "config", "get", "quota.daily_limit").assert_success()?;
    assert_eq!(result.stdout.trim(), "5");

    trimless!(&profile, "config", "set", "quota.daily_limit", "10").assert_success()?;
    let result = trimless!(&profile, "config", "get", "quota.daily_limit").assert_success()?;
    assert_eq!(result.stdout.trim(), "10");

    trimless!(&profile, "config", "set", "quota.daily_limit", "0").assert_failure()?;
    trimless!(&profile, "config", "set", "scheduler.max_ticks", "1").assert_failure()?;
    trimless!(&profile, "config", "set", "payment.extension_id", "your-extension-id")
        .assert_failure()?;
    trimless!(&profile, "config", "get", "nope").assert_failure()?;

    // Failed sets leave the file untouched
    let result = trimless!(&profile, "config", "get", "quota.daily_limit").assert_success()?;
    assert_eq!(result.stdout.trim(), "10");

    Ok(())
}

#[test]
fn test_config_path_and_example() -> Result<()> {
    let profile = TestProfile::new()?;

    let result = trimless!(&profile, "config", "path").assert_success()?;
    assert!(result.contains_stdout("File does not exist"));

    trimless!(&profile, "config", "path", "--create").assert_success()?;
    assert!(profile.config_file().exists());

    let result = trimless!(&profile, "config", "example").assert_success()?;
    assert!(result.contains_stdout("[quota]"));
    assert!(result.contains_stdout("tick_interval_ms"));

    Ok(())
}

#[test]
fn test_invalid_config_file_is_reported() -> Result<()> {
    let profile = TestProfile::new()?;
    profile.write_config("[quota]\ndaily_limit = \"many\"\n")?;

    let result = trimless!(&profile, "status").assert_failure()?;
    assert!(result.contains_stderr("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_options_set_get_reset() -> Result<()> {
    let profile = TestProfile::new()?;
    trimless!(&profile, "install").assert_success()?;

    let result = trimless!(&profile, "options", "get", "color.value").assert_success()?;
    assert_eq!(result.stdout.trim(), "#888888");

    trimless!(&profile, "options", "set", "color.value", "#123456").assert_success()?;
    trimless!(&profile, "options", "set", "indentation.value", "12").assert_success()?;
    let result = trimless!(&profile, "options", "list").assert_success()?;
    assert!(result.contains_stdout("#123456"));
    assert!(result.contains_stdout("padding-left: 12px"));

    trimless!(&profile, "options", "set", "color.value", "blue").assert_failure()?;

    trimless!(&profile, "options", "reset").assert_success()?;
    let result = trimless!(&profile, "options", "get", "color.value").assert_success()?;
    assert_eq!(result.stdout.trim(), "#888888");

    Ok(())
}
