//! Enabling and disabling the feature

use crate::common::TestProfile;
use crate::trimless;
use anyhow::Result;

#[test]
fn test_toggle_round_trip() -> Result<()> {
    let profile = TestProfile::new()?;
    trimless!(&profile, "install").assert_success()?;

    let result = trimless!(&profile, "toggle").assert_success()?;
    assert!(result.contains_stdout("Trimless is disabled"));

    let result = trimless!(&profile, "untrim", "ab").assert_success()?;
    assert!(result.contains_stdout("Trimless is disabled"));
    assert_eq!(result.count_lines("untrim"), 0);

    let result = trimless!(&profile, "toggle").assert_success()?;
    assert!(result.contains_stdout("Trimless is enabled"));

    Ok(())
}

#[test]
fn test_enable_disable() -> Result<()> {
    let profile = TestProfile::new()?;
    trimless!(&profile, "install").assert_success()?;

    trimless!(&profile, "disable").assert_success()?;
    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Disabled"));

    trimless!(&profile, "enable").assert_success()?;
    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Enabled"));

    Ok(())
}

#[test]
fn test_uninstalled_profile_reads_as_disabled() -> Result<()> {
    let profile = TestProfile::new()?;
    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Disabled"));
    assert!(result.contains_stdout("trimless enable"));
    Ok(())
}
