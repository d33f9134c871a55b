//! Daily quota from install through trial and payment

use crate::common::TestProfile;
use crate::trimless;
use anyhow::Result;

#[test]
fn test_free_quota_then_trial() -> Result<()> {
    let profile = TestProfile::new()?;
    profile.write_config("[quota]\ndaily_limit = 2\n")?;

    let result = trimless!(&profile, "install").assert_success()?;
    assert!(result.contains_stdout("Initialized profile"));
    assert!(result.contains_stdout("trial"));

    trimless!(&profile, "untrim", "#inbox/a1").assert_success()?;
    let result = trimless!(&profile, "untrim", "a2").assert_success()?;
    assert!(result.contains_stdout("2/2 threads today"));

    // Third distinct thread is denied, a counted one is not
    let result = trimless!(&profile, "untrim", "a3").assert_success()?;
    assert!(result.contains_stdout("2/2 threads used today"));
    assert_eq!(result.count_lines("untrim"), 0);

    let result = trimless!(&profile, "untrim", "a1").assert_success()?;
    assert!(result.contains_stdout("already counted today"));
    assert_eq!(result.count_lines("untrim"), 1);

    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Free (2/2 threads today)"));
    assert!(result.contains_stdout("- a1"));
    assert!(result.contains_stdout("- a2"));

    trimless!(&profile, "payment", "trial").assert_success()?;
    let result = trimless!(&profile, "untrim", "a3").assert_success()?;
    assert!(result.contains_stdout("premium: not counted"));

    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("(7 days left)"));

    Ok(())
}

#[test]
fn test_expired_trial_falls_back_to_free() -> Result<()> {
    let profile = TestProfile::new()?;
    trimless!(&profile, "install").assert_success()?;

    trimless!(&profile, "payment", "trial", "--at", "2020-01-01T00:00:00Z").assert_success()?;
    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Free (0/5 threads today)"));
    assert!(result.contains_stdout("Trial started"));

    trimless!(&profile, "payment", "paid").assert_success()?;
    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Paid"));

    Ok(())
}

#[test]
fn test_list_view_is_not_counted() -> Result<()> {
    let profile = TestProfile::new()?;
    trimless!(&profile, "install").assert_success()?;

    let result = trimless!(&profile, "untrim", "#inbox").assert_success()?;
    assert!(result.contains_stdout("no thread here"));

    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("No threads untrimmed yet"));

    Ok(())
}

#[test]
fn test_bad_trial_timestamp() -> Result<()> {
    let profile = TestProfile::new()?;
    let result = trimless!(&profile, "payment", "trial", "--at", "yesterday").assert_failure()?;
    assert!(result.contains_stderr("RFC 3339"));
    Ok(())
}

#[test]
fn test_payment_sync_reports_failure() -> Result<()> {
    let profile = TestProfile::new()?;
    trimless!(&profile, "install").assert_success()?;
    trimless!(&profile, "payment", "paid").assert_success()?;

    let result = trimless!(&profile, "payment", "sync").assert_failure()?;
    assert!(result.contains_stderr("Payment sync failed"));

    // A failed sync leaves the stored plan alone
    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Paid"));
    Ok(())
}

#[test]
fn test_install_is_idempotent() -> Result<()> {
    let profile = TestProfile::new()?;
    trimless!(&profile, "install").assert_success()?;
    trimless!(&profile, "disable").assert_success()?;

    let result = trimless!(&profile, "install").assert_success()?;
    assert!(result.contains_stdout("Profile already initialized"));

    // The flag set before the second install survives it
    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Disabled"));
    Ok(())
}
