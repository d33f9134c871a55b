//! Page sessions driven through `trimless watch`

use crate::common::TestProfile;
use crate::trimless;
use anyhow::Result;

#[test]
fn test_watch_counts_visited_thread_once() -> Result<()> {
    let profile = TestProfile::fast()?;
    trimless!(&profile, "install").assert_success()?;

    let result = trimless!(&profile, "watch")
        .stdin("hash #inbox/ab12\nquit\n")
        .assert_success()?;
    assert!(result.contains_stdout("untrim #inbox/ab12"));

    let result = trimless!(&profile, "status").assert_success()?;
    assert!(result.contains_stdout("Free (1/5 threads today)"));
    assert!(result.contains_stdout("- ab12"));

    Ok(())
}

#[test]
fn test_watch_applies_on_start() -> Result<()> {
    let profile = TestProfile::fast()?;
    trimless!(&profile, "install").assert_success()?;

    // No input: the start trigger alone runs the initial ticks
    let result = trimless!(&profile, "watch", "--hash", "#inbox/cd34").assert_success()?;
    assert_eq!(result.count_lines("untrim #inbox/cd34"), 3);

    Ok(())
}

#[test]
fn test_watch_disabled_only_undoes() -> Result<()> {
    let profile = TestProfile::fast()?;
    trimless!(&profile, "install").assert_success()?;
    trimless!(&profile, "disable").assert_success()?;

    let result = trimless!(&profile, "watch")
        .stdin("load\nhash #inbox/ef56\nclick\nquit\n")
        .assert_success()?;
    assert_eq!(result.count_lines("untrim"), 0);
    assert!(result.count_lines("undo") >= 1);

    Ok(())
}

#[test]
fn test_watch_answers_ping() -> Result<()> {
    let profile = TestProfile::fast()?;
    trimless!(&profile, "install").assert_success()?;

    let result = trimless!(&profile, "watch")
        .stdin("message {\"type\":\"ping\"}\nbogus\nquit\n")
        .assert_success()?;
    assert!(result.contains_stdout(r#"{"trimless":true}"#));
    assert!(result.contains_stderr("Unknown command: bogus"));

    Ok(())
}
