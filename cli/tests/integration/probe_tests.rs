//! End-to-end checks for the preload probe binary.

use crate::common::*;

#[test]
fn test_clean_run_checks_all_default_symbols() {
    let output = run_probe(&[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr);
    assert_eq!(count_checking_lines(&stdout), 6, "stdout: {}", stdout);
    assert_eq!(count_finding_blocks(&stdout), 0, "stdout: {}", stdout);
}

#[test]
fn test_open_unlink_clean_environment() {
    let output = run_probe(&["-s", "open", "-s", "unlink"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(count_checking_lines(&stdout), 2, "stdout: {}", stdout);
    assert_eq!(count_finding_blocks(&stdout), 0, "stdout: {}", stdout);
}

#[test]
fn test_missing_library_reports_loader_error() {
    let output = run_probe(&["--libc", "/nonexistent/libc-hookcheck-test.so.6"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_ne!(output.status.code(), Some(0), "stdout: {}", stdout);
    // Fatal before any comparison: no partial output.
    assert_eq!(count_checking_lines(&stdout), 0, "stdout: {}", stdout);
    assert!(
        stderr.contains("failed to load"),
        "stderr should name the loader failure: {}",
        stderr
    );
}

#[test]
fn test_unknown_symbol_is_reported_not_compared() {
    let output = run_probe(&["-s", "hookcheck_definitely_missing_xyz123"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr);
    assert_eq!(count_checking_lines(&stdout), 1, "stdout: {}", stdout);
    assert_eq!(count_finding_blocks(&stdout), 0, "stdout: {}", stdout);
    assert!(
        stderr.contains("symbol not found"),
        "stderr should report the unresolved symbol: {}",
        stderr
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = run_probe(&[]);
    let second = run_probe(&[]);
    assert_eq!(first.status.code(), second.status.code());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_json_report_lists_all_checks() {
    let output = run_probe(&["--json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");
    let checks = report["checks"].as_array().expect("checks array");
    assert_eq!(checks.len(), 6);

    let symbols: Vec<&str> = checks
        .iter()
        .map(|c| c["symbol"].as_str().expect("symbol name"))
        .collect();
    assert_eq!(
        symbols,
        ["open", "readdir", "fopen", "accept", "access", "unlink"]
    );
    for check in checks {
        assert!(
            check["outcome"].get("clean").is_some(),
            "expected clean outcome, got {}",
            check["outcome"]
        );
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_preloaded_interposer_is_detected() {
    let Some(fixture) = interposer_fixture() else {
        println!("SKIPPED: no C compiler available to build the interposer fixture");
        return;
    };

    let output = run_probe_preloaded(&["-s", "open", "-s", "unlink"], &fixture);
    let stdout = strip_ansi_codes(&String::from_utf8_lossy(&output.stdout));
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Reference-compatible default: findings do not change the exit status.
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr);
    assert_eq!(count_checking_lines(&stdout), 2, "stdout: {}", stdout);
    assert_eq!(count_finding_blocks(&stdout), 1, "stdout: {}", stdout);
    assert!(stdout.contains("Libc address: 0x"), "stdout: {}", stdout);
    assert!(stdout.contains("Next address: 0x"), "stdout: {}", stdout);

    // The finding belongs to open, not unlink.
    let open_pos = stdout.find("Checking open syscall.").expect("open line");
    let unlink_pos = stdout.find("Checking unlink syscall.").expect("unlink line");
    let finding_pos = stdout.find("Preload hooks detected!").expect("finding");
    assert!(open_pos < finding_pos && finding_pos < unlink_pos, "stdout: {}", stdout);
}

#[cfg(target_os = "linux")]
#[test]
fn test_preloaded_interposer_is_attributed() {
    let Some(fixture) = interposer_fixture() else {
        println!("SKIPPED: no C compiler available to build the interposer fixture");
        return;
    };

    let output = run_probe_preloaded(&["-s", "open"], &fixture);
    let stdout = strip_ansi_codes(&String::from_utf8_lossy(&output.stdout));
    assert!(
        stdout.contains("openhook"),
        "finding should name the interposing module: {}",
        stdout
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_preloaded_json_report() {
    let Some(fixture) = interposer_fixture() else {
        println!("SKIPPED: no C compiler available to build the interposer fixture");
        return;
    };

    let output = run_probe_preloaded(&["--json", "-s", "open", "-s", "unlink"], &fixture);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");
    let checks = report["checks"].as_array().expect("checks array");
    assert_eq!(checks.len(), 2);

    let hooked = &checks[0]["outcome"]["hooked"];
    assert_eq!(checks[0]["symbol"], "open");
    assert!(
        hooked.is_object(),
        "open should be hooked: {}",
        checks[0]["outcome"]
    );
    assert_ne!(hooked["libc_address"], hooked["next_address"]);
    assert!(
        hooked["interposer"]
            .as_str()
            .is_some_and(|m| m.contains("openhook")),
        "interposer attribution: {}",
        hooked["interposer"]
    );

    assert_eq!(checks[1]["symbol"], "unlink");
    assert!(
        checks[1]["outcome"].get("clean").is_some(),
        "unlink should be clean: {}",
        checks[1]["outcome"]
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_fail_on_hook_changes_exit_status() {
    let Some(fixture) = interposer_fixture() else {
        println!("SKIPPED: no C compiler available to build the interposer fixture");
        return;
    };

    let default_run = run_probe_preloaded(&["-s", "open"], &fixture);
    assert_eq!(default_run.status.code(), Some(0));

    let strict_run = run_probe_preloaded(&["-s", "open", "--fail-on-hook"], &fixture);
    assert_eq!(strict_run.status.code(), Some(2));
}
