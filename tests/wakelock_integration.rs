//! Integration tests for wake-lock policy resolution and report parsing.
//!
//! The live `powercfg /requests` query needs an elevated Windows prompt;
//! these tests drive the same filtering logic over captured report text, so
//! the end-to-end expectations ("DISPLAY, SYSTEM" vs "SYSTEM") hold on
//! every platform.

use std::sync::Arc;

use benchhost::executor::ExecutionMode;
use benchhost::log::{Logger, NoOpLogger};
use benchhost::wakelock::{parse_power_requests, resolve, WakeLock, WakeLockPolicy};

// =============================================================================
// Test Helpers
// =============================================================================

const REQUESTER: &str = "\\Device\\HarddiskVolume3\\tools\\benchhost.exe";
const REASON: &str = "benchhost running benchmark 'WakeLock/Scenario'";

/// Mirror of the verification query used against live reports: the request
/// types of all PROCESS entries for our executable with our reason text,
/// joined in report order.
fn power_requests_for(report: &str, requester_suffix: &str, reason: &str) -> String {
    parse_power_requests(report)
        .into_iter()
        .filter(|entry| {
            entry.requester_type == "PROCESS"
                && entry.requester_name.ends_with(requester_suffix)
                && entry.reason == reason
        })
        .map(|entry| entry.request_type)
        .collect::<Vec<_>>()
        .join(", ")
}

fn report_while_holding(policy: WakeLockPolicy) -> String {
    // Captured shape of `powercfg /requests` while a lock of the given
    // strength is held by this process.
    let mut report = String::new();
    let display_entry = format!("[PROCESS] {REQUESTER}\n{REASON}\n");
    report.push_str("DISPLAY:\n");
    if policy == WakeLockPolicy::RequireSystemAndDisplayAwake {
        report.push_str(&display_entry);
    } else {
        report.push_str("None.\n");
    }
    report.push_str("\nSYSTEM:\n");
    if policy == WakeLockPolicy::None {
        report.push_str("None.\n");
    } else {
        report.push_str(&display_entry);
    }
    report.push_str("\nAWAYMODE:\nNone.\n\nEXECUTION:\nNone.\n");
    report
}

const RELEASED_REPORT: &str = "DISPLAY:\nNone.\n\nSYSTEM:\nNone.\n\nAWAYMODE:\nNone.\n";

// =============================================================================
// Policy resolution
// =============================================================================

#[test]
fn global_default_applies_without_override() {
    for default in [
        WakeLockPolicy::None,
        WakeLockPolicy::RequireSystemAwake,
        WakeLockPolicy::RequireSystemAndDisplayAwake,
    ] {
        assert_eq!(resolve(default, None, ExecutionMode::InProcess), default);
    }
}

#[test]
fn override_wins_over_any_default() {
    for default in [
        WakeLockPolicy::None,
        WakeLockPolicy::RequireSystemAwake,
        WakeLockPolicy::RequireSystemAndDisplayAwake,
    ] {
        for overridden in [
            WakeLockPolicy::None,
            WakeLockPolicy::RequireSystemAwake,
            WakeLockPolicy::RequireSystemAndDisplayAwake,
        ] {
            assert_eq!(
                resolve(default, Some(overridden), ExecutionMode::InProcess),
                overridden
            );
        }
    }
}

#[test]
fn ignoring_mode_forces_none_regardless_of_inputs() {
    assert_eq!(
        resolve(
            WakeLockPolicy::RequireSystemAndDisplayAwake,
            Some(WakeLockPolicy::RequireSystemAwake),
            ExecutionMode::InProcessDebug,
        ),
        WakeLockPolicy::None
    );
}

// =============================================================================
// Platform behavior
// =============================================================================

#[cfg(not(windows))]
#[test]
fn non_supporting_platform_never_returns_a_handle() {
    let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
    for policy in [
        WakeLockPolicy::None,
        WakeLockPolicy::RequireSystemAwake,
        WakeLockPolicy::RequireSystemAndDisplayAwake,
    ] {
        assert!(WakeLock::request(policy, "dummy", &logger).is_none());
    }
}

#[test]
fn releasing_an_absent_handle_is_a_no_op() {
    let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
    let lock = WakeLock::request(WakeLockPolicy::None, "dummy", &logger);
    assert!(lock.is_none());
    drop(lock); // no panic, no error
}

#[cfg(windows)]
#[test]
fn double_release_is_a_no_op() {
    let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
    if let Some(mut lock) = WakeLock::request(WakeLockPolicy::RequireSystemAwake, "dummy", &logger)
    {
        assert!(lock.is_held());
        lock.release();
        assert!(!lock.is_held());
        lock.release(); // second release must be silent
        assert!(!lock.is_held());
    }
}

// =============================================================================
// End-to-end report expectations
// =============================================================================

#[test]
fn display_policy_reports_display_and_system() {
    let report = report_while_holding(WakeLockPolicy::RequireSystemAndDisplayAwake);
    assert_eq!(
        power_requests_for(&report, "benchhost.exe", REASON),
        "DISPLAY, SYSTEM"
    );
}

#[test]
fn system_policy_reports_system_only() {
    let report = report_while_holding(WakeLockPolicy::RequireSystemAwake);
    assert_eq!(power_requests_for(&report, "benchhost.exe", REASON), "SYSTEM");
}

#[test]
fn no_policy_reports_nothing() {
    let report = report_while_holding(WakeLockPolicy::None);
    assert_eq!(power_requests_for(&report, "benchhost.exe", REASON), "");
}

#[test]
fn after_release_no_matching_entry_remains() {
    assert_eq!(
        power_requests_for(RELEASED_REPORT, "benchhost.exe", REASON),
        ""
    );
}

#[test]
fn foreign_entries_are_filtered_out() {
    let report = "SYSTEM:\n[DRIVER] Realtek Audio (HDAUDIO\\FUNC_01)\nAudio stream in use.\n\
                  [PROCESS] \\Device\\HarddiskVolume3\\other\\app.exe\nsome other reason\n";
    assert_eq!(power_requests_for(report, "benchhost.exe", REASON), "");
}
