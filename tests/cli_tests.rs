#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

const MAY_2013: &str = "log 1 2013-05-06\nlog 1 2013-05-08\nlog 1 2013-05-10\nlog 1 2013-05-15\n\
log 1 2013-05-17\nlog 1 2013-05-20\nlog 1 2013-05-22\nlog 1 2013-05-24\n";

#[test]
fn cli_rejects_invalid_week_mask() {
    run_cli("habit 1 days 0000000 Gym\nquit\n")
        .success()
        .stdout(str_contains("Error: a weekly schedule needs at least one required day"));
}

#[test]
fn cli_reports_streaks_for_reference_date() {
    let script = format!("habit 1 days 1010100 Gym\n{MAY_2013}streaks 1 2013-05-28\nquit\n");
    run_cli(&script)
        .success()
        .stdout(str_contains("Habit 1 added: Gym (Mo/We/Fr)."))
        .stdout(str_contains("Streaks for habit 1 as of 2013-05-28:"))
        .stdout(str_contains("2013-05-06..2013-05-10 entries=3 days=5"))
        .stdout(str_contains("(nothing logged yet) entries=0 days=0 *current*"));
}

#[test]
fn cli_rating_and_next_day() {
    let script = format!(
        "habit 1 interval 3 Water plants\n{MAY_2013}rating 1 2013-05-25\nnext 1 2013-05-25\nquit\n"
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Habit 1 rating as of 2013-05-25: bronze"))
        .stdout(str_contains("Next required day for habit 1: 2013-05-27"));
}

#[test]
fn cli_refuses_second_entry_on_same_day() {
    run_cli("habit 1 interval 2 Read\nlog 1 2013-05-06 half\nlog 1 2013-05-06\nquit\n")
        .success()
        .stdout(str_contains("Logged 2013-05-06 (half) for habit 1."))
        .stdout(str_contains("already has an activity on 2013-05-06"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "habit 1 interval 2 Persisted\nsave json {path}\nhabit 2 interval 2 Temp\nload json {path}\nlist\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Tracker saved to"));
    assert!(output.contains("Tracker loaded from"));
    let after_reload = output
        .split("Tracker loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("Persisted"));
    assert!(
        !after_reload.contains("  Temp "),
        "habits added after saving should be gone after reload"
    );
}

#[test]
fn cli_unknown_command_points_to_help() {
    run_cli("dance\nquit\n")
        .success()
        .stdout(str_contains("Unknown command 'dance'. Type 'help'."));
}
