//! Integration tests: drive the built `dwatch` binary end to end.

mod common;

use std::fs;
use std::time::Duration;

use nix::sys::signal::Signal;
use serde_json::Value;

fn fast(args: &[&str]) -> Vec<String> {
    let mut all = vec!["-i", "0.05", "--no-color"];
    all.extend_from_slice(args);
    all.into_iter().map(str::to_string).collect()
}

fn run(case: &str, args: &[&str]) -> common::CmdResult {
    let owned = fast(args);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    common::run_cli_case(case, &refs)
}

#[test]
fn help_lists_flags() {
    let result = common::run_cli_case("help_lists_flags", &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: dwatch"),
        "missing usage line; log: {}",
        result.log_path.display()
    );
    for flag in ["--interval", "--drop-zero", "--style", "--trace", "--tab"] {
        assert!(result.stdout.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn version_prints_package_version() {
    let result = common::run_cli_case("version_prints_package_version", &["--version"]);
    assert!(result.status.success());
    assert!(result.stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn list_styles_prints_all_seven() {
    let result = common::run_cli_case("list_styles_prints_all_seven", &["--list-styles"]);
    assert!(result.status.success());
    assert_eq!(result.stdout.lines().count(), 7);
    for name in ["counter", "value", "value+delta", "delta", "rate", "value+rate", "bitrate"] {
        assert!(result.stdout.contains(name), "missing style {name}");
    }
}

#[test]
fn completions_are_generated() {
    let result = common::run_cli_case("completions_are_generated", &["--completions", "bash"]);
    assert!(result.status.success());
    assert!(result.stdout.contains("dwatch"));
}

#[test]
fn missing_command_is_a_user_error() {
    let result = common::run_cli_case("missing_command_is_a_user_error", &["-n", "1"]);
    assert_eq!(
        result.status.code(),
        Some(1),
        "log: {}",
        result.log_path.display()
    );
    assert!(result.stderr.starts_with("dwatch: "));
    assert!(result.stderr.contains("missing command"));
}

#[test]
fn unknown_style_is_rejected() {
    let result = run("unknown_style_is_rejected", &["-n", "1", "-s", "sparkle", "true"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("DW-1001"));
}

#[test]
fn daemon_without_trace_is_rejected() {
    let result = run("daemon_without_trace_is_rejected", &["-n", "1", "--daemon", "true"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("trace"));
}

#[test]
fn explicit_missing_config_is_rejected() {
    let result = run(
        "explicit_missing_config_is_rejected",
        &["-n", "1", "--config", "/nonexistent/dwatch.toml", "true"],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("DW-1002"));
}

#[test]
fn banner_names_interval_and_command() {
    let result = run("banner_names_interval_and_command", &["-n", "1", "echo", "7"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("Every 50ms: 'echo 7'"));
    assert!(result.stdout.contains("[diff:off style:0(counter) heuristic:1]"));
}

#[test]
fn second_tick_annotates_deltas() {
    let dir = tempfile::tempdir().unwrap();
    let counter = dir.path().join("counter");
    let command = format!("echo x >> {0}; wc -l < {0}", counter.display());
    let result = run(
        "second_tick_annotates_deltas",
        &["-n", "2", "-b", "-s", "value+delta", &command],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(
        result.stdout.contains("2[+1]"),
        "expected delta annotation; log: {}",
        result.log_path.display()
    );
}

#[test]
fn non_fatal_exit_is_shown_inline() {
    let result = run(
        "non_fatal_exit_is_shown_inline",
        &["-n", "1", "-b", "echo 5; exit 1"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("[exit status 1]"));
}

#[test]
fn command_not_found_is_fatal() {
    let result = run(
        "command_not_found_is_fatal",
        &["-n", "3", "-b", "dwatch-definitely-missing-command"],
    );
    assert_eq!(
        result.status.code(),
        Some(2),
        "log: {}",
        result.log_path.display()
    );
    assert!(result.stderr.contains("DW-3103"));
}

#[test]
fn trace_file_gets_one_row_per_tick() {
    let dir = tempfile::tempdir().unwrap();
    let trace = dir.path().join("trace.tsv");
    let trace_arg = trace.display().to_string();
    let result = run(
        "trace_file_gets_one_row_per_tick",
        &[
            "-n",
            "2",
            "-b",
            "-t",
            &trace_arg,
            "--trace-values",
            "raw",
            "echo 3 4",
        ],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert_eq!(fs::read_to_string(&trace).unwrap(), "0\t3\t4\n1\t3\t4\n");
}

#[test]
fn config_file_disables_banner() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[watch]\nbanner = false\n").unwrap();
    let config_arg = config.display().to_string();
    let result = run(
        "config_file_disables_banner",
        &["-n", "1", "--config", &config_arg, "echo", "1"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(!result.stdout.contains("Every "));
}

#[test]
fn activity_log_records_run_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("activity.jsonl");
    let log_arg = log.display().to_string();
    let result = run(
        "activity_log_records_run_lifecycle",
        &["-n", "2", "-b", "--activity-log", &log_arg, "echo 1"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());

    let events: Vec<Value> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.first().unwrap()["event"], "run_start");
    let last = events.last().unwrap();
    assert_eq!(last["event"], "run_stop");
    assert_eq!(last["tick"], 2);
    assert_eq!(last["details"], "count");
}

#[test]
fn quit_key_mid_command_only_cycles_the_style() {
    let args = fast(&["-n", "2", "-b", "sleep 0.5; echo rx 1"]);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = common::run_cli_case_signaled(
        "quit_key_mid_command_only_cycles_the_style",
        &refs,
        Duration::from_millis(300),
        Signal::SIGQUIT,
    );
    assert!(
        result.status.success(),
        "expected a clean run; log: {}",
        result.log_path.display()
    );
    assert!(!result.stderr.contains("DW-3103"));
    assert!(result.stdout.contains("rx 1"));
}

#[test]
fn interrupt_mid_command_stops_at_the_tick_boundary() {
    let args = fast(&["-n", "50", "-b", "sleep 0.5; echo rx 1"]);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = common::run_cli_case_signaled(
        "interrupt_mid_command_stops_at_the_tick_boundary",
        &refs,
        Duration::from_millis(300),
        Signal::SIGINT,
    );
    assert!(
        result.status.success(),
        "expected a graceful stop; log: {}",
        result.log_path.display()
    );
    assert!(result.stdout.contains("rx 1"));
    assert!(result.stderr.contains("[DW-RUN] stopped after 1 ticks"));
}
