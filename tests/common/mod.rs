use std::fs;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

const ENV_OVERRIDES: &[&str] = &[
    "DWATCH_INTERVAL_MS",
    "DWATCH_COUNT",
    "DWATCH_BANNER",
    "DWATCH_DROP_ZERO",
    "DWATCH_DIFF_MODE",
    "DWATCH_HEURISTIC_LEVEL",
    "DWATCH_COLOR",
    "DWATCH_TRACE_PATH",
    "DWATCH_SHELL",
    "DWATCH_CPU",
];

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_dwatch") {
        return PathBuf::from(path);
    }

    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join("dwatch"));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve dwatch binary path for integration test"),
    }
}

fn cli_command(args: &[&str]) -> (Command, PathBuf) {
    let root = std::env::temp_dir().join("dwatch-test-logs");
    let home = root.join("home");
    fs::create_dir_all(&home).expect("create isolated home");

    let bin_path = resolve_bin_path();
    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", &home)
        .env("RUST_BACKTRACE", "1");
    for name in ENV_OVERRIDES {
        command.env_remove(name);
    }
    (command, bin_path)
}

fn record(case_name: &str, bin_path: &Path, args: &[&str], output: &Output) -> CmdResult {
    let root = std::env::temp_dir().join("dwatch-test-logs");
    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Run the binary with an isolated `HOME` and no `DWATCH_*` overrides,
/// keeping a per-case log of the invocation.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    let (mut command, bin_path) = cli_command(args);
    let output = command.output().expect("execute dwatch command");
    record(case_name, &bin_path, args, &output)
}

/// Like [`run_cli_case`], but start dwatch as the leader of a fresh process
/// group and deliver `signal` to that whole group after `delay`, the way a
/// terminal delivers keyboard signals to its foreground group.
pub fn run_cli_case_signaled(
    case_name: &str,
    args: &[&str],
    delay: Duration,
    signal: Signal,
) -> CmdResult {
    let (mut command, bin_path) = cli_command(args);
    let child = command
        .process_group(0)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn dwatch command");

    thread::sleep(delay);
    let pid = i32::try_from(child.id()).expect("pid fits i32");
    killpg(Pid::from_raw(pid), signal).expect("signal dwatch process group");

    let output = child.wait_with_output().expect("wait for dwatch command");
    record(case_name, &bin_path, args, &output)
}
