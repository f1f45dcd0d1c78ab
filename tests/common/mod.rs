#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

impl CmdResult {
    /// Parse stdout as a single JSON document.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim()).unwrap_or_else(|e| {
            panic!(
                "stdout is not JSON ({e}); log: {}",
                self.log_path.display()
            )
        })
    }
}

/// Per-case sandbox: a fake HOME plus the files reachboard writes.
pub struct Sandbox {
    pub root: PathBuf,
}

impl Sandbox {
    pub fn new(case_name: &str) -> Self {
        let root = std::env::temp_dir()
            .join("reachboard-test-sandboxes")
            .join(format!("{}-{}", sanitize(case_name), now_nanos()));
        fs::create_dir_all(root.join("home")).expect("create sandbox home");
        Self { root }
    }

    pub fn home(&self) -> PathBuf {
        self.root.join("home")
    }

    pub fn theme_file(&self) -> PathBuf {
        self.root.join("theme.json")
    }

    pub fn activity_log(&self) -> PathBuf {
        self.root.join("activity.jsonl")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.root.join("config.toml");
        fs::write(&path, contents).expect("write sandbox config");
        path
    }

    fn apply(&self, command: &mut Command) {
        command
            .env("HOME", self.home())
            .env("RB_THEME_FILE", self.theme_file())
            .env("RB_ACTIVITY_LOG", self.activity_log())
            .env_remove("RB_OUTPUT_FORMAT")
            .env_remove("RB_DASHBOARD_DEFAULT_PERIOD")
            .env_remove("RB_DASHBOARD_STRICT_SELECTORS")
            .env_remove("RB_GENERATOR_SALT")
            .env_remove("RB_LOGGING_ENABLED")
            .env("NO_COLOR", "1");
    }

    /// Activity log lines written so far, parsed.
    pub fn activity_events(&self) -> Vec<serde_json::Value> {
        read_jsonl(&self.activity_log())
    }
}

fn read_jsonl(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("activity log line is JSON"))
        .collect()
}

fn now_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_reachboard") {
        return PathBuf::from(path);
    }
    if let Some(path) = option_env!("CARGO_BIN_EXE_reachboard") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "reachboard.exe"
    } else {
        "reachboard"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve reachboard binary path for integration test"),
    }
}

/// Run the binary in a fresh sandbox.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    let sandbox = Sandbox::new(case_name);
    run_in_sandbox(&sandbox, case_name, args, &[])
}

/// Run the binary inside `sandbox` with extra environment variables.
pub fn run_in_sandbox(
    sandbox: &Sandbox,
    case_name: &str,
    args: &[&str],
    env: &[(&str, &str)],
) -> CmdResult {
    let log_path = sandbox
        .root
        .join(format!("{}-{}.log", sanitize(case_name), now_nanos()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command.args(args);
    sandbox.apply(&mut command);
    command
        .env("RB_TEST_VERBOSE", "1")
        .env("RUST_BACKTRACE", "1");
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("execute reachboard command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("env={env:?}\n"));
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
