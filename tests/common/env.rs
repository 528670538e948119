//! Test environment for running the `scd` binary in isolation.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of running the scd binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated environment: a temporary HOME with `SCD_HOME` inside it.
pub struct TestEnv {
    pub home_dir: TempDir,
    scd_bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home_dir: tempfile::tempdir().expect("Failed to create temp home"),
            scd_bin: PathBuf::from(env!("CARGO_BIN_EXE_scd")),
        }
    }

    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home_dir.path().join(relative)
    }

    pub fn scd_home(&self) -> PathBuf {
        self.home_path(".scd")
    }

    pub fn config_path(&self) -> PathBuf {
        self.scd_home().join("config")
    }

    pub fn status_path(&self) -> PathBuf {
        self.scd_home().join("host_status")
    }

    pub fn write_config(&self, config: &serde_json::Value) {
        write_file(
            &self.config_path(),
            &serde_json::to_string_pretty(config).expect("Failed to serialize config"),
        );
    }

    pub fn write_status(&self, status: &serde_json::Value) {
        write_file(
            &self.status_path(),
            &serde_json::to_string_pretty(status).expect("Failed to serialize status"),
        );
    }

    pub fn read_status(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.status_path()).expect("Failed to read status");
        serde_json::from_str(&content).expect("Status file is not JSON")
    }

    /// Run scd with the given arguments
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run scd with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.scd_bin);
        cmd.current_dir(self.home_dir.path())
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("SCD_HOME", self.scd_home())
            .env("NO_COLOR", "1")
            .env_remove("SCD_USER")
            .env_remove("SCD_PORT")
            .env_remove("SCD_PRIVATE_KEY")
            .env_remove("RUST_LOG");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute scd");
        output_to_result(output)
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
