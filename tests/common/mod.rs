//! Common test utilities for Noodle integration tests

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use noodle::test_utils::SceneFixture;

/// A scene written into a temporary directory
pub struct TestScene {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    dir: PathBuf,
    root: PathBuf,
    config: PathBuf,
}

impl TestScene {
    /// Write `fixture` into a fresh temporary directory
    pub fn new(fixture: &SceneFixture) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path().to_path_buf();
        let root = fixture.write_to(&dir)?;
        let config = dir.join("noodle.toml");
        fs::write(&config, "")?;

        Ok(Self {
            _temp_dir: temp_dir,
            dir,
            root,
            config,
        })
    }

    /// The `shot` fixture
    pub fn shot() -> Result<Self> {
        Self::new(&SceneFixture::shot())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Root layer path as a string argument
    pub fn root_arg(&self) -> String {
        self.root.to_string_lossy().to_string()
    }

    /// Path of a file inside the scene
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }

    /// Replace the scene's config file
    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(&self.config, content)
            .with_context(|| format!("Failed to write config to {}", self.config.display()))
    }

    /// Command for the noodle binary, isolated from the user's config and environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("noodle").expect("noodle binary is built");
        cmd.current_dir(&self.dir)
            .env("NOODLE_CONFIG", &self.config)
            .env_remove("NOODLE_SEARCH_PATH")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run noodle with `args` and capture the result
    pub fn run_noodle(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.command().args(args).output().context("Failed to run noodle")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    /// Assert the command failed with exit code 1
    pub fn assert_failure(&self) -> &Self {
        assert_eq!(self.code, Some(1), "Expected exit code 1\nStdout: {}", self.stdout);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
