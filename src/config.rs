//! Client settings.
//!
//! Settings live in `.rclang.json` at the workspace root. A missing file
//! means defaults; `rclang-client config` writes a starter file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::lsp::LspClientBuilder;

/// Name of the settings file inside a workspace.
pub const SETTINGS_FILE: &str = ".rclang.json";

/// How to launch the language server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// Executable to run.
    pub command: String,
    /// Arguments passed to it.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            command: "java".to_string(),
            args: vec![
                "-Dfile.encoding=UTF-8".to_string(),
                "-jar".to_string(),
                "rclang-language-server.jar".to_string(),
            ],
        }
    }
}

/// Everything configurable about the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Language server launch command.
    pub server: ServerSettings,
    /// Tree view ids to register.
    pub tree_views: Vec<String>,
    /// Directory holding the client's `media/` resources.
    pub extension_root: PathBuf,
    /// Seconds to wait for the initialize handshake.
    pub init_timeout_secs: u64,
    /// Seconds to wait for any single request.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            tree_views: vec!["rcAst".to_string()],
            extension_root: PathBuf::from("."),
            init_timeout_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or defaults when the file does not exist.
    ///
    /// ## Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {} - invalid JSON", path.display()))
    }

    /// A client builder preconfigured from these settings.
    pub fn client_builder(&self, workspace_root: impl Into<PathBuf>) -> LspClientBuilder {
        LspClientBuilder::new()
            .server_command(&self.server.command)
            .server_args(self.server.args.iter().cloned())
            .workspace_root(workspace_root)
            .init_timeout(Duration::from_secs(self.init_timeout_secs))
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

/// Writes a default `.rclang.json` into `dir`.
///
/// ## Errors
/// Returns an error if:
/// - File I/O fails
/// - the settings file already exists
pub fn configure_in(dir: &Path) -> Result<PathBuf> {
    let config_file = dir.join(SETTINGS_FILE);

    if config_file.exists() {
        bail!(
            "rclang-client is already configured in {}\n\n\
            To reconfigure, remove the file, then run:\n  \
            rclang-client config",
            config_file.display()
        );
    }

    // Write atomically (temp file + rename)
    let temp_file = config_file.with_extension("tmp");
    let json_str = serde_json::to_string_pretty(&Settings::default())
        .context("failed to serialize settings")?;

    fs::write(&temp_file, json_str).context("failed to write temporary settings file")?;
    fs::rename(&temp_file, &config_file).context("failed to rename temporary settings file")?;

    Ok(config_file)
}

/// Writes a default `.rclang.json` into the current directory and prints next steps.
///
/// ## Errors
/// See [`configure_in`].
pub fn configure() -> Result<()> {
    let dir = std::env::current_dir().context("failed to get current directory")?;
    let path = configure_in(&dir)?;

    println!("\n{}", "=".repeat(60));
    println!("✓ Created {}", path.display());
    println!("{}", "=".repeat(60));
    println!("\nNext steps:");
    println!("  1. Point server.command/server.args at your rclang language server");
    println!("  2. Run: rclang-client tree rcAst");
    println!("  3. Run: rclang-client preview src/main.rc\n");

    Ok(())
}
