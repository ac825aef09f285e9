//! YAML configuration loading and validation.
//!
//! The config file describes the i3 settings, the monitor detection
//! strategy, the named screen layouts, and the pass-through sections
//! that land in the rendered config unchanged.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::monitor::{CommandDetector, Detector, NativeDetector};

/// Config directory under the user's config root.
pub const APP_DIR: &str = "i3gen";
/// Config file names searched in order of preference.
const CONFIG_FILENAMES: [&str; 2] = ["config.yaml", "config.yml"];

/// The requested layout does not exist in the configuration.
#[derive(Debug, Error)]
#[error("layout '{0}' not found in configuration")]
pub struct LayoutNotFound(pub String);

/// Top-level configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub i3: I3Settings,
    #[serde(default)]
    pub use_detected_monitors: bool,
    #[serde(default)]
    pub monitor_detection: DetectionSettings,
    #[serde(default)]
    pub layouts: BTreeMap<String, Layout>,
    #[serde(default)]
    pub application_bindings: BTreeMap<String, String>,
    #[serde(default)]
    pub startup_programs: Vec<String>,
    #[serde(default)]
    pub window_overrides: Vec<String>,
    #[serde(default)]
    pub colors: Colors,
}

/// Basic i3 window manager settings.
#[derive(Debug, Clone, Deserialize)]
pub struct I3Settings {
    pub mod_key: String,
    #[serde(default)]
    pub bar_font: String,
}

/// Which detection strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Query the X server directly over RandR.
    #[default]
    Native,
    /// Run a user-supplied shell command and read monitor names from
    /// its stdout.
    Command,
}

/// Monitor detection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionSettings {
    #[serde(default)]
    pub method: DetectionMethod,
    /// X display target for the native method.
    #[serde(default = "default_display")]
    pub display: String,
    /// Shell command for the command method.
    #[serde(default)]
    pub detection_command: String,
    /// Stand-in names used to pad the detected set up to `min_monitors`.
    #[serde(default)]
    pub dummy_monitors: Vec<String>,
    #[serde(default = "default_min_monitors")]
    pub min_monitors: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            method: DetectionMethod::default(),
            display: default_display(),
            detection_command: String::new(),
            dummy_monitors: Vec::new(),
            min_monitors: default_min_monitors(),
        }
    }
}

impl DetectionSettings {
    /// Build the configured detection strategy.
    pub fn detector(&self) -> Box<dyn Detector> {
        match self.method {
            DetectionMethod::Native => Box::new(NativeDetector::new(&self.display)),
            DetectionMethod::Command => Box::new(CommandDetector::new(&self.detection_command)),
        }
    }
}

/// One named screen arrangement: gaps plus the two role-reference maps.
/// Values in the maps are role tokens (`primary_display`, `left_display`,
/// `right_display`) resolved to monitor names at render time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub gaps_inner: i64,
    #[serde(default)]
    pub gaps_outer: i64,
    /// keybinding → role
    #[serde(default)]
    pub move_workspace: BTreeMap<String, String>,
    /// workspace number → role
    #[serde(default)]
    pub workspace_to_display: BTreeMap<String, String>,
}

/// Base16 color palette, passed through to the template.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Colors {
    #[serde(default)]
    pub base00: String,
    #[serde(default)]
    pub base01: String,
    #[serde(default)]
    pub base02: String,
    #[serde(default)]
    pub base03: String,
    #[serde(default)]
    pub base04: String,
    #[serde(default)]
    pub base05: String,
    #[serde(default)]
    pub base06: String,
    #[serde(default)]
    pub base07: String,
    #[serde(default)]
    pub base08: String,
    #[serde(default)]
    pub base09: String,
    #[serde(default, rename = "base0A")]
    pub base0a: String,
    #[serde(default, rename = "base0B")]
    pub base0b: String,
    #[serde(default, rename = "base0C")]
    pub base0c: String,
    #[serde(default, rename = "base0D")]
    pub base0d: String,
    #[serde(default, rename = "base0E")]
    pub base0e: String,
    #[serde(default, rename = "base0F")]
    pub base0f: String,
}

fn default_display() -> String {
    ":0".to_string()
}

fn default_min_monitors() -> usize {
    3
}

impl Config {
    /// Load from an explicit path, or search the default config
    /// directory (`~/.config/i3gen/config.yaml`, then `config.yml`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => find_config_file()?,
        };
        Self::load_from_file(&path)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config file {}", path.display()))?;
        config.validate()?;
        info!(
            "loaded config from {} ({} layout(s))",
            path.display(),
            config.layouts.len()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.i3.mod_key.is_empty() {
            bail!("i3.mod_key is required");
        }
        if self.use_detected_monitors
            && self.monitor_detection.method == DetectionMethod::Command
            && self.monitor_detection.detection_command.is_empty()
        {
            bail!(
                "monitor_detection.detection_command is required when use_detected_monitors is true"
            );
        }
        Ok(())
    }

    /// Look up a named layout.
    pub fn layout(&self, name: &str) -> Result<&Layout, LayoutNotFound> {
        self.layouts
            .get(name)
            .ok_or_else(|| LayoutNotFound(name.to_string()))
    }
}

/// Default config directory, `~/.config/i3gen`.
pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn find_config_file() -> Result<PathBuf> {
    find_config_file_in(&config_dir())
}

fn find_config_file_in(dir: &Path) -> Result<PathBuf> {
    for filename in CONFIG_FILENAMES {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    bail!(
        "no configuration file found in {} (tried: {})",
        dir.display(),
        CONFIG_FILENAMES.join(", ")
    )
}
