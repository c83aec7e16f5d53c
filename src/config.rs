//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treewalk/treewalk.toml`
//! 3. Local config: `<dir>/.treewalk.toml` (the directory being walked)
//! 4. Environment variables: `TREEWALK_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, Group};
use crate::domain::DEFAULT_REVISIT_BUDGET;
use crate::util::path::expand_env_vars;

/// Walk behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WalkerSettings {
    /// Depth bound, unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_level: Option<usize>,
    /// Revisits per item identity before expansion is refused
    pub revisit_budget: usize,
    pub show_hidden: bool,
    /// Entry names that stop expansion below their directory
    pub stop_markers: Vec<String>,
}

impl Default for WalkerSettings {
    fn default() -> Self {
        Self {
            max_level: None,
            revisit_budget: DEFAULT_REVISIT_BUDGET,
            show_hidden: false,
            stop_markers: vec![],
        }
    }
}

/// JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    pub groups: Vec<Group>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            groups: vec![Group::Walker, Group::Children],
        }
    }
}

/// Raw walker settings for intermediate parsing.
///
/// `None` means "not specified, inherit", `Some([])` is an explicit empty list.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawWalkerSettings {
    pub max_level: Option<usize>,
    pub revisit_budget: Option<usize>,
    pub show_hidden: Option<bool>,
    pub stop_markers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputSettings {
    pub groups: Option<Vec<Group>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub walker: RawWalkerSettings,
    pub output: RawOutputSettings,
}

impl WalkerSettings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Local overlay: scalars win if set, markers union with negation.
    pub fn merge(&self, overlay: &RawWalkerSettings) -> Self {
        Self {
            max_level: overlay.max_level.or(self.max_level),
            revisit_budget: overlay.revisit_budget.unwrap_or(self.revisit_budget),
            show_hidden: overlay.show_hidden.unwrap_or(self.show_hidden),
            stop_markers: overlay
                .stop_markers
                .as_ref()
                .map(|o| Self::merge_array(&self.stop_markers, o))
                .unwrap_or_else(|| self.stop_markers.clone()),
        }
    }

    /// Global overlay: markers REPLACE the defaults when given.
    pub fn apply_global(&self, global: &RawWalkerSettings) -> Self {
        Self {
            max_level: global.max_level.or(self.max_level),
            revisit_budget: global.revisit_budget.unwrap_or(self.revisit_budget),
            show_hidden: global.show_hidden.unwrap_or(self.show_hidden),
            stop_markers: global
                .stop_markers
                .clone()
                .unwrap_or_else(|| self.stop_markers.clone()),
        }
    }
}

/// Unified configuration for treewalk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub walker: WalkerSettings,
    pub output: OutputSettings,
}

/// Get the XDG config directory for treewalk.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treewalk").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treewalk.toml"))
}

/// Get the path to the local config file of a walked directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treewalk.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in marker names.
    fn expand_paths(&mut self) {
        for marker in &mut self.walker.stop_markers {
            *marker = expand_env_vars(marker);
        }
    }

    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            walker: self.walker.merge(&overlay.walker),
            output: OutputSettings {
                groups: overlay
                    .output
                    .groups
                    .clone()
                    .unwrap_or_else(|| self.output.groups.clone()),
            },
        }
    }

    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            walker: self.walker.apply_global(&global.walker),
            output: OutputSettings {
                groups: global
                    .output
                    .groups
                    .clone()
                    .unwrap_or_else(|| self.output.groups.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!name` negation (stop markers)
    /// - Any → Env vars: REPLACE
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Like [`Settings::load`] with an explicit global config file.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!(path = %local_path.display(), "loading local config");
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TREEWALK_* environment variables as explicit overrides,
    /// e.g. `TREEWALK_WALKER__MAX_LEVEL=3` or `TREEWALK_OUTPUT__GROUPS=walker,parent`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREEWALK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("walker.max_level") {
            settings.walker.max_level = match val.trim() {
                "" | "unbounded" => None,
                level => Some(parse_number("walker.max_level", level)?),
            };
        }
        if let Ok(val) = config.get_string("walker.revisit_budget") {
            settings.walker.revisit_budget = parse_number("walker.revisit_budget", &val)?;
        }
        if let Ok(val) = config.get_bool("walker.show_hidden") {
            settings.walker.show_hidden = val;
        }
        if let Ok(val) = config.get_string("walker.stop_markers") {
            settings.walker.stop_markers = split_list(&val);
        }
        if let Ok(val) = config.get_string("output.groups") {
            settings.output.groups = split_list(&val)
                .iter()
                .map(|name| name.parse::<Group>())
                .collect::<Result<_, _>>()
                .map_err(|message| ApplicationError::Config { message })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treewalk configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treewalk/treewalk.toml  (defines your baseline)
#   Local:  <dir>/.treewalk.toml              (per-tree additions)
#   Env:    TREEWALK_* environment variables  (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS stop_markers with global.
#   Use "!name" in local config to REMOVE an inherited marker:
#     stop_markers = ["node_modules", "!.git"]

[walker]
# Depth bound (omit for unbounded)
# max_level = 3

# Revisits of the same entry (e.g. through symlinks) before expansion is refused
# revisit_budget = 2

# Include entries starting with '.'
# show_hidden = false

# A directory containing one of these entries lists its content but stops there
# stop_markers = [".git", "Cargo.toml"]

[output]
# JSON groups: walker, children, children_count, parent,
# walker_level, walker_metadata, walker_index
# (children and parent are mutually exclusive)
# groups = ["walker", "children"]
"#
        .to_string()
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, ApplicationError> {
    value.trim().parse().map_err(|e| ApplicationError::Config {
        message: format!("{key}: invalid number '{value}': {e}"),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
