//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/grove/grove.toml`
//! 3. Explicit config: `--config <file>`
//! 4. Environment variables: `GROVE_*` prefix, `__` between section and key
//!    (e.g. `GROVE_TREE__REMOVE_POLICY=strict`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::scene::expand_path;
use crate::application::ApplicationError;
use crate::domain::{CyclePolicy, RemovePolicy, Traversal, TreePolicy};

/// Traversal limits applied by the CLI.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TraversalConfig {
    /// Maximum number of levels visited (root is level 1), unlimited if unset
    pub max_depth: Option<usize>,
}

impl TraversalConfig {
    pub fn traversal(&self) -> Traversal<'static> {
        Traversal::new().max_depth(self.max_depth)
    }
}

/// Terminal output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Decimals in area reports
    pub precision: usize,
    /// Colored headers and errors
    pub color: bool,
    /// Label of composite nodes in `tree` output
    pub branch_label: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: 2,
            color: true,
            branch_label: "composite".into(),
        }
    }
}

/// Unified configuration for grove.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub tree: TreePolicy,
    pub traversal: TraversalConfig,
    pub output: OutputConfig,
}

/// Raw settings for intermediate parsing (Option detects "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree: RawTreePolicy,
    pub traversal: RawTraversalConfig,
    pub output: RawOutputConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreePolicy {
    pub cycle_policy: Option<CyclePolicy>,
    pub remove_policy: Option<RemovePolicy>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTraversalConfig {
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub precision: Option<usize>,
    pub color: Option<bool>,
    pub branch_label: Option<String>,
}

/// Get the XDG config directory for grove.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "grove").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("grove.toml"))
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
    /// Merge overlay config onto self: overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree: TreePolicy {
                cycle: overlay.tree.cycle_policy.unwrap_or(self.tree.cycle),
                remove: overlay.tree.remove_policy.unwrap_or(self.tree.remove),
            },
            traversal: TraversalConfig {
                max_depth: overlay.traversal.max_depth.or(self.traversal.max_depth),
            },
            output: OutputConfig {
                precision: overlay.output.precision.unwrap_or(self.output.precision),
                color: overlay.output.color.unwrap_or(self.output.color),
                branch_label: overlay
                    .output
                    .branch_label
                    .clone()
                    .unwrap_or_else(|| self.output.branch_label.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; it
    ///   must exist (`~` and `$VAR` are expanded).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(
            global_config_path().as_deref(),
            explicit,
            Self::environment(),
        )
    }

    /// Load settings from the given layers instead of the process ones.
    ///
    /// A missing `global` file is skipped; a missing `explicit` file is an
    /// error.
    pub fn load_layers(
        global: Option<&Path>,
        explicit: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            let path = expand_path(path);
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!("explicit config: {}", path.display());
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current, env)
    }

    /// The `GROVE_*` environment source.
    pub fn environment() -> Environment {
        Environment::with_prefix("GROVE")
            .prefix_separator("_")
            .separator("__")
    }

    /// Apply `GROVE_*` variables from `env` as explicit overrides.
    pub fn apply_env_overrides(
        mut settings: Self,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder().add_source(env).build().map_err(config_err)?;

        if let Some(val) = lookup::<CyclePolicy>(&config, "tree.cycle_policy")? {
            settings.tree.cycle = val;
        }
        if let Some(val) = lookup::<RemovePolicy>(&config, "tree.remove_policy")? {
            settings.tree.remove = val;
        }
        if let Some(val) = lookup::<usize>(&config, "traversal.max_depth")? {
            settings.traversal.max_depth = Some(val);
        }
        if let Some(val) = lookup::<usize>(&config, "output.precision")? {
            settings.output.precision = val;
        }
        if let Some(val) = lookup::<bool>(&config, "output.color")? {
            settings.output.color = val;
        }
        if let Some(val) = lookup::<String>(&config, "output.branch_label")? {
            settings.output.branch_label = val;
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
        r#"# grove configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/grove/grove.toml
#   File:   grove --config <file>
#   Env:    GROVE_* environment variables, e.g. GROVE_TREE__REMOVE_POLICY=strict

[tree]
# "reject" refuses to add an ancestor below its descendant, "unchecked" trusts the caller
# cycle_policy = "reject"

# "ignore" makes removing an absent child a no-op, "strict" reports it
# remove_policy = "ignore"

[traversal]
# Deepest level visited (root is level 1)
# max_depth = 64

[output]
# precision = 2
# color = true
# branch_label = "composite"
"#
        .to_string()
    }
}

/// Unset keys are `None`; values that do not parse are errors.
fn lookup<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn env_from(pairs: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::environment().source(Some(map))
    }

    #[rstest]
    fn given_defaults_then_conservative_policies() {
        let settings = Settings::default();
        assert_eq!(settings.tree.cycle, CyclePolicy::Reject);
        assert_eq!(settings.tree.remove, RemovePolicy::Ignore);
        assert_eq!(settings.traversal.max_depth, None);
        assert_eq!(settings.output.precision, 2);
    }

    #[rstest]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let raw: RawSettings = toml::from_str(
            r#"
            [tree]
            remove_policy = "strict"
            [output]
            precision = 4
            "#,
        )
        .unwrap();
        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged.tree.remove, RemovePolicy::Strict);
        assert_eq!(merged.tree.cycle, CyclePolicy::Reject);
        assert_eq!(merged.output.precision, 4);
        assert!(merged.output.color);
    }

    #[rstest]
    fn given_env_vars_when_applying_overrides_then_replace_values() {
        let env = env_from(&[
            ("GROVE_TREE__CYCLE_POLICY", "unchecked"),
            ("GROVE_TRAVERSAL__MAX_DEPTH", "8"),
            ("GROVE_OUTPUT__COLOR", "false"),
        ]);
        let settings = Settings::apply_env_overrides(Settings::default(), env).unwrap();
        assert_eq!(settings.tree.cycle, CyclePolicy::Unchecked);
        assert_eq!(settings.traversal.max_depth, Some(8));
        assert!(!settings.output.color);
        assert_eq!(settings.output.branch_label, "composite");
    }

    #[rstest]
    #[case("GROVE_TREE__REMOVE_POLICY", "strcit")]
    #[case("GROVE_TREE__CYCLE_POLICY", "never")]
    #[case("GROVE_TRAVERSAL__MAX_DEPTH", "deep")]
    fn given_malformed_env_var_when_applying_overrides_then_config_error(
        #[case] key: &str,
        #[case] value: &str,
    ) {
        let result = Settings::apply_env_overrides(Settings::default(), env_from(&[(key, value)]));
        assert!(matches!(result, Err(ApplicationError::Config { .. })), "{:?}", result);
    }

    #[rstest]
    fn given_settings_when_serialized_then_round_trips_through_raw() {
        let mut settings = Settings::default();
        settings.traversal.max_depth = Some(3);
        let text = settings.to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }

    #[rstest]
    fn given_template_when_parsed_then_yields_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }
}
