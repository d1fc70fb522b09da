//! `vigil.toml`: which checks run, how loudly, and how vigil logs.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [checks]
//! all_errors_as_warnings = true
//!
//! [checks.severity]
//! ArrayToString = "error"
//! MissingOverride = "off"
//!
//! [checks.patch]
//! checks = ["ArrayToString"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_check::{CheckOptions, OptionsError, SeverityOverride};

mod logging;
mod schema;

pub use logging::{init_tracing, LoggingConfig};
pub use schema::json_schema;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub checks: ChecksConfig,
}

/// Severity of one check, as written in `[checks.severity]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Off,
    Default,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl From<SeverityLevel> for SeverityOverride {
    fn from(level: SeverityLevel) -> Self {
        match level {
            SeverityLevel::Off => SeverityOverride::Off,
            SeverityLevel::Default => SeverityOverride::Default,
            SeverityLevel::Warn => SeverityOverride::Warn,
            SeverityLevel::Error => SeverityOverride::Error,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ChecksConfig {
    /// Per-check severity, keyed by check name.
    #[serde(default)]
    pub severity: BTreeMap<String, SeverityLevel>,

    /// Turn off every check that may be disabled.
    #[serde(default)]
    pub disable_all: bool,

    /// Report error-level checks as warnings.
    #[serde(default)]
    pub all_errors_as_warnings: bool,

    /// Enable checks that are off by default, as warnings.
    #[serde(default)]
    pub enable_all_disabled_as_warnings: bool,

    /// Skip unknown check names instead of failing.
    #[serde(default)]
    pub ignore_unknown_check_names: bool,

    #[serde(default)]
    pub patch: PatchConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PatchConfig {
    /// Checks whose first fix patch mode applies. Empty means every enabled
    /// check.
    #[serde(default)]
    pub checks: Vec<String>,
}

impl ChecksConfig {
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            severities: self
                .severity
                .iter()
                .map(|(name, level)| (name.clone(), (*level).into()))
                .collect(),
            disable_all: self.disable_all,
            all_errors_as_warnings: self.all_errors_as_warnings,
            enable_all_disabled_as_warnings: self.enable_all_disabled_as_warnings,
            ignore_unknown_check_names: self.ignore_unknown_check_names,
            patch_checks: self.patch.checks.clone(),
            remaining_args: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_string())
    }
}

impl VigilConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// The configured check options followed by the `-Xep` flags in `args`.
    ///
    /// Flags come last so they override the file: a later severity for the
    /// same check wins, blanket switches are combined, and patch checks are
    /// added to the configured ones.
    pub fn check_options<I, S>(&self, args: I) -> Result<CheckOptions, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = self.checks.check_options();
        let flags = CheckOptions::from_args(args)?;
        options.severities.extend(flags.severities);
        options.disable_all |= flags.disable_all;
        options.all_errors_as_warnings |= flags.all_errors_as_warnings;
        options.enable_all_disabled_as_warnings |= flags.enable_all_disabled_as_warnings;
        options.ignore_unknown_check_names |= flags.ignore_unknown_check_names;
        for name in flags.patch_checks {
            if !options.patch_checks.contains(&name) {
                options.patch_checks.push(name);
            }
        }
        options.remaining_args = flags.remaining_args;
        Ok(options)
    }
}

pub const VIGIL_CONFIG_ENV_VAR: &str = "VIGIL_CONFIG";

/// Discover the configuration file for a workspace root.
///
/// Search order:
/// 1) `VIGIL_CONFIG` (absolute or relative to `workspace_root`)
/// 2) `vigil.toml` in `workspace_root`
/// 3) `.vigil.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(VIGIL_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["vigil.toml", ".vigil.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a workspace root.
///
/// If no config is present, returns [`VigilConfig::default`] and `None`.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(VigilConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        tracing::debug!(
            target: "vigil.config",
            root = %workspace_root.display(),
            "no config file, using defaults"
        );
        return Ok((VigilConfig::default(), None));
    };

    let config = VigilConfig::load_from_path(&path)?;
    tracing::debug!(target: "vigil.config", path = %path.display(), "loaded config");
    Ok((config, Some(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_is_default() {
        let config = VigilConfig::load_from_str("").unwrap();
        assert_eq!(config, VigilConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.checks.check_options().is_empty());
    }

    #[test]
    fn checks_map_to_options() {
        let config = VigilConfig::load_from_str(
            r#"
[checks]
disable_all = true
ignore_unknown_check_names = true

[checks.severity]
MissingOverride = "off"
BadShiftAmount = "warning"
ArrayToString = "error"

[checks.patch]
checks = ["ArrayToString"]
"#,
        )
        .unwrap();
        let options = config.checks.check_options();
        assert_eq!(
            options.severities,
            vec![
                ("ArrayToString".to_string(), SeverityOverride::Error),
                ("BadShiftAmount".to_string(), SeverityOverride::Warn),
                ("MissingOverride".to_string(), SeverityOverride::Off),
            ]
        );
        assert!(options.disable_all);
        assert!(options.ignore_unknown_check_names);
        assert!(!options.all_errors_as_warnings);
        assert_eq!(options.patch_checks, vec!["ArrayToString"]);
    }

    #[test]
    fn flags_override_the_file() {
        let config = VigilConfig::load_from_str(
            "[checks.severity]\nArrayToString = \"warn\"\n[checks.patch]\nchecks = [\"A\"]\n",
        )
        .unwrap();
        let options = config
            .check_options([
                "-Xep:ArrayToString:ERROR",
                "-XepAllErrorsAsWarnings",
                "-XepPatchChecks:A,B",
                "Foo.java",
            ])
            .unwrap();
        assert_eq!(
            options.severities,
            vec![
                ("ArrayToString".to_string(), SeverityOverride::Warn),
                ("ArrayToString".to_string(), SeverityOverride::Error),
            ]
        );
        assert!(options.all_errors_as_warnings);
        assert_eq!(options.patch_checks, vec!["A", "B"]);
        assert_eq!(options.remaining_args, vec!["Foo.java"]);

        let err = config.check_options(["-Xep:A:LOUD"]).unwrap_err();
        assert!(matches!(err, ConfigError::Options(OptionsError::InvalidFlag(_))));
    }

    #[test]
    fn rejects_unknown_keys_and_levels() {
        let err = VigilConfig::load_from_str("[checks]\ndisable_al = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");

        let err = VigilConfig::load_from_str("[checks.severity]\nArrayToString = \"loud\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
    }
}
