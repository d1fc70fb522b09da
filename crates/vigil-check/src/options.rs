//! Check selection and severity options.
//!
//! [`CheckOptions`] is filled either from the `[checks]` table of
//! `vigil.toml` (see `vigil-config`) or from command-line flags:
//!
//! | flag | effect |
//! |---|---|
//! | `-Xep:Name[:OFF\|DEFAULT\|WARN\|ERROR]` | per-check severity (default `DEFAULT`) |
//! | `-XepAllErrorsAsWarnings` | demote disableable error checks |
//! | `-XepAllDisabledChecksAsWarnings` | enable checks that are off by default |
//! | `-XepDisableAllChecks` | turn off every disableable check |
//! | `-XepIgnoreUnknownCheckNames` | skip unknown names instead of failing |
//! | `-XepPatchChecks:A,B` | checks whose fixes patch mode applies |

use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeverityOverride {
    Off,
    Default,
    Warn,
    Error,
}

impl FromStr for SeverityOverride {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OFF" => Ok(SeverityOverride::Off),
            "DEFAULT" => Ok(SeverityOverride::Default),
            "WARN" => Ok(SeverityOverride::Warn),
            "ERROR" => Ok(SeverityOverride::Error),
            other => Err(OptionsError::InvalidSeverity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid flag: {0}")]
    InvalidFlag(String),
    #[error("invalid severity: {0}")]
    InvalidSeverity(String),
    #[error("{0} is not a valid checker name")]
    UnknownCheck(String),
    #[error("{0} may not be disabled")]
    NotDisableable(String),
    #[error("{0} is not disableable and may not be demoted to a warning")]
    CannotDemote(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Per-check overrides, in the order given; later entries for the same
    /// check win.
    pub severities: Vec<(String, SeverityOverride)>,
    pub disable_all: bool,
    pub all_errors_as_warnings: bool,
    pub enable_all_disabled_as_warnings: bool,
    pub ignore_unknown_check_names: bool,
    pub patch_checks: Vec<String>,
    /// Arguments that are not vigil flags, passed through untouched.
    pub remaining_args: Vec<String>,
}

const SEVERITY_PREFIX: &str = "-Xep:";
const PATCH_CHECKS_PREFIX: &str = "-XepPatchChecks:";
const ERRORS_AS_WARNINGS_FLAG: &str = "-XepAllErrorsAsWarnings";
const ENABLE_ALL_FLAG: &str = "-XepAllDisabledChecksAsWarnings";
const DISABLE_ALL_FLAG: &str = "-XepDisableAllChecks";
const IGNORE_UNKNOWN_FLAG: &str = "-XepIgnoreUnknownCheckNames";

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_args<I, S>(args: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                ERRORS_AS_WARNINGS_FLAG => options.all_errors_as_warnings = true,
                ENABLE_ALL_FLAG => options.enable_all_disabled_as_warnings = true,
                DISABLE_ALL_FLAG => options.disable_all = true,
                IGNORE_UNKNOWN_FLAG => options.ignore_unknown_check_names = true,
                _ => {
                    if let Some(rest) = arg.strip_prefix(SEVERITY_PREFIX) {
                        let (name, severity) = parse_severity_flag(arg, rest)?;
                        options.severities.push((name, severity));
                    } else if let Some(rest) = arg.strip_prefix(PATCH_CHECKS_PREFIX) {
                        options.patch_checks.extend(
                            rest.split(',')
                                .map(str::trim)
                                .filter(|name| !name.is_empty())
                                .map(str::to_string),
                        );
                    } else {
                        options.remaining_args.push(arg.to_string());
                    }
                }
            }
        }
        Ok(options)
    }

    pub fn set_severity(
        &mut self,
        check: impl Into<String>,
        severity: SeverityOverride,
    ) -> &mut Self {
        self.severities.push((check.into(), severity));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.severities.is_empty()
            && !self.disable_all
            && !self.all_errors_as_warnings
            && !self.enable_all_disabled_as_warnings
            && self.patch_checks.is_empty()
    }
}

fn parse_severity_flag(arg: &str, rest: &str) -> Result<(String, SeverityOverride), OptionsError> {
    let mut parts = rest.split(':');
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(OptionsError::InvalidFlag(arg.to_string()));
    }
    let severity = match parts.next() {
        None => SeverityOverride::Default,
        Some(level) => level
            .parse()
            .map_err(|_| OptionsError::InvalidFlag(arg.to_string()))?,
    };
    if parts.next().is_some() {
        return Err(OptionsError::InvalidFlag(arg.to_string()));
    }
    Ok((name.to_string(), severity))
}
