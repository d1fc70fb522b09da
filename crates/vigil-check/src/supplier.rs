use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{BugChecker, CheckOptions, OptionsError, Scanner, Severity, SeverityOverride};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("duplicate check name: {0}")]
    DuplicateName(String),
}

/// The set of known checks and which of them run, at what severity.
#[derive(Clone)]
pub struct ScannerSupplier {
    checks: BTreeMap<String, Arc<dyn BugChecker>>,
    severities: BTreeMap<String, Severity>,
    disabled: BTreeSet<String>,
    patch_checks: BTreeSet<String>,
}

impl fmt::Debug for ScannerSupplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerSupplier")
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .field("severities", &self.severities)
            .field("disabled", &self.disabled)
            .field("patch_checks", &self.patch_checks)
            .finish()
    }
}

impl ScannerSupplier {
    /// Registers `checkers` under their canonical names. Checks that are not
    /// enabled by default start out disabled.
    pub fn from_checkers(
        checkers: impl IntoIterator<Item = Arc<dyn BugChecker>>,
    ) -> Result<Self, RegisterError> {
        let mut checks = BTreeMap::new();
        let mut severities = BTreeMap::new();
        let mut disabled = BTreeSet::new();
        for checker in checkers {
            let info = checker.info();
            let name = info.name.clone();
            if checks.contains_key(&name) {
                return Err(RegisterError::DuplicateName(name));
            }
            severities.insert(name.clone(), info.severity);
            if !info.enabled_by_default {
                disabled.insert(name.clone());
            }
            checks.insert(name, checker);
        }
        Ok(Self {
            checks,
            severities,
            disabled,
            patch_checks: BTreeSet::new(),
        })
    }

    pub fn check(&self, name: &str) -> Option<&Arc<dyn BugChecker>> {
        self.checks.get(name)
    }

    pub fn all_checks(&self) -> impl Iterator<Item = &Arc<dyn BugChecker>> {
        self.checks.values()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.checks.contains_key(name) && !self.disabled.contains(name)
    }

    /// The effective severity of an enabled check.
    pub fn severity(&self, name: &str) -> Option<Severity> {
        if self.is_enabled(name) {
            self.severities.get(name).copied()
        } else {
            None
        }
    }

    /// Enabled checks with their effective severities, by name.
    pub fn enabled_checks(&self) -> impl Iterator<Item = (&Arc<dyn BugChecker>, Severity)> + '_ {
        self.checks.iter().filter_map(|(name, checker)| {
            let severity = self.severity(name)?;
            Some((checker, severity))
        })
    }

    pub fn patch_checks(&self) -> &BTreeSet<String> {
        &self.patch_checks
    }

    /// A copy of this supplier with `options` applied.
    ///
    /// Blanket options go first (enable-all-disabled, errors-as-warnings,
    /// disable-all), then the per-check overrides in order.
    pub fn apply_overrides(&self, options: &CheckOptions) -> Result<Self, OptionsError> {
        if options.is_empty() {
            return Ok(self.clone());
        }
        let mut next = self.clone();

        if options.enable_all_disabled_as_warnings {
            for name in std::mem::take(&mut next.disabled) {
                next.severities.insert(name, Severity::Warning);
            }
        }

        if options.all_errors_as_warnings {
            for checker in self.checks.values() {
                let info = checker.info();
                if info.severity == Severity::Error && info.disableable {
                    next.severities.insert(info.name.clone(), Severity::Warning);
                }
            }
        }

        if options.disable_all {
            for checker in self.checks.values() {
                if checker.info().disableable {
                    next.disabled.insert(checker.info().name.clone());
                }
            }
        }

        for (name, severity) in &options.severities {
            let Some(checker) = self.checks.get(name) else {
                if options.ignore_unknown_check_names {
                    warn!(target: "vigil.check", check = %name, "ignoring unknown check name");
                    continue;
                }
                return Err(OptionsError::UnknownCheck(name.clone()));
            };
            let info = checker.info();
            match severity {
                SeverityOverride::Off => {
                    if !info.disableable {
                        return Err(OptionsError::NotDisableable(name.clone()));
                    }
                    next.disabled.insert(name.clone());
                }
                SeverityOverride::Default => {
                    next.severities.insert(name.clone(), info.severity);
                    next.disabled.remove(name);
                }
                SeverityOverride::Warn => {
                    // Demoting an enabled error is a form of disabling.
                    if !self.disabled.contains(name)
                        && !info.disableable
                        && info.severity == Severity::Error
                    {
                        return Err(OptionsError::CannotDemote(name.clone()));
                    }
                    next.severities.insert(name.clone(), Severity::Warning);
                    next.disabled.remove(name);
                }
                SeverityOverride::Error => {
                    next.severities.insert(name.clone(), Severity::Error);
                    next.disabled.remove(name);
                }
            }
        }

        for name in &options.patch_checks {
            if !self.checks.contains_key(name) {
                if options.ignore_unknown_check_names {
                    warn!(target: "vigil.check", check = %name, "ignoring unknown patch check");
                    continue;
                }
                return Err(OptionsError::UnknownCheck(name.clone()));
            }
            next.patch_checks.insert(name.clone());
        }

        debug!(
            target: "vigil.check",
            enabled = next.enabled_checks().count(),
            disabled = next.disabled.len(),
            "applied check options"
        );
        Ok(next)
    }

    pub fn scanner(&self) -> Scanner {
        Scanner::new(self)
    }
}
