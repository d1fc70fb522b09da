use std::sync::Arc;

use vigil_check::{checker, BugChecker, BugPatternInfo, OptionsError, ScannerSupplier, Severity};
use vigil_config::{ConfigError, VigilConfig};
use vigil_syntax::NodeKind;

fn supplier() -> ScannerSupplier {
    let checks: Vec<Arc<dyn BugChecker>> = vec![
        Arc::new(checker(
            BugPatternInfo::new("Loud", "always an error", Severity::Error),
            [NodeKind::Literal],
            |_, _, _| None,
        )),
        Arc::new(checker(
            BugPatternInfo::new("Quiet", "off unless asked", Severity::Warning)
                .disabled_by_default(),
            [NodeKind::Literal],
            |_, _, _| None,
        )),
        Arc::new(checker(
            BugPatternInfo::new("Pinned", "cannot be turned off", Severity::Error)
                .not_disableable(),
            [NodeKind::Literal],
            |_, _, _| None,
        )),
    ];
    ScannerSupplier::from_checkers(checks).unwrap()
}

#[test]
fn config_file_drives_the_supplier() {
    let config = VigilConfig::load_from_str(
        r#"
[checks]
enable_all_disabled_as_warnings = true

[checks.severity]
Loud = "warn"
Quiet = "error"

[checks.patch]
checks = ["Loud"]
"#,
    )
    .unwrap();
    let options = config.check_options(Vec::<String>::new()).unwrap();
    let supplier = supplier().apply_overrides(&options).unwrap();

    assert_eq!(supplier.severity("Loud"), Some(Severity::Warning));
    assert_eq!(supplier.severity("Quiet"), Some(Severity::Error));
    assert_eq!(supplier.severity("Pinned"), Some(Severity::Error));
    assert!(supplier.patch_checks().contains("Loud"));
}

#[test]
fn command_line_flags_win_over_the_file() {
    let config = VigilConfig::load_from_str("[checks.severity]\nLoud = \"off\"\n").unwrap();
    let options = config.check_options(["-Xep:Loud:ERROR"]).unwrap();
    let supplier = supplier().apply_overrides(&options).unwrap();
    assert!(supplier.is_enabled("Loud"));
    assert_eq!(supplier.severity("Loud"), Some(Severity::Error));
}

#[test]
fn unknown_checks_fail_unless_ignored() {
    let config = VigilConfig::load_from_str("[checks.severity]\nMissing = \"warn\"\n").unwrap();
    let options = config.check_options(Vec::<String>::new()).unwrap();
    assert_eq!(
        supplier().apply_overrides(&options).unwrap_err(),
        OptionsError::UnknownCheck("Missing".into())
    );

    let options = config.check_options(["-XepIgnoreUnknownCheckNames"]).unwrap();
    assert!(supplier().apply_overrides(&options).is_ok());
}

#[test]
fn pinned_checks_cannot_be_turned_off() {
    let config = VigilConfig::load_from_str("[checks.severity]\nPinned = \"off\"\n").unwrap();
    let options = config.check_options(Vec::<String>::new()).unwrap();
    assert_eq!(
        supplier().apply_overrides(&options).unwrap_err(),
        OptionsError::NotDisableable("Pinned".into())
    );

    let err = config.check_options(["-Xep:Pinned:SOMETIMES"]).unwrap_err();
    assert!(matches!(err, ConfigError::Options(OptionsError::InvalidFlag(_))));
}
