mod common;

use common::*;
use vaultlint::core::error::ScanFault;
use vaultlint::core::hooks::InstallHookPolicy;
use vaultlint::core::id::PackageId;
use vaultlint::core::package::{InstallHook, Package};
use vaultlint::core::report::CheckReport;
use vaultlint::core::scanner::Scanner;

fn hook(name: &str, broken: bool) -> InstallHook {
    InstallHook {
        name: name.to_string(),
        broken,
    }
}

fn hooked_package(id: &str, hooks: Vec<InstallHook>) -> Package {
    let mut pkg = package(id);
    pkg.hooks = hooks;
    pkg
}

fn scan(policy: InstallHookPolicy, pkg: Package) -> Result<Vec<CheckReport>, String> {
    let mut scanner = Scanner::builder()
        .with_install_hook_policy(policy)
        .build();
    scanner
        .scan_packages(&[pkg])
        .map_err(|error| error.to_string())
}

#[test]
fn report_policy_reports_broken_hook_and_continues() {
    let pkg = hooked_package("g:app:1", vec![hook("bad", true), hook("good", false)]);
    let reports = scan(InstallHookPolicy::Report, pkg).unwrap();
    let listener = &reports[0];
    assert_eq!(listener.violations.len(), 1);
    assert!(listener.violations[0].description.contains("bad"));
    assert!(listener.violations[0].implicates(&PackageId::from("g:app:1")));
}

#[test]
fn report_is_the_default_policy() {
    let pkg = hooked_package("g:app:1", vec![hook("bad", true)]);
    let mut scanner = Scanner::builder().build();
    let reports = scanner.scan_packages(&[pkg]).unwrap();
    assert_eq!(reports[0].violations.len(), 1);
}

#[test]
fn abort_policy_fails_the_scan_on_broken_hook() {
    let pkg = hooked_package("g:app:1", vec![hook("bad", true)]);
    let mut scanner = Scanner::builder()
        .with_install_hook_policy(InstallHookPolicy::Abort)
        .build();
    let error = scanner.scan_packages(&[pkg]).unwrap_err();
    assert!(matches!(error.fault(), ScanFault::Hook(_)));
    assert!(error.to_string().contains("bad"));
}

#[test]
fn abort_policy_passes_working_hooks() {
    let pkg = hooked_package("g:app:1", vec![hook("good", false)]);
    let reports = scan(InstallHookPolicy::Abort, pkg).unwrap();
    assert!(reports[0].violations.is_empty());
}

#[test]
fn prohibit_policy_flags_every_registration_attempt() {
    // Even a broken hook only counts as a prohibited registration; the
    // delegate never sees it.
    let pkg = hooked_package("g:app:1", vec![hook("a", false), hook("b", true)]);
    let reports = scan(InstallHookPolicy::Prohibit, pkg).unwrap();
    let listener = &reports[0];
    assert_eq!(listener.violations.len(), 2);
    for violation in &listener.violations {
        assert!(violation.description.contains("Prohibited"));
        assert!(violation.implicates(&PackageId::from("g:app:1")));
    }
}

#[test]
fn prohibit_policy_never_executes_hooks() {
    let probe = PathProbe::new("probe", "/var/hooks/g:app:1");
    let observations = probe.observations();
    let mut scanner = Scanner::builder()
        .add_check(Box::new(probe))
        .with_install_hook_policy(InstallHookPolicy::Prohibit)
        .build();
    scanner
        .scan_packages(&[hooked_package("g:app:1", vec![hook("a", false)])])
        .unwrap();
    assert_eq!(observations.borrow().as_slice(), [false]);
}

#[test]
fn skip_policy_ignores_hooks_entirely() {
    let probe = PathProbe::new("probe", "/var/hooks/g:app:1");
    let observations = probe.observations();
    let mut scanner = Scanner::builder()
        .add_check(Box::new(probe))
        .with_install_hook_policy(InstallHookPolicy::Skip)
        .build();
    let reports = scanner
        .scan_packages(&[hooked_package("g:app:1", vec![hook("bad", true)])])
        .unwrap();
    assert!(reports[0].violations.is_empty());
    assert_eq!(observations.borrow().as_slice(), [false]);
}

#[test]
fn report_policy_executes_working_hooks() {
    let probe = PathProbe::new("probe", "/var/hooks/g:app:1");
    let observations = probe.observations();
    let mut scanner = Scanner::builder().add_check(Box::new(probe)).build();
    scanner
        .scan_packages(&[hooked_package("g:app:1", vec![hook("a", false)])])
        .unwrap();
    // Hooks run before the save that precedes after_extract.
    assert_eq!(observations.borrow().as_slice(), [true]);
}

#[test]
fn policy_names_resolve_case_insensitively() {
    assert_eq!(
        InstallHookPolicy::for_name("PROHIBIT"),
        Some(InstallHookPolicy::Prohibit)
    );
    assert_eq!(
        InstallHookPolicy::for_name("skip"),
        Some(InstallHookPolicy::Skip)
    );
    assert_eq!(InstallHookPolicy::for_name("bogus"), None);
}
