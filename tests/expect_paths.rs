mod common;

use common::*;
use vaultlint::checks::expect_paths::ExpectPaths;
use vaultlint::core::id::PackageId;
use vaultlint::core::scanner::Scanner;

fn id(s: &str) -> PackageId {
    PackageId::from(s)
}

fn scanner_expecting(config: serde_json::Value) -> Scanner {
    Scanner::builder()
        .add_check(Box::new(ExpectPaths::from_config(&config).unwrap()))
        .build()
}

#[test]
fn later_subpackage_satisfies_an_earlier_miss() {
    // The first subpackage leaves the path missing; a later sibling creates
    // it. Judged only when the root finishes, so no violation.
    let mut scanner =
        scanner_expecting(serde_json::json!({"expectedPaths": ["/content/site"]}));

    let first = package("g:first:1");
    let mut second = package("g:second:1");
    second.imports.push(import("/content/site"));
    let mut root = package("g:root:1");
    root.subpackages.push(first);
    root.subpackages.push(second);

    let reports = scanner.scan_packages(&[root]).unwrap();
    let expect_report = &reports[1];
    assert_eq!(expect_report.check_name, "ExpectPaths");
    assert!(expect_report.violations.is_empty());
}

#[test]
fn unsatisfied_expectation_blames_the_whole_chain_once() {
    let mut scanner =
        scanner_expecting(serde_json::json!({"expectedPaths": ["/content/site"]}));

    let mut root = package("g:root:1");
    root.subpackages.push(package("g:sub:1"));

    let reports = scanner.scan_packages(&[root]).unwrap();
    let violations = &reports[1].violations;
    // Exactly one violation for the criteria, listing the subpackage and its
    // ancestor without duplicates.
    assert_eq!(violations.len(), 1);
    assert!(violations[0].description.contains("/content/site"));
    // The root's own checkpoint ran before the subpackage's.
    assert_eq!(violations[0].packages, vec![id("g:root:1"), id("g:sub:1")]);
}

#[test]
fn two_embedded_packages_jointly_satisfy_two_expectations() {
    let mut scanner = scanner_expecting(
        serde_json::json!({"expectedPaths": ["/content/a", "/content/b"]}),
    );

    let mut e1 = package("g:e1:1");
    e1.imports.push(import("/content/a"));
    let mut e2 = package("g:e2:1");
    e2.imports.push(import("/content/b"));
    let mut container = package("g:c:1");
    container
        .embedded
        .push(embedded_package("/etc/packages/e1.zip", e1, &[]));
    container
        .embedded
        .push(embedded_package("/etc/packages/e2.zip", e2, &[]));

    let reports = scanner.scan_packages(&[container]).unwrap();
    assert!(reports[1].violations.is_empty());
}

#[test]
fn one_never_created_path_yields_exactly_one_violation() {
    let mut scanner = scanner_expecting(
        serde_json::json!({"expectedPaths": ["/content/a", "/content/b"]}),
    );

    let mut e1 = package("g:e1:1");
    e1.imports.push(import("/content/a"));
    let mut container = package("g:c:1");
    container
        .embedded
        .push(embedded_package("/etc/packages/e1.zip", e1, &[]));

    let reports = scanner.scan_packages(&[container]).unwrap();
    let violations = &reports[1].violations;
    assert_eq!(violations.len(), 1);
    assert!(violations[0].description.contains("/content/b"));
    assert!(!violations[0].description.contains("/content/a"));
}

#[test]
fn init_script_path_satisfies_expectation() {
    let mut scanner =
        scanner_expecting(serde_json::json!({"expectedPaths": ["/var/scripted"]}));

    let mut root = package("g:root:1");
    root.embedded
        .push(embedded_scripts("/apps/repoinit", &["create path /var/scripted"]));

    let reports = scanner.scan_packages(&[root]).unwrap();
    assert!(reports[1].violations.is_empty());
}

#[test]
fn forbidden_path_present_at_first_checkpoint_is_reported() {
    let mut scanner =
        scanner_expecting(serde_json::json!({"notExpectedPaths": ["/etc/forbidden"]}));

    let mut root = package("g:root:1");
    root.imports.push(import("/etc/forbidden"));

    let reports = scanner.scan_packages(&[root]).unwrap();
    let violations = &reports[1].violations;
    assert_eq!(violations.len(), 1);
    assert!(violations[0].description.contains("/etc/forbidden"));
    assert!(violations[0].implicates(&id("g:root:1")));
}

#[test]
fn forbidden_path_deleted_before_the_root_finishes_is_suppressed() {
    let mut scanner =
        scanner_expecting(serde_json::json!({"notExpectedPaths": ["/etc/forbidden"]}));

    let mut root = package("g:root:1");
    root.imports.push(import("/etc/forbidden"));
    let mut cleanup = package("g:cleanup:1");
    cleanup.deletes.push("/etc/forbidden".to_string());
    root.subpackages.push(cleanup);

    let reports = scanner.scan_packages(&[root]).unwrap();
    assert!(reports[1].violations.is_empty());
}

#[test]
fn ignore_nested_judges_only_scan_targets() {
    let mut scanner = scanner_expecting(serde_json::json!({
        "expectedPaths": ["/content/site"],
        "ignoreNestedPackages": true
    }));

    // Only the subpackage misses the expectation; with nested checkpoints
    // ignored and the root itself creating the path, the scan is clean.
    let mut root = package("g:root:1");
    root.imports.push(import("/content/site"));
    root.subpackages.push(package("g:sub:1"));

    let reports = scanner.scan_packages(&[root]).unwrap();
    assert!(reports[1].violations.is_empty());
}

#[test]
fn severity_is_configurable() {
    let mut scanner = scanner_expecting(serde_json::json!({
        "expectedPaths": ["/content/site"],
        "severity": "SEVERE"
    }));

    let reports = scanner.scan_packages(&[package("g:root:1")]).unwrap();
    assert_eq!(
        reports[1].violations[0].severity,
        vaultlint::core::report::Severity::Severe
    );
}

#[test]
fn state_resets_between_scans() {
    let mut scanner =
        scanner_expecting(serde_json::json!({"expectedPaths": ["/content/site"]}));

    let reports = scanner.scan_packages(&[package("g:root:1")]).unwrap();
    assert_eq!(reports[1].violations.len(), 1);

    // The second scan creates the path; the earlier miss must not leak.
    let mut root = package("g:root:1");
    root.imports.push(import("/content/site"));
    let reports = scanner.scan_packages(&[root]).unwrap();
    assert!(reports[1].violations.is_empty());
}
