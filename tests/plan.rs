use std::fs;
use tempfile::TempDir;
use vaultlint::core::package::Package;
use vaultlint::core::plan::ScanPlan;

#[test]
fn plan_file_drives_a_full_scan() {
    let dir = TempDir::new().unwrap();

    fs::write(
        dir.path().join("base.json"),
        r#"{
            "id": "g:base:1",
            "imports": [{"path": "/libs/base"}]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("plan.json"),
        r#"{
            "initStage": {"forcedRoots": [{"path": "/content"}]},
            "preinstallPackages": ["base.json"],
            "checks": [
                {"name": "expect-paths",
                 "alias": "required-paths",
                 "config": {"expectedPaths": ["/libs/base", "/content/site"]}}
            ]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("app.json"),
        r#"{
            "id": "g:app:1",
            "imports": [{"path": "/apps/app", "primaryType": "sling:Folder"}]
        }"#,
    )
    .unwrap();

    let plan = ScanPlan::from_file(&dir.path().join("plan.json")).unwrap();
    let mut scanner = plan.build_scanner().unwrap();
    let app = Package::from_file(&dir.path().join("app.json")).unwrap();

    let reports = scanner.scan_packages(&[app]).unwrap();

    // Listener first, then the aliased check.
    assert_eq!(reports[0].check_name, "DefaultErrorListener");
    assert!(reports[0].violations.is_empty());
    assert_eq!(reports[1].check_name, "required-paths");

    // The preinstalled path satisfied its expectation without being blamed;
    // nothing created /content/site.
    assert_eq!(reports[1].violations.len(), 1);
    assert!(reports[1].violations[0].description.contains("/content/site"));
}

#[test]
fn preinstall_paths_resolve_relative_to_the_plan_file() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("plans");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("base.json"), r#"{"id": "g:base:1"}"#).unwrap();
    fs::write(
        nested.join("plan.json"),
        r#"{"preinstallPackages": ["base.json"]}"#,
    )
    .unwrap();

    let plan = ScanPlan::from_file(&nested.join("plan.json")).unwrap();
    assert!(plan.build_scanner().is_ok());
}

#[test]
fn missing_preinstall_package_is_a_plan_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("plan.json"),
        r#"{"preinstallPackages": ["nope.json"]}"#,
    )
    .unwrap();

    let plan = ScanPlan::from_file(&dir.path().join("plan.json")).unwrap();
    assert!(plan.build_scanner().is_err());
}

#[test]
fn package_descriptors_record_their_file_reference() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{"id": "g:app:1", "valid": false}"#).unwrap();

    let package = Package::from_file(&path).unwrap();
    let mut scanner = ScanPlan::default().build_scanner().unwrap();
    let error = scanner.scan_packages(&[package]).unwrap_err();
    assert!(error.to_string().contains("app.json"));
    assert!(error.to_string().starts_with("(Failed package: "));
}
