use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn apexguard() -> Command {
    Command::new(cargo::cargo_bin!("apexguard"))
}

fn write_sample_tree(dir: &std::path::Path) {
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(
        dir.join("src/Svc.cls"),
        "public class Svc {\n    void log() {\n        System.debug('x');\n    }\n}\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("src/Query.cls"),
        "public with sharing class Query {\n    void run(String userInput) {\n        List<Account> rows = Database.query(baseQuery + userInput);\n    }\n}\n",
    )
    .unwrap();
}

#[test]
fn scan_reports_violations_and_writes_receipt() {
    let td = TempDir::new().expect("temp");
    let dir = td.path();
    write_sample_tree(dir);

    apexguard()
        .current_dir(dir)
        .args(["scan", "--directory", "src"])
        .args(["--output", "report.html"])
        .args(["--json", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scanned 2 file(s)"));

    let html = std::fs::read_to_string(dir.join("report.html")).unwrap();
    assert!(html.contains("Salesforce Apex Static Analysis Report"));
    assert!(html.contains("ApexSharingViolation"));
    assert!(html.contains("ApexSOQLInjection"));

    let receipt: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(receipt["schema"], "apexguard.scan.v1");
    assert_eq!(receipt["stats"]["files_scanned"], 2);
    assert_eq!(receipt["stats"]["fixed_violations"], 0);
    assert!(receipt["stats"]["total_violations"].as_u64().unwrap() >= 3);
}

#[test]
fn scan_with_fix_rewrites_files_and_rollback_restores_them() {
    let td = TempDir::new().expect("temp");
    let dir = td.path();
    write_sample_tree(dir);
    let original = std::fs::read_to_string(dir.join("src/Svc.cls")).unwrap();

    apexguard()
        .current_dir(dir)
        .args(["scan", "--directory", "src", "--fix"])
        .args(["--output", "report.html"])
        .args(["--backup-dir", "backups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Auto-fix:"));

    let fixed = std::fs::read_to_string(dir.join("src/Svc.cls")).unwrap();
    assert!(fixed.contains("public with sharing class Svc"));
    assert!(fixed.contains("// System.debug('x');"));

    let html = std::fs::read_to_string(dir.join("report.html")).unwrap();
    assert!(html.contains("Auto-Fixed"));
    assert!(html.contains("with sharing"));

    apexguard()
        .current_dir(dir)
        .args(["rollback", "src/Svc.cls", "--backup-dir", "backups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored"));

    assert_eq!(
        std::fs::read_to_string(dir.join("src/Svc.cls")).unwrap(),
        original
    );
}

#[test]
fn rollback_without_backup_is_reported_not_fatal() {
    let td = TempDir::new().expect("temp");
    let dir = td.path();
    write_sample_tree(dir);

    apexguard()
        .current_dir(dir)
        .args(["rollback", "src/Svc.cls", "--backup-dir", "backups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backup found"));
}

#[test]
fn scan_missing_directory_fails() {
    let td = TempDir::new().expect("temp");

    apexguard()
        .current_dir(td.path())
        .args(["scan", "--directory", "no_such_dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn rules_lists_every_built_in_rule() {
    apexguard()
        .args(["rules"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("AvoidDebugStatements")
                .and(predicate::str::contains("NoTrailingWhitespace"))
                .and(predicate::str::contains("ApexSharingViolation"))
                .and(predicate::str::contains("ApexCRUDViolation"))
                .and(predicate::str::contains("ApexSOQLInjection"))
                .and(predicate::str::contains("CognitiveComplexity")),
        );
}

#[test]
fn explain_unknown_rule_suggests_candidates() {
    apexguard()
        .args(["explain", "ApexSharing"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("not found")
                .and(predicate::str::contains("ApexSharingViolation")),
        );
}

#[test]
fn complexity_threshold_flag_changes_detection() {
    let td = TempDir::new().expect("temp");
    let dir = td.path();
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(
        dir.join("src/Branchy.cls"),
        "public with sharing class Branchy {\n    public static void route(Integer n) {\n        if (n > 0) {\n            if (n > 1) {\n                doA();\n            }\n        }\n    }\n}\n",
    )
    .unwrap();

    apexguard()
        .current_dir(dir)
        .args(["scan", "--directory", "src"])
        .args(["--output", "default.html"])
        .args(["--json", "default.json"])
        .assert()
        .success();
    let default_receipt: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("default.json")).unwrap()).unwrap();
    assert!(default_receipt["stats"]["by_rule"]
        .get("CognitiveComplexity")
        .is_none());

    apexguard()
        .current_dir(dir)
        .args(["scan", "--directory", "src", "--complexity-threshold", "0"])
        .args(["--output", "strict.html"])
        .args(["--json", "strict.json"])
        .assert()
        .success();
    let strict_receipt: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("strict.json")).unwrap()).unwrap();
    assert_eq!(strict_receipt["stats"]["by_rule"]["CognitiveComplexity"], 1);
}
