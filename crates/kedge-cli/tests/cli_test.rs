use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn kedge() -> assert_cmd::Command {
    cargo_bin_cmd!("kedge")
}

/// Failures print exactly one diagnostic line on stdout.
fn single_line(stdout: &[u8]) -> String {
    let text = String::from_utf8(stdout.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 1, "expected one line, got {text:?}");
    text
}

fn read_yaml(path: &std::path::Path) -> serde_yaml::Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&content).unwrap()
}

// ── Help / Version ──

#[test]
fn shows_help() {
    kedge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"));
}

#[test]
fn init_help_lists_flags() {
    kedge()
        .args(["init", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--controller"))
        .stdout(predicate::str::contains("--ports"))
        .stdout(predicate::str::contains("kedge.yml"));
}

#[test]
fn shows_version() {
    kedge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kedge"));
}

// ── Init: success ──

#[test]
fn init_with_explicit_ports() {
    let tmp = TempDir::new().unwrap();

    kedge()
        .current_dir(tmp.path())
        .args(["init", "-n", "web", "-i", "nginx:1.25", "-p", "80,443"])
        .assert()
        .success()
        .stdout(predicate::str::contains("file kedge.yml created"));

    let doc = read_yaml(&tmp.path().join("kedge.yml"));
    assert_eq!(doc["name"], "web");
    assert_eq!(doc["containers"][0]["image"], "nginx:1.25");
    assert_eq!(doc["containers"].as_sequence().unwrap().len(), 1);
    assert_eq!(doc["services"][0]["portMappings"][0], "80");
    assert_eq!(doc["services"][0]["portMappings"][1], "443");
    assert!(doc.get("controller").is_none());
}

#[test]
fn init_reads_expose_from_dockerfile() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("Dockerfile"),
        "FROM node:20\nEXPOSE 80\nCOPY . /app\nEXPOSE 3000/tcp 9229\n",
    )
    .unwrap();

    kedge()
        .current_dir(tmp.path())
        .args(["init", "--name", "api", "--image", "api:dev", "--controller", "job"])
        .assert()
        .success();

    let doc = read_yaml(&tmp.path().join("kedge.yml"));
    assert_eq!(doc["controller"], "job");
    let ports = doc["services"][0]["portMappings"].as_sequence().unwrap();
    assert_eq!(ports.len(), 2);
    assert_eq!(ports[0], "3000/tcp");
    assert_eq!(ports[1], "9229");
}

#[test]
fn init_writes_custom_output_path() {
    let tmp = TempDir::new().unwrap();

    kedge()
        .current_dir(tmp.path())
        .args(["init", "-o", "web.yaml", "-n", "web", "-i", "nginx", "-p", "8080"])
        .assert()
        .success()
        .stdout(predicate::str::contains("file web.yaml created"));

    assert!(tmp.path().join("web.yaml").exists());
    assert!(!tmp.path().join("kedge.yml").exists());
}

#[test]
fn init_with_custom_dockerfile_flag() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("prod.Dockerfile"), "FROM nginx\nEXPOSE 8443\n").unwrap();

    kedge()
        .current_dir(tmp.path())
        .args(["init", "-n", "web", "-i", "nginx", "-f", "prod.Dockerfile"])
        .assert()
        .success();

    let doc = read_yaml(&tmp.path().join("kedge.yml"));
    assert_eq!(doc["services"][0]["portMappings"][0], "8443");
}

// ── Init: failures ──

#[test]
fn init_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("kedge.yml"), "original").unwrap();

    let assert = kedge()
        .current_dir(tmp.path())
        .args(["init", "-n", "web", "-i", "nginx", "-p", "80"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("already present"));
    single_line(&assert.get_output().stdout);

    let content = std::fs::read_to_string(tmp.path().join("kedge.yml")).unwrap();
    assert_eq!(content, "original");
}

#[test]
fn init_requires_name_and_image() {
    let tmp = TempDir::new().unwrap();

    let assert = kedge()
        .current_dir(tmp.path())
        .args(["init", "-i", "nginx", "-p", "80"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("mandatory"));
    single_line(&assert.get_output().stdout);

    assert!(!tmp.path().join("kedge.yml").exists());
}

#[test]
fn init_rejects_unknown_controller() {
    let tmp = TempDir::new().unwrap();

    let assert = kedge()
        .current_dir(tmp.path())
        .args(["init", "-n", "web", "-i", "nginx", "-p", "80", "-c", "cronjob"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Deployment, Job, DeploymentConfig"));
    single_line(&assert.get_output().stdout);

    assert!(!tmp.path().join("kedge.yml").exists());
}

#[test]
fn init_without_ports_or_dockerfile_fails() {
    let tmp = TempDir::new().unwrap();

    let assert = kedge()
        .current_dir(tmp.path())
        .args(["init", "-n", "web", "-i", "nginx"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Dockerfile is not present"));
    single_line(&assert.get_output().stdout);
}

#[test]
fn init_reports_dockerfile_parse_failure() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Dockerfile"), "# escape=?\nFROM nginx\n").unwrap();

    let assert = kedge()
        .current_dir(tmp.path())
        .args(["init", "-n", "web", "-i", "nginx"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed to parse Dockerfile"))
        .stdout(predicate::str::contains("invalid escape token"));
    single_line(&assert.get_output().stdout);
}

#[test]
fn init_parse_failure_is_one_line_with_cause() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Dockerfile"), "# just a comment\n").unwrap();

    let assert = kedge()
        .current_dir(tmp.path())
        .args(["init", "-n", "web", "-i", "nginx"])
        .assert()
        .failure()
        .code(1);

    let line = single_line(&assert.get_output().stdout);
    assert_eq!(
        line.trim_end(),
        "failed to parse Dockerfile at Dockerfile: file with no instructions"
    );
    assert!(!tmp.path().join("kedge.yml").exists());
}
