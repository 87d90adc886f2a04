// tests/cli_test.rs
use git2::Repository;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn setup_test_repo(files: &[(&str, &str)], message: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init(temp_dir.path()).expect("Could not init git repo");
    {
        let mut config = repo.config().expect("Could not get config");
        config
            .set_str("user.name", "Test User")
            .expect("Could not set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Could not set user.email");
    }

    let mut index = repo.index().expect("Could not get index");
    for (name, content) in files {
        fs::write(temp_dir.path().join(name), content).expect("Could not write file");
        index
            .add_path(Path::new(name))
            .expect("Could not add file to index");
    }
    index.write().expect("Could not write index");
    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let sig = repo.signature().expect("Could not get sig");
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
        .expect("Could not create commit");

    temp_dir
}

fn ci_bump(dir: &Path, args: &[&str], pipeline_id: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ci-bump"));
    command.current_dir(dir).args(args).env_remove("CI_PIPELINE_ID");
    if let Some(id) = pipeline_id {
        command.env("CI_PIPELINE_ID", id);
    }
    command.output().expect("Could not run ci-bump")
}

#[test]
fn test_qa_stage_reports_build_number() {
    let dir = setup_test_repo(&[("package.json", r#"{"version":"1.0.0"}"#)], "feat: x [major]");

    let output = ci_bump(dir.path(), &["package.json", "qa", "npm"], Some("77"));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("New version without prerelease: 1.0.0+77"));
    assert!(stdout.contains("New version: 1.0.0-beta+77"));
    assert!(stdout.contains("##vso[build.updatebuildnumber]1.0.0-77"));
    assert_eq!(
        fs::read_to_string(dir.path().join("build.env")).unwrap(),
        "1.0.0-77"
    );
    // qa never rewrites the manifest
    assert_eq!(
        fs::read_to_string(dir.path().join("package.json")).unwrap(),
        r#"{"version":"1.0.0"}"#
    );
}

#[test]
fn test_invalid_version_exits_with_failure() {
    let original = r#"{"version":"1.2"}"#;
    let dir = setup_test_repo(&[("package.json", original)], "fix: y [patch]");

    let output = ci_bump(dir.path(), &["package.json", "dev", "npm"], Some("5"));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().contains("1.2"));
    assert_eq!(
        fs::read_to_string(dir.path().join("package.json")).unwrap(),
        original
    );
    assert!(!dir.path().join("build.env").exists());
}

#[test]
fn test_unknown_manifest_type_exits_with_failure() {
    let dir = setup_test_repo(&[("package.json", r#"{"version":"1.0.0"}"#)], "init");

    let output = ci_bump(dir.path(), &["package.json", "dev", "gradle"], Some("5"));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().contains("gradle"));
}

#[test]
fn test_missing_manifest_exits_with_failure() {
    let dir = setup_test_repo(&[("README.md", "# readme")], "init");

    let output = ci_bump(dir.path(), &["pom.xml", "staging", "maven"], Some("5"));

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_dry_run_on_dev_changes_nothing() {
    let original = "version=2.0.0\nandroid.versioncode=3\nios.bundleversion=3\n";
    let dir = setup_test_repo(&[("app.properties", original)], "feat: z [minor]");

    let output = ci_bump(
        dir.path(),
        &["app.properties", "dev", "koni", "--dry-run"],
        None,
    );

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("New version without prerelease: 2.1.0+0"));
    assert!(!stdout.contains("##vso"));
    assert_eq!(
        fs::read_to_string(dir.path().join("app.properties")).unwrap(),
        original
    );
    let repo = Repository::open(dir.path()).unwrap();
    assert!(repo.tag_names(None).unwrap().is_empty());
}

#[test]
fn test_custom_config_moves_env_file() {
    let dir = setup_test_repo(&[("package.json", r#"{"version":"4.5.6"}"#)], "chore: ci");
    let config_path = dir.path().join("custom.toml");
    fs::write(&config_path, "build_env_file = \"out/ci.env\"\n").unwrap();
    fs::create_dir(dir.path().join("out")).unwrap();

    let output = ci_bump(
        dir.path(),
        &[
            "package.json",
            "prod",
            "npm",
            "--config",
            config_path.to_str().unwrap(),
        ],
        Some("9"),
    );

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("out/ci.env")).unwrap(),
        "4.5.6-9"
    );
    assert!(!dir.path().join("build.env").exists());
}
