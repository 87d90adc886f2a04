// tests/pipeline_test.rs
use ci_bump::cli::{run_pipeline, PipelineArgs};
use ci_bump::config::Config;
use ci_bump::domain::Stage;
use ci_bump::git::Git2Repository;
use ci_bump::manifest::ManifestType;
use git2::Repository;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    work: TempDir,
    remote: TempDir,
    env_dir: TempDir,
}

// Working repository with one commit containing `file`, and a bare `origin`
fn setup(file: &str, content: &str, message: &str) -> Fixture {
    let work = TempDir::new().expect("Could not create temp dir");
    let remote = TempDir::new().expect("Could not create temp dir");
    let env_dir = TempDir::new().expect("Could not create temp dir");

    Repository::init_bare(remote.path()).expect("Could not init bare repo");
    let repo = Repository::init(work.path()).expect("Could not init git repo");
    {
        let mut config = repo.config().expect("Could not get config");
        config
            .set_str("user.name", "Test User")
            .expect("Could not set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Could not set user.email");
    }
    repo.remote("origin", remote.path().to_str().expect("utf-8 temp path"))
        .expect("Could not add remote");

    fs::write(work.path().join(file), content).expect("Could not write manifest");
    let mut index = repo.index().expect("Could not get index");
    index
        .add_path(Path::new(file))
        .expect("Could not add file to index");
    index.write().expect("Could not write index");
    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let sig = repo.signature().expect("Could not get sig");
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
        .expect("Could not create commit");

    Fixture {
        work,
        remote,
        env_dir,
    }
}

fn config_for(fixture: &Fixture) -> Config {
    Config {
        build_env_file: fixture.env_dir.path().join("build.env"),
        ..Config::default()
    }
}

fn args(fixture: &Fixture, file: &str, stage: Stage, manifest_type: ManifestType) -> PipelineArgs {
    PipelineArgs {
        manifest_path: fixture.work.path().join(file),
        stage,
        manifest_type,
        pipeline_id: Some("812".to_string()),
        dry_run: false,
    }
}

#[test]
fn test_dev_run_tags_commits_and_pushes() {
    let fixture = setup(
        "package.json",
        "{\n  \"name\": \"web\",\n  \"version\": \"2.3.7\"\n}\n",
        "fix: stuff [minor]",
    );
    let repo = Git2Repository::open(fixture.work.path()).unwrap();
    let initial_head = Repository::open(fixture.work.path())
        .unwrap()
        .head()
        .unwrap()
        .target()
        .unwrap();
    let mut out = Vec::new();

    let result = run_pipeline(
        &args(&fixture, "package.json", Stage::Dev, ManifestType::Npm),
        &config_for(&fixture),
        &repo,
        &mut out,
    )
    .expect("pipeline should succeed");

    assert_eq!(result.version.to_string(), "2.4.0");

    let remote = Repository::open_bare(fixture.remote.path()).unwrap();

    // both tags reached the remote and point at the commit that was HEAD;
    // the bare tag names the version the manifest held before the bump
    for tag in ["2.4.0+812", "2.3.7"] {
        let reference = remote
            .find_reference(&format!("refs/tags/{}", tag))
            .unwrap_or_else(|_| panic!("tag {} should be pushed", tag));
        let target = reference.peel_to_commit().unwrap().id();
        assert_eq!(target, initial_head);
    }
    assert!(remote.find_reference("refs/tags/2.4.0").is_err());

    // the version commit reached the remote branch and carries the manifest change
    let local = Repository::open(fixture.work.path()).unwrap();
    let branch = local.head().unwrap().shorthand().unwrap().to_string();
    let pushed = remote
        .find_reference(&format!("refs/heads/{}", branch))
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(
        pushed.message().unwrap(),
        "ci: Version updated to 2.4.0-alpha+812 [skip ci]"
    );
    assert_eq!(pushed.parent_id(0).unwrap(), initial_head);

    let entry = pushed
        .tree()
        .unwrap()
        .get_path(Path::new("package.json"))
        .unwrap();
    let blob = remote.find_blob(entry.id()).unwrap();
    let content = std::str::from_utf8(blob.content()).unwrap();
    assert!(content.contains("\"version\": \"2.4.0+812\""));

    let stdout = String::from_utf8(out).unwrap();
    assert!(stdout.contains("##vso[build.updatebuildnumber]2.4.0-812"));
    assert_eq!(
        fs::read_to_string(fixture.env_dir.path().join("build.env")).unwrap(),
        "2.4.0-812"
    );
}

#[test]
fn test_dev_run_replaces_existing_bare_tag() {
    let fixture = setup(
        "app.properties",
        "version=3.1.2\nandroid.versioncode=14\nios.bundleversion=14\n",
        "fix: crash on start",
    );
    let local = Repository::open(fixture.work.path()).unwrap();
    let head = local.head().unwrap().peel_to_commit().unwrap();
    let sig = local.signature().unwrap();
    local
        .tag("3.1.2", head.as_object(), &sig, "older build", false)
        .unwrap();

    let repo = Git2Repository::open(fixture.work.path()).unwrap();
    let result = run_pipeline(
        &args(&fixture, "app.properties", Stage::Dev, ManifestType::Koni),
        &config_for(&fixture),
        &repo,
        &mut Vec::new(),
    )
    .expect("pipeline should succeed");

    assert_eq!(result.build_counter, Some(15));
    assert_eq!(result.rendered.release, "3.1.2+15");

    let tag = local
        .find_reference("refs/tags/3.1.2")
        .unwrap()
        .peel_to_tag()
        .unwrap();
    assert_eq!(tag.message().unwrap().trim(), "Version 3.1.2+15");

    let remote = Repository::open_bare(fixture.remote.path()).unwrap();
    assert!(remote.find_reference("refs/tags/3.1.2+15").is_ok());

    assert_eq!(
        fs::read_to_string(fixture.work.path().join("app.properties")).unwrap(),
        "version=3.1.2\nandroid.versioncode=15\nios.bundleversion=15\n"
    );
    // koni does not report a CI build number
    assert!(!fixture.env_dir.path().join("build.env").exists());
}

#[test]
fn test_staging_run_leaves_repository_untouched() {
    let fixture = setup(
        "pom.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <artifactId>api</artifactId>
  <version>1.0.0</version>
</project>
"#,
        "feat: breaking [major]",
    );
    let before = fs::read_to_string(fixture.work.path().join("pom.xml")).unwrap();
    let repo = Git2Repository::open(fixture.work.path()).unwrap();
    let mut out = Vec::new();

    let result = run_pipeline(
        &args(&fixture, "pom.xml", Stage::Staging, ManifestType::Maven),
        &config_for(&fixture),
        &repo,
        &mut out,
    )
    .expect("pipeline should succeed");

    assert_eq!(result.rendered.full, "1.0.0-rc+812");
    assert_eq!(
        fs::read_to_string(fixture.work.path().join("pom.xml")).unwrap(),
        before
    );

    let local = Repository::open(fixture.work.path()).unwrap();
    assert!(local.tag_names(None).unwrap().is_empty());
    let remote = Repository::open_bare(fixture.remote.path()).unwrap();
    assert!(remote.tag_names(None).unwrap().is_empty());
    assert!(remote.references().unwrap().next().is_none());

    let stdout = String::from_utf8(out).unwrap();
    assert!(stdout.contains("New version: 1.0.0-rc+812"));
}
