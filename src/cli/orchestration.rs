//! Main pipeline orchestration logic
//!
//! One run reads the manifest, decides the next version, and on the `dev`
//! stage writes it back, tags the latest commit, commits the manifest change
//! and pushes everything. Every stage ends with the CI report.

use std::io::Write;
use std::path::PathBuf;

use git2::Oid;
use tracing::{debug, info, warn};

use crate::boundary::BoundaryWarning;
use crate::ci::CiReporter;
use crate::config::Config;
use crate::domain::{bump, Stage, TagPlan, Version, VersionBump};
use crate::error::Result;
use crate::git::{CommitInfo, Repository};
use crate::manifest::{ManifestType, ManifestUpdate, RenderedVersion};
use crate::ui;

/// Arguments for one pipeline run
///
/// Mirrors the CLI arguments in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineArgs {
    /// Manifest file to read (and on dev, rewrite)
    pub manifest_path: PathBuf,

    /// Deployment stage
    pub stage: Stage,

    /// Manifest syntax
    pub manifest_type: ManifestType,

    /// CI pipeline id used as build metadata
    pub pipeline_id: Option<String>,

    /// Compute and print only; no file, tag, commit or push side effects
    pub dry_run: bool,
}

/// Result of a successful pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Version read from the manifest
    pub previous: Version,

    /// Version after the bump decision
    pub version: Version,

    /// Applied bump, if any
    pub bump: Option<VersionBump>,

    /// Both renderings of `version`
    pub rendered: RenderedVersion,

    /// Next auxiliary build counter (koni)
    pub build_counter: Option<u64>,

    /// Whether the manifest file was rewritten
    pub manifest_written: bool,

    /// Tags created and pushed
    pub tags: Option<TagPlan>,

    /// Version commit created and pushed
    pub commit: Option<Oid>,

    /// Build number reported to CI
    pub build_number: Option<String>,
}

/// Run the pipeline against a repository.
///
/// Result lines and the CI logging command are written to `out`.
/// Any error aborts the run; nothing already done is rolled back.
pub fn run_pipeline<R: Repository, W: Write>(
    args: &PipelineArgs,
    config: &Config,
    repo: &R,
    out: &mut W,
) -> Result<PipelineResult> {
    let format = args.manifest_type.format();

    let data = format.read(&args.manifest_path)?;
    debug!(
        manifest = %args.manifest_path.display(),
        version = %data.version,
        counter = ?data.build_counter,
        "read manifest"
    );

    let current = Version::parse(&data.version)?;
    let head = repo.head_commit()?;
    info!(
        stage = %args.stage,
        manifest_type = %args.manifest_type,
        current = %current,
        commit = %head.short_hash(),
        author = %head.author,
        "computing version"
    );

    let decision = bump::decide(&args.stage, current, &head.message)?;
    if args.stage.is_dev() && decision.bump.is_none() {
        warn!("no bump marker in latest commit");
        ui::display_boundary_warning(&BoundaryWarning::NoBumpMarker {
            commit_hash: head.oid.to_string(),
        });
    }

    let pipeline_id = args
        .pipeline_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    if pipeline_id.is_none() && args.manifest_type != ManifestType::Koni {
        ui::display_boundary_warning(&BoundaryWarning::MissingPipelineId);
    }

    let build_counter = data
        .build_counter
        .map(|prior| bump::next_build_counter(prior, decision.bump))
        .transpose()?;

    let rendered = args.manifest_type.render(
        &decision.version,
        &args.stage,
        pipeline_id,
        build_counter,
    )?;

    let mut result = PipelineResult {
        previous: decision.previous,
        version: decision.version,
        bump: decision.bump,
        rendered,
        build_counter,
        manifest_written: false,
        tags: None,
        commit: None,
        build_number: None,
    };

    if args.stage.is_dev() {
        // the bare tag carries the version read from the manifest, not the bumped one
        let plan = TagPlan::new(
            &result.rendered.release,
            &result.previous.to_string(),
            &config.tag_pattern(),
            data.app.as_ref(),
        );

        if args.dry_run {
            ui::display_status(&format!(
                "Dry run: would write {} to {}",
                args.manifest_type.written_version(&result.rendered),
                args.manifest_path.display()
            ));
            ui::display_status(&format!(
                "Dry run: would tag {} and push to {}",
                plan.names().join(", "),
                config.remote
            ));
        } else {
            let branch = repo.current_branch()?;

            let update = ManifestUpdate {
                version: args
                    .manifest_type
                    .written_version(&result.rendered)
                    .to_string(),
                build_counter,
            };
            format.write(&args.manifest_path, &update)?;
            result.manifest_written = true;
            ui::display_success(&format!("New version: {}", result.rendered.release));

            let commit = publish(repo, config, &plan, &head, &branch, &result.rendered)?;
            result.tags = Some(plan);
            result.commit = Some(commit);
        }
    }

    let reporter = CiReporter::new(&config.build_env_file);
    result.build_number = reporter.report(out, args.manifest_type, &result.rendered, args.dry_run)?;

    Ok(result)
}

/// Tag the latest commit, push the tags, commit the working tree and push the branch
fn publish<R: Repository>(
    repo: &R,
    config: &Config,
    plan: &TagPlan,
    head: &CommitInfo,
    branch: &str,
    rendered: &RenderedVersion,
) -> Result<Oid> {
    if repo.find_tag_oid(&plan.bare)?.is_some() {
        ui::display_boundary_warning(&BoundaryWarning::ReplacedTag {
            tag: plan.bare.clone(),
        });
        repo.delete_tag(&plan.bare)?;
    }

    repo.create_annotated_tag(&plan.name, head.oid, &plan.message, true)?;
    if plan.bare != plan.name {
        repo.create_annotated_tag(&plan.bare, head.oid, &plan.message, false)?;
    }
    repo.push_tags(&config.remote, &plan.names())?;
    ui::display_success(&format!(
        "Pushed tags {} to {}",
        plan.names().join(", "),
        config.remote
    ));

    let message = config.commit_pattern().format(&rendered.full);
    let commit = repo.commit_all(&message)?;
    repo.push_branch(&config.remote, branch)?;
    ui::display_success(&format!("Pushed {} to {}/{}", message, config.remote, branch));

    Ok(commit)
}
