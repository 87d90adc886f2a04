use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ci_bump::cli::{run_pipeline, PipelineArgs};
use ci_bump::config;
use ci_bump::domain::Stage;
use ci_bump::git::Git2Repository;
use ci_bump::manifest::ManifestType;
use ci_bump::ui;

#[derive(clap::Parser)]
#[command(
    name = "ci-bump",
    version,
    about = "Bump, write back, tag and report the version of a build artifact"
)]
struct Args {
    #[arg(help = "Path to the manifest file")]
    manifest_path: PathBuf,

    #[arg(help = "Deployment stage: dev, qa, staging or any other name")]
    stage: String,

    #[arg(
        value_name = "TYPE",
        help = "Manifest type: npm, maven, dotnet, koni or automation"
    )]
    manifest_type: String,

    #[arg(
        long,
        env = "CI_PIPELINE_ID",
        help = "Pipeline id appended as build metadata"
    )]
    pipeline_id: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ci_bump=info"));

    // stdout is reserved for result lines and the CI logging command
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let manifest_type: ManifestType = args.manifest_type.parse()?;
    let stage = Stage::parse(&args.stage);
    let config = config::load_config(args.config.as_deref())?;

    let repo = Git2Repository::open(".").context("Not in a git repository")?;

    let pipeline_args = PipelineArgs {
        manifest_path: args.manifest_path,
        stage,
        manifest_type,
        pipeline_id: args.pipeline_id,
        dry_run: args.dry_run,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_pipeline(&pipeline_args, &config, &repo, &mut out)?;

    Ok(())
}
