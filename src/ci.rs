//! Reporting the computed version to the CI system
//!
//! The build number is announced with an Azure Pipelines logging command on
//! stdout and appended to a shared env file for later pipeline steps.

use crate::error::Result;
use crate::manifest::{ManifestType, RenderedVersion};
use crate::ui;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Logging command prefix that renames the running build
pub const UPDATE_BUILD_NUMBER: &str = "##vso[build.updatebuildnumber]";

/// Build numbers may not contain `+`, so build metadata is joined with `-`
pub fn build_number(release: &str) -> String {
    release.replace('+', "-")
}

/// Writes result lines and the build number for one run
pub struct CiReporter {
    env_file: PathBuf,
}

impl CiReporter {
    pub fn new(env_file: impl Into<PathBuf>) -> Self {
        CiReporter {
            env_file: env_file.into(),
        }
    }

    /// Print both renderings and, for types that report one, the build number.
    ///
    /// Returns the build number that was emitted. With `dry_run` the env file
    /// is left untouched.
    pub fn report<W: Write>(
        &self,
        out: &mut W,
        manifest_type: ManifestType,
        rendered: &RenderedVersion,
        dry_run: bool,
    ) -> Result<Option<String>> {
        writeln!(
            out,
            "{}",
            ui::version_line("New version without prerelease", &rendered.release)
        )?;
        writeln!(out, "{}", ui::version_line("New version", &rendered.full))?;

        if !manifest_type.reports_build_number() {
            return Ok(None);
        }

        let build = build_number(&rendered.release);
        writeln!(out, "{}{}", UPDATE_BUILD_NUMBER, build)?;

        if dry_run {
            info!(file = %self.env_file.display(), "dry run: build number not appended");
        } else {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.env_file)?;
            file.write_all(build.as_bytes())?;
            info!(file = %self.env_file.display(), build = %build, "appended build number");
        }

        Ok(Some(build))
    }
}
