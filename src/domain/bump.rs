use crate::domain::{Stage, Version, VersionBump};
use crate::error::{CiBumpError, Result};
use tracing::{debug, info};

/// Commit message markers in the order they are checked. First match wins.
pub const BUMP_MARKERS: [(&str, VersionBump); 3] = [
    ("[major]", VersionBump::Major),
    ("[minor]", VersionBump::Minor),
    ("[patch]", VersionBump::Patch),
];

/// Outcome of the bump decision for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpDecision {
    /// Version read from the manifest
    pub previous: Version,
    /// Version after applying the bump (equal to `previous` when none applies)
    pub version: Version,
    /// Bump that was applied, if any
    pub bump: Option<VersionBump>,
}

/// Find the bump directive in a commit message.
///
/// The message is case-folded before matching, so `[MINOR]` counts too.
pub fn directive_from_message(message: &str) -> Option<VersionBump> {
    let folded = message.to_lowercase();
    BUMP_MARKERS
        .iter()
        .find(|(marker, _)| folded.contains(marker))
        .map(|(_, bump)| *bump)
}

/// Decide the next version for a stage and the latest commit message.
///
/// Only the `dev` stage bumps. Without a marker the version stays as it is.
pub fn decide(stage: &Stage, current: Version, commit_message: &str) -> Result<BumpDecision> {
    if !stage.is_dev() {
        debug!(stage = %stage, "stage does not bump");
        return Ok(BumpDecision {
            previous: current,
            version: current,
            bump: None,
        });
    }

    let bump = directive_from_message(commit_message);
    let version = match &bump {
        Some(kind) => {
            let next = current.bump(kind)?;
            info!(bump = %kind, from = %current, to = %next, "applying version bump");
            next
        }
        None => current,
    };

    Ok(BumpDecision {
        previous: current,
        version,
        bump,
    })
}

/// Next value of the auxiliary build counter.
///
/// Any applied bump resets the counter to 0; otherwise it advances by one.
pub fn next_build_counter(prior: u64, bump: Option<VersionBump>) -> Result<u64> {
    match bump {
        Some(_) => Ok(0),
        None => prior
            .checked_add(1)
            .ok_or_else(|| CiBumpError::bump(format!("build counter {} cannot be incremented", prior))),
    }
}
