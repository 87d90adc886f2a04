use std::fmt;

/// Non-fatal conditions met during a pipeline run.
/// They are reported to the user but never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Dev run whose latest commit carries no bump marker
    NoBumpMarker { commit_hash: String },
    /// `CI_PIPELINE_ID` is unset or empty, so no build metadata is attached
    MissingPipelineId,
    /// A tag with the bare version name already existed and is replaced
    ReplacedTag { tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoBumpMarker { commit_hash } => {
                let short_hash = if commit_hash.len() > 7 {
                    &commit_hash[..7]
                } else {
                    commit_hash.as_str()
                };
                write!(
                    f,
                    "Commit {} has no [major], [minor] or [patch] marker; version is not incremented",
                    short_hash
                )
            }
            BoundaryWarning::MissingPipelineId => {
                write!(f, "CI_PIPELINE_ID is not set; no build metadata is attached")
            }
            BoundaryWarning::ReplacedTag { tag } => {
                write!(f, "Tag '{}' already exists and is replaced", tag)
            }
        }
    }
}
