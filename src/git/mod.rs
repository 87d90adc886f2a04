//! Git operations abstraction layer
//!
//! The pipeline only needs a handful of repository operations: read the
//! latest commit, (re)create tags, commit the manifest change and push.
//! They are expressed by the [Repository] trait so the orchestration can run
//! against a real repository or a recording mock.
//!
//! - [repository::Git2Repository]: implementation on top of the `git2` crate
//! - [mock::MockRepository]: in-memory implementation that records every call

pub mod mock;
pub mod repository;

pub use mock::{MockRepository, RecordedAction};
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Object id of the commit
    pub oid: Oid,
    /// The commit message
    pub message: String,
    /// The commit author
    pub author: String,
}

impl CommitInfo {
    /// First seven hex digits of the commit id
    pub fn short_hash(&self) -> String {
        let hash = self.oid.to_string();
        hash[..7.min(hash.len())].to_string()
    }
}

/// Repository operations used by the pipeline
///
/// All methods return [crate::error::Result<T>]; implementations map
/// `git2::Error` and remote failures to [crate::error::CiBumpError] variants.
pub trait Repository {
    /// Latest commit (HEAD)
    fn head_commit(&self) -> Result<CommitInfo>;

    /// Short name of the checked out branch
    ///
    /// Fails when HEAD is detached, since there is no branch to push.
    fn current_branch(&self) -> Result<String>;

    /// Find a tag by name and get the object it points at
    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>>;

    /// Delete a local tag
    fn delete_tag(&self, tag_name: &str) -> Result<()>;

    /// Create an annotated tag on `target`
    ///
    /// With `force`, an existing tag of the same name is replaced.
    fn create_annotated_tag(&self, name: &str, target: Oid, message: &str, force: bool)
        -> Result<()>;

    /// Stage every working-tree change (additions, modifications, deletions)
    /// and commit it on the current branch
    fn commit_all(&self, message: &str) -> Result<Oid>;

    /// Push tags to a remote, replacing remote tags of the same name
    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()>;

    /// Push a local branch to the branch of the same name on a remote
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;
}
