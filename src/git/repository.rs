use crate::error::{CiBumpError, Result};
use crate::git::CommitInfo;
use git2::{Cred, CredentialType, IndexAddOption, Oid, PushOptions, RemoteCallbacks, Signature};
use std::path::Path;
use tracing::{debug, info};

/// Identity used for tags and commits when the repository config has none
const FALLBACK_NAME: &str = "ci-bump";
const FALLBACK_EMAIL: &str = "ci-bump@localhost";

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: git2::Repository,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: git2::Repository) -> Self {
        Git2Repository { repo }
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
        }
    }

    fn push_refspecs(&self, remote_name: &str, refspecs: &[String]) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|e| CiBumpError::remote(format!("Cannot find remote '{}': {}", remote_name, e)))?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(CredentialType::SSH_KEY) {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = Path::new(&home).join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }

                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            Cred::default()
        });

        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();
        debug!(remote = remote_name, refspecs = ?refspec_strs, "pushing");

        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    CiBumpError::remote(format!("Network error during push: {}", e))
                } else {
                    CiBumpError::remote(format!("Push to '{}' failed: {}", remote_name, e))
                }
            })?;

        Ok(())
    }
}

impl super::Repository for Git2Repository {
    fn head_commit(&self) -> Result<CommitInfo> {
        let commit = self.repo.head()?.peel_to_commit()?;

        let message = commit.message().unwrap_or("").to_string();
        let author = commit.author().name().unwrap_or("unknown").to_string();

        Ok(CommitInfo {
            oid: commit.id(),
            message,
            author,
        })
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(CiBumpError::remote(
                "HEAD is detached; no branch to push the version commit to",
            ));
        }

        head.shorthand()
            .map(|name| name.to_string())
            .ok_or_else(|| CiBumpError::remote("Branch name is not valid UTF-8"))
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        let reference_name = format!("refs/tags/{}", tag_name);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                let oid = reference
                    .peel(git2::ObjectType::Any)
                    .map_err(|e| CiBumpError::tag(format!("Cannot peel tag: {}", e)))?
                    .id();

                Ok(Some(oid))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(CiBumpError::tag(format!(
                "Cannot find tag '{}': {}",
                tag_name, e
            ))),
        }
    }

    fn delete_tag(&self, tag_name: &str) -> Result<()> {
        self.repo
            .tag_delete(tag_name)
            .map_err(|e| CiBumpError::tag(format!("Cannot delete tag '{}': {}", tag_name, e)))?;
        info!(tag = tag_name, "deleted existing tag");
        Ok(())
    }

    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        message: &str,
        force: bool,
    ) -> Result<()> {
        let object = self
            .repo
            .find_object(target, None)
            .map_err(|e| CiBumpError::tag(format!("Cannot find object: {}", e)))?;
        let tagger = self.signature()?;

        self.repo
            .tag(name, &object, &tagger, message, force)
            .map_err(|e| CiBumpError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        info!(tag = name, target = %target, "created tag");
        Ok(())
    }

    fn commit_all(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = self.repo.head()?.peel_to_commit()?;
        let signature = self.signature()?;

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;

        info!(commit = %oid, "committed version update");
        Ok(oid)
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        let refspecs: Vec<String> = tag_names
            .iter()
            .map(|tag| format!("+refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();

        self.push_refspecs(remote, &refspecs)?;
        info!(remote, tags = ?tag_names, "pushed tags");
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);

        self.push_refspecs(remote, &[refspec])?;
        info!(remote, branch, "pushed branch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use tempfile::tempdir;

    fn init_repo(dir: &Path) -> git2::Repository {
        let repo = git2::Repository::init(dir).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test Author").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        std::fs::write(dir.join("README.md"), "hello\n").unwrap();
        {
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("README.md")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = repo.signature().unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "feat: initial [minor]", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_head_commit() {
        let dir = tempdir().unwrap();
        let repo = Git2Repository::from_git2(init_repo(dir.path()));

        let head = repo.head_commit().unwrap();
        assert_eq!(head.message, "feat: initial [minor]");
        assert_eq!(head.author, "Test Author");
    }

    #[test]
    fn test_tag_lifecycle() {
        let dir = tempdir().unwrap();
        let repo = Git2Repository::from_git2(init_repo(dir.path()));
        let head = repo.head_commit().unwrap();

        repo.create_annotated_tag("1.0.0", head.oid, "Version 1.0.0", false)
            .unwrap();
        assert_eq!(repo.find_tag_oid("1.0.0").unwrap(), Some(head.oid));

        // a second non-forced create of the same name fails
        assert!(repo
            .create_annotated_tag("1.0.0", head.oid, "again", false)
            .is_err());
        repo.create_annotated_tag("1.0.0", head.oid, "again", true)
            .unwrap();

        repo.delete_tag("1.0.0").unwrap();
        assert_eq!(repo.find_tag_oid("1.0.0").unwrap(), None);
    }

    #[test]
    fn test_commit_all_picks_up_changes() {
        let dir = tempdir().unwrap();
        let repo = Git2Repository::from_git2(init_repo(dir.path()));
        let before = repo.head_commit().unwrap();

        std::fs::write(dir.path().join("README.md"), "changed\n").unwrap();
        std::fs::write(dir.path().join("new.txt"), "new\n").unwrap();
        let oid = repo.commit_all("ci: Version updated to 1.1.0 [skip ci]").unwrap();

        let head = repo.head_commit().unwrap();
        assert_eq!(head.oid, oid);
        assert_ne!(head.oid, before.oid);
        assert_eq!(head.message, "ci: Version updated to 1.1.0 [skip ci]");
    }

    #[test]
    fn test_current_branch() {
        let dir = tempdir().unwrap();
        let repo = Git2Repository::from_git2(init_repo(dir.path()));
        assert!(!repo.current_branch().unwrap().is_empty());
    }

    #[test]
    fn test_push_to_missing_remote() {
        let dir = tempdir().unwrap();
        let repo = Git2Repository::from_git2(init_repo(dir.path()));

        let err = repo.push_tags("origin", &["1.0.0"]).unwrap_err();
        assert!(matches!(err, CiBumpError::Remote(_)));
    }
}
