use crate::error::{CiBumpError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A side effect performed against a [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    DeleteTag(String),
    CreateTag {
        name: String,
        message: String,
        force: bool,
    },
    Commit(String),
    PushTags {
        remote: String,
        tags: Vec<String>,
    },
    PushBranch {
        remote: String,
        branch: String,
    },
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    head: CommitInfo,
    branch: Option<String>,
    tags: RefCell<HashMap<String, Oid>>,
    actions: RefCell<Vec<RecordedAction>>,
    fail_push: Cell<bool>,
    next_commit: Cell<u8>,
}

impl MockRepository {
    /// Create a mock whose HEAD carries the given commit message
    pub fn new(message: impl Into<String>) -> Self {
        MockRepository {
            head: CommitInfo {
                oid: Oid::from_bytes(&[1; 20]).unwrap_or_else(|_| Oid::zero()),
                message: message.into(),
                author: "Test Author".to_string(),
            },
            branch: Some("main".to_string()),
            tags: RefCell::new(HashMap::new()),
            actions: RefCell::new(Vec::new()),
            fail_push: Cell::new(false),
            next_commit: Cell::new(2),
        }
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&self, name: impl Into<String>, oid: Oid) {
        self.tags.borrow_mut().insert(name.into(), oid);
    }

    /// Simulate a detached HEAD
    pub fn detach_head(&mut self) {
        self.branch = None;
    }

    /// Make every push fail with a remote error
    pub fn fail_pushes(&self) {
        self.fail_push.set(true);
    }

    /// Side effects performed so far, in order
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.actions.borrow().clone()
    }

    /// Names of the tags currently present
    pub fn tag_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tags.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    fn record(&self, action: RecordedAction) {
        self.actions.borrow_mut().push(action);
    }

    fn check_push(&self) -> Result<()> {
        if self.fail_push.get() {
            return Err(CiBumpError::remote("simulated push failure"));
        }
        Ok(())
    }
}

impl Repository for MockRepository {
    fn head_commit(&self) -> Result<CommitInfo> {
        Ok(self.head.clone())
    }

    fn current_branch(&self) -> Result<String> {
        self.branch
            .clone()
            .ok_or_else(|| CiBumpError::remote("HEAD is detached"))
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        Ok(self.tags.borrow().get(tag_name).copied())
    }

    fn delete_tag(&self, tag_name: &str) -> Result<()> {
        if self.tags.borrow_mut().remove(tag_name).is_none() {
            return Err(CiBumpError::tag(format!("tag '{}' not found", tag_name)));
        }
        self.record(RecordedAction::DeleteTag(tag_name.to_string()));
        Ok(())
    }

    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        message: &str,
        force: bool,
    ) -> Result<()> {
        let mut tags = self.tags.borrow_mut();
        if tags.contains_key(name) && !force {
            return Err(CiBumpError::tag(format!("tag '{}' already exists", name)));
        }
        tags.insert(name.to_string(), target);
        drop(tags);

        self.record(RecordedAction::CreateTag {
            name: name.to_string(),
            message: message.to_string(),
            force,
        });
        Ok(())
    }

    fn commit_all(&self, message: &str) -> Result<Oid> {
        let seed = self.next_commit.get();
        self.next_commit.set(seed.wrapping_add(1));
        self.record(RecordedAction::Commit(message.to_string()));
        Ok(Oid::from_bytes(&[seed; 20])?)
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        self.check_push()?;
        self.record(RecordedAction::PushTags {
            remote: remote.to_string(),
            tags: tag_names.iter().map(|t| t.to_string()).collect(),
        });
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.check_push()?;
        self.record(RecordedAction::PushBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }
}
