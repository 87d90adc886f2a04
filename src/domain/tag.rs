use crate::error::{CiBumpError, Result};

/// Message/name pattern with a `{version}` placeholder
/// (e.g. "Version {version}", "ci: Version updated to {version} [skip ci]")
#[derive(Debug, Clone)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    /// Create a new pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        TagPattern {
            pattern: pattern.into(),
        }
    }

    /// Check that the pattern carries the `{version}` placeholder
    pub fn validate(&self) -> Result<()> {
        if !self.pattern.contains("{version}") {
            return Err(CiBumpError::config(format!(
                "Pattern '{}' must contain {{version}} placeholder",
                self.pattern
            )));
        }
        Ok(())
    }

    /// Format a version according to pattern
    /// Example: pattern="Version {version}", version="1.2.3" -> "Version 1.2.3"
    pub fn format(&self, version: &str) -> String {
        self.pattern.replace("{version}", version)
    }
}

/// Application identity carried by automation manifests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub name: String,
    pub version: String,
}

/// The tags one dev run creates on the latest commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan {
    /// Fully formatted tag, created with force
    pub name: String,
    /// Bare MAJOR.MINOR.PATCH tag, replaced if it already exists
    pub bare: String,
    /// Annotation message shared by both tags
    pub message: String,
}

impl TagPlan {
    /// Build the tag plan for a release string.
    ///
    /// With an app identity the name becomes `<release>_<name>-<version>` and
    /// the message gains ` - <name>(<version>)`.
    pub fn new(release: &str, bare: &str, message: &TagPattern, app: Option<&AppIdentity>) -> Self {
        let base_message = message.format(release);
        match app {
            Some(app) => TagPlan {
                name: format!("{}_{}-{}", release, app.name, app.version),
                bare: bare.to_string(),
                message: format!("{} - {}({})", base_message, app.name, app.version),
            },
            None => TagPlan {
                name: release.to_string(),
                bare: bare.to_string(),
                message: base_message,
            },
        }
    }

    /// Tag names to create and push, without duplicates
    pub fn names(&self) -> Vec<&str> {
        if self.name == self.bare {
            vec![self.name.as_str()]
        } else {
            vec![self.name.as_str(), self.bare.as_str()]
        }
    }
}
