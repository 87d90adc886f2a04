//! Domain logic - pure versioning rules independent of manifests and git

pub mod bump;
pub mod stage;
pub mod tag;
pub mod version;

pub use bump::BumpDecision;
pub use stage::{PreReleaseType, Stage};
pub use tag::{AppIdentity, TagPattern, TagPlan};
pub use version::{Version, VersionBump};
