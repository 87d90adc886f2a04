//! Manifest formats
//!
//! Each supported manifest type is a [ManifestFormat] implementation that can
//! read the current version (plus any auxiliary fields) and write an updated
//! version back without disturbing the rest of the document.
//!
//! - [json::NpmPackage]: `package.json`, field `version`
//! - [xml::MavenPom]: `pom.xml`, element `version` in the POM namespace
//! - [xml::DotnetProject]: `*.csproj`, element `PropertyGroup/Version`
//! - [properties::KoniProperties]: properties with `version` and `android.versioncode`
//! - [properties::AutomationProperties]: properties with `version`, `version_app`, `name_app`

pub mod json;
pub mod properties;
pub mod xml;

pub use json::NpmPackage;
pub use properties::{AutomationProperties, KoniProperties, PropertiesDocument};
pub use xml::{DotnetProject, MavenPom};

use crate::domain::{AppIdentity, Stage, Version};
use crate::error::{CiBumpError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Values extracted from a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestData {
    /// Raw version string as stored
    pub version: String,
    /// Auxiliary build counter (koni)
    pub build_counter: Option<u64>,
    /// Application identity (automation)
    pub app: Option<AppIdentity>,
}

impl ManifestData {
    /// Data for formats that only carry a version
    pub fn version_only(version: impl Into<String>) -> Self {
        ManifestData {
            version: version.into(),
            build_counter: None,
            app: None,
        }
    }
}

/// Values to write back into a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUpdate {
    pub version: String,
    pub build_counter: Option<u64>,
}

/// Read/write strategy for one manifest syntax
pub trait ManifestFormat {
    /// Extract the current version and auxiliary fields.
    ///
    /// Fails with [CiBumpError::MissingVersionField] when a required field is absent.
    fn read(&self, path: &Path) -> Result<ManifestData>;

    /// Write the updated version, preserving the rest of the document
    fn write(&self, path: &Path, update: &ManifestUpdate) -> Result<()>;
}

/// The two renderings of a computed version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVersion {
    /// Prerelease-free form: names the tag and feeds the CI build number
    pub release: String,
    /// Form used in the version commit message
    pub full: String,
}

/// Supported manifest types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestType {
    Npm,
    Maven,
    Dotnet,
    Koni,
    Automation,
}

impl ManifestType {
    /// Strategy that reads and writes this manifest type
    pub fn format(&self) -> Box<dyn ManifestFormat> {
        match self {
            ManifestType::Npm => Box::new(NpmPackage),
            ManifestType::Maven => Box::new(MavenPom),
            ManifestType::Dotnet => Box::new(DotnetProject),
            ManifestType::Koni => Box::new(KoniProperties),
            ManifestType::Automation => Box::new(AutomationProperties),
        }
    }

    /// Whether the CI build number is updated for this type
    pub fn reports_build_number(&self) -> bool {
        !matches!(self, ManifestType::Koni)
    }

    /// Render a version in this type's conventions.
    ///
    /// - npm/maven/dotnet: `full` carries the stage prerelease and the pipeline id,
    ///   `release` only the pipeline id
    /// - koni: `release` carries the build counter, `full` is bare
    /// - automation: both carry the pipeline id only
    pub fn render(
        &self,
        version: &Version,
        stage: &Stage,
        pipeline_id: Option<&str>,
        build_counter: Option<u64>,
    ) -> Result<RenderedVersion> {
        match self {
            ManifestType::Npm | ManifestType::Maven | ManifestType::Dotnet => {
                Ok(RenderedVersion {
                    release: version.render(None, pipeline_id)?,
                    full: version.render(stage.prerelease().as_ref(), pipeline_id)?,
                })
            }
            ManifestType::Koni => {
                let counter = build_counter.ok_or_else(|| {
                    CiBumpError::missing_field("android.versioncode is required for koni")
                })?;
                Ok(RenderedVersion {
                    release: version.render(None, Some(&counter.to_string()))?,
                    full: version.render(None, None)?,
                })
            }
            ManifestType::Automation => {
                let release = version.render(None, pipeline_id)?;
                Ok(RenderedVersion {
                    full: release.clone(),
                    release,
                })
            }
        }
    }

    /// The rendering that goes into the manifest file
    pub fn written_version<'a>(&self, rendered: &'a RenderedVersion) -> &'a str {
        match self {
            ManifestType::Koni | ManifestType::Automation => &rendered.full,
            _ => &rendered.release,
        }
    }
}

impl FromStr for ManifestType {
    type Err = CiBumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(ManifestType::Npm),
            "maven" => Ok(ManifestType::Maven),
            "dotnet" => Ok(ManifestType::Dotnet),
            "koni" => Ok(ManifestType::Koni),
            "automation" => Ok(ManifestType::Automation),
            _ => Err(CiBumpError::UnknownManifestType(format!(
                "'{}' (expected npm, maven, dotnet, koni or automation)",
                s
            ))),
        }
    }
}

impl fmt::Display for ManifestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManifestType::Npm => "npm",
            ManifestType::Maven => "maven",
            ManifestType::Dotnet => "dotnet",
            ManifestType::Koni => "koni",
            ManifestType::Automation => "automation",
        };
        write!(f, "{}", name)
    }
}
