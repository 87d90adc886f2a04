use crate::error::{CiBumpError, Result};
use crate::manifest::{ManifestData, ManifestFormat, ManifestUpdate};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// `package.json` manifest
pub struct NpmPackage;

fn load(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CiBumpError::manifest(format!("Cannot parse {}: {}", path.display(), e)))
}

impl ManifestFormat for NpmPackage {
    fn read(&self, path: &Path) -> Result<ManifestData> {
        let doc = load(path)?;
        let version = doc.get("version").and_then(Value::as_str).ok_or_else(|| {
            CiBumpError::missing_field(format!("no string 'version' in {}", path.display()))
        })?;

        Ok(ManifestData::version_only(version))
    }

    fn write(&self, path: &Path, update: &ManifestUpdate) -> Result<()> {
        let mut doc = load(path)?;
        let object = doc.as_object_mut().ok_or_else(|| {
            CiBumpError::manifest(format!("{} is not a JSON object", path.display()))
        })?;
        object.insert("version".to_string(), Value::String(update.version.clone()));

        let mut rendered = serde_json::to_string_pretty(&doc)
            .map_err(|e| CiBumpError::manifest(format!("Cannot serialize JSON: {}", e)))?;
        rendered.push('\n');
        fs::write(path, rendered)?;
        Ok(())
    }
}
