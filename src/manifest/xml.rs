use crate::error::{CiBumpError, Result};
use crate::manifest::{ManifestData, ManifestFormat, ManifestUpdate};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Namespace of Maven project descriptors
pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

/// `pom.xml` manifest: `<project><version>` in the POM namespace
pub struct MavenPom;

/// SDK-style project file: first `<PropertyGroup><Version>`
pub struct DotnetProject;

fn load(path: &Path) -> Result<Element> {
    let file = File::open(path)?;
    Element::parse(BufReader::new(file))
        .map_err(|e| CiBumpError::manifest(format!("Cannot parse {}: {}", path.display(), e)))
}

fn save(path: &Path, root: &Element) -> Result<()> {
    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ")
        .write_document_declaration(true);

    let mut writer = BufWriter::new(File::create(path)?);
    root.write_with_config(&mut writer, config)
        .map_err(|e| CiBumpError::manifest(format!("Cannot write {}: {}", path.display(), e)))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn text_of(element: &Element) -> Option<String> {
    element
        .get_text()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn replace_text(element: &mut Element, text: &str) {
    element
        .children
        .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));
    element.children.push(XMLNode::Text(text.to_string()));
}

fn pom_version(root: &Element) -> Option<&Element> {
    root.get_child(("version", POM_NAMESPACE))
}

fn pom_version_mut(root: &mut Element) -> Option<&mut Element> {
    root.get_mut_child(("version", POM_NAMESPACE))
}

fn property_groups(root: &Element) -> impl Iterator<Item = &Element> {
    root.children.iter().filter_map(|node| match node {
        XMLNode::Element(el) if el.name == "PropertyGroup" => Some(el),
        _ => None,
    })
}

fn project_version(root: &Element) -> Option<&Element> {
    property_groups(root).find_map(|group| group.get_child("Version"))
}

fn project_version_mut(root: &mut Element) -> Option<&mut Element> {
    root.children
        .iter_mut()
        .filter_map(|node| match node {
            XMLNode::Element(el) if el.name == "PropertyGroup" => Some(el),
            _ => None,
        })
        .find_map(|group| group.get_mut_child("Version"))
}

impl ManifestFormat for MavenPom {
    fn read(&self, path: &Path) -> Result<ManifestData> {
        let root = load(path)?;
        let version = pom_version(&root).and_then(text_of).ok_or_else(|| {
            CiBumpError::missing_field(format!("no <version> in {}", path.display()))
        })?;
        Ok(ManifestData::version_only(version))
    }

    fn write(&self, path: &Path, update: &ManifestUpdate) -> Result<()> {
        let mut root = load(path)?;
        let element = pom_version_mut(&mut root).ok_or_else(|| {
            CiBumpError::missing_field(format!("no <version> in {}", path.display()))
        })?;
        replace_text(element, &update.version);
        save(path, &root)
    }
}

impl ManifestFormat for DotnetProject {
    fn read(&self, path: &Path) -> Result<ManifestData> {
        let root = load(path)?;
        let version = project_version(&root).and_then(text_of).ok_or_else(|| {
            CiBumpError::missing_field(format!(
                "no <PropertyGroup><Version> in {}",
                path.display()
            ))
        })?;
        Ok(ManifestData::version_only(version))
    }

    fn write(&self, path: &Path, update: &ManifestUpdate) -> Result<()> {
        let mut root = load(path)?;
        let element = project_version_mut(&mut root).ok_or_else(|| {
            CiBumpError::missing_field(format!(
                "no <PropertyGroup><Version> in {}",
                path.display()
            ))
        })?;
        replace_text(element, &update.version);
        save(path, &root)
    }
}
