use crate::domain::AppIdentity;
use crate::error::{CiBumpError, Result};
use crate::manifest::{ManifestData, ManifestFormat, ManifestUpdate};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

pub const VERSION_KEY: &str = "version";
pub const ANDROID_COUNTER_KEY: &str = "android.versioncode";
pub const IOS_COUNTER_KEY: &str = "ios.bundleversion";
pub const APP_VERSION_KEY: &str = "version_app";
pub const APP_NAME_KEY: &str = "name_app";

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*((?:\\.|[^\\=:\s])+)(?:\s*[=:]\s*|\s+|$)(.*)$")
            .expect("entry pattern is a valid regex")
    })
}

/// One logical `key=value` entry and the physical lines it spans
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: String,
    first: usize,
    last: usize,
}

fn is_comment(line: &str) -> bool {
    matches!(line.trim_start().chars().next(), Some('#') | Some('!'))
}

/// A line continues onto the next when it ends in an odd number of backslashes
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Line-preserving view of a `.properties` file.
///
/// Comments, blank lines and unrelated entries are written back untouched;
/// only the lines of keys that are set get rewritten as `key=value`.
/// Backslash escapes and continuation lines are understood on read, and
/// values are escaped on write. A duplicated key resolves to its last entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertiesDocument {
    lines: Vec<String>,
}

impl PropertiesDocument {
    /// Parse properties text
    pub fn parse(content: &str) -> Self {
        PropertiesDocument {
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    /// Load a properties file
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Save the document, one entry per line
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    fn entries(&self) -> Vec<Entry> {
        let mut entries = Vec::new();
        let mut index = 0;

        while index < self.lines.len() {
            let first = index;
            let line = &self.lines[index];
            index += 1;

            if line.trim().is_empty() || is_comment(line) {
                continue;
            }

            let mut logical = line.clone();
            while continues(&logical) && index < self.lines.len() {
                logical.pop();
                logical.push_str(self.lines[index].trim_start());
                index += 1;
            }
            if continues(&logical) {
                logical.pop();
            }

            if let Some(captures) = entry_pattern().captures(&logical) {
                let key = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let value = captures.get(2).map(|m| m.as_str()).unwrap_or("");
                entries.push(Entry {
                    key: unescape(key),
                    value: unescape(value),
                    first,
                    last: index - 1,
                });
            }
        }

        entries
    }

    fn last_entry(&self, key: &str) -> Option<Entry> {
        self.entries().into_iter().rev().find(|entry| entry.key == key)
    }

    /// Value of a key, if present
    pub fn get(&self, key: &str) -> Option<String> {
        self.last_entry(key).map(|entry| entry.value)
    }

    /// Set a key, rewriting its (last) entry in place or appending it
    pub fn set(&mut self, key: &str, value: &str) {
        let rendered = format!("{}={}", escape(key, true), escape(value, false));

        match self.last_entry(key) {
            Some(entry) => {
                self.lines
                    .splice(entry.first..=entry.last, std::iter::once(rendered));
            }
            None => self.lines.push(rendered),
        }
    }

    fn require(&self, key: &str, path: &Path) -> Result<String> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                CiBumpError::missing_field(format!("no '{}' key in {}", key, path.display()))
            })
    }
}

impl std::fmt::Display for PropertiesDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Mobile app properties: `version` plus the shared android/ios build counter
pub struct KoniProperties;

/// Automation suite properties: `version` plus the app under test
pub struct AutomationProperties;

impl ManifestFormat for KoniProperties {
    fn read(&self, path: &Path) -> Result<ManifestData> {
        let doc = PropertiesDocument::load(path)?;
        let version = doc.require(VERSION_KEY, path)?;
        let raw_counter = doc.require(ANDROID_COUNTER_KEY, path)?;
        let counter = raw_counter.parse::<u64>().map_err(|_| {
            CiBumpError::missing_field(format!(
                "'{}' in {} is not a non-negative integer: '{}'",
                ANDROID_COUNTER_KEY,
                path.display(),
                raw_counter
            ))
        })?;

        Ok(ManifestData {
            version,
            build_counter: Some(counter),
            app: None,
        })
    }

    fn write(&self, path: &Path, update: &ManifestUpdate) -> Result<()> {
        let mut doc = PropertiesDocument::load(path)?;
        doc.set(VERSION_KEY, &update.version);
        if let Some(counter) = update.build_counter {
            doc.set(ANDROID_COUNTER_KEY, &counter.to_string());
            doc.set(IOS_COUNTER_KEY, &counter.to_string());
        }
        doc.save(path)
    }
}

impl ManifestFormat for AutomationProperties {
    fn read(&self, path: &Path) -> Result<ManifestData> {
        let doc = PropertiesDocument::load(path)?;
        let version = doc.require(VERSION_KEY, path)?;
        let app = AppIdentity {
            name: doc.require(APP_NAME_KEY, path)?,
            version: doc.require(APP_VERSION_KEY, path)?,
        };

        Ok(ManifestData {
            version,
            build_counter: None,
            app: Some(app),
        })
    }

    fn write(&self, path: &Path, update: &ManifestUpdate) -> Result<()> {
        let mut doc = PropertiesDocument::load(path)?;
        doc.set(VERSION_KEY, &update.version);
        doc.save(path)
    }
}
