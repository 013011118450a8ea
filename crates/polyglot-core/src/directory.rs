use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::errors::{CoreError, CoreResult};
use crate::models::{LanguageCode, ProviderId};

/// One row of the language directory.
#[derive(Debug, Clone)]
pub struct LanguageEntry {
    pub code: LanguageCode,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub flags: Vec<String>,
}

/// Ground truth for language identity: canonical codes, their aliases and
/// flag emojis, and the per-provider capability sets.
///
/// Immutable after load; share it behind an `Arc` and read freely.
#[derive(Debug)]
pub struct LanguageDirectory {
    entries: Vec<LanguageEntry>,
    by_alias: HashMap<String, usize>,
    by_flag: HashMap<String, usize>,
    capabilities: HashMap<ProviderId, HashSet<LanguageCode>>,
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    capabilities: CapabilityRows,
    #[serde(rename = "language")]
    languages: Vec<LanguageRow>,
}

#[derive(Debug, Deserialize)]
struct CapabilityRows {
    premium: Vec<String>,
    free: Vec<String>,
    /// Absent means "every language in the file".
    broad: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct LanguageRow {
    code: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    flags: Vec<String>,
}

impl LanguageDirectory {
    /// Load the directory shipped with the crate.
    pub fn embedded() -> CoreResult<Self> {
        Self::parse(include_str!("../languages.toml"))
    }

    /// Load a directory from an operator-supplied resource, replacing the
    /// embedded table entirely.
    pub fn from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoreError::DirectoryLoad(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> CoreResult<Self> {
        let file: DirectoryFile =
            toml::from_str(raw).map_err(|e| CoreError::DirectoryLoad(e.to_string()))?;

        if file.languages.is_empty() {
            return Err(CoreError::DirectoryInvalid("no languages defined".into()));
        }

        let mut entries = Vec::with_capacity(file.languages.len());
        let mut by_alias: HashMap<String, usize> = HashMap::new();
        let mut by_flag: HashMap<String, usize> = HashMap::new();

        for (index, row) in file.languages.into_iter().enumerate() {
            let code = LanguageCode::new(&row.code);
            let entry = LanguageEntry {
                code: code.clone(),
                display_name: row.name,
                aliases: row.aliases.iter().map(|a| a.to_lowercase()).collect(),
                flags: row.flags.clone(),
            };

            // The canonical code and the folded display name resolve like any
            // other alias.
            let mut keys = vec![code.as_str().to_string(), entry.display_name.to_lowercase()];
            keys.extend(entry.aliases.iter().cloned());

            for key in keys {
                match by_alias.get(&key) {
                    Some(&existing) if existing != index => {
                        return Err(CoreError::DirectoryInvalid(format!(
                            "alias {:?} maps to both {} and {}",
                            key, entries[existing], entry,
                        )));
                    }
                    _ => {
                        by_alias.insert(key, index);
                    }
                }
            }

            for flag in &entry.flags {
                if let Some(&existing) = by_flag.get(flag) {
                    if existing != index {
                        return Err(CoreError::DirectoryInvalid(format!(
                            "flag {} maps to both {} and {}",
                            flag, entries[existing], entry,
                        )));
                    }
                }
                by_flag.insert(flag.clone(), index);
            }

            entries.push(entry);
        }

        let all_codes: HashSet<LanguageCode> =
            entries.iter().map(|e| e.code.clone()).collect();

        let mut capabilities = HashMap::new();
        capabilities.insert(
            ProviderId::Premium,
            Self::capability_set(&file.capabilities.premium, &all_codes, "premium")?,
        );
        capabilities.insert(
            ProviderId::Free,
            Self::capability_set(&file.capabilities.free, &all_codes, "free")?,
        );
        capabilities.insert(
            ProviderId::Broad,
            match &file.capabilities.broad {
                Some(codes) => Self::capability_set(codes, &all_codes, "broad")?,
                None => all_codes.clone(),
            },
        );

        info!(
            languages = entries.len(),
            aliases = by_alias.len(),
            flags = by_flag.len(),
            "language directory loaded"
        );

        Ok(Self {
            entries,
            by_alias,
            by_flag,
            capabilities,
        })
    }

    fn capability_set(
        codes: &[String],
        all_codes: &HashSet<LanguageCode>,
        provider: &str,
    ) -> CoreResult<HashSet<LanguageCode>> {
        let mut set = HashSet::with_capacity(codes.len());
        for raw in codes {
            let code = LanguageCode::new(raw);
            if !all_codes.contains(&code) {
                return Err(CoreError::DirectoryInvalid(format!(
                    "{} capability lists unknown code {:?}",
                    provider, raw
                )));
            }
            set.insert(code);
        }
        Ok(set)
    }

    /// Case-folded exact alias lookup. Returning `None` is not an error; it
    /// means "unrecognized input" and the caller decides what to do.
    pub fn lookup_by_alias(&self, input: &str) -> Option<&LanguageEntry> {
        let folded = input.trim().to_lowercase();
        self.by_alias.get(&folded).map(|&i| &self.entries[i])
    }

    pub fn lookup_by_flag(&self, flag: &str) -> Option<&LanguageEntry> {
        self.by_flag.get(flag.trim()).map(|&i| &self.entries[i])
    }

    pub fn entry(&self, code: &LanguageCode) -> Option<&LanguageEntry> {
        self.by_alias.get(code.as_str()).map(|&i| &self.entries[i])
    }

    pub fn display_name(&self, code: &LanguageCode) -> Option<&str> {
        self.entry(code).map(|e| e.display_name.as_str())
    }

    pub fn supports(&self, provider: ProviderId, code: &LanguageCode) -> bool {
        self.capabilities
            .get(&provider)
            .is_some_and(|set| set.contains(code))
    }

    pub fn capability_codes(&self, provider: ProviderId) -> HashSet<LanguageCode> {
        self.capabilities
            .get(&provider)
            .cloned()
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for LanguageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.code)
    }
}
