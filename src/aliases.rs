use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::app_config_dir;

/// Participant-name remap table: some accounts show a different name
/// inside match participant records than the one they registered under.
/// Loaded once from a JSON object (`{"Display Name": "ParticipantName"}`);
/// lookups only ever affect participant matching, never what is stored.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    entries: HashMap<String, String>,
}

impl AliasMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, alias)| (name.to_lowercase(), alias))
            .collect();
        Self { entries }
    }

    /// A missing file is an empty table; a file that exists but does not
    /// parse is a real error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::empty());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read alias table {}", path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid alias table {}", path.display()))?;
        Ok(Self::from_entries(entries))
    }

    /// Case-insensitive on the registered name; a name with no alias maps
    /// to itself.
    pub fn resolve<'a>(&'a self, summoner_name: &'a str) -> &'a str {
        self.entries
            .get(&summoner_name.to_lowercase())
            .map(String::as_str)
            .unwrap_or(summoner_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn default_aliases_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join("aliases.json"))
}

#[cfg(test)]
mod tests {
    use super::AliasMap;

    #[test]
    fn resolve_is_case_insensitive_and_falls_through() {
        let aliases = AliasMap::from_entries([(
            "UMBREON".to_string(),
            "UmbreonReaper".to_string(),
        )]);
        assert_eq!(aliases.resolve("UMBREON"), "UmbreonReaper");
        assert_eq!(aliases.resolve("umbreon"), "UmbreonReaper");
        assert_eq!(aliases.resolve("Faker"), "Faker");
    }

    #[test]
    fn missing_file_is_empty_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let aliases = AliasMap::load(&dir.path().join("aliases.json")).expect("load");
        assert!(aliases.is_empty());
    }

    #[test]
    fn loads_json_object() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("aliases.json");
        std::fs::write(&path, r#"{"UMBREON": "UmbreonReaper"}"#).expect("write");
        let aliases = AliasMap::load(&path).expect("load");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases.resolve("Umbreon"), "UmbreonReaper");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("aliases.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(AliasMap::load(&path).is_err());
    }
}
