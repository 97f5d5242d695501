use std::collections::{BTreeMap, HashMap};
use std::fmt;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::api::{ApiSource, hero_list_path};
use crate::normalize::normalize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeroId(pub String);

impl HeroId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// Id to name table of every hero plus the normalized-name index derived from it.
#[derive(Debug, Clone)]
pub struct HeroDirectory {
    status: DirectoryStatus,
    names: BTreeMap<HeroId, String>,
    index: HashMap<String, HeroId>,
}

impl Default for HeroDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl HeroDirectory {
    pub fn new() -> Self {
        Self {
            status: DirectoryStatus::Uninitialized,
            names: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_names(names: BTreeMap<HeroId, String>) -> Self {
        let index = build_name_index(&names);
        Self {
            status: DirectoryStatus::Ready,
            names,
            index,
        }
    }

    /// Fetches the hero list and rebuilds the table and index. A failure is
    /// logged and leaves the directory empty in the `Failed` state.
    pub fn reload(&mut self, api: &dyn ApiSource) -> DirectoryStatus {
        self.status = DirectoryStatus::Loading;
        self.names.clear();
        self.index.clear();

        match fetch_hero_list(api) {
            Ok(names) => {
                log::info!("hero list loaded: {} heroes", names.len());
                self.index = build_name_index(&names);
                self.names = names;
                self.status = DirectoryStatus::Ready;
            }
            Err(err) => {
                log::warn!("hero list fetch failed: {err:#}");
                self.status = DirectoryStatus::Failed;
            }
        }
        self.status
    }

    pub fn status(&self) -> DirectoryStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == DirectoryStatus::Ready
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: &HeroId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeroId, &str)> {
        self.names.iter().map(|(id, name)| (id, name.as_str()))
    }

    /// Resolves a display name in any casing or spacing to its id.
    pub fn lookup(&self, display_name: &str) -> Option<&HeroId> {
        self.index.get(&normalize(display_name))
    }
}

fn fetch_hero_list(api: &dyn ApiSource) -> Result<BTreeMap<HeroId, String>> {
    let body = api.get(hero_list_path()).context("hero list request failed")?;
    parse_hero_list_json(&body)
}

/// Parses the `{ "<id>": "<name>", ... }` hero list body. Entries whose name
/// is not a string are skipped.
pub fn parse_hero_list_json(raw: &str) -> Result<BTreeMap<HeroId, String>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid hero list json")?;
    let Value::Object(entries) = root else {
        return Err(anyhow::anyhow!("hero list is not an object"));
    };

    let mut names = BTreeMap::new();
    for (id, name) in entries {
        let Value::String(name) = name else {
            continue;
        };
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        names.insert(HeroId(id.to_string()), name);
    }
    Ok(names)
}

fn build_name_index(names: &BTreeMap<HeroId, String>) -> HashMap<String, HeroId> {
    let mut index = HashMap::with_capacity(names.len());
    for (id, name) in names {
        index.insert(normalize(name), id.clone());
    }
    index
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{HeroDirectory, HeroId, parse_hero_list_json};
    use crate::normalize::normalize;

    fn sample() -> HeroDirectory {
        let names = BTreeMap::from([
            (HeroId("1".to_string()), "Miya".to_string()),
            (HeroId("2".to_string()), "Balmond".to_string()),
            (HeroId("84".to_string()), "Yi Sun-shin".to_string()),
        ]);
        HeroDirectory::from_names(names)
    }

    #[test]
    fn every_directory_name_round_trips_through_the_index() {
        let directory = sample();
        for (id, name) in directory.iter() {
            assert_eq!(directory.lookup(&normalize(name)), Some(id));
            assert_eq!(directory.lookup(name), Some(id));
        }
    }

    #[test]
    fn lookup_ignores_case_and_punctuation() {
        let directory = sample();
        assert_eq!(
            directory.lookup("YI SUN SHIN!"),
            Some(&HeroId("84".to_string()))
        );
        assert!(directory.lookup("Layla").is_none());
    }

    #[test]
    fn colliding_names_resolve_to_the_later_id() {
        let directory = HeroDirectory::from_names(BTreeMap::from([
            (HeroId("3".to_string()), "Chang'e".to_string()),
            (HeroId("7".to_string()), "Change".to_string()),
        ]));
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.lookup("Chang'e"), Some(&HeroId("7".to_string())));
        assert_eq!(directory.lookup("change"), Some(&HeroId("7".to_string())));
    }

    #[test]
    fn hero_list_accepts_plain_object() {
        let names = parse_hero_list_json(r#"{"1":"Miya","2":"Balmond","x":null}"#)
            .expect("list should parse");
        assert_eq!(names.len(), 2);
        assert_eq!(names[&HeroId("2".to_string())], "Balmond");
    }

    #[test]
    fn hero_list_rejects_non_object() {
        assert!(parse_hero_list_json("[]").is_err());
        assert!(parse_hero_list_json("not json").is_err());
    }
}
