use crate::model::{RawCase, TestCase};
use ahash::RandomState;
use common::{HarnessError, HarnessResult};
use hashbrown::HashMap;
use indexmap::IndexMap;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

type Map<K, V> = HashMap<K, V, RandomState>;

/// Every test case of one fixture file, grouped by procedure name.
#[derive(Clone, Debug, PartialEq)]
pub struct FixtureSet {
    name: String,
    procedures: IndexMap<String, Vec<TestCase>>,
}

impl FixtureSet {
    /// Parse and validate fixture JSON. `name` is only used in diagnostics.
    pub fn from_json_str(name: &str, json: &str) -> HarnessResult<Self> {
        let raw: IndexMap<String, Vec<RawCase>> = serde_json::from_str(json)
            .map_err(|err| HarnessError::Fixture(format!("invalid fixture file '{name}': {err}")))?;

        let mut procedures = IndexMap::with_capacity(raw.len());
        for (procedure, cases) in raw {
            let cases = cases
                .into_iter()
                .enumerate()
                .map(|(idx, case)| case.validate(&procedure, idx + 1))
                .collect::<HarnessResult<Vec<_>>>()?;
            procedures.insert(procedure, cases);
        }

        Ok(Self {
            name: name.to_string(),
            procedures,
        })
    }

    pub fn from_path(path: &Path) -> HarnessResult<Self> {
        let data = fs::read_to_string(path).map_err(|err| {
            HarnessError::Fixture(format!("cannot read '{}': {err}", path.display()))
        })?;
        Self::from_json_str(&path.display().to_string(), &data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered cases for `procedure`, or `None` if the file has no entry.
    pub fn cases_for(&self, procedure: &str) -> Option<&[TestCase]> {
        self.procedures.get(procedure).map(Vec::as_slice)
    }

    pub fn procedures(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    pub fn case_count(&self) -> usize {
        self.procedures.values().map(Vec::len).sum()
    }
}

/// Loads fixture sets from a directory and caches them by identifier.
///
/// The cache is owned by the store and only dropped through
/// [`FixtureStore::invalidate`] or [`FixtureStore::clear`].
#[derive(Debug)]
pub struct FixtureStore {
    root: PathBuf,
    cache: Map<String, Arc<FixtureSet>>,
}

impl FixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Map::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a fixture-set identifier to `<root>/<id>.json`.
    pub fn resolve_path(&self, id: &str) -> HarnessResult<PathBuf> {
        let id = id.trim();
        if id.is_empty() {
            return Err(HarnessError::Fixture(
                "fixture set name is mandatory".into(),
            ));
        }
        let file = if id.ends_with(".json") {
            id.to_string()
        } else {
            format!("{id}.json")
        };
        Ok(self.root.join(file))
    }

    /// Load a fixture set, parsing the file only on the first request.
    pub fn load(&mut self, id: &str) -> HarnessResult<Arc<FixtureSet>> {
        let key = cache_key(id);
        if let Some(set) = self.cache.get(&key) {
            debug!(fixture_set = %key, "fixture cache hit");
            return Ok(Arc::clone(set));
        }

        let path = self.resolve_path(id)?;
        if !path.exists() {
            return Err(HarnessError::Fixture(format!(
                "test input file not found: {}",
                path.display()
            )));
        }

        let set = Arc::new(FixtureSet::from_path(&path)?);
        info!(
            fixture_set = %key,
            path = %path.display(),
            cases = set.case_count(),
            "loaded fixture set"
        );
        self.cache.insert(key, Arc::clone(&set));
        Ok(set)
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.contains_key(&cache_key(id))
    }

    /// Drop one cached set; returns whether it was cached.
    pub fn invalidate(&mut self, id: &str) -> bool {
        self.cache.remove(&cache_key(id)).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

fn cache_key(id: &str) -> String {
    let id = id.trim();
    id.strip_suffix(".json").unwrap_or(id).to_string()
}
