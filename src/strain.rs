//! Strain identifiers and the fixed strain universe for a scoring run.
//!
//! A strain is the unit of evidence for every scoring function: both sides
//! of a comparison answer "was this strain observed in you?". Strains are
//! identified by a representative id (an NCBI taxonomy id or name is
//! recommended) and may carry any number of aliases picked up from the
//! different input files that mention them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A biological isolate/sample identifier with its known aliases.
///
/// Equality and hashing consider only the representative id, so aliases can
/// be added after a strain has been placed in a set or used as a map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strain {
    id: String,
    aliases: BTreeSet<String>,
}

impl Strain {
    /// Creates a strain with the given representative id and no aliases.
    pub fn new(id: impl Into<String>) -> Self {
        Strain {
            id: id.into(),
            aliases: BTreeSet::new(),
        }
    }

    /// The representative id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The known aliases, excluding the representative id.
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// All names this strain answers to: the id plus every alias.
    pub fn names(&self) -> BTreeSet<String> {
        let mut names = self.aliases.clone();
        names.insert(self.id.clone());
        names
    }

    /// Registers an alias. Empty aliases are refused with a warning.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if alias.is_empty() {
            log::warn!("refusing to add an empty-string alias to {}", self);
        } else {
            self.aliases.insert(alias);
        }
    }

    /// Whether `name` is the id or one of the aliases.
    pub fn has_name(&self, name: &str) -> bool {
        self.id == name || self.aliases.contains(name)
    }
}

impl fmt::Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Strain({}) [{} aliases]", self.id, self.aliases.len())
    }
}

impl PartialEq for Strain {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Strain {}

impl std::hash::Hash for Strain {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The fixed universe of strains for one scoring run.
///
/// The collection is append-only and shared read-only with every scoring
/// worker; every name (id or alias) of every member is indexed for O(1)
/// lookup.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StrainCollection {
    strains: Vec<Strain>,
    lookup: HashMap<String, usize>,
}

impl StrainCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a strain and indexes all of its names.
    ///
    /// A name already indexed for an earlier strain is re-pointed at the new
    /// one, with a warning; input files occasionally disagree on aliases.
    pub fn add(&mut self, strain: Strain) {
        let index = self.strains.len();
        for name in strain.names() {
            if let Some(previous) = self.lookup.insert(name.clone(), index) {
                if previous != index {
                    log::warn!(
                        "strain name '{}' was already mapped to {}",
                        name,
                        self.strains[previous].id()
                    );
                }
            }
        }
        self.strains.push(strain);
    }

    /// Looks a strain up by any of its names.
    pub fn lookup(&self, name: &str) -> Option<&Strain> {
        self.lookup.get(name).map(|&i| &self.strains[i])
    }

    /// Whether any member answers to `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.strains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strains.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Strain> {
        self.strains.iter()
    }
}

impl<'a> IntoIterator for &'a StrainCollection {
    type Item = &'a Strain;
    type IntoIter = std::slice::Iter<'a, Strain>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Strain> for StrainCollection {
    fn from_iter<T: IntoIterator<Item = Strain>>(iter: T) -> Self {
        let mut collection = StrainCollection::new();
        for strain in iter {
            collection.add(strain);
        }
        collection
    }
}
