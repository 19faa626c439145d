//! Scoring functions and the score-table output type.
//!
//! Every scoring function is pure: `(metabolomic unit, genomic unit,
//! strain universe) -> ScoreValue`, no side effects beyond `log`
//! diagnostics. A score of `None` means "not applicable to this pair", a
//! normal outcome for annotation-based scorers, never an error.

pub mod aa;
pub mod annotation;
pub mod hypergeom;
pub mod metcalf;

pub use aa::{AaLossTable, AaScoring};
pub use annotation::{KnownClusterBlastScoring, NameScoring, ReferenceMap};
pub use hypergeom::hypergeometric_score;
pub use metcalf::{MetcalfScoring, MetcalfWeights};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::Annotation;

/// Auxiliary evidence attached to a score by the function that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreEvidence {
    /// The scoring function produces no evidence (e.g. hypergeometric).
    None,
    /// Strains observed in both units (co-occurrence scoring).
    SharedStrains(BTreeSet<String>),
    /// The annotation/alias pair behind a reference match.
    AnnotationMatch { annotation: Annotation, alias: String },
}

/// The outcome of scoring one pair: the score itself (or not-applicable)
/// plus whatever evidence the function collected.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreValue {
    pub score: Option<f64>,
    pub evidence: ScoreEvidence,
}

impl ScoreValue {
    pub fn new(score: f64, evidence: ScoreEvidence) -> Self {
        ScoreValue {
            score: Some(score),
            evidence,
        }
    }

    /// The sentinel for pairs the scoring function does not apply to.
    pub fn not_applicable() -> Self {
        ScoreValue {
            score: None,
            evidence: ScoreEvidence::None,
        }
    }
}

/// One cell of the score table: the observed score, the null-model score
/// when it was computed, and the observed score's evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub observed: Option<f64>,
    pub random: Option<f64>,
    pub evidence: ScoreEvidence,
}

/// The two-level result mapping: metabolomic-unit id -> genomic-unit id ->
/// [`ScoreRecord`].
///
/// Built append-only by the batch scorer and merged shard-by-shard by the
/// driver. Content is deterministic for a given input; iteration order is
/// insertion order and not part of the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    rows: IndexMap<String, IndexMap<String, ScoreRecord>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        metabolomic_id: impl Into<String>,
        genomic_id: impl Into<String>,
        record: ScoreRecord,
    ) {
        self.rows
            .entry(metabolomic_id.into())
            .or_default()
            .insert(genomic_id.into(), record);
    }

    pub fn get(&self, metabolomic_id: &str, genomic_id: &str) -> Option<&ScoreRecord> {
        self.rows.get(metabolomic_id)?.get(genomic_id)
    }

    /// All records for one metabolomic unit.
    pub fn row(&self, metabolomic_id: &str) -> Option<&IndexMap<String, ScoreRecord>> {
        self.rows.get(metabolomic_id)
    }

    /// Number of metabolomic units scored.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, ScoreRecord>)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Absorbs another table built from a disjoint shard.
    ///
    /// Shards partition the metabolomic collection, so a colliding top-level
    /// key indicates a partitioning bug; the colliding key is returned and
    /// nothing past it is merged.
    pub fn merge(&mut self, other: ScoreTable) -> Result<(), String> {
        for (key, row) in other.rows {
            if self.rows.contains_key(&key) {
                return Err(key);
            }
            self.rows.insert(key, row);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(observed: f64) -> ScoreRecord {
        ScoreRecord {
            observed: Some(observed),
            random: None,
            evidence: ScoreEvidence::None,
        }
    }

    #[test]
    fn test_merge_disjoint_tables() {
        let mut a = ScoreTable::new();
        a.insert("m1", "g1", record(1.0));
        let mut b = ScoreTable::new();
        b.insert("m2", "g1", record(2.0));

        a.merge(b).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("m2", "g1").unwrap().observed, Some(2.0));
    }

    #[test]
    fn test_table_round_trips_through_json() {
        let mut table = ScoreTable::new();
        table.insert("m1", "g1", record(4.0));
        table.insert(
            "m1",
            "g2",
            ScoreRecord {
                observed: Some(100.0),
                random: Some(-3.0),
                evidence: ScoreEvidence::AnnotationMatch {
                    annotation: Annotation::new("Rifamycin", "gnps"),
                    alias: "rifamycin SV".to_string(),
                },
            },
        );

        let json = serde_json::to_string(&table).unwrap();
        let restored: ScoreTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn test_merge_reports_collision() {
        let mut a = ScoreTable::new();
        a.insert("m1", "g1", record(1.0));
        let mut b = ScoreTable::new();
        b.insert("m1", "g2", record(2.0));

        assert_eq!(a.merge(b), Err("m1".to_string()));
    }
}
