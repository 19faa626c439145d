//! Annotation/reference matching against a MiBIG alias map.
//!
//! Both scorers here compare spectral library annotations against reference
//! cluster identifiers reachable from the GCF's BGCs. They apply only when
//! both sides have something to compare; otherwise they return the
//! not-applicable sentinel, which is a normal outcome.
//!
//! A match compares the first whitespace token of the annotation name with
//! the first token of a reference alias, case-insensitively: `Rifamycin`
//! matches the alias `rifamycin SV` but not `xrifamycin`. Each
//! (annotation, reference) pair scores at most one match, however many
//! aliases the reference has.

use itertools::iproduct;
use log::debug;
use std::collections::HashMap;

use super::{ScoreEvidence, ScoreValue};
use crate::models::{Annotation, GenomicUnit, MetabolomicUnit};

/// Short reference-cluster id -> known compound aliases.
pub type ReferenceMap = HashMap<String, Vec<String>>;

/// Per-match bonus for a direct MiBIG annotation match.
const NAME_MATCH_BONUS: i64 = 100;

fn first_tokens_match(annotation_name: &str, alias: &str) -> bool {
    match (
        annotation_name.split_whitespace().next(),
        alias.split_whitespace().next(),
    ) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// MiBIG accessions use a `.` version suffix, knownclusterblast ids a `_`
/// region suffix; either way the map is keyed by the part before it.
fn short_reference_id(reference: &str, separator: char) -> &str {
    reference.split(separator).next().unwrap_or(reference)
}

/// Running tally that keeps the strongest match as evidence, first-wins on
/// equal bonuses.
#[derive(Default)]
struct MatchTally {
    total: i64,
    best_bonus: i64,
    evidence: Option<(Annotation, String)>,
}

impl MatchTally {
    fn record(&mut self, annotation: &Annotation, alias: &str, bonus: i64) {
        debug!(
            "annotation match: '{}' ~ '{}' (+{})",
            annotation.name, alias, bonus
        );
        self.total += bonus;
        if self.evidence.is_none() || bonus > self.best_bonus {
            self.best_bonus = bonus;
            self.evidence = Some((annotation.clone(), alias.to_string()));
        }
    }

    fn into_value(self) -> ScoreValue {
        let evidence = match self.evidence {
            Some((annotation, alias)) => ScoreEvidence::AnnotationMatch { annotation, alias },
            None => ScoreEvidence::None,
        };
        ScoreValue::new(self.total as f64, evidence)
    }
}

/// Matches annotations against the MiBIG accessions of the GCF's reference
/// BGCs; every match is worth a fixed bonus of 100.
#[derive(Debug, Clone, Default)]
pub struct NameScoring {
    references: ReferenceMap,
}

impl NameScoring {
    pub fn new(references: ReferenceMap) -> Self {
        NameScoring { references }
    }

    pub fn score(
        &self,
        metabolomic: &impl MetabolomicUnit,
        genomic: &impl GenomicUnit,
    ) -> ScoreValue {
        let annotations = metabolomic.annotations();
        if annotations.is_empty() {
            debug!("{}: no annotations", metabolomic.id());
            return ScoreValue::not_applicable();
        }
        let accessions: Vec<&str> = genomic
            .reference_clusters()
            .iter()
            .filter_map(|bgc| bgc.mibig_accession())
            .collect();
        if accessions.is_empty() {
            debug!("{}: no MiBIG members", genomic.id());
            return ScoreValue::not_applicable();
        }

        let mut tally = MatchTally::default();
        for (annotation, accession) in iproduct!(annotations, accessions.iter().copied()) {
            let short = short_reference_id(accession, '.');
            if let Some(aliases) = self.references.get(short) {
                // a pair earns the bonus once; the first matching alias is
                // the match
                if let Some(alias) = aliases
                    .iter()
                    .find(|alias| first_tokens_match(&annotation.name, alias))
                {
                    tally.record(annotation, alias, NAME_MATCH_BONUS);
                }
            }
        }
        tally.into_value()
    }
}

/// Matches annotations against the knownclusterblast hits of the GCF's
/// BGCs; each match is worth that hit's own integer score.
#[derive(Debug, Clone, Default)]
pub struct KnownClusterBlastScoring {
    references: ReferenceMap,
}

impl KnownClusterBlastScoring {
    pub fn new(references: ReferenceMap) -> Self {
        KnownClusterBlastScoring { references }
    }

    pub fn score(
        &self,
        metabolomic: &impl MetabolomicUnit,
        genomic: &impl GenomicUnit,
    ) -> ScoreValue {
        let annotations = metabolomic.annotations();
        if annotations.is_empty() {
            debug!("{}: no annotations", metabolomic.id());
            return ScoreValue::not_applicable();
        }
        let hits: Vec<&(String, i64)> = genomic
            .reference_clusters()
            .iter()
            .flat_map(|bgc| bgc.known_cluster_hits())
            .collect();
        if hits.is_empty() {
            debug!("{}: no knownclusterblast hits", genomic.id());
            return ScoreValue::not_applicable();
        }

        let mut tally = MatchTally::default();
        for (annotation, (reference, hit_score)) in iproduct!(annotations, hits) {
            let short = short_reference_id(reference, '_');
            if let Some(aliases) = self.references.get(short) {
                // each hit contributes its score at most once per annotation
                if let Some(alias) = aliases
                    .iter()
                    .find(|alias| first_tokens_match(&annotation.name, alias))
                {
                    tally.record(annotation, alias, *hit_score);
                }
            }
        }
        tally.into_value()
    }
}
