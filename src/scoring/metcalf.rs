//! Metcalf-style weighted co-occurrence scoring.
//!
//! Each strain in the universe falls into exactly one of four buckets for a
//! pair of units: present in both, metabolomic side only, genomic side only,
//! or neither. The score is the weighted sum over all strains. With the
//! default weights, co-occurrence is rewarded strongly, a metabolite seen
//! where the gene cluster is absent is penalized equally strongly, a gene
//! cluster seen without the metabolite is neutral (expression may simply be
//! silent), and joint absence earns a small baseline credit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ScoreEvidence, ScoreValue};
use crate::models::StrainOccurrence;
use crate::strain::StrainCollection;

/// The four bucket weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetcalfWeights {
    /// Strain present in both units.
    pub both: f64,
    /// Strain present in the metabolomic unit only.
    pub met_not_gcf: f64,
    /// Strain present in the genomic unit only.
    pub gcf_not_met: f64,
    /// Strain present in neither unit.
    pub neither: f64,
}

impl Default for MetcalfWeights {
    fn default() -> Self {
        MetcalfWeights {
            both: 10.0,
            met_not_gcf: -10.0,
            gcf_not_met: 0.0,
            neither: 1.0,
        }
    }
}

/// Co-occurrence scorer over a fixed strain universe.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetcalfScoring {
    weights: MetcalfWeights,
}

impl MetcalfScoring {
    pub fn new(weights: MetcalfWeights) -> Self {
        MetcalfScoring { weights }
    }

    pub fn weights(&self) -> &MetcalfWeights {
        &self.weights
    }

    /// Scores one pair. Total for any universe; an empty universe yields 0
    /// with no shared strains. The evidence is the set of strains observed
    /// in both units.
    pub fn score(
        &self,
        metabolomic: &impl StrainOccurrence,
        genomic: &impl StrainOccurrence,
        strains: &StrainCollection,
    ) -> ScoreValue {
        let mut cumulative = 0.0;
        let mut shared = BTreeSet::new();

        for strain in strains {
            let in_met = metabolomic.has_strain(strain);
            let in_gcf = genomic.has_strain(strain);
            cumulative += match (in_met, in_gcf) {
                (true, true) => {
                    shared.insert(strain.id().to_string());
                    self.weights.both
                }
                (true, false) => self.weights.met_not_gcf,
                (false, true) => self.weights.gcf_not_met,
                (false, false) => self.weights.neither,
            };
        }

        ScoreValue::new(cumulative, ScoreEvidence::SharedStrains(shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gcf, Spectrum};
    use crate::strain::Strain;
    use approx::assert_relative_eq;

    fn universe(ids: &[&str]) -> StrainCollection {
        ids.iter().map(|id| Strain::new(*id)).collect()
    }

    fn spectrum_in(strains: &StrainCollection, ids: &[&str]) -> Spectrum {
        let mut s = Spectrum::new("spec");
        for id in ids {
            s.add_strain(strains.lookup(id).unwrap());
        }
        s
    }

    fn gcf_in(strains: &StrainCollection, ids: &[&str]) -> Gcf {
        let mut g = Gcf::new("gcf");
        for id in ids {
            g.add_strain(strains.lookup(id).unwrap());
        }
        g
    }

    #[test]
    fn test_reference_scenario() {
        // m in {S1,S2}, g in {S2,S3}: 10 (S2) - 10 (S1) + 0 (S3) = 0
        let strains = universe(&["S1", "S2", "S3"]);
        let m = spectrum_in(&strains, &["S1", "S2"]);
        let g = gcf_in(&strains, &["S2", "S3"]);

        let value = MetcalfScoring::default().score(&m, &g, &strains);
        assert_relative_eq!(value.score.unwrap(), 0.0);
        assert_eq!(
            value.evidence,
            ScoreEvidence::SharedStrains(["S2".to_string()].into())
        );
    }

    #[test]
    fn test_full_overlap_boundary() {
        let strains = universe(&["S1", "S2", "S3", "S4"]);
        let m = spectrum_in(&strains, &["S1", "S2", "S3", "S4"]);
        let g = gcf_in(&strains, &["S1", "S2", "S3", "S4"]);

        let value = MetcalfScoring::default().score(&m, &g, &strains);
        assert_relative_eq!(value.score.unwrap(), 4.0 * 10.0);
    }

    #[test]
    fn test_joint_absence_boundary() {
        let strains = universe(&["S1", "S2", "S3", "S4"]);
        let m = spectrum_in(&strains, &[]);
        let g = gcf_in(&strains, &[]);

        let value = MetcalfScoring::default().score(&m, &g, &strains);
        assert_relative_eq!(value.score.unwrap(), 4.0 * 1.0);
        assert_eq!(value.evidence, ScoreEvidence::SharedStrains(BTreeSet::new()));
    }

    #[test]
    fn test_empty_universe_is_zero() {
        let strains = universe(&[]);
        let m = spectrum_in(&strains, &[]);
        let g = gcf_in(&strains, &[]);

        let value = MetcalfScoring::default().score(&m, &g, &strains);
        assert_relative_eq!(value.score.unwrap(), 0.0);
    }

    #[test]
    fn test_relabeling_symmetry() {
        // Swapping the two sides while swapping the asymmetric weights must
        // give the same score.
        let strains = universe(&["S1", "S2", "S3", "S4", "S5"]);
        let m = spectrum_in(&strains, &["S1", "S2", "S3"]);
        let g = gcf_in(&strains, &["S3", "S4"]);

        let forward = MetcalfScoring::new(MetcalfWeights {
            both: 10.0,
            met_not_gcf: -10.0,
            gcf_not_met: 0.0,
            neither: 1.0,
        });
        let swapped = MetcalfScoring::new(MetcalfWeights {
            both: 10.0,
            met_not_gcf: 0.0,
            gcf_not_met: -10.0,
            neither: 1.0,
        });

        let a = forward.score(&m, &g, &strains).score.unwrap();
        let b = swapped.score(&g, &m, &strains).score.unwrap();
        assert_relative_eq!(a, b);
    }
}
