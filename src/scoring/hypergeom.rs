//! Hypergeometric significance scoring.
//!
//! Models the question: if the genomic unit's strains were drawn at random
//! from the universe, how likely is an overlap at least as large as the one
//! observed with the metabolomic unit? Lower p-value = stronger
//! association.

use log::warn;
use statrs::distribution::{DiscreteCDF, Hypergeometric};

use super::{ScoreEvidence, ScoreValue};
use crate::models::StrainOccurrence;
use crate::strain::StrainCollection;

/// Scores one pair with the upper-tail hypergeometric p-value.
///
/// With `M` strains in the universe, `n` in the genomic unit, `N` in the
/// metabolomic unit, and `k` in both, the score is `P(X >= k)` for
/// `X ~ Hypergeometric(M, n, N)` — the overlap itself counts toward
/// significance. Degenerate inputs (`M`, `n`, `N`, or `k` of 0) give the
/// no-evidence value 1.0 rather than an error. Produces no evidence.
pub fn hypergeometric_score(
    metabolomic: &impl StrainOccurrence,
    genomic: &impl StrainOccurrence,
    strains: &StrainCollection,
) -> ScoreValue {
    let mut metabolomic_count: u64 = 0;
    let mut genomic_count: u64 = 0;
    let mut overlap_count: u64 = 0;

    for strain in strains {
        let in_met = metabolomic.has_strain(strain);
        let in_gcf = genomic.has_strain(strain);
        metabolomic_count += u64::from(in_met);
        genomic_count += u64::from(in_gcf);
        overlap_count += u64::from(in_met && in_gcf);
    }

    let p = upper_tail(
        strains.len() as u64,
        genomic_count,
        metabolomic_count,
        overlap_count,
    );
    ScoreValue::new(p, ScoreEvidence::None)
}

/// `P(X >= k)` for `X ~ Hypergeometric(population, successes, draws)`.
fn upper_tail(population: u64, successes: u64, draws: u64, k: u64) -> f64 {
    if k == 0 || population == 0 || successes == 0 || draws == 0 {
        return 1.0;
    }
    match Hypergeometric::new(population, successes, draws) {
        // sf(k - 1) = P(X > k - 1) = P(X >= k)
        Ok(distribution) => distribution.sf(k - 1),
        Err(e) => {
            warn!(
                "degenerate hypergeometric parameters (M={}, n={}, N={}): {}",
                population, successes, draws, e
            );
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gcf, Spectrum};
    use crate::strain::Strain;
    use approx::assert_relative_eq;

    fn universe(n: usize) -> StrainCollection {
        (0..n).map(|i| Strain::new(format!("S{i}"))).collect()
    }

    fn pair(strains: &StrainCollection, met: &[usize], gcf: &[usize]) -> (Spectrum, Gcf) {
        let mut m = Spectrum::new("spec");
        for i in met {
            m.add_strain(strains.lookup(&format!("S{i}")).unwrap());
        }
        let mut g = Gcf::new("gcf");
        for i in gcf {
            g.add_strain(strains.lookup(&format!("S{i}")).unwrap());
        }
        (m, g)
    }

    #[test]
    fn test_degenerate_cases_are_one() {
        assert_relative_eq!(upper_tail(0, 0, 0, 0), 1.0);
        assert_relative_eq!(upper_tail(10, 0, 4, 0), 1.0);
        assert_relative_eq!(upper_tail(10, 4, 0, 0), 1.0);

        let strains = universe(0);
        let (m, g) = pair(&strains, &[], &[]);
        assert_relative_eq!(
            hypergeometric_score(&m, &g, &strains).score.unwrap(),
            1.0
        );
    }

    #[test]
    fn test_no_overlap_is_one() {
        let strains = universe(6);
        let (m, g) = pair(&strains, &[0, 1], &[2, 3]);
        assert_relative_eq!(
            hypergeometric_score(&m, &g, &strains).score.unwrap(),
            1.0
        );
    }

    #[test]
    fn test_known_value_single_overlap() {
        // M=4, n=2, N=2, k=2: P(X >= 2) = C(2,2)C(2,0)/C(4,2) = 1/6.
        let strains = universe(4);
        let (m, g) = pair(&strains, &[0, 1], &[0, 1]);
        assert_relative_eq!(
            hypergeometric_score(&m, &g, &strains).score.unwrap(),
            1.0 / 6.0,
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_tail_includes_k_itself() {
        // M=4, n=2, N=2, k=1: P(X >= 1) = 1 - C(2,0)C(2,2)/C(4,2) = 5/6.
        assert_relative_eq!(upper_tail(4, 2, 2, 1), 5.0 / 6.0, max_relative = 1e-10);
    }

    #[test]
    fn test_maximum_overlap_minimizes_p() {
        // For fixed (M, n, N) the p-value is non-increasing in k, so the
        // maximum possible overlap gives the smallest value.
        let (population, successes, draws) = (20, 6, 8);
        let mut previous = 1.0;
        for k in 1..=6 {
            let p = upper_tail(population, successes, draws, k);
            assert!(p <= previous, "p({k}) = {p} > p({}) = {previous}", k - 1);
            previous = p;
        }
        assert!(previous < 1e-3);
    }

    #[test]
    fn test_no_evidence_produced() {
        let strains = universe(4);
        let (m, g) = pair(&strains, &[0], &[0]);
        assert_eq!(
            hypergeometric_score(&m, &g, &strains).evidence,
            ScoreEvidence::None
        );
    }
}
