//! Genomic units: biosynthetic gene clusters (BGCs) and the gene-cluster
//! families (GCFs) that aggregate them.

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{GenomicUnit, StrainOccurrence};
use crate::strain::{Strain, StrainCollection};

/// A single biosynthetic gene cluster.
///
/// Only the fields annotation scoring consults are modeled here: the MiBIG
/// accession (present when the BGC is itself a MiBIG reference entry) and
/// the knownclusterblast hits antiSMASH reported for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bgc {
    id: String,
    mibig_accession: Option<String>,
    /// `(reference cluster id, hit score)` pairs from knownclusterblast.
    known_cluster_hits: Vec<(String, i64)>,
}

impl Bgc {
    pub fn new(id: impl Into<String>) -> Self {
        Bgc {
            id: id.into(),
            mibig_accession: None,
            known_cluster_hits: Vec::new(),
        }
    }

    pub fn with_mibig_accession(mut self, accession: impl Into<String>) -> Self {
        self.mibig_accession = Some(accession.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mibig_accession(&self) -> Option<&str> {
        self.mibig_accession.as_deref()
    }

    pub fn add_known_cluster_hit(&mut self, reference: impl Into<String>, score: i64) {
        self.known_cluster_hits.push((reference.into(), score));
    }

    pub fn known_cluster_hits(&self) -> &[(String, i64)] {
        &self.known_cluster_hits
    }
}

/// A gene-cluster family: BGCs grouped by similarity, with the union of the
/// strains their genomes came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gcf {
    id: String,
    bgcs: Vec<Bgc>,
    strains: HashSet<String>,
    /// Per-amino-acid incorporation probabilities predicted from the NRPS
    /// domains, consumed by mass-shift scoring.
    aa_predictions: Vec<(String, f64)>,
    surrogate: Option<Box<Gcf>>,
}

impl Gcf {
    pub fn new(id: impl Into<String>) -> Self {
        Gcf {
            id: id.into(),
            bgcs: Vec::new(),
            strains: HashSet::new(),
            aa_predictions: Vec::new(),
            surrogate: None,
        }
    }

    pub fn add_bgc(&mut self, bgc: Bgc) {
        self.bgcs.push(bgc);
    }

    /// Records that one of this family's BGCs came from `strain`.
    pub fn add_strain(&mut self, strain: &Strain) {
        self.strains.insert(strain.id().to_string());
    }

    pub fn add_aa_prediction(&mut self, residue: impl Into<String>, probability: f64) {
        self.aa_predictions.push((residue.into(), probability));
    }

    pub fn aa_predictions(&self) -> &[(String, f64)] {
        &self.aa_predictions
    }

    pub fn bgcs(&self) -> &[Bgc] {
        &self.bgcs
    }

    /// The constituent BGCs that are MiBIG reference entries.
    pub fn mibig_bgcs(&self) -> impl Iterator<Item = &Bgc> {
        self.bgcs.iter().filter(|b| b.mibig_accession().is_some())
    }

    pub fn strain_count(&self) -> usize {
        self.strains.len()
    }

    /// Attaches a randomized counterpart with the same strain cardinality,
    /// drawn uniformly without replacement from `universe`. The surrogate
    /// keeps no BGCs; it exists only for strain-based null scoring.
    pub fn attach_surrogate<R: Rng + ?Sized>(&mut self, universe: &StrainCollection, rng: &mut R) {
        let mut random = Gcf::new(format!("{}::random", self.id));
        for strain in universe.iter().choose_multiple(rng, self.strains.len()) {
            random.add_strain(strain);
        }
        self.surrogate = Some(Box::new(random));
    }
}

impl StrainOccurrence for Gcf {
    fn id(&self) -> &str {
        &self.id
    }

    fn has_strain(&self, strain: &Strain) -> bool {
        self.strains.contains(strain.id())
    }
}

impl GenomicUnit for Gcf {
    fn reference_clusters(&self) -> &[Bgc] {
        &self.bgcs
    }

    fn surrogate(&self) -> Option<&Self> {
        self.surrogate.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mibig_bgcs_filters_non_reference_members() {
        let mut gcf = Gcf::new("gcf_1");
        gcf.add_bgc(Bgc::new("BGC0000136.1").with_mibig_accession("BGC0000136.1"));
        gcf.add_bgc(Bgc::new("contig_42_cluster_1"));

        let accessions: Vec<_> = gcf
            .mibig_bgcs()
            .filter_map(Bgc::mibig_accession)
            .collect();
        assert_eq!(accessions, ["BGC0000136.1"]);
    }

    #[test]
    fn test_surrogate_preserves_cardinality() {
        let universe: StrainCollection =
            (0..8).map(|i| Strain::new(format!("S{i}"))).collect();
        let mut gcf = Gcf::new("gcf_1");
        gcf.add_strain(universe.lookup("S1").unwrap());
        gcf.add_strain(universe.lookup("S2").unwrap());
        gcf.add_strain(universe.lookup("S3").unwrap());

        let mut rng = StdRng::seed_from_u64(5);
        gcf.attach_surrogate(&universe, &mut rng);

        let random = GenomicUnit::surrogate(&gcf).unwrap();
        assert_eq!(random.strain_count(), 3);
        assert!(random.bgcs().is_empty());
    }
}
