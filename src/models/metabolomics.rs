//! Metabolomic units: mass spectra and the molecular families that group
//! them.
//!
//! Strain membership is stored as a set of strain ids, so `has_strain` is a
//! single hash lookup. Both types can carry a randomized surrogate with the
//! same strain cardinality, drawn uniformly from the universe, for the
//! null-model comparison.

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{MetabolomicUnit, StrainOccurrence};
use crate::strain::{Strain, StrainCollection};

/// A `(name, source)` annotation pair, e.g. a GNPS library hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub source: String,
}

impl Annotation {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Annotation {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// A single mass spectrum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum {
    id: String,
    strains: HashSet<String>,
    annotations: Vec<Annotation>,
    /// Neutral-loss masses observed in the spectrum (precursor minus peak).
    losses: Vec<f64>,
    surrogate: Option<Box<Spectrum>>,
}

impl Spectrum {
    pub fn new(id: impl Into<String>) -> Self {
        Spectrum {
            id: id.into(),
            strains: HashSet::new(),
            annotations: Vec::new(),
            losses: Vec::new(),
            surrogate: None,
        }
    }

    /// Records that this spectrum was observed in `strain`.
    pub fn add_strain(&mut self, strain: &Strain) {
        self.strains.insert(strain.id().to_string());
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn add_loss(&mut self, mass: f64) {
        self.losses.push(mass);
    }

    pub fn strain_count(&self) -> usize {
        self.strains.len()
    }

    /// Whether any observed neutral loss lies within `tolerance` of `mass`.
    pub fn has_loss(&self, mass: f64, tolerance: f64) -> bool {
        self.losses.iter().any(|&m| (m - mass).abs() <= tolerance)
    }

    /// Attaches a randomized counterpart with the same number of strains,
    /// drawn uniformly without replacement from `universe`.
    pub fn attach_surrogate<R: Rng + ?Sized>(&mut self, universe: &StrainCollection, rng: &mut R) {
        let mut random = Spectrum::new(format!("{}::random", self.id));
        for strain in universe.iter().choose_multiple(rng, self.strains.len()) {
            random.add_strain(strain);
        }
        self.surrogate = Some(Box::new(random));
    }
}

impl StrainOccurrence for Spectrum {
    fn id(&self) -> &str {
        &self.id
    }

    fn has_strain(&self, strain: &Strain) -> bool {
        self.strains.contains(strain.id())
    }
}

impl MetabolomicUnit for Spectrum {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn surrogate(&self) -> Option<&Self> {
        self.surrogate.as_deref()
    }
}

/// The family id GNPS assigns to spectra that clustered with nothing else.
pub const SINGLETON_FAMILY_ID: i64 = -1;

/// A cluster of spectra grouped by spectral similarity.
///
/// Strain membership and annotations are the unions over the member
/// spectra, accumulated as members are added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MolecularFamily {
    id: String,
    family_id: i64,
    spectrum_ids: Vec<String>,
    strains: HashSet<String>,
    annotations: Vec<Annotation>,
    surrogate: Option<Box<MolecularFamily>>,
}

impl MolecularFamily {
    pub fn new(family_id: i64) -> Self {
        MolecularFamily {
            id: family_id.to_string(),
            family_id,
            spectrum_ids: Vec::new(),
            strains: HashSet::new(),
            annotations: Vec::new(),
            surrogate: None,
        }
    }

    pub fn family_id(&self) -> i64 {
        self.family_id
    }

    /// Whether this is a singleton family (conventionally keyed `-1`).
    pub fn is_singleton(&self) -> bool {
        self.family_id == SINGLETON_FAMILY_ID
    }

    /// Folds a member spectrum's strains and annotations into the family.
    pub fn add_spectrum(&mut self, spectrum: &Spectrum) {
        self.spectrum_ids.push(spectrum.id.clone());
        self.strains.extend(spectrum.strains.iter().cloned());
        self.annotations.extend(spectrum.annotations.iter().cloned());
    }

    pub fn spectrum_ids(&self) -> &[String] {
        &self.spectrum_ids
    }

    pub fn strain_count(&self) -> usize {
        self.strains.len()
    }

    /// Attaches a randomized counterpart, as for [`Spectrum::attach_surrogate`].
    pub fn attach_surrogate<R: Rng + ?Sized>(&mut self, universe: &StrainCollection, rng: &mut R) {
        let mut random = MolecularFamily::new(self.family_id);
        random.id = format!("{}::random", self.id);
        for strain in universe.iter().choose_multiple(rng, self.strains.len()) {
            random.strains.insert(strain.id().to_string());
        }
        self.surrogate = Some(Box::new(random));
    }
}

impl StrainOccurrence for MolecularFamily {
    fn id(&self) -> &str {
        &self.id
    }

    fn has_strain(&self, strain: &Strain) -> bool {
        self.strains.contains(strain.id())
    }
}

impl MetabolomicUnit for MolecularFamily {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
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

    fn universe(n: usize) -> StrainCollection {
        (0..n).map(|i| Strain::new(format!("S{i}"))).collect()
    }

    #[test]
    fn test_spectrum_strain_membership() {
        let strains = universe(3);
        let mut spectrum = Spectrum::new("spec_1");
        spectrum.add_strain(strains.lookup("S0").unwrap());

        assert!(spectrum.has_strain(&Strain::new("S0")));
        assert!(!spectrum.has_strain(&Strain::new("S1")));
    }

    #[test]
    fn test_family_unions_members() {
        let strains = universe(3);
        let mut s1 = Spectrum::new("spec_1");
        s1.add_strain(strains.lookup("S0").unwrap());
        s1.add_annotation(Annotation::new("Rifamycin", "gnps"));
        let mut s2 = Spectrum::new("spec_2");
        s2.add_strain(strains.lookup("S1").unwrap());

        let mut family = MolecularFamily::new(7);
        family.add_spectrum(&s1);
        family.add_spectrum(&s2);

        assert!(!family.is_singleton());
        assert_eq!(family.strain_count(), 2);
        assert_eq!(family.annotations().len(), 1);
        assert_eq!(family.spectrum_ids(), ["spec_1", "spec_2"]);
    }

    #[test]
    fn test_singleton_convention() {
        assert!(MolecularFamily::new(SINGLETON_FAMILY_ID).is_singleton());
    }

    #[test]
    fn test_surrogate_preserves_cardinality() {
        let strains = universe(10);
        let mut spectrum = Spectrum::new("spec_1");
        spectrum.add_strain(strains.lookup("S0").unwrap());
        spectrum.add_strain(strains.lookup("S4").unwrap());

        let mut rng = StdRng::seed_from_u64(11);
        spectrum.attach_surrogate(&strains, &mut rng);

        let random = MetabolomicUnit::surrogate(&spectrum).unwrap();
        assert_eq!(random.strain_count(), 2);
        assert_eq!(random.id(), "spec_1::random");
    }

    #[test]
    fn test_has_loss_within_tolerance() {
        let mut spectrum = Spectrum::new("spec_1");
        spectrum.add_loss(71.0371); // alanine residue
        assert!(spectrum.has_loss(71.04, 0.01));
        assert!(!spectrum.has_loss(71.06, 0.01));
    }
}
