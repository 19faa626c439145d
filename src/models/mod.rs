//! Comparable entities and the capability traits the scoring core sees.
//!
//! Scoring functions and the parallel driver never depend on the concrete
//! spectrum/family/GCF types directly; they see only the traits defined
//! here. The loader (out of scope for this crate) builds the concrete types
//! and hands them over as slices.

pub mod genomics;
pub mod metabolomics;

pub use genomics::{Bgc, Gcf};
pub use metabolomics::{Annotation, MolecularFamily, Spectrum};

use crate::strain::Strain;

/// The core capability: an entity that knows which strains it was observed
/// in.
pub trait StrainOccurrence {
    /// Stable identifier, unique within the entity's collection.
    fn id(&self) -> &str;

    /// Whether `strain` was observed in this entity.
    fn has_strain(&self, strain: &Strain) -> bool;
}

/// A metabolomic comparable unit: a spectrum or a molecular family.
pub trait MetabolomicUnit: StrainOccurrence {
    /// Textual annotations attached by upstream library matching.
    fn annotations(&self) -> &[Annotation];

    /// The randomized null-model counterpart, if one was attached.
    fn surrogate(&self) -> Option<&Self>
    where
        Self: Sized;
}

/// A genomic comparable unit: a gene-cluster family.
pub trait GenomicUnit: StrainOccurrence {
    /// The constituent BGCs, which carry the reference-cluster identifiers
    /// used by annotation scoring.
    fn reference_clusters(&self) -> &[Bgc];

    /// The randomized null-model counterpart, if one was attached.
    fn surrogate(&self) -> Option<&Self>
    where
        Self: Sized;
}
