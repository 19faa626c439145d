//! Scoring core for linking metabolomics to genome mining.
//!
//! Given spectra/molecular families and gene-cluster families, each
//! annotated with the biological strains they were observed in, this crate
//! answers "which gene clusters plausibly produce which metabolites" by
//! scoring every pair. A run looks like:
//! 1. The loader (external to this crate) builds the strain universe and
//!    the two entity collections, optionally attaching randomized
//!    surrogates for the null model.
//! 2. [`driver::compute_all_scores`] shards the metabolomic collection
//!    across worker threads, each scoring its shard against every
//!    gene-cluster family with the chosen scoring function.
//! 3. The merged [`scoring::ScoreTable`] goes back to the analysis layer.
//!
//! Scoring functions are pure and usable on their own: Metcalf-style
//! co-occurrence ([`scoring::MetcalfScoring`]), hypergeometric
//! significance ([`scoring::hypergeometric_score`]), reference-annotation
//! matching ([`scoring::NameScoring`],
//! [`scoring::KnownClusterBlastScoring`]), and amino-acid mass-shift
//! likelihood ([`scoring::AaScoring`]).

pub mod driver;
pub mod models;
pub mod scoring;
pub mod strain;

pub use driver::{
    compute_all_scores, score_batch, BatchOptions, CancelToken, DriverConfig, DriverError,
};
pub use models::{
    Annotation, Bgc, Gcf, GenomicUnit, MetabolomicUnit, MolecularFamily, Spectrum,
    StrainOccurrence,
};
pub use scoring::{
    hypergeometric_score, AaLossTable, AaScoring, KnownClusterBlastScoring, MetcalfScoring,
    MetcalfWeights, NameScoring, ScoreEvidence, ScoreRecord, ScoreTable, ScoreValue,
};
pub use strain::{Strain, StrainCollection};
