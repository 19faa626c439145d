//! Amino-acid mass-shift scoring.
//!
//! NRPS gene clusters come with per-amino-acid incorporation predictions.
//! If a residue is confidently predicted in or out (probability outside the
//! 0.2..0.8 uncertain band), the spectrum either showing or not showing a
//! neutral loss at that residue's mass is evidence for or against the pair.
//! The score is the product of the corresponding probabilities, so it reads
//! as a likelihood: higher means the spectrum's losses agree with the
//! cluster's predictions.

use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::{ScoreEvidence, ScoreValue};
use crate::models::{Gcf, Spectrum};

/// Default mass tolerance (Da) when matching neutral losses.
pub const DEFAULT_LOSS_TOLERANCE: f64 = 0.01;

/// Predictions inside this band are too uncertain to count either way.
const UNCERTAIN_BAND: (f64, f64) = (0.2, 0.8);

#[derive(Debug, Deserialize)]
struct ResidueRow {
    residue: String,
    monoisotopic: f64,
    average: f64,
}

/// Residue -> (monoisotopic mass, average mass) lookup, loaded from the
/// `aa_residues.csv`-style table shipped with the dataset.
#[derive(Debug, Clone, Default)]
pub struct AaLossTable {
    masses: HashMap<String, (f64, f64)>,
}

impl AaLossTable {
    /// Loads a CSV with a `residue,monoisotopic,average` header.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut masses = HashMap::new();
        for row in reader.deserialize() {
            let row: ResidueRow = row?;
            masses.insert(row.residue, (row.monoisotopic, row.average));
        }
        debug!("loaded {} amino-acid residue masses", masses.len());
        Ok(AaLossTable { masses })
    }

    pub fn insert(&mut self, residue: impl Into<String>, monoisotopic: f64, average: f64) {
        self.masses.insert(residue.into(), (monoisotopic, average));
    }

    pub fn get(&self, residue: &str) -> Option<(f64, f64)> {
        self.masses.get(residue).copied()
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }
}

/// Likelihood scorer for amino-acid neutral losses.
#[derive(Debug, Clone)]
pub struct AaScoring {
    table: AaLossTable,
    tolerance: f64,
}

impl AaScoring {
    pub fn new(table: AaLossTable) -> Self {
        AaScoring {
            table,
            tolerance: DEFAULT_LOSS_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Scores one (spectrum, GCF) pair. A GCF with no confident predictions
    /// known to the table scores the neutral likelihood 1.0.
    pub fn score(&self, spectrum: &Spectrum, gcf: &Gcf) -> ScoreValue {
        let mut likelihood = 1.0;
        for (residue, probability) in gcf.aa_predictions() {
            if *probability >= UNCERTAIN_BAND.0 && *probability <= UNCERTAIN_BAND.1 {
                continue;
            }
            if let Some((monoisotopic, _)) = self.table.get(residue) {
                if spectrum.has_loss(monoisotopic, self.tolerance) {
                    likelihood *= probability;
                } else {
                    likelihood *= 1.0 - probability;
                }
            }
        }
        ScoreValue::new(likelihood, ScoreEvidence::None)
    }
}
