// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for the GFCC regression gate.
//!
//! Every variant is terminal: the gate stops at the first one it sees. The
//! `Display` text of each variant is the single line printed by
//! `compare_results` before it exits with status 1.

use crate::document::SpectralPoint;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Display wrapper for reported values.
///
/// Magnitudes below 1e-4 or at/above 1e16 print in exponent form and whole
/// numbers keep a trailing `.0`, so `1.5e-12` and `-76.0` read as reals in
/// a CI log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Real(pub f64);

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.0;
        if !x.is_finite() {
            return write!(f, "{x}");
        }
        let mag = x.abs();
        if mag != 0.0 && !(1e-4..1e16).contains(&mag) {
            return write!(f, "{x:e}");
        }
        if x.fract() == 0.0 {
            write!(f, "{x:.1}")
        } else {
            write!(f, "{x}")
        }
    }
}

/// Which structural count disagreed between reference and current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralField {
    /// `output.GFCCSD.retarded_alpha.nlevels`
    LevelCount,
    /// `omega_npts` of the named level (e.g. `level2`).
    PointCount {
        /// Level key, `level{i}`.
        level: String,
    },
}

/// Errors raised while pairing, loading, or comparing result documents.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// A supplied results directory does not exist.
    #[error("ERROR: {} does not exist!", path.display())]
    PathNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// A reference case has no same-named file in the current directory.
    #[error("ERROR: {file} not available in {}", current_dir.display())]
    MissingCounterpart {
        /// Case file name.
        file: String,
        /// Current results directory that lacks it.
        current_dir: PathBuf,
    },

    /// A scalar quantity (SCF or CCSD energy) is not close enough.
    #[error(
        "ERROR: {quantity} does not match. reference: {}, current: {}",
        Real(*reference),
        Real(*current)
    )]
    ValueMismatch {
        /// Human-readable quantity name.
        quantity: &'static str,
        /// Reference value.
        reference: f64,
        /// Current value.
        current: f64,
    },

    /// A spectral sample disagrees in frequency or amplitude.
    #[error(
        "GFCC ERROR in {level}: omega, A_a mismatch. reference (w, A0): ({},{}), current (w, A0): ({},{})",
        Real(reference.omega),
        Real(reference.amplitude),
        Real(current.omega),
        Real(current.amplitude)
    )]
    SpectralMismatch {
        /// Level key, `level{i}`.
        level: String,
        /// Reference `(omega, A_a)`.
        reference: SpectralPoint,
        /// Current `(omega, A_a)`.
        current: SpectralPoint,
    },

    /// Level count or per-level point count differ.
    #[error("{}", structural_message(field, *reference, *current))]
    StructuralMismatch {
        /// Which count disagreed.
        field: StructuralField,
        /// Reference count.
        reference: u64,
        /// Current count.
        current: u64,
    },

    /// A result document could not be read.
    #[error("ERROR: cannot read {}: {source}", path.display())]
    Io {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A result document is not valid JSON.
    #[error("ERROR: cannot parse {}: {source}", path.display())]
    Parse {
        /// File with malformed JSON.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A required field is absent or has the wrong JSON type.
    #[error("ERROR: {field} missing or malformed in {}", path.display())]
    MissingField {
        /// Document the lookup ran against.
        path: PathBuf,
        /// Dotted path of the field.
        field: String,
    },
}

fn structural_message(field: &StructuralField, reference: u64, current: u64) -> String {
    match field {
        StructuralField::LevelCount => format!(
            "ERROR: number of levels in GFCCSD calculation does not match. reference: {reference}, current: {current}"
        ),
        StructuralField::PointCount { level } => format!(
            "ERROR in {level}: number of frequency points in GFCCSD calculation does not match. reference: {reference}, current: {current}"
        ),
    }
}
