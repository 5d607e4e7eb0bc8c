// SPDX-License-Identifier: AGPL-3.0-only

//! GFCC result document loading and typed field access.
//!
//! The solver writes one JSON document per test case:
//!
//! ```text
//! input.CCSD.threshold
//! input.GFCCSD.gf_threshold
//! output.SCF.final_energy
//! output.CCSD.final_energy.correlation
//! output.GFCCSD.retarded_alpha.nlevels
//! output.GFCCSD.retarded_alpha.level{i}.omega_npts        (i = 1..=nlevels)
//! output.GFCCSD.retarded_alpha.level{i}.{j}.{omega, A_a}  (j = 0..omega_npts)
//! ```
//!
//! The file is parsed once into a [`serde_json::Value`] tree and each
//! quantity is looked up on demand, so a document missing a later section
//! still reports an earlier mismatch first.

use crate::error::ValidatorError;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A single `(omega, A_a)` sample of the retarded alpha spectral function.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpectralPoint {
    /// Frequency coordinate.
    pub omega: f64,
    /// Spectral amplitude.
    #[serde(rename = "A_a")]
    pub amplitude: f64,
}

/// One parsed result document.
#[derive(Debug, Clone)]
pub struct ResultDocument {
    path: PathBuf,
    root: Value,
}

impl ResultDocument {
    /// Read and parse a result document.
    ///
    /// Uses streaming `from_reader`; documents are small but there is no
    /// reason to buffer them as an intermediate string.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::Io`] if the file cannot be opened,
    /// [`ValidatorError::Parse`] if it is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, ValidatorError> {
        let file = std::fs::File::open(path).map_err(|source| ValidatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            ValidatorError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// Wrap an already-parsed tree. `path` is only used in error messages.
    #[must_use]
    pub fn from_value(path: impl Into<PathBuf>, root: Value) -> Self {
        Self {
            path: path.into(),
            root,
        }
    }

    /// File this document was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `output.SCF.final_energy`
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if absent or not a number.
    pub fn scf_energy(&self) -> Result<f64, ValidatorError> {
        self.real(&["output", "SCF", "final_energy"])
    }

    /// `output.CCSD.final_energy.correlation`
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if absent or not a number.
    pub fn ccsd_correlation(&self) -> Result<f64, ValidatorError> {
        self.real(&["output", "CCSD", "final_energy", "correlation"])
    }

    /// `input.CCSD.threshold`
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if absent or not a number.
    pub fn ccsd_threshold(&self) -> Result<f64, ValidatorError> {
        self.real(&["input", "CCSD", "threshold"])
    }

    /// `input.GFCCSD.gf_threshold`
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if absent or not a number.
    pub fn gf_threshold(&self) -> Result<f64, ValidatorError> {
        self.real(&["input", "GFCCSD", "gf_threshold"])
    }

    /// `output.GFCCSD.retarded_alpha`
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if absent.
    pub fn retarded_alpha(&self) -> Result<SpectralTable<'_>, ValidatorError> {
        let path = ["output", "GFCCSD", "retarded_alpha"];
        let node = self.lookup(&path)?;
        Ok(SpectralTable {
            doc: self,
            node,
            prefix: path.join("."),
        })
    }

    fn lookup(&self, keys: &[&str]) -> Result<&Value, ValidatorError> {
        lookup_in(&self.root, keys).ok_or_else(|| self.missing(&keys.join(".")))
    }

    fn real(&self, keys: &[&str]) -> Result<f64, ValidatorError> {
        self.lookup(keys)?
            .as_f64()
            .ok_or_else(|| self.missing(&keys.join(".")))
    }

    fn missing(&self, field: &str) -> ValidatorError {
        ValidatorError::MissingField {
            path: self.path.clone(),
            field: field.to_string(),
        }
    }
}

fn lookup_in<'v>(root: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    keys.iter().try_fold(root, |node, key| node.get(*key))
}

/// View over `output.GFCCSD.retarded_alpha`.
#[derive(Debug, Clone)]
pub struct SpectralTable<'d> {
    doc: &'d ResultDocument,
    node: &'d Value,
    prefix: String,
}

impl<'d> SpectralTable<'d> {
    /// Number of levels (levels are 1-indexed).
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if absent or not a non-negative integer.
    pub fn nlevels(&self) -> Result<u64, ValidatorError> {
        self.node
            .get("nlevels")
            .and_then(Value::as_u64)
            .ok_or_else(|| self.doc.missing(&format!("{}.nlevels", self.prefix)))
    }

    /// Level `index` (1-based), keyed `level{index}`.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if the level is absent.
    pub fn level(&self, index: u64) -> Result<SpectralLevel<'d>, ValidatorError> {
        let key = level_key(index);
        let prefix = format!("{}.{key}", self.prefix);
        let node = self
            .node
            .get(&key)
            .ok_or_else(|| self.doc.missing(&prefix))?;
        Ok(SpectralLevel {
            doc: self.doc,
            node,
            key,
            prefix,
        })
    }
}

/// Document key for a 1-based level index.
#[must_use]
pub fn level_key(index: u64) -> String {
    format!("level{index}")
}

/// View over one `level{i}` block.
#[derive(Debug, Clone)]
pub struct SpectralLevel<'d> {
    doc: &'d ResultDocument,
    node: &'d Value,
    key: String,
    prefix: String,
}

impl SpectralLevel<'_> {
    /// The `level{i}` key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of frequency samples in this level.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if absent or not a non-negative integer.
    pub fn omega_npts(&self) -> Result<u64, ValidatorError> {
        self.node
            .get("omega_npts")
            .and_then(Value::as_u64)
            .ok_or_else(|| self.doc.missing(&format!("{}.omega_npts", self.prefix)))
    }

    /// Sample `index` (0-based), keyed by its decimal string.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingField`] if the sample is absent or lacks a
    /// numeric `omega` / `A_a`.
    pub fn point(&self, index: u64) -> Result<SpectralPoint, ValidatorError> {
        let field = format!("{}.{index}", self.prefix);
        let node = self
            .node
            .get(index.to_string())
            .ok_or_else(|| self.doc.missing(&field))?;
        SpectralPoint::deserialize(node).map_err(|_| self.doc.missing(&field))
    }
}
