// SPDX-License-Identifier: AGPL-3.0-only

//! Test-case discovery for a reference/current result pair.
//!
//! The reference directory is authoritative: every entry in it is a case,
//! and each case must have a same-named entry in the current directory.
//! Entries that exist only in the current directory are ignored.
//!
//! Case names are returned sorted so repeated runs visit cases in the same
//! order on every platform. Names are kept as raw `OsString`s; they are only
//! converted (lossily) when printed.

use crate::error::ValidatorError;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// A reference/current document pair for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePair {
    /// File name shared by both documents.
    pub name: OsString,
    /// Path of the reference document.
    pub reference: PathBuf,
    /// Path of the current document.
    pub current: PathBuf,
}

/// The two results directories, both checked to exist.
#[derive(Debug, Clone)]
pub struct ResultDirs {
    reference: PathBuf,
    current: PathBuf,
}

impl ResultDirs {
    /// Resolve both directories.
    ///
    /// Paths are made absolute against the working directory and `.`/`..`
    /// segments are resolved lexically, so error messages name the directory
    /// unambiguously. The reference directory is checked first.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::PathNotFound`] if either path does not exist.
    pub fn new(reference: &Path, current: &Path) -> Result<Self, ValidatorError> {
        let reference = absolute(reference);
        let current = absolute(current);
        for dir in [&reference, &current] {
            if !dir.exists() {
                return Err(ValidatorError::PathNotFound { path: dir.clone() });
            }
        }
        Ok(Self { reference, current })
    }

    /// Reference results directory.
    #[must_use]
    pub fn reference(&self) -> &Path {
        &self.reference
    }

    /// Current results directory.
    #[must_use]
    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Names of every entry in the reference directory, sorted.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::Io`] if the directory cannot be listed.
    pub fn case_names(&self) -> Result<Vec<OsString>, ValidatorError> {
        list_names(&self.reference)
    }

    /// Pair a reference case with its counterpart in the current directory.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::MissingCounterpart`] if the current directory has no
    /// entry named `name`.
    pub fn pair(&self, name: &OsStr) -> Result<CasePair, ValidatorError> {
        let current = self.current.join(name);
        if !current.exists() {
            return Err(ValidatorError::MissingCounterpart {
                file: name.to_string_lossy().into_owned(),
                current_dir: self.current.clone(),
            });
        }
        Ok(CasePair {
            name: name.to_os_string(),
            reference: self.reference.join(name),
            current,
        })
    }
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };
    normalize(&joined)
}

/// Lexical `.`/`..` resolution; symlinks are not followed.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn list_names(dir: &Path) -> Result<Vec<OsString>, ValidatorError> {
    let io_err = |source| ValidatorError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}
