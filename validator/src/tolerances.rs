// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized comparison tolerances for GFCC result regression checks.
//!
//! Two quantity families use the fixed defaults below (SCF total energy and
//! GFCCSD frequency coordinates). The CCSD correlation energy and the GFCCSD
//! spectral amplitude use a relative threshold read from the reference
//! document's `input` block, so the case that produced the baseline decides
//! how tight its own comparison is.
//!
//! # Tolerance table
//!
//! | Quantity | Relative | Absolute | Source |
//! |----------|----------|----------|--------|
//! | `SCF.final_energy` | 1e-9 | 0 | [`DEFAULT_REL_TOL`] |
//! | `CCSD.final_energy.correlation` | `input.CCSD.threshold` | 0 | reference doc |
//! | `retarded_alpha.level{i}.{j}.omega` | 1e-9 | 0 | [`DEFAULT_REL_TOL`] |
//! | `retarded_alpha.level{i}.{j}.A_a` | `input.GFCCSD.gf_threshold` | 0 | reference doc |
//! | `nlevels`, `omega_npts` | exact | exact | integer equality |

use std::fmt;

/// Default relative tolerance.
///
/// Nine significant digits: tight enough to flag any change in an SCF
/// energy printed to the solver's usual precision, loose enough to absorb
/// reduction-order noise across MPI layouts.
pub const DEFAULT_REL_TOL: f64 = 1e-9;

/// Default absolute tolerance.
///
/// Zero, so values near zero must match exactly unless a caller supplies
/// an explicit floor.
pub const DEFAULT_ABS_TOL: f64 = 0.0;

/// A relative/absolute tolerance pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Relative tolerance, scaled by the larger magnitude of the two values.
    pub rel: f64,
    /// Absolute floor.
    pub abs: f64,
}

impl Tolerance {
    /// The fixed default used for SCF energies and frequencies.
    pub const DEFAULT: Self = Self {
        rel: DEFAULT_REL_TOL,
        abs: DEFAULT_ABS_TOL,
    };

    /// Pure relative tolerance (absolute floor of zero).
    #[must_use]
    pub const fn relative(rel: f64) -> Self {
        Self {
            rel,
            abs: DEFAULT_ABS_TOL,
        }
    }

    /// Whether `a` and `b` are close under this tolerance.
    #[must_use]
    pub fn accepts(&self, a: f64, b: f64) -> bool {
        is_close(a, b, self.rel, self.abs)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rel={:.2e}, abs={:.2e}", self.rel, self.abs)
    }
}

/// Relative-dominant closeness test.
///
/// `|a - b| <= max(rel_tol * max(|a|, |b|), abs_tol)`
///
/// Symmetric in `a` and `b`. With `abs_tol = 0` a value is only close to
/// zero if it is zero. NaN is never close to anything; identical values
/// (including equal infinities) are always close.
#[must_use]
pub fn is_close(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    diff <= (rel_tol * a.abs().max(b.abs())).max(abs_tol)
}
