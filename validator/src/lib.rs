// SPDX-License-Identifier: AGPL-3.0-only

//! GFCC CI regression gate.
//!
//! Compares a freshly computed GFCC result set (one JSON document per test
//! case) against a reference result set and stops at the first quantity that
//! drifted outside its tolerance.
//!
//! ## Modules
//!   - `discovery` — case enumeration and reference/current pairing
//!   - `document` — JSON result document loading and typed field access
//!   - `tolerances` — closeness predicate and default tolerances
//!   - `validation` — first-failure gate over SCF, CCSD, and GFCCSD quantities
//!   - `error` — the failure taxonomy; each variant's text is the CI error line
//!
//! ## Binary
//!   - `compare_results <reference_dir> <current_dir>` — exit 0 if every case
//!     matches, exit 1 with a single `ERROR:` line otherwise

pub mod discovery;
pub mod document;
pub mod error;
pub mod tolerances;
pub mod validation;

pub use error::ValidatorError;
pub use validation::{compare_directories, RunSummary};
