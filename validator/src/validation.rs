// SPDX-License-Identifier: AGPL-3.0-only

//! Regression gate for GFCC result sets.
//!
//! Every comparison follows the same pattern:
//!   - Reference document is authoritative (its thresholds, its case list)
//!   - Fixed check order: SCF → CCSD → level count → per level
//!     (point count, then every `(omega, A_a)` sample)
//!   - The first failing check aborts the whole run
//!
//! [`RegressionGate`] records each check it performs and turns the first
//! failure into a [`ValidatorError`]. [`compare_case`] drives it over one
//! document pair; [`compare_directories`] drives it over a results tree.

use crate::discovery::ResultDirs;
use crate::document::ResultDocument;
use crate::error::{StructuralField, ValidatorError};
use crate::tolerances::Tolerance;
use std::path::Path;
use tracing::{debug, info, trace};

/// How a check decided pass/fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckMode {
    /// Closeness under a relative/absolute tolerance pair.
    Close(Tolerance),
    /// Integer equality.
    Exact,
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Close(tol) => write!(f, "close({tol})"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// A single comparison performed by the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    /// Human-readable label (e.g. `level2.omega[5]`).
    pub label: String,
    /// Reference value.
    pub reference: f64,
    /// Current value.
    pub current: f64,
    /// How the comparison was made.
    pub mode: CheckMode,
    /// Whether it passed.
    pub passed: bool,
}

/// First-failure regression gate.
///
/// Unlike an accumulating harness, every `check_*` method returns `Err` on
/// the first failure so callers can stop with `?`. Only counts and the most
/// recent check are retained; every check is emitted as a `trace` event.
#[derive(Debug, Default)]
#[must_use]
pub struct RegressionGate {
    total: usize,
    passed: usize,
    last: Option<Check>,
}

impl RegressionGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent check (the failing one, after an `Err`).
    #[must_use]
    pub fn last_check(&self) -> Option<&Check> {
        self.last.as_ref()
    }

    /// Number of checks performed.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total
    }

    /// Number of checks that passed.
    #[must_use]
    pub const fn passed_count(&self) -> usize {
        self.passed
    }

    /// Record a closeness check and report whether it passed.
    pub fn record_close(
        &mut self,
        label: &str,
        reference: f64,
        current: f64,
        tol: Tolerance,
    ) -> bool {
        let passed = tol.accepts(reference, current);
        self.push(Check {
            label: label.to_string(),
            reference,
            current,
            mode: CheckMode::Close(tol),
            passed,
        });
        passed
    }

    /// Scalar closeness check.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::ValueMismatch`] naming `quantity` if the values are
    /// not close under `tol`.
    pub fn check_value(
        &mut self,
        quantity: &'static str,
        reference: f64,
        current: f64,
        tol: Tolerance,
    ) -> Result<(), ValidatorError> {
        if self.record_close(quantity, reference, current, tol) {
            Ok(())
        } else {
            Err(ValidatorError::ValueMismatch {
                quantity,
                reference,
                current,
            })
        }
    }

    /// Exact structural count check.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::StructuralMismatch`] if the counts differ.
    #[allow(clippy::cast_precision_loss)]
    pub fn check_count(
        &mut self,
        field: StructuralField,
        reference: u64,
        current: u64,
    ) -> Result<(), ValidatorError> {
        let passed = reference == current;
        let label = match &field {
            StructuralField::LevelCount => "nlevels".to_string(),
            StructuralField::PointCount { level } => format!("{level}.omega_npts"),
        };
        self.push(Check {
            label,
            reference: reference as f64,
            current: current as f64,
            mode: CheckMode::Exact,
            passed,
        });
        if passed {
            Ok(())
        } else {
            Err(ValidatorError::StructuralMismatch {
                field,
                reference,
                current,
            })
        }
    }

    fn push(&mut self, check: Check) {
        trace!(
            label = %check.label,
            reference = check.reference,
            current = check.current,
            mode = %check.mode,
            passed = check.passed,
            "check"
        );
        self.total += 1;
        if check.passed {
            self.passed += 1;
        }
        self.last = Some(check);
    }
}

/// Compare one reference/current document pair.
///
/// # Errors
///
/// The first mismatch in the fixed check order, or a
/// [`ValidatorError::MissingField`] if a required field is absent.
pub fn compare_case(
    gate: &mut RegressionGate,
    reference: &ResultDocument,
    current: &ResultDocument,
) -> Result<(), ValidatorError> {
    gate.check_value(
        "SCF energy",
        reference.scf_energy()?,
        current.scf_energy()?,
        Tolerance::DEFAULT,
    )?;

    let ref_ccsd = reference.ccsd_correlation()?;
    let cur_ccsd = current.ccsd_correlation()?;
    let ccsd_tol = Tolerance::relative(reference.ccsd_threshold()?);
    gate.check_value("CCSD correlation energy", ref_ccsd, cur_ccsd, ccsd_tol)?;

    let ref_gf = reference.retarded_alpha()?;
    let cur_gf = current.retarded_alpha()?;
    let nlevels = ref_gf.nlevels()?;
    gate.check_count(StructuralField::LevelCount, nlevels, cur_gf.nlevels()?)?;

    let gf_tol = Tolerance::relative(reference.gf_threshold()?);

    for index in 1..=nlevels {
        let ref_level = ref_gf.level(index)?;
        let cur_level = cur_gf.level(index)?;
        let npts = ref_level.omega_npts()?;
        gate.check_count(
            StructuralField::PointCount {
                level: ref_level.key().to_string(),
            },
            npts,
            cur_level.omega_npts()?,
        )?;

        for point in 0..npts {
            let ref_pt = ref_level.point(point)?;
            let cur_pt = cur_level.point(point)?;
            // Near-zero reference omega is compared as-is; no snapping to 0.
            let omega_ok = gate.record_close(
                &format!("{}.omega[{point}]", ref_level.key()),
                ref_pt.omega,
                cur_pt.omega,
                Tolerance::DEFAULT,
            );
            let amp_ok = omega_ok
                && gate.record_close(
                    &format!("{}.A_a[{point}]", ref_level.key()),
                    ref_pt.amplitude,
                    cur_pt.amplitude,
                    gf_tol,
                );
            if !amp_ok {
                return Err(ValidatorError::SpectralMismatch {
                    level: ref_level.key().to_string(),
                    reference: ref_pt,
                    current: cur_pt,
                });
            }
        }
    }
    Ok(())
}

/// Outcome of a fully passing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of cases compared.
    pub cases: usize,
    /// Number of individual checks performed.
    pub checks: usize,
}

/// Compare every case in `reference_dir` against `current_dir`.
///
/// Cases are visited in sorted name order; the first failure of any kind
/// stops the run.
///
/// # Errors
///
/// [`ValidatorError::PathNotFound`], [`ValidatorError::MissingCounterpart`],
/// document load/lookup errors, or the first quantity mismatch.
pub fn compare_directories(
    reference_dir: &Path,
    current_dir: &Path,
) -> Result<RunSummary, ValidatorError> {
    let dirs = ResultDirs::new(reference_dir, current_dir)?;
    let mut gate = RegressionGate::new();
    let names = dirs.case_names()?;

    for name in &names {
        let pair = dirs.pair(name)?;
        debug!(case = %pair.name.to_string_lossy(), "comparing");
        let reference = ResultDocument::load(&pair.reference)?;
        let current = ResultDocument::load(&pair.current)?;
        let before = gate.total_count();
        compare_case(&mut gate, &reference, &current)?;
        debug!(
            case = %pair.name.to_string_lossy(),
            checks = gate.total_count() - before,
            "case passed"
        );
    }

    let summary = RunSummary {
        cases: names.len(),
        checks: gate.total_count(),
    };
    info!(
        cases = summary.cases,
        checks = summary.checks,
        reference = %dirs.reference().display(),
        current = %dirs.current().display(),
        "all cases match reference"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(scf: f64, ccsd: f64, ccsd_thresh: f64, points: &[(f64, f64)]) -> ResultDocument {
        doc_with_gf(scf, ccsd, ccsd_thresh, 1e-4, points)
    }

    fn doc_with_gf(
        scf: f64,
        ccsd: f64,
        ccsd_thresh: f64,
        gf_thresh: f64,
        points: &[(f64, f64)],
    ) -> ResultDocument {
        let mut level = json!({ "omega_npts": points.len() });
        for (j, (w, a)) in points.iter().enumerate() {
            level[j.to_string()] = json!({ "omega": w, "A_a": a });
        }
        ResultDocument::from_value(
            "case.json",
            json!({
                "input": {
                    "CCSD": { "threshold": ccsd_thresh },
                    "GFCCSD": { "gf_threshold": gf_thresh }
                },
                "output": {
                    "SCF": { "final_energy": scf },
                    "CCSD": { "final_energy": { "correlation": ccsd } },
                    "GFCCSD": { "retarded_alpha": { "nlevels": 1, "level1": level } }
                }
            }),
        )
    }

    const POINTS: [(f64, f64); 2] = [(-0.5, 1.2), (-0.4, 2.4)];

    #[test]
    fn matching_case_passes_and_counts_checks() {
        let reference = doc(-76.02633, -0.29715, 1e-6, &POINTS);
        let current = doc(-76.02633, -0.297_150_1, 1e-6, &POINTS);
        let mut gate = RegressionGate::new();
        compare_case(&mut gate, &reference, &current).unwrap();
        // scf + ccsd + nlevels + npts + 2 * (omega + A_a)
        assert_eq!(gate.total_count(), 8);
        assert_eq!(gate.passed_count(), 8);
        assert_eq!(gate.last_check().map(|c| c.label.as_str()), Some("level1.A_a[1]"));
    }

    #[test]
    fn scf_reported_before_ccsd() {
        let reference = doc(-76.02633, -0.29715, 1e-6, &POINTS);
        let current = doc(-76.02634, -0.5, 1e-6, &POINTS);
        let err = compare_case(&mut RegressionGate::new(), &reference, &current).unwrap_err();
        assert!(
            matches!(err, ValidatorError::ValueMismatch { quantity: "SCF energy", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn ccsd_threshold_comes_from_reference() {
        // rel diff ~3.4e-5: fails at 1e-6, passes at 1e-3
        let strict_ref = doc(-76.0, -0.29715, 1e-6, &POINTS);
        let loose_cur = doc(-76.0, -0.29716, 1e-3, &POINTS);
        let err = compare_case(&mut RegressionGate::new(), &strict_ref, &loose_cur).unwrap_err();
        assert!(matches!(
            err,
            ValidatorError::ValueMismatch {
                quantity: "CCSD correlation energy",
                ..
            }
        ));

        let loose_ref = doc(-76.0, -0.29715, 1e-3, &POINTS);
        let strict_cur = doc(-76.0, -0.29716, 1e-6, &POINTS);
        compare_case(&mut RegressionGate::new(), &loose_ref, &strict_cur).unwrap();
    }

    #[test]
    fn point_count_mismatch_names_level() {
        let reference = doc(-1.0, -0.1, 1e-6, &POINTS);
        let current = doc(-1.0, -0.1, 1e-6, &POINTS[..1]);
        match compare_case(&mut RegressionGate::new(), &reference, &current) {
            Err(ValidatorError::StructuralMismatch {
                field: StructuralField::PointCount { level },
                reference: 2,
                current: 1,
            }) => assert_eq!(level, "level1"),
            other => panic!("expected point-count mismatch, got {other:?}"),
        }
    }

    #[test]
    fn omega_mismatch_halts_at_first_point() {
        let reference = doc(-1.0, -0.1, 1e-6, &POINTS);
        let current = doc(-1.0, -0.1, 1e-6, &[(-0.5001, 1.2), (-0.4, 99.0)]);
        let mut gate = RegressionGate::new();
        let err = compare_case(&mut gate, &reference, &current).unwrap_err();
        match err {
            ValidatorError::SpectralMismatch { level, reference, current } => {
                assert_eq!(level, "level1");
                assert!((reference.omega + 0.5).abs() < f64::EPSILON);
                assert!((current.omega + 0.5001).abs() < f64::EPSILON);
            }
            other => panic!("expected spectral mismatch, got {other:?}"),
        }
        // scf, ccsd, nlevels, npts, omega[0]; the second point was never visited
        assert_eq!(gate.total_count(), 5);
        assert_eq!(gate.passed_count(), 4);
        let last = gate.last_check().expect("a check was recorded");
        assert_eq!(last.label, "level1.omega[0]");
        assert!(!last.passed);
    }

    #[test]
    fn amplitude_uses_gf_threshold() {
        let reference = doc(-1.0, -0.1, 1e-6, &POINTS);
        // 5e-5 relative on A_a is inside gf_threshold = 1e-4
        let within = doc(-1.0, -0.1, 1e-6, &[(-0.5, 1.2 * (1.0 + 5e-5)), (-0.4, 2.4)]);
        compare_case(&mut RegressionGate::new(), &reference, &within).unwrap();

        let outside = doc(-1.0, -0.1, 1e-6, &[(-0.5, 1.2 * (1.0 + 5e-4)), (-0.4, 2.4)]);
        assert!(matches!(
            compare_case(&mut RegressionGate::new(), &reference, &outside),
            Err(ValidatorError::SpectralMismatch { .. })
        ));
    }

    #[test]
    fn amplitude_threshold_comes_from_reference() {
        // A_a rel diff ~1e-3: fails at 1e-6, passes at 1e-2
        let drifted = [(-0.5, 1.2 * (1.0 + 1e-3)), (-0.4, 2.4)];

        let strict_ref = doc_with_gf(-1.0, -0.1, 1e-6, 1e-6, &POINTS);
        let loose_cur = doc_with_gf(-1.0, -0.1, 1e-6, 1e-2, &drifted);
        assert!(matches!(
            compare_case(&mut RegressionGate::new(), &strict_ref, &loose_cur),
            Err(ValidatorError::SpectralMismatch { .. })
        ));

        let loose_ref = doc_with_gf(-1.0, -0.1, 1e-6, 1e-2, &POINTS);
        let strict_cur = doc_with_gf(-1.0, -0.1, 1e-6, 1e-6, &drifted);
        compare_case(&mut RegressionGate::new(), &loose_ref, &strict_cur).unwrap();
    }

    #[test]
    fn near_zero_omega_is_not_snapped() {
        let reference = doc(-1.0, -0.1, 1e-6, &[(0.0, 1.0)]);
        let current = doc(-1.0, -0.1, 1e-6, &[(1e-14, 1.0)]);
        assert!(matches!(
            compare_case(&mut RegressionGate::new(), &reference, &current),
            Err(ValidatorError::SpectralMismatch { .. })
        ));
    }

    #[test]
    fn missing_gfccsd_in_current_surfaces_as_missing_field() {
        let reference = doc(-1.0, -0.1, 1e-6, &POINTS);
        let mut tree: Value = json!({
            "output": {
                "SCF": { "final_energy": -1.0 },
                "CCSD": { "final_energy": { "correlation": -0.1 } }
            }
        });
        tree["input"] = json!({});
        let current = ResultDocument::from_value("cur.json", tree);
        match compare_case(&mut RegressionGate::new(), &reference, &current) {
            Err(ValidatorError::MissingField { field, .. }) => {
                assert_eq!(field, "output.GFCCSD.retarded_alpha");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn check_mode_display() {
        assert_eq!(CheckMode::Exact.to_string(), "exact");
        assert!(CheckMode::Close(Tolerance::DEFAULT)
            .to_string()
            .starts_with("close(rel=1.00e-9"));
    }
}
