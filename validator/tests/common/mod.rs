// SPDX-License-Identifier: AGPL-3.0-only

//! Shared fixtures: GFCC result documents written into temp directories.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Parameters of one synthetic GFCC result document.
#[derive(Debug, Clone)]
pub struct CaseSpec {
    pub scf: f64,
    pub ccsd: f64,
    pub ccsd_threshold: f64,
    pub gf_threshold: f64,
    /// One entry per level, each a list of `(omega, A_a)` samples.
    pub levels: Vec<Vec<(f64, f64)>>,
}

impl CaseSpec {
    /// Scenario A baseline: water-like energies, one level with two points.
    pub fn water() -> Self {
        Self {
            scf: -76.02633,
            ccsd: -0.29715,
            ccsd_threshold: 1e-6,
            gf_threshold: 1e-4,
            levels: vec![vec![(-0.55, 0.0123), (-0.54, 0.0456)]],
        }
    }

    pub fn to_json(&self) -> Value {
        let mut table = json!({ "nlevels": self.levels.len() });
        for (i, points) in self.levels.iter().enumerate() {
            let mut level = json!({ "omega_npts": points.len() });
            for (j, (omega, amp)) in points.iter().enumerate() {
                level[j.to_string()] = json!({ "omega": omega, "A_a": amp });
            }
            table[format!("level{}", i + 1)] = level;
        }
        json!({
            "input": {
                "CCSD": { "threshold": self.ccsd_threshold },
                "GFCCSD": { "gf_threshold": self.gf_threshold }
            },
            "output": {
                "SCF": { "final_energy": self.scf },
                "CCSD": { "final_energy": { "correlation": self.ccsd } },
                "GFCCSD": { "retarded_alpha": table }
            }
        })
    }
}

/// Write `spec` as `dir/name`, creating `dir` if needed.
pub fn write_case(dir: &Path, name: &str, spec: &CaseSpec) {
    fs::create_dir_all(dir).expect("results dir should be created");
    let body = serde_json::to_string_pretty(&spec.to_json()).expect("fixture serializes");
    fs::write(dir.join(name), body).expect("fixture should be written");
}
