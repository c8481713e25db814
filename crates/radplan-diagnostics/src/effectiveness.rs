// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Effectiveness Report
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! How well a dose field covers the tumor while sparing critical tissue.
//!
//! Each region is the dose field masked by its 0/1 mask. A region whose
//! masked dose has no positive entry is reported as [`RegionReport::NoDose`];
//! otherwise:
//! - `total`: dose summed over flagged cells,
//! - `mean`: `total` over the flagged cells that received dose,
//! - `acceptable`: flagged cells within the bound (critical `<= max_rad`,
//!   tumor `>= min_rad`),
//! - `percent`: `100 · acceptable / flagged`.

use std::fmt;

use ndarray::{Array2, Zip};
use radplan_core::dose::solution_dose;
use radplan_lp::Solution;
use radplan_types::config::ReportThresholds;
use radplan_types::error::{PlanError, PlanResult};
use radplan_types::state::{BeamLibrary, DoseField};
use tracing::debug;

/// Acceptance rule of one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DoseBound {
    AtMost(f64),
    AtLeast(f64),
}

impl DoseBound {
    fn accepts(self, dose: f64) -> bool {
        match self {
            DoseBound::AtMost(max) => dose <= max,
            DoseBound::AtLeast(min) => dose >= min,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    pub flagged: usize,
    pub dosed: usize,
    pub total: f64,
    pub mean: f64,
    pub acceptable: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionReport {
    NoDose,
    Delivered(RegionStats),
}

impl RegionReport {
    pub fn stats(&self) -> Option<&RegionStats> {
        match self {
            RegionReport::Delivered(s) => Some(s),
            RegionReport::NoDose => None,
        }
    }
}

/// Masked dose and statistics for one region.
pub fn assess_region(dose: &DoseField, mask: &Array2<f64>, bound: DoseBound) -> (Array2<f64>, RegionReport) {
    let masked = dose * mask;
    if !masked.iter().any(|&v| v > 0.0) {
        return (masked, RegionReport::NoDose);
    }

    let mut flagged = 0usize;
    let mut dosed = 0usize;
    let mut total = 0.0;
    let mut acceptable = 0usize;
    Zip::from(dose).and(mask).for_each(|&d, &m| {
        if m <= 0.0 {
            return;
        }
        flagged += 1;
        if d > 0.0 {
            dosed += 1;
            total += d;
        }
        if bound.accepts(d) {
            acceptable += 1;
        }
    });

    // `dosed >= 1` and `flagged >= dosed` once any masked entry is positive.
    let stats = RegionStats {
        flagged,
        dosed,
        total,
        mean: total / dosed as f64,
        acceptable,
        percent: 100.0 * acceptable as f64 / flagged as f64,
    };
    (masked, RegionReport::Delivered(stats))
}

/// Region statistics plus the masked dose maps handed to a renderer.
#[derive(Debug, Clone)]
pub struct EffectivenessReport {
    pub thresholds: ReportThresholds,
    pub critical: RegionReport,
    pub tumor: RegionReport,
    pub critical_dose: Array2<f64>,
    pub tumor_dose: Array2<f64>,
}

/// Assess an already reconstructed dose field.
pub fn assess_dose(
    dose: &DoseField,
    critical: &Array2<f64>,
    tumor: &Array2<f64>,
    thresholds: ReportThresholds,
) -> PlanResult<EffectivenessReport> {
    for (what, mask) in [("critical mask", critical), ("tumor mask", tumor)] {
        if mask.dim() != dose.dim() {
            return Err(PlanError::ShapeMismatch {
                what: what.to_string(),
                expected: dose.dim(),
                found: mask.dim(),
            });
        }
    }
    let (critical_dose, critical_report) =
        assess_region(dose, critical, DoseBound::AtMost(thresholds.max_rad));
    let (tumor_dose, tumor_report) =
        assess_region(dose, tumor, DoseBound::AtLeast(thresholds.min_rad));
    debug!(critical = ?critical_report, tumor = ?tumor_report, "effectiveness assessed");
    Ok(EffectivenessReport {
        thresholds,
        critical: critical_report,
        tumor: tumor_report,
        critical_dose,
        tumor_dose,
    })
}

/// Reconstruct the dose of `solution` over `library` and assess it.
pub fn report_effectiveness(
    solution: &Solution,
    library: &BeamLibrary,
    critical: &Array2<f64>,
    tumor: &Array2<f64>,
    thresholds: ReportThresholds,
) -> PlanResult<EffectivenessReport> {
    let dose = solution_dose(solution, library)?;
    assess_dose(&dose, critical, tumor, thresholds)
}

fn write_region(f: &mut fmt::Formatter<'_>, region: &str, report: &RegionReport) -> fmt::Result {
    match report {
        RegionReport::NoDose => {
            writeln!(f, "No units of radiation were delivered to any {region} cells.")
        }
        RegionReport::Delivered(s) => {
            writeln!(f, "{:.1} units of radiation were delivered to {region} cells.", s.total)?;
            writeln!(f, "{:.1} units were delivered to each cell, on average.", s.mean)?;
            writeln!(
                f,
                "{} cells were found to have acceptable levels of radiation, out of {}.",
                s.acceptable, s.flagged
            )?;
            writeln!(
                f,
                "{:.2}% of cells were found to have acceptable levels of radiation.",
                s.percent
            )
        }
    }
}

impl fmt::Display for EffectivenessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MODEL REPORT")?;
        writeln!(f)?;
        write_region(f, "critical", &self.critical)?;
        writeln!(f)?;
        write_region(f, "tumor", &self.tumor)
    }
}
