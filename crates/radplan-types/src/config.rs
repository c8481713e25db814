// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_RAD, DEFAULT_MIN_RAD, DEFAULT_P_NEIGHBOR, DEFAULT_P_REGROW,
    DEFAULT_STEERING_EXPONENT, INTERIOR_WINDOW,
};
use crate::error::{PlanError, PlanResult};

/// Top-level planning configuration.
/// Every section has defaults, so `{}` is a valid config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub variant: ModelVariant,
    #[serde(default)]
    pub model: ModelParams,
    #[serde(default)]
    pub report: ReportThresholds,
    #[serde(default)]
    pub solver: SolverOptions,
}

/// The escalating LP formulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelVariant {
    /// Hard ceiling and floor, objective `(critical - tumor)`.
    #[default]
    #[serde(rename = "1")]
    HardConstraints,
    /// Bounded slack/surplus, objective on critical dose only.
    #[serde(rename = "2")]
    Relaxed,
    /// Wider slack, slack and surplus priced in the objective.
    #[serde(rename = "2.1")]
    RelaxedCosted,
    /// Adds the critical-neighbour penalty.
    #[serde(rename = "3")]
    NeighborPenalty,
    /// Strips the tumor interior from the floor, prices regrowth risk.
    #[serde(rename = "4")]
    InteriorCarveOut,
    /// Adds left/right magnetically deflected copies of every beam.
    #[serde(rename = "5")]
    MagneticSteering,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 6] = [
        ModelVariant::HardConstraints,
        ModelVariant::Relaxed,
        ModelVariant::RelaxedCosted,
        ModelVariant::NeighborPenalty,
        ModelVariant::InteriorCarveOut,
        ModelVariant::MagneticSteering,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModelVariant::HardConstraints => "1",
            ModelVariant::Relaxed => "2",
            ModelVariant::RelaxedCosted => "2.1",
            ModelVariant::NeighborPenalty => "3",
            ModelVariant::InteriorCarveOut => "4",
            ModelVariant::MagneticSteering => "5",
        }
    }

    /// Per-cell slack and surplus variables soften the dose bounds.
    pub fn has_slack(&self) -> bool {
        match self {
            ModelVariant::HardConstraints => false,
            ModelVariant::Relaxed
            | ModelVariant::RelaxedCosted
            | ModelVariant::NeighborPenalty
            | ModelVariant::InteriorCarveOut
            | ModelVariant::MagneticSteering => true,
        }
    }

    /// Slack and surplus carry a cost in the objective.
    pub fn prices_relaxation(&self) -> bool {
        match self {
            ModelVariant::HardConstraints | ModelVariant::Relaxed => false,
            ModelVariant::RelaxedCosted
            | ModelVariant::NeighborPenalty
            | ModelVariant::InteriorCarveOut
            | ModelVariant::MagneticSteering => true,
        }
    }

    pub fn uses_neighbor_penalty(&self) -> bool {
        match self {
            ModelVariant::HardConstraints | ModelVariant::Relaxed | ModelVariant::RelaxedCosted => {
                false
            }
            ModelVariant::NeighborPenalty
            | ModelVariant::InteriorCarveOut
            | ModelVariant::MagneticSteering => true,
        }
    }

    pub fn carves_interior(&self) -> bool {
        matches!(
            self,
            ModelVariant::InteriorCarveOut | ModelVariant::MagneticSteering
        )
    }

    pub fn is_magnetic(&self) -> bool {
        matches!(self, ModelVariant::MagneticSteering)
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.label())
    }
}

impl FromStr for ModelVariant {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('m');
        ModelVariant::ALL
            .into_iter()
            .find(|v| v.label() == trimmed)
            .ok_or_else(|| {
                PlanError::ConfigError(format!(
                    "unknown model variant '{s}' (expected 1, 2, 2.1, 3, 4 or 5)"
                ))
            })
    }
}

/// Upper bounds of the per-cell relaxation variables.
/// `f64::INFINITY` leaves a variable unbounded above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlackBounds {
    pub slack_upper: f64,
    pub surplus_upper: f64,
}

/// Optional override of a variant's slack/surplus upper bounds.
/// A missing field keeps the variant default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surplus_upper: Option<f64>,
}

impl BoundsOverride {
    pub fn apply(&self, defaults: SlackBounds) -> SlackBounds {
        SlackBounds {
            slack_upper: self.slack_upper.unwrap_or(defaults.slack_upper),
            surplus_upper: self.surplus_upper.unwrap_or(defaults.surplus_upper),
        }
    }
}

/// How a window filter treats cells beyond the grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingMode {
    /// Out-of-grid cells read as 0.
    #[default]
    Zero,
    /// Out-of-grid cells repeat the nearest edge cell.
    Nearest,
}

/// Which filtered value marks a tumor cell as interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteriorThreshold {
    /// The largest filtered value observed anywhere in the grid.
    #[default]
    ObservedMaximum,
    /// A completely filled window, `size * size`.
    FullWindow,
}

/// Tumor-interior extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteriorRule {
    #[serde(default = "default_interior_window")]
    pub window: usize,
    #[serde(default)]
    pub padding: PaddingMode,
    #[serde(default)]
    pub threshold: InteriorThreshold,
}

fn default_interior_window() -> usize {
    INTERIOR_WINDOW
}

impl Default for InteriorRule {
    fn default() -> Self {
        InteriorRule {
            window: INTERIOR_WINDOW,
            padding: PaddingMode::Zero,
            threshold: InteriorThreshold::ObservedMaximum,
        }
    }
}

impl InteriorRule {
    /// Interior = cells whose whole window (edges replicated) is tumor.
    pub fn full_window() -> Self {
        InteriorRule {
            window: INTERIOR_WINDOW,
            padding: PaddingMode::Nearest,
            threshold: InteriorThreshold::FullWindow,
        }
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.window == 0 {
            return Err(PlanError::ConfigError(
                "interior window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest window accepted on a `rows × cols` grid. From `2·max(rows, cols)`
    /// on, every window already spans the whole grid.
    pub fn max_window(rows: usize, cols: usize) -> usize {
        INTERIOR_WINDOW.max(2 * rows.max(cols))
    }

    pub fn validate_for_grid(&self, rows: usize, cols: usize) -> PlanResult<()> {
        self.validate()?;
        let max = Self::max_window(rows, cols);
        if self.window > max {
            return Err(PlanError::ConfigError(format!(
                "interior window {} exceeds {max} for a {rows} x {cols} grid",
                self.window
            )));
        }
        Ok(())
    }
}

/// Objective weights and structural switches of the model builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Penalty on dose delivered next to critical tissue (variants 3-5).
    #[serde(default = "default_p_neighbor")]
    pub p_neighbor: f64,
    /// Surplus price in the tumor interior (variants 4-5).
    #[serde(default = "default_p_regrow")]
    pub p_regrow: f64,
    /// Deflection exponent `p` in `floor(r^p)` (variant 5).
    #[serde(default = "default_steering_exponent")]
    pub steering_exponent: f64,
    /// Also place a soft floor on interior cells (variants 4-5).
    #[serde(default)]
    pub constrain_interior: bool,
    #[serde(default)]
    pub interior: InteriorRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundsOverride>,
}

fn default_p_neighbor() -> f64 {
    DEFAULT_P_NEIGHBOR
}
fn default_p_regrow() -> f64 {
    DEFAULT_P_REGROW
}
fn default_steering_exponent() -> f64 {
    DEFAULT_STEERING_EXPONENT
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            p_neighbor: default_p_neighbor(),
            p_regrow: default_p_regrow(),
            steering_exponent: default_steering_exponent(),
            constrain_interior: false,
            interior: InteriorRule::default(),
            bounds: None,
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> PlanResult<()> {
        for (name, value) in [
            ("p_neighbor", self.p_neighbor),
            ("p_regrow", self.p_regrow),
            ("steering_exponent", self.steering_exponent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::ConfigError(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        self.interior.validate()?;
        if let Some(b) = self.bounds {
            for (name, value) in [("slack_upper", b.slack_upper), ("surplus_upper", b.surplus_upper)]
            {
                if let Some(v) = value {
                    if v.is_nan() || v < 0.0 {
                        return Err(PlanError::ConfigError(format!(
                            "{name} must be non-negative, got {v}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Acceptance thresholds of the effectiveness report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportThresholds {
    #[serde(default = "default_max_rad")]
    pub max_rad: f64,
    #[serde(default = "default_min_rad")]
    pub min_rad: f64,
}

fn default_max_rad() -> f64 {
    DEFAULT_MAX_RAD
}
fn default_min_rad() -> f64 {
    DEFAULT_MIN_RAD
}

impl Default for ReportThresholds {
    fn default() -> Self {
        ReportThresholds {
            max_rad: DEFAULT_MAX_RAD,
            min_rad: DEFAULT_MIN_RAD,
        }
    }
}

/// Options handed to the bundled simplex backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_tol")]
    pub tol: f64,
}

fn default_max_iter() -> usize {
    50_000
}
fn default_tol() -> f64 {
    1e-9
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_iter: default_max_iter(),
            tol: default_tol(),
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> PlanResult<()> {
        if self.max_iter == 0 {
            return Err(PlanError::ConfigError(
                "solver max_iter must be at least 1".to_string(),
            ));
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(PlanError::ConfigError(format!(
                "solver tol must be finite and positive, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

impl PlanConfig {
    /// Load from a JSON file; absent fields take their defaults.
    pub fn from_file(path: &str) -> PlanResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlanResult<()> {
        self.model.validate()?;
        self.solver.validate()
    }
}
