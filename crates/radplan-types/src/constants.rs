// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Objective weight on dose spilling into cells next to critical tissue.
pub const DEFAULT_P_NEIGHBOR: f64 = 0.5;

/// Surplus cost multiplier for the tumor interior (regrowth risk).
pub const DEFAULT_P_REGROW: f64 = 0.1;

/// Exponent of the row-dependent magnetic deflection, `floor(r^p)`.
pub const DEFAULT_STEERING_EXPONENT: f64 = 0.75;

/// Report threshold: highest acceptable dose in a critical cell.
pub const DEFAULT_MAX_RAD: f64 = 2.0;

/// Report threshold: lowest acceptable dose in a tumor cell.
pub const DEFAULT_MIN_RAD: f64 = 10.0;

/// Side length of the mean filter that finds critical neighbours.
pub const NEIGHBOR_WINDOW: usize = 3;

/// Side length of the sum filter that finds the tumor interior.
pub const INTERIOR_WINDOW: usize = 10;

/// Prefix of dose-contributing weight variables (`x1`, `x2`, ...).
pub const WEIGHT_PREFIX: &str = "x";

/// Prefix of per-cell critical slack variables.
pub const SLACK_PREFIX: &str = "critical_slack";

/// Prefix of per-cell tumor surplus variables.
pub const SURPLUS_PREFIX: &str = "tumor_surplus";
