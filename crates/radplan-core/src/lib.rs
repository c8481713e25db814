// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Beam-planning model construction and solution aggregation.
//!
//! Leaf-first: dose reconstruction, beam deflection, derived masks, the
//! variant model builder, and the solve pipeline.

pub mod builder;
pub mod deflection;
pub mod dose;
pub mod masks;
pub mod plan;
