//! Mathematical primitives for SCPN RadPlan.

pub mod filter;
pub mod roll;
