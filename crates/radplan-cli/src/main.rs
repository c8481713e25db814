// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Command Line
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `radplan`: load a planning case, build a model variant and solve it.
//!
//! - `radplan inspect <case>`: specs, mask sizes and unreachable cells
//! - `radplan solve <case> --variant 3`: solve and print the report
//! - `radplan sweep <case> --variant 3 --p-neighbor 0,0.5,1`: parameter sweep
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use radplan_core::builder::{build_model, PlanModel};
use radplan_core::plan::{solve_plan, sweep, PlanOutcome, SweepParameter};
use radplan_diagnostics::effectiveness::assess_dose;
use radplan_diagnostics::export::{write_dose_npz, write_shift_preview};
use radplan_lp::DenseSimplex;
use radplan_types::config::{InteriorRule, ModelVariant, PlanConfig};
use radplan_types::loader::load_case;
use radplan_types::state::PlanCase;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "radplan")]
#[command(about = "Radiation beam planning as a linear program", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a case directory
    Inspect {
        #[command(flatten)]
        common: CommonArgs,

        /// Write summed undeflected/right/left beam maps to this .npz
        #[arg(long)]
        shift_preview: Option<PathBuf>,
    },

    /// Build and solve one model variant
    Solve {
        #[command(flatten)]
        common: CommonArgs,

        /// Also write the model in CPLEX LP format
        #[arg(long)]
        export_lp: Option<PathBuf>,

        /// Write dose and masked dose maps to this .npz
        #[arg(long)]
        export_npz: Option<PathBuf>,

        /// Report against the whole tumor instead of the floor-constrained cells
        #[arg(long)]
        report_full_tumor: bool,
    },

    /// Solve one variant over a list of parameter values
    #[command(group(
        ArgGroup::new("parameter")
            .required(true)
            .args(["neighbor_values", "regrow_values", "exponent_values"])
    ))]
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// Comma-separated p_neighbor values
        #[arg(long = "p-neighbor", value_delimiter = ',', num_args = 1..)]
        neighbor_values: Vec<f64>,

        /// Comma-separated p_regrow values
        #[arg(long = "p-regrow", value_delimiter = ',', num_args = 1..)]
        regrow_values: Vec<f64>,

        /// Comma-separated steering exponents
        #[arg(long = "steering-exponent", value_delimiter = ',', num_args = 1..)]
        exponent_values: Vec<f64>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Directory holding specs.txt, critical_raw.txt, tumor_raw.txt, beam_raw.txt
    #[arg(name = "CASE")]
    case_dir: PathBuf,

    /// JSON configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model variant: 1, 2, 2.1, 3, 4 or 5
    #[arg(long)]
    variant: Option<ModelVariant>,

    /// Interior = cells whose whole window (edges replicated) is tumor
    #[arg(long)]
    full_window_interior: bool,

    /// Also place a soft floor on tumor-interior cells (variants 4 and 5)
    #[arg(long)]
    constrain_interior: bool,
}

impl CommonArgs {
    fn load(&self) -> Result<(PlanConfig, PlanCase)> {
        let mut config = match &self.config {
            Some(path) => {
                let path = path.to_string_lossy();
                PlanConfig::from_file(&path)
                    .with_context(|| format!("loading configuration {path}"))?
            }
            None => PlanConfig::default(),
        };
        if let Some(v) = self.variant {
            config.variant = v;
        }
        if self.full_window_interior {
            config.model.interior = InteriorRule::full_window();
        }
        if self.constrain_interior {
            config.model.constrain_interior = true;
        }
        let case = load_case(&self.case_dir)
            .with_context(|| format!("loading case {}", self.case_dir.display()))?;
        Ok((config, case))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn solver_for(config: &PlanConfig) -> DenseSimplex {
    DenseSimplex::new(config.solver.max_iter, config.solver.tol)
}

fn inspect(common: &CommonArgs, shift_preview: Option<&PathBuf>) -> Result<()> {
    let (config, case) = common.load()?;
    let specs = &case.specs;
    println!("beams:            {}", specs.n_beams);
    println!("grid:             {} x {}", specs.rows, specs.cols);
    println!("max critical dose {}", specs.max_critical_dose);
    println!("min tumor dose    {}", specs.min_tumor_dose);
    println!("critical cells:   {}", case.masks.critical_count());
    println!("tumor cells:      {}", case.masks.tumor_count());
    let overlap = case.masks.overlap();
    if !overlap.is_empty() {
        println!("double-flagged:   {} cells", overlap.len());
    }

    let model = build_model(&case, config.variant, &config.model)?;
    println!(
        "interior cells:   {} ({} on the floor for {})",
        model.derived.interior.sum() as usize,
        model.floor_mask.sum() as usize,
        config.variant
    );
    println!("model:            {}", model.lp.summary());
    if model.diagnostics.is_empty() {
        println!("every constrained cell is reachable");
    } else {
        for d in &model.diagnostics {
            println!("unreachable:      {d}");
        }
    }

    if let Some(path) = shift_preview {
        write_shift_preview(path, &case.beams, config.model.steering_exponent)?;
        println!("shift preview written to {}", path.display());
    }
    Ok(())
}

fn solve(
    common: &CommonArgs,
    export_lp: Option<&PathBuf>,
    export_npz: Option<&PathBuf>,
    report_full_tumor: bool,
) -> Result<()> {
    let (config, case) = common.load()?;
    let model: PlanModel = build_model(&case, config.variant, &config.model)?;

    if let Some(path) = export_lp {
        std::fs::write(path, model.lp.to_lp_format())
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "LP model exported");
    }

    let outcome = solve_plan(&model, &solver_for(&config))?;
    let solved = match &outcome {
        PlanOutcome::Solved(s) => s,
        PlanOutcome::NoSolution(reason) => {
            bail!("{} has no solution ({reason})", config.variant);
        }
    };

    println!("{} {}", config.variant, outcome);
    for &(index, weight) in solved.weights.iter().filter(|(_, w)| *w > 0.0) {
        println!("  x{index} = {weight:.6}");
    }

    let tumor = if report_full_tumor {
        case.masks.tumor()
    } else {
        &model.floor_mask
    };
    let report = assess_dose(&solved.dose, case.masks.critical(), tumor, config.report)?;
    println!();
    print!("{report}");

    if let Some(path) = export_npz {
        write_dose_npz(path, &solved.dose, &report, case.masks.critical(), tumor)?;
    }
    Ok(())
}

fn run_sweep(common: &CommonArgs, parameter: SweepParameter, values: &[f64]) -> Result<()> {
    let (config, case) = common.load()?;
    let points = sweep(
        &case,
        config.variant,
        &config.model,
        parameter,
        values,
        &solver_for(&config),
    )?;
    println!("{:>12}  {:>11}  outcome", parameter.to_string(), "unreachable");
    for p in &points {
        println!("{:>12.4}  {:>11}  {}", p.value, p.unreachable, p.outcome);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Inspect {
            common,
            shift_preview,
        } => inspect(common, shift_preview.as_ref()),
        Commands::Solve {
            common,
            export_lp,
            export_npz,
            report_full_tumor,
        } => solve(
            common,
            export_lp.as_ref(),
            export_npz.as_ref(),
            *report_full_tumor,
        ),
        Commands::Sweep {
            common,
            neighbor_values,
            regrow_values,
            exponent_values,
        } => {
            let (parameter, values) = if !neighbor_values.is_empty() {
                (SweepParameter::PNeighbor, neighbor_values)
            } else if !regrow_values.is_empty() {
                (SweepParameter::PRegrow, regrow_values)
            } else {
                (SweepParameter::SteeringExponent, exponent_values)
            };
            run_sweep(common, parameter, values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sweep_values() {
        let cli = Cli::try_parse_from([
            "radplan", "sweep", "case", "--variant", "3", "--p-neighbor", "0,0.5,1",
        ])
        .unwrap();
        match cli.command {
            Commands::Sweep {
                common,
                neighbor_values,
                ..
            } => {
                assert_eq!(common.variant, Some(ModelVariant::NeighborPenalty));
                assert_eq!(neighbor_values, vec![0.0, 0.5, 1.0]);
            }
            _ => panic!("expected sweep"),
        }
    }

    #[test]
    fn test_sweep_requires_a_parameter() {
        assert!(Cli::try_parse_from(["radplan", "sweep", "case"]).is_err());
    }

    #[test]
    fn test_variant_labels_parse() {
        let cli = Cli::try_parse_from(["radplan", "solve", "case", "--variant", "m2.1"]).unwrap();
        match cli.command {
            Commands::Solve { common, .. } => {
                assert_eq!(common.variant, Some(ModelVariant::RelaxedCosted))
            }
            _ => panic!("expected solve"),
        }
    }

    fn demo_args(variant: &str) -> CommonArgs {
        let case = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("demos")
            .join("small_case");
        let cli = Cli::try_parse_from([
            OsStr::new("radplan"),
            OsStr::new("solve"),
            case.as_os_str(),
            OsStr::new("--variant"),
            OsStr::new(variant),
        ])
        .unwrap();
        match cli.command {
            Commands::Solve { common, .. } => common,
            _ => panic!("expected solve"),
        }
    }

    #[test]
    fn test_solve_without_solution_is_an_error() {
        let err = solve(&demo_args("1"), None, None, false).unwrap_err();
        assert!(err.to_string().contains("unbounded"), "{err}");
    }

    #[test]
    fn test_solve_relaxed_demo_succeeds() {
        assert!(solve(&demo_args("3"), None, None, false).is_ok());
    }
}
