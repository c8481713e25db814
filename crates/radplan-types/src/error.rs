use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid {mask} mask value {value} at row={row}, col={col} (expected 0 or 1)")]
    InvalidMask {
        mask: &'static str,
        row: usize,
        col: usize,
        value: f64,
    },

    #[error("Invalid dose {value} in beam {beam} at row={row}, col={col}")]
    InvalidBeam {
        beam: usize,
        row: usize,
        col: usize,
        value: f64,
    },

    #[error("Beam index {index} out of range for a library of {n_beams} beams (indices are 1-based)")]
    BeamIndexOutOfRange { index: usize, n_beams: usize },

    #[error("Weight variable '{0}' does not follow the x<index> naming convention")]
    VariableName(String),

    #[error("Parse error in {path} line {line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PlanResult<T> = Result<T, PlanError>;
