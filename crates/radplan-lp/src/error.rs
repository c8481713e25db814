use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    #[error("Constraint '{constraint}' references variable #{index}, model has {n_vars}")]
    UnknownVariable {
        constraint: String,
        index: usize,
        n_vars: usize,
    },

    #[error("Non-finite coefficient {value} in {location}")]
    NonFinite { location: String, value: f64 },

    #[error("Invalid bounds for '{variable}': [{lower}, {upper}]")]
    InvalidBound {
        variable: String,
        lower: f64,
        upper: f64,
    },

    #[error("Duplicate variable name '{0}'")]
    DuplicateVariable(String),

    #[error("Expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

pub type LpResult<T> = Result<T, LpError>;
