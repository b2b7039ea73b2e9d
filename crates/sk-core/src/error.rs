use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeomError {
    /// Constructor preconditions violated: non-positive shape scalars,
    /// zero or parallel direction vectors, out-of-range aperture angles.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Operation undefined at the given input (zero-vector normalization,
    /// degenerate plane from collinear points).
    #[error("Degenerate input: {0}")]
    Degenerate(String),

    /// Iterative solver exhausted its budget before reaching the threshold.
    #[error("No convergence to {threshold:e} within {iterations} iterations")]
    Convergence { threshold: f64, iterations: u32 },

    /// Malformed boundary representation.
    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GeomError>;
