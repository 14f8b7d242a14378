use ndarray::Array1;
use thiserror::Error;

/// Convenience alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by state-space builders, models, and solvers.
#[derive(Debug, Error)]
pub enum Error {
    /// The enumerated state space is inconsistent with the grid geometry,
    /// or a model was constructed with mismatched shapes.
    #[error("structural error: {0}")]
    Structural(String),

    /// An action index outside the fixed discrete action set.
    #[error("invalid action {action}: model has {n_actions} actions")]
    InvalidAction { action: usize, n_actions: usize },

    /// A probability row failed validation at a sampling or normalization
    /// boundary.
    #[error("normalization error: {0}")]
    Normalization(String),

    /// An iterative solver exhausted its iteration bound before reaching
    /// the requested tolerance. Carries the last iterate for inspection.
    #[error("did not converge after {iterations} iterations (residual {residual:.3e})")]
    NonConvergence {
        iterations: usize,
        residual: f64,
        last: Box<Array1<f64>>,
    },
}

impl Error {
    /// Creates a structural error from anything string-like.
    pub fn structural(msg: impl Into<String>) -> Self {
        Error::Structural(msg.into())
    }

    /// Creates a normalization error from anything string-like.
    pub fn normalization(msg: impl Into<String>) -> Self {
        Error::Normalization(msg.into())
    }
}
