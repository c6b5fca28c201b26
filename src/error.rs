use thiserror::Error;

use crate::dynamics::glide::Degeneracy;
use crate::table::TableError;
use crate::vehicle::ConfigError;

/// Everything that can stop a run.
///
/// Setup problems are reported before the first step; an in-loop failure
/// carries the index and time of the step that produced it.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid table: {0}")]
    InvalidTable(#[from] TableError),
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Scenario(#[from] ConfigError),
    #[error("degenerate state at step {step} (t = {time:.3} s): {reason}")]
    DegenerateState {
        step: usize,
        time: f64,
        reason: Degeneracy,
    },
}
