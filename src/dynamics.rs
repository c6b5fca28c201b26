pub mod glide;
pub mod state;

pub use glide::{check_state, derivatives, Degeneracy};
pub use state::{Deflections, PhysicalConstants, SimConfig, State, StateVector, N_STATE};
