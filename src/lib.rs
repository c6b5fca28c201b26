pub mod error;
pub mod table;
pub mod physics;
pub mod dynamics;
pub mod vehicle;
mod gnc_mod;
pub mod sim;
pub mod io;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

// Flat re-exports for the common entry points
pub mod atmosphere {
    pub use crate::physics::atmosphere::*;
}

pub mod integrator {
    pub use crate::sim::integrator::rk4_step;
    pub use crate::sim::runner::{simulate, simulate_with, Trajectory};
}

pub mod types {
    pub use crate::dynamics::state::{
        Deflections, PhysicalConstants, SimConfig, State, StateVector,
    };
    pub use crate::error::SimError;
    pub use crate::vehicle::{Airframe, Propulsion, Scenario};
}
