pub mod aerodynamics;
pub mod atmosphere;

pub use aerodynamics::{dynamic_pressure, AeroCoefficients, AeroModel};
pub use atmosphere::Atmosphere;
