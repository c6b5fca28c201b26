use nalgebra::SVector;

use crate::physics::atmosphere::Atmosphere;

// ---------------------------------------------------------------------------
// State vector layout
// ---------------------------------------------------------------------------

pub const N_STATE: usize = 11;

pub type StateVector = SVector<f64, N_STATE>;

/// Component indices into [`StateVector`].
pub mod idx {
    pub const VELOCITY: usize = 0; // m/s
    pub const PATH_ANGLE: usize = 1; // rad, Theta
    pub const HEADING: usize = 2; // rad, Psi
    pub const PITCH_RATE: usize = 3; // rad/s, omega_z
    pub const ROLL_RATE: usize = 4; // rad/s, omega_x
    pub const DOWNRANGE: usize = 5; // m, X
    pub const ALTITUDE: usize = 6; // m, Y
    pub const CROSSRANGE: usize = 7; // m, Z
    pub const ALPHA: usize = 8; // rad, angle of attack
    pub const BANK: usize = 9; // rad, gamma
    pub const MASS: usize = 10; // kg
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// One time-stamped record of the vehicle state.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub time: f64,
    pub x: StateVector,
}

impl State {
    pub fn new(time: f64, x: StateVector) -> Self {
        Self { time, x }
    }

    /// Working copy displaced by `d * h`, at the same time.
    /// Used for RK4 sub-stages; never committed.
    pub fn displaced(&self, d: &StateVector, h: f64) -> State {
        State {
            time: self.time,
            x: self.x + d * h,
        }
    }

    pub fn velocity(&self) -> f64 {
        self.x[idx::VELOCITY]
    }

    pub fn path_angle(&self) -> f64 {
        self.x[idx::PATH_ANGLE]
    }

    pub fn heading(&self) -> f64 {
        self.x[idx::HEADING]
    }

    pub fn pitch_rate(&self) -> f64 {
        self.x[idx::PITCH_RATE]
    }

    pub fn roll_rate(&self) -> f64 {
        self.x[idx::ROLL_RATE]
    }

    pub fn downrange(&self) -> f64 {
        self.x[idx::DOWNRANGE]
    }

    pub fn altitude(&self) -> f64 {
        self.x[idx::ALTITUDE]
    }

    pub fn crossrange(&self) -> f64 {
        self.x[idx::CROSSRANGE]
    }

    pub fn alpha(&self) -> f64 {
        self.x[idx::ALPHA]
    }

    pub fn bank(&self) -> f64 {
        self.x[idx::BANK]
    }

    pub fn mass(&self) -> f64 {
        self.x[idx::MASS]
    }
}

// ---------------------------------------------------------------------------
// Control surface command
// ---------------------------------------------------------------------------

/// Actuator deflections in degrees, held constant over one integration step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deflections {
    pub elevator: f64,
    pub aileron: f64,
}

// ---------------------------------------------------------------------------
// Physical constants and simulation config
// ---------------------------------------------------------------------------

/// Constants the equations of motion depend on. Passed in explicitly so a
/// run never reads free-floating globals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub g0: f64,          // m/s^2
    pub deg_per_rad: f64, // table axes are in degrees
    pub atmosphere: Atmosphere,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            g0: 9.807,
            deg_per_rad: 180.0 / std::f64::consts::PI,
            atmosphere: Atmosphere::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,       // integration step, s
    pub max_time: f64, // horizon, s
    pub constants: PhysicalConstants,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.002,
            max_time: 120.5,
            constants: PhysicalConstants::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displaced_keeps_time_and_original() {
        let mut x = StateVector::zeros();
        x[idx::VELOCITY] = 100.0;
        let s = State::new(2.0, x);
        let mut d = StateVector::zeros();
        d[idx::ALTITUDE] = -10.0;
        let w = s.displaced(&d, 0.5);
        assert_eq!(w.time, 2.0);
        assert_eq!(w.altitude(), -5.0);
        assert_eq!(s.altitude(), 0.0);
        assert_eq!(w.velocity(), 100.0);
    }
}
