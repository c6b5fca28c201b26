use crate::dynamics::state::{Deflections, State};
use super::channel::{Axis, ControlChannel};

// ---------------------------------------------------------------------------
// Two-axis flight control system: pitch -> elevator, roll -> ailerons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FlightControlSystem {
    pub pitch: ControlChannel,
    pub roll: ControlChannel,
}

impl FlightControlSystem {
    /// Both channels inactive with zero deflection.
    pub fn new() -> Self {
        Self {
            pitch: ControlChannel::new(Axis::Pitch),
            roll: ControlChannel::new(Axis::Roll),
        }
    }

    pub fn with_channels(pitch: ControlChannel, roll: ControlChannel) -> Self {
        Self { pitch, roll }
    }

    pub fn check_controls(&mut self, state: &State) {
        self.pitch.check(state);
        self.roll.check(state);
    }

    pub fn deflections(&self) -> Deflections {
        Deflections {
            elevator: self.pitch.deflection(),
            aileron: self.roll.deflection(),
        }
    }

    pub fn set_base_pitch(&mut self, elevator: f64) {
        self.pitch.set_bias(elevator);
    }

    pub fn set_base_roll(&mut self, aileron: f64) {
        self.roll.set_bias(aileron);
    }

    pub fn toggle_pitch(&mut self, active: bool) {
        self.pitch.set_active(active);
    }

    pub fn toggle_roll(&mut self, active: bool) {
        self.roll.set_active(active);
    }

    pub fn prime(&mut self, state: &State) {
        self.pitch.prime(state);
        self.roll.prime(state);
    }
}

impl Default for FlightControlSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Controller for FlightControlSystem {
    fn check_controls(&mut self, state: &State) {
        FlightControlSystem::check_controls(self, state);
    }

    fn deflections(&self) -> Deflections {
        FlightControlSystem::deflections(self)
    }

    fn reset(&mut self, state: &State) {
        self.prime(state);
    }

    fn name(&self) -> &str {
        "FlightControlSystem"
    }
}
