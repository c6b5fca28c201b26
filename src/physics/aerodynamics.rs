use crate::dynamics::state::Deflections;
use crate::table::{ExtrapolationWarning, Table1D, Table2D};

/// Dynamic pressure `0.5 * rho * V^2`, Pa.
pub fn dynamic_pressure(density: f64, speed: f64) -> f64 {
    0.5 * density * speed * speed
}

/// Dimensionless coefficients at one flight condition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AeroCoefficients {
    pub lift: f64,
    pub drag: f64,
    pub pitch: f64,         // baseline pitching moment
    pub pitch_control: f64, // elevator increment
    pub roll_control: f64,  // aileron rolling moment
}

impl AeroCoefficients {
    pub fn total_pitch(&self) -> f64 {
        self.pitch + self.pitch_control
    }
}

// ---------------------------------------------------------------------------
// Table-driven aerodynamic model
// ---------------------------------------------------------------------------

/// Lift, drag and pitch-moment grids over (Mach, alpha in degrees) plus the
/// elevator and aileron effectiveness curves over deflection in degrees.
///
/// The model never resolves on its own: the caller decides when the cursors
/// move, because only it knows the query point of each RK4 sub-stage.
#[derive(Debug, Clone)]
pub struct AeroModel {
    pub lift: Table2D,
    pub drag: Table2D,
    pub pitch: Table2D,
    pub elevator: Table1D,
    pub aileron: Table1D,
}

impl AeroModel {
    pub fn new(
        lift: Table2D,
        drag: Table2D,
        pitch: Table2D,
        elevator: Table1D,
        aileron: Table1D,
    ) -> Self {
        Self {
            lift: lift.labelled("lift"),
            drag: drag.labelled("drag"),
            pitch: pitch.labelled("pitch_moment"),
            elevator: elevator.labelled("elevator"),
            aileron: aileron.labelled("aileron"),
        }
    }

    /// Move every cursor to the given flight condition.
    pub fn resolve(&mut self, mach: f64, alpha_deg: f64, cmd: &Deflections) {
        self.lift.resolve(mach, alpha_deg);
        self.drag.resolve(mach, alpha_deg);
        self.pitch.resolve(mach, alpha_deg);
        self.elevator.resolve(cmd.elevator);
        self.aileron.resolve(cmd.aileron);
    }

    /// Coefficients from the cached cells.
    pub fn coefficients(&self, mach: f64, alpha_deg: f64, cmd: &Deflections) -> AeroCoefficients {
        AeroCoefficients {
            lift: self.lift.value_at(mach, alpha_deg),
            drag: self.drag.value_at(mach, alpha_deg),
            pitch: self.pitch.value_at(mach, alpha_deg),
            pitch_control: self.elevator.value_at(cmd.elevator),
            roll_control: self.aileron.value_at(cmd.aileron),
        }
    }

    /// One entry per table that was queried outside its domain.
    pub fn extrapolation_report(&self) -> Vec<ExtrapolationWarning> {
        [
            self.lift.extrapolation_warning(),
            self.drag.extrapolation_warning(),
            self.pitch.extrapolation_warning(),
            self.elevator.extrapolation_warning(),
            self.aileron.extrapolation_warning(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
