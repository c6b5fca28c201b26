use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Exponential-density atmosphere with a two-layer speed of sound
// ---------------------------------------------------------------------------

/// Atmosphere parameters.
///
/// Density decays exponentially with altitude. Speed of sound falls
/// linearly up to the tropopause and is constant above it. Both functions
/// are defined for every altitude; negative altitudes extrapolate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    pub sea_level_density: f64,    // kg/m^3
    pub scale_height: f64,         // m
    pub sea_level_sound_speed: f64, // m/s
    pub sound_speed_lapse: f64,    // (m/s) per m
    pub tropopause: f64,           // m
    pub stratosphere_sound_speed: f64, // m/s
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            sea_level_density: 1.2,
            scale_height: 9_400.0,
            sea_level_sound_speed: 340.0,
            sound_speed_lapse: 0.003_91,
            tropopause: 11_500.0,
            stratosphere_sound_speed: 295.0,
        }
    }
}

impl Atmosphere {
    pub fn density(&self, altitude: f64) -> f64 {
        self.sea_level_density * (-altitude / self.scale_height).exp()
    }

    pub fn speed_of_sound(&self, altitude: f64) -> f64 {
        if altitude < self.tropopause {
            self.sea_level_sound_speed - self.sound_speed_lapse * altitude
        } else {
            self.stratosphere_sound_speed
        }
    }

    pub fn mach(&self, speed: f64, altitude: f64) -> f64 {
        speed / self.speed_of_sound(altitude)
    }
}
