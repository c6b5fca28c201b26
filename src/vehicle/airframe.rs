use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Airframe: mass and geometry the equations of motion need
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airframe {
    pub name: String,
    pub mass: f64,      // kg, without propellant
    pub wing_area: f64, // m^2
    pub chord: f64,     // m, mean aerodynamic chord
    pub jx: f64,        // kg·m^2, roll axis
    pub jz: f64,        // kg·m^2, pitch axis
}

impl Airframe {
    /// Wing loading in kg/m^2.
    pub fn wing_loading(&self) -> f64 {
        self.mass / self.wing_area
    }

    /// Speed at which lift coefficient `cl` balances weight at `density`.
    pub fn trim_speed(&self, cl: f64, density: f64, g0: f64) -> f64 {
        (2.0 * self.mass * g0 / (density * self.wing_area * cl)).sqrt()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let fields = [
            ("mass", self.mass),
            ("wing_area", self.wing_area),
            ("chord", self.chord),
            ("jx", self.jx),
            ("jz", self.jz),
        ];
        match fields.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            Some((name, v)) => Err(format!("airframe {name} must be positive, got {v}")),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Airframe builder
// ---------------------------------------------------------------------------

pub struct AirframeBuilder {
    name: String,
    mass: f64,
    wing_area: f64,
    chord: f64,
    jx: f64,
    jz: f64,
}

impl AirframeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mass: 2.5,
            wing_area: 0.033,
            chord: 0.04,
            jx: 0.4,
            jz: 0.25,
        }
    }

    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn wing_area(mut self, v: f64) -> Self { self.wing_area = v; self }
    pub fn chord(mut self, v: f64) -> Self { self.chord = v; self }
    pub fn jx(mut self, v: f64) -> Self { self.jx = v; self }
    pub fn jz(mut self, v: f64) -> Self { self.jz = v; self }

    pub fn build(self) -> Airframe {
        Airframe {
            name: self.name,
            mass: self.mass,
            wing_area: self.wing_area,
            chord: self.chord,
            jx: self.jx,
            jz: self.jz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_are_valid() {
        let a = AirframeBuilder::new("Default").build();
        assert!(a.validate().is_ok());
        assert!((a.wing_loading() - 2.5 / 0.033).abs() < 1e-9);
    }

    #[test]
    fn rejects_zero_inertia() {
        let a = AirframeBuilder::new("Bad").jz(0.0).build();
        let err = a.validate().unwrap_err();
        assert!(err.contains("jz"), "{err}");
    }

    #[test]
    fn trim_speed_balances_weight() {
        let a = AirframeBuilder::new("T").build();
        let v = a.trim_speed(0.5, 1.2, 9.807);
        let lift = 0.5 * 1.2 * v * v * a.wing_area * 0.5;
        assert!((lift - a.mass * 9.807).abs() < 1e-9);
    }
}
