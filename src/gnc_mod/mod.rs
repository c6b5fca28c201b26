pub mod channel;
pub mod controller;
pub mod fcs;

pub use channel::{AntiWindup, Axis, ControlChannel, DerivativeSource};
pub use controller::Controller;
pub use fcs::FlightControlSystem;
