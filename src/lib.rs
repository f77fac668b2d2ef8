// src/lib.rs
// Planar chain-pendulum simulator: physics core (math, logic), initial conditions, frame driver,
// and the HTTP/rendering surface the binary serves.

pub mod cli;
pub mod driver;
pub mod error;
pub mod initial;
pub mod logic;
pub mod math;
pub mod params;
pub mod ui;

pub use driver::{AnimationDriver, DriverConfig, Frame, TraceBuffer};
pub use error::{PendulumError, PendulumResult};
pub use initial::InitialAngles;
pub use logic::{Multipendulum, PendulumState};
pub use math::CouplingMatrix;
pub use params::{PendulumConfig, SimulationParameters};
