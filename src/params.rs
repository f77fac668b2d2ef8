// src/params.rs
// Configuration surface for the chain. PendulumConfig is the raw, serde-friendly form (every field defaulted,
// so a JSON body may omit any of them); SimulationParameters is the validated, immutable form the integrator owns.
// gravity_over_length and time_step are derived once here and never recomputed.

use crate::error::{PendulumError, PendulumResult};
use serde::{Deserialize, Serialize};

/// Raw chain configuration: three unit rods, unit gravity, 25 frames per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumConfig {
    pub segment_count: usize,
    pub rod_length: f64,
    pub damping: f64,
    pub gravitational_acceleration: f64,
    pub frame_rate: f64,
    /// Fixed pivot anchor (x0, y0).
    pub origin: [f64; 2],
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            segment_count: 3,
            rod_length: 1.0,
            damping: 0.0,
            gravitational_acceleration: 1.0,
            frame_rate: 25.0,
            origin: [0.0, 0.0],
        }
    }
}

impl PendulumConfig {
    /// Checks every field and freezes the result.
    pub fn validate(&self) -> PendulumResult<SimulationParameters> {
        if self.segment_count < 1 {
            return Err(PendulumError::invalid(
                "segment_count must be >= 1",
                self.segment_count,
            ));
        }
        if !(self.rod_length.is_finite() && self.rod_length > 0.0) {
            return Err(PendulumError::invalid(
                "rod_length must be a finite value > 0",
                self.rod_length,
            ));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(PendulumError::invalid(
                "frame_rate must be a finite value > 0",
                self.frame_rate,
            ));
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(PendulumError::invalid(
                "damping must be a finite value >= 0",
                self.damping,
            ));
        }
        if !self.gravitational_acceleration.is_finite() {
            return Err(PendulumError::invalid(
                "gravitational_acceleration must be finite",
                self.gravitational_acceleration,
            ));
        }
        if !self.origin.iter().all(|v| v.is_finite()) {
            return Err(PendulumError::invalid(
                "origin must be finite",
                format!("{:?}", self.origin),
            ));
        }

        Ok(SimulationParameters {
            rod_length: self.rod_length,
            segment_count: self.segment_count,
            damping: self.damping,
            gravitational_acceleration: self.gravitational_acceleration,
            frame_rate: self.frame_rate,
            time_step: 1.0 / self.frame_rate,
            gravity_over_length: self.gravitational_acceleration / self.rod_length,
            origin: (self.origin[0], self.origin[1]),
        })
    }
}

/// Validated, immutable parameters. Only constructible through [`PendulumConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    rod_length: f64,
    segment_count: usize,
    damping: f64,
    gravitational_acceleration: f64,
    frame_rate: f64,
    time_step: f64,
    gravity_over_length: f64,
    origin: (f64, f64),
}

impl SimulationParameters {
    pub fn rod_length(&self) -> f64 {
        self.rod_length
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn gravitational_acceleration(&self) -> f64 {
        self.gravitational_acceleration
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Seconds advanced per `advance()` call, `1 / frame_rate`.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// g / l, cached at construction.
    pub fn gravity_over_length(&self) -> f64 {
        self.gravity_over_length
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Back to the raw form, e.g. for echoing the effective config over HTTP.
    pub fn to_config(&self) -> PendulumConfig {
        PendulumConfig {
            segment_count: self.segment_count,
            rod_length: self.rod_length,
            damping: self.damping,
            gravitational_acceleration: self.gravitational_acceleration,
            frame_rate: self.frame_rate,
            origin: [self.origin.0, self.origin.1],
        }
    }
}
