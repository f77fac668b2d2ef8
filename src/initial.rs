// src/initial.rs
// Initial-angle strategies. The random source is passed in so tests can use a seeded ChaCha8Rng
// while the binary uses the thread-local generator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the starting angles of a chain are drawn. Velocities always start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialAngles {
    /// Each angle uniform in [0, 2π).
    #[default]
    UniformRandom,
    /// Each angle in [π − 0.05, π + 0.05): the chain balanced almost upright.
    NearInverted,
}

impl InitialAngles {
    pub fn sample<R: Rng>(self, segment_count: usize, rng: &mut R) -> Vec<f64> {
        (0..segment_count)
            .map(|_| {
                let u: f64 = rng.random();
                match self {
                    InitialAngles::UniformRandom => 2.0 * PI * u,
                    InitialAngles::NearInverted => PI - 0.05 + 0.1 * u,
                }
            })
            .collect()
    }
}
