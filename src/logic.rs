// src/logic.rs
// Simulation state and the per-frame integrator.
// Multipendulum owns the parameters, the coupling matrix and the mutable PendulumState; advance() is the only
// transition. Each call solves A φ̈ = D for the current angles, applies linear damping, takes one explicit step
// (velocity first, then angle from the new velocity) and projects the *pre-step* angles to Cartesian joints,
// so drawn positions trail the integrated angles by one frame.
// solve_linear_system is Gaussian elimination with partial pivoting; a vanishing pivot is reported, never divided by.

use crate::error::{PendulumError, PendulumResult};
use crate::initial::InitialAngles;
use crate::math::{joint_positions, ChainSnapshot, CouplingMatrix};
use crate::params::SimulationParameters;
use rand::Rng;
use tracing::{debug, trace, warn};

/// Pivots at or below this magnitude (or non-finite) mark the system as singular.
pub const SINGULAR_PIVOT_TOLERANCE: f64 = 1e-12;

/// Where elimination broke down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingularPivot {
    pub column: usize,
    pub pivot: f64,
}

/// Solves `a x = b` for a square system. Works on copies; inputs are untouched.
pub fn solve_linear_system(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>, SingularPivot> {
    let n = b.len();
    let mut mat = a.to_vec();
    let mut rhs = b.to_vec();

    // Forward elimination with partial pivoting.
    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if mat[k][i].abs() > mat[max_row][i].abs() {
                max_row = k;
            }
        }
        mat.swap(i, max_row);
        rhs.swap(i, max_row);

        let pivot = mat[i][i];
        // Also catches NaN, which fails every comparison.
        if !(pivot.abs() > SINGULAR_PIVOT_TOLERANCE) {
            return Err(SingularPivot { column: i, pivot });
        }

        for k in (i + 1)..n {
            let c = -mat[k][i] / pivot;
            mat[k][i] = 0.0;
            for j in (i + 1)..n {
                mat[k][j] += c * mat[i][j];
            }
            rhs[k] += c * rhs[i];
        }
    }

    // Back-substitution.
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum_ax: f64 = mat[i][(i + 1)..]
            .iter()
            .zip(&x[(i + 1)..])
            .map(|(m, x_j)| m * x_j)
            .sum();
        x[i] = (rhs[i] - sum_ax) / mat[i][i];
    }
    Ok(x)
}

/// Mutable per-chain state. Only [`Multipendulum`] writes to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendulumState {
    angles: Vec<f64>,
    angular_velocities: Vec<f64>,
    angular_accelerations: Vec<f64>,
    joint_x: Vec<f64>,
    joint_y: Vec<f64>,
}

impl PendulumState {
    fn at_rest(angles: Vec<f64>, angular_velocities: Vec<f64>) -> Self {
        let n = angles.len();
        Self {
            angles,
            angular_velocities,
            angular_accelerations: vec![0.0; n],
            joint_x: vec![0.0; n],
            joint_y: vec![0.0; n],
        }
    }

    /// φ in radians, not wrapped.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn angular_velocities(&self) -> &[f64] {
        &self.angular_velocities
    }

    /// φ̈ from the most recent solve.
    pub fn angular_accelerations(&self) -> &[f64] {
        &self.angular_accelerations
    }

    pub fn joint_x(&self) -> &[f64] {
        &self.joint_x
    }

    pub fn joint_y(&self) -> &[f64] {
        &self.joint_y
    }
}

/// A single chain of N equal rods plus everything needed to step it.
#[derive(Debug, Clone)]
pub struct Multipendulum {
    params: SimulationParameters,
    coupling: CouplingMatrix,
    state: PendulumState,
    steps: u64,
}

impl Multipendulum {
    /// Chain with angles drawn by `initial`, at rest.
    pub fn new<R: Rng>(
        params: SimulationParameters,
        initial: InitialAngles,
        rng: &mut R,
    ) -> PendulumResult<Self> {
        let angles = initial.sample(params.segment_count(), rng);
        let velocities = vec![0.0; params.segment_count()];
        Self::with_state(params, angles, velocities)
    }

    /// Chain with an injected angle/velocity state.
    pub fn with_state(
        params: SimulationParameters,
        angles: Vec<f64>,
        angular_velocities: Vec<f64>,
    ) -> PendulumResult<Self> {
        let n = params.segment_count();
        if angles.len() != n {
            return Err(PendulumError::invalid(
                "angle count must equal segment_count",
                angles.len(),
            ));
        }
        if angular_velocities.len() != n {
            return Err(PendulumError::invalid(
                "angular velocity count must equal segment_count",
                angular_velocities.len(),
            ));
        }
        if let Some(bad) = angles
            .iter()
            .chain(&angular_velocities)
            .find(|v| !v.is_finite())
        {
            return Err(PendulumError::invalid("initial state must be finite", bad));
        }

        let coupling = CouplingMatrix::build(n)?;
        debug!(
            segment_count = n,
            rod_length = params.rod_length(),
            damping = params.damping(),
            time_step = params.time_step(),
            "multipendulum constructed"
        );
        Ok(Self {
            params,
            coupling,
            state: PendulumState::at_rest(angles, angular_velocities),
            steps: 0,
        })
    }

    /// Fresh angles from `initial`; velocities, accelerations and joints back to zero.
    pub fn reinitialize<R: Rng>(&mut self, initial: InitialAngles, rng: &mut R) {
        let n = self.params.segment_count();
        self.state = PendulumState::at_rest(initial.sample(n, rng), vec![0.0; n]);
        self.steps = 0;
    }

    /// One frame. On error nothing has been written, including when the step overflows to NaN/inf.
    pub fn advance(&mut self) -> PendulumResult<()> {
        let t = self.params.time_step();
        let damping = self.params.damping();

        let accelerations = {
            let snapshot = ChainSnapshot::new(&self.coupling, &self.state.angles);
            let a = snapshot.inertia_matrix();
            let d = snapshot.generalized_forces(
                self.params.gravity_over_length(),
                &self.state.angular_velocities,
            );
            let mut phi_ddot = solve_linear_system(&a, &d).map_err(|singular| {
                warn!(
                    step = self.steps,
                    column = singular.column,
                    pivot = singular.pivot,
                    "inertia matrix is singular"
                );
                PendulumError::SingularSystem {
                    step: self.steps,
                    column: singular.column,
                    pivot: singular.pivot,
                }
            })?;
            for (acc, w) in phi_ddot.iter_mut().zip(&self.state.angular_velocities) {
                *acc -= damping * w;
            }
            phi_ddot
        };

        // Joints follow the angles as they were at the top of the step.
        let (xs, ys) = joint_positions(
            &self.state.angles,
            self.params.rod_length(),
            self.params.origin(),
        );

        let velocities: Vec<f64> = self
            .state
            .angular_velocities
            .iter()
            .zip(&accelerations)
            .map(|(w, acc)| w + acc * t)
            .collect();
        let angles: Vec<f64> = self
            .state
            .angles
            .iter()
            .zip(&velocities)
            .map(|(phi, w)| phi + w * t)
            .collect();

        let finite = |v: &[f64]| v.iter().all(|x| x.is_finite());
        if !(finite(&accelerations) && finite(&velocities) && finite(&angles)) {
            warn!(step = self.steps, "step produced non-finite state");
            return Err(PendulumError::NonFiniteState { step: self.steps });
        }

        let state = &mut self.state;
        state.angles = angles;
        state.angular_velocities = velocities;
        state.angular_accelerations = accelerations;
        state.joint_x = xs;
        state.joint_y = ys;

        self.steps += 1;
        trace!(step = self.steps, "advanced");
        Ok(())
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn coupling(&self) -> &CouplingMatrix {
        &self.coupling
    }

    pub fn state(&self) -> &PendulumState {
        &self.state
    }

    /// Number of successful `advance()` calls since construction or the last reinitialize.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn joint_positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.state
            .joint_x
            .iter()
            .copied()
            .zip(self.state.joint_y.iter().copied())
    }

    /// The N+1 drawable points: anchor first, then every joint.
    pub fn chain_points(&self) -> Vec<(f64, f64)> {
        std::iter::once(self.params.origin())
            .chain(self.joint_positions())
            .collect()
    }

    /// Position of the free end, i.e. the last joint.
    pub fn tip(&self) -> (f64, f64) {
        self.joint_positions()
            .last()
            .unwrap_or_else(|| self.params.origin())
    }
}
