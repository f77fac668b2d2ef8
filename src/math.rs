// src/math.rs
// Structural and per-step matrices for a chain of N identical rods.
// CouplingMatrix is built once from N; ChainSnapshot borrows it together with the current angles and assembles
// the inertia-like matrix A, the centrifugal matrix B and the gravity vector D that logic.rs solves every frame.
// Indices are 0-based throughout: index 0 is the rod attached to the fixed pivot.

use crate::error::{PendulumError, PendulumResult};

/// N×N structural weights: entry (row, col) counts the rods hanging below the deeper of the two joints.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingMatrix {
    size: usize,
    rows: Vec<Vec<f64>>,
}

impl CouplingMatrix {
    /// Builds the matrix with the column sweep below. The fill order matters: the diagonal step
    /// writes the row above the diagonal, so an off-by-one here changes the dynamics.
    pub fn build(segment_count: usize) -> PendulumResult<Self> {
        if segment_count < 1 {
            return Err(PendulumError::invalid(
                "segment_count must be >= 1",
                segment_count,
            ));
        }
        let size = segment_count;
        let mut rows = vec![vec![0.0; size]; size];

        for i in 0..size {
            for j in (i..size).rev() {
                let weight = (size - j) as f64;
                rows[j][i] = weight;
                if j == i {
                    // Backfill the same value above the diagonal.
                    for row in rows.iter_mut().take(j) {
                        row[j] = weight;
                    }
                }
            }
        }

        Ok(Self { size, rows })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry at (row, col). Panics when out of range, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// Trig of the current angles, paired with the coupling weights. One per `advance()`.
pub struct ChainSnapshot<'a> {
    coupling: &'a CouplingMatrix,
    sin: Vec<f64>,
    cos: Vec<f64>,
}

impl<'a> ChainSnapshot<'a> {
    pub fn new(coupling: &'a CouplingMatrix, angles: &[f64]) -> Self {
        debug_assert_eq!(coupling.size(), angles.len());
        Self {
            coupling,
            sin: angles.iter().map(|phi| phi.sin()).collect(),
            cos: angles.iter().map(|phi| phi.cos()).collect(),
        }
    }

    /// A[j][i] = cos(φj − φi) · M[j][i], expanded as the sum of the two outer products.
    pub fn inertia_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.coupling.size();
        let mut a = vec![vec![0.0; n]; n];
        for (j, row) in a.iter_mut().enumerate() {
            for (i, entry) in row.iter_mut().enumerate() {
                let cos_diff = self.cos[j] * self.cos[i] + self.sin[j] * self.sin[i];
                *entry = cos_diff * self.coupling.get(j, i);
            }
        }
        a
    }

    /// B[j][i] = sin(φj − φi) · M[j][i]. Antisymmetric up to the weights; the diagonal is zero.
    pub fn centrifugal_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.coupling.size();
        let mut b = vec![vec![0.0; n]; n];
        for (j, row) in b.iter_mut().enumerate() {
            for (i, entry) in row.iter_mut().enumerate() {
                let sin_diff = self.sin[j] * self.cos[i] - self.cos[j] * self.sin[i];
                *entry = sin_diff * self.coupling.get(j, i);
            }
        }
        b
    }

    /// D[i] = −(g/l) · sin φi · (N − i): gravity torque on joint i carried by the rods below it.
    pub fn gravity_vector(&self, gravity_over_length: f64) -> Vec<f64> {
        let n = self.coupling.size();
        self.sin
            .iter()
            .enumerate()
            .map(|(i, s)| s * -gravity_over_length * (n - i) as f64)
            .collect()
    }

    /// Full right-hand side: D − B · (φ̇ ∘ φ̇).
    pub fn generalized_forces(&self, gravity_over_length: f64, ang_vels: &[f64]) -> Vec<f64> {
        let mut d = self.gravity_vector(gravity_over_length);
        let b = self.centrifugal_matrix();
        let squared: Vec<f64> = ang_vels.iter().map(|w| w * w).collect();
        let centrifugal = mat_vec(&b, &squared);
        for (d_i, c_i) in d.iter_mut().zip(centrifugal) {
            *d_i -= c_i;
        }
        d
    }
}

/// Dense matrix-vector product.
pub fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter()
        .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
        .collect()
}

/// Cartesian joint positions from cumulative sums of sin/cos along the chain.
/// y grows downward in angle space, so it is subtracted from the anchor.
pub fn joint_positions(angles: &[f64], rod_length: f64, origin: (f64, f64)) -> (Vec<f64>, Vec<f64>) {
    let (x0, y0) = origin;
    let mut xs = Vec::with_capacity(angles.len());
    let mut ys = Vec::with_capacity(angles.len());
    let mut hx = 0.0;
    let mut hy = 0.0;
    for phi in angles {
        hx += phi.sin();
        xs.push(x0 + rod_length * hx);
        hy += phi.cos();
        ys.push(y0 - rod_length * hy);
    }
    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn three_segment_matrix_literal() {
        let m = CouplingMatrix::build(3).unwrap();
        assert_eq!(
            m.rows(),
            &[
                vec![3.0, 2.0, 1.0],
                vec![2.0, 2.0, 1.0],
                vec![1.0, 1.0, 1.0],
            ]
        );
    }

    #[test]
    fn single_segment_is_one() {
        let m = CouplingMatrix::build(1).unwrap();
        assert_eq!(m.size(), 1);
        assert_eq!(m.get(0, 0), 1.0);
    }

    #[test]
    fn zero_segments_rejected() {
        assert!(CouplingMatrix::build(0).unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn hanging_chain_has_no_forces() {
        let m = CouplingMatrix::build(4).unwrap();
        let snap = ChainSnapshot::new(&m, &[0.0; 4]);
        assert_eq!(snap.inertia_matrix(), m.rows().to_vec());
        assert!(snap.gravity_vector(1.0).iter().all(|d| *d == 0.0));
        assert!(snap
            .centrifugal_matrix()
            .iter()
            .flatten()
            .all(|b| *b == 0.0));
    }

    #[test]
    fn gravity_vector_weights_by_rods_below() {
        let m = CouplingMatrix::build(3).unwrap();
        let snap = ChainSnapshot::new(&m, &[FRAC_PI_2; 3]);
        let d = snap.gravity_vector(2.0);
        for (got, want) in d.iter().zip([-6.0, -4.0, -2.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn centrifugal_matrix_matches_sin_difference() {
        let m = CouplingMatrix::build(2).unwrap();
        let angles = [0.3, 1.1];
        let b = ChainSnapshot::new(&m, &angles).centrifugal_matrix();
        assert!((b[0][1] - (0.3f64 - 1.1).sin() * 1.0).abs() < 1e-12);
        assert!((b[1][0] - (1.1f64 - 0.3).sin() * 1.0).abs() < 1e-12);
        assert_eq!(b[0][0], 0.0);
    }

    #[test]
    fn positions_stack_rods() {
        let (xs, ys) = joint_positions(&[0.0, PI / 2.0], 2.0, (1.0, 1.0));
        assert!((xs[0] - 1.0).abs() < 1e-12);
        assert!((ys[0] + 1.0).abs() < 1e-12);
        assert!((xs[1] - 3.0).abs() < 1e-12);
        assert!((ys[1] + 1.0).abs() < 1e-12);
    }
}
