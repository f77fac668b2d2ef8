//! Property tests for the coupling matrix and the integrator step.

use multipendulum::math::joint_positions;
use multipendulum::{CouplingMatrix, Multipendulum, PendulumConfig, TraceBuffer};
use proptest::prelude::*;

proptest! {
    #[test]
    fn coupling_matrix_counts_rods_below_deeper_joint(n in 1usize..40) {
        let m = CouplingMatrix::build(n).unwrap();
        prop_assert_eq!(m.size(), n);
        prop_assert_eq!(m.rows().len(), n);
        prop_assert_eq!(m.get(0, 0), n as f64);
        prop_assert_eq!(m.get(n - 1, 0), 1.0);
        prop_assert_eq!(m.get(0, n - 1), 1.0);
        for row in 0..n {
            prop_assert_eq!(m.rows()[row].len(), n);
            for col in 0..n {
                let v = m.get(row, col);
                prop_assert_eq!(v, (n - row.max(col)) as f64);
                prop_assert!(v >= 1.0 && v <= n as f64);
                prop_assert_eq!(v, m.get(col, row));
            }
        }
    }

    #[test]
    fn positions_follow_pre_step_angles(
        angles in prop::collection::vec(-10.0f64..10.0, 1..8),
        rod_length in 0.1f64..5.0,
    ) {
        let n = angles.len();
        let params = PendulumConfig {
            segment_count: n,
            rod_length,
            ..PendulumConfig::default()
        }
        .validate()
        .unwrap();
        let mut p = Multipendulum::with_state(params, angles.clone(), vec![0.0; n]).unwrap();
        p.advance().unwrap();
        let (xs, ys) = joint_positions(&angles, rod_length, (0.0, 0.0));
        for j in 0..n {
            prop_assert!((p.state().joint_x()[j] - xs[j]).abs() < 1e-12);
            prop_assert!((p.state().joint_y()[j] - ys[j]).abs() < 1e-12);
        }
    }

    #[test]
    fn weightless_chain_at_rest_does_not_accelerate(
        angles in prop::collection::vec(0.0f64..std::f64::consts::TAU, 1..8),
    ) {
        let n = angles.len();
        let params = PendulumConfig {
            segment_count: n,
            gravitational_acceleration: 0.0,
            ..PendulumConfig::default()
        }
        .validate()
        .unwrap();
        let mut p = Multipendulum::with_state(params, angles, vec![0.0; n]).unwrap();
        p.advance().unwrap();
        prop_assert!(p.state().angular_accelerations().iter().all(|a| a.abs() < 1e-12));
    }

    #[test]
    fn trace_never_exceeds_limit_plus_one(limit in 0usize..50, pushes in 0usize..200) {
        let mut trace = TraceBuffer::new(limit);
        for i in 0..pushes {
            trace.push((i as f64, -(i as f64)));
        }
        prop_assert_eq!(trace.len(), pushes.min(limit + 1));
        if pushes > 0 {
            prop_assert_eq!(trace.iter().last(), Some(((pushes - 1) as f64, -((pushes - 1) as f64))));
        }
    }
}
