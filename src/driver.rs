// src/driver.rs
// Frame loop around a Multipendulum: init hook, one advance() per frame, bounded trace of the free end.
// The driver only reads joint positions; the integrator stays the sole writer of the chain state.

use crate::error::{PendulumError, PendulumResult};
use crate::initial::InitialAngles;
use crate::logic::Multipendulum;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Display-side settings. None of these touch the physics step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Number of tip positions kept for drawing the trace.
    pub trace_length: usize,
    pub initial_angles: InitialAngles,
    /// Playback speed-up divisor for the frame interval.
    pub time_lapse: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            trace_length: 100,
            initial_angles: InitialAngles::UniformRandom,
            time_lapse: 40.0,
        }
    }
}

impl DriverConfig {
    /// Only the pacing divisor can be out of range; trace length and start mode are always usable.
    pub fn validate(&self) -> PendulumResult<()> {
        if !(self.time_lapse.is_finite() && self.time_lapse > 0.0) {
            return Err(PendulumError::invalid(
                "time_lapse must be a finite value > 0",
                self.time_lapse,
            ));
        }
        Ok(())
    }
}

/// Recent tip positions, oldest first.
///
/// The oldest point is dropped only once the buffer already holds more than `limit` points,
/// so a full buffer carries `limit + 1` points.
#[derive(Debug, Clone, Default)]
pub struct TraceBuffer {
    limit: usize,
    points: VecDeque<(f64, f64)>,
}

impl TraceBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            points: VecDeque::with_capacity(limit.saturating_add(1).min(1 << 16)),
        }
    }

    pub fn push(&mut self, point: (f64, f64)) {
        if self.points.len() > self.limit {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<(f64, f64)> {
        self.iter().collect()
    }
}

/// One drawable frame: anchor plus N joints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Frame {
    fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            xs: points.iter().map(|p| p.0).collect(),
            ys: points.iter().map(|p| p.1).collect(),
        }
    }

    pub fn tip(&self) -> Option<(f64, f64)> {
        Some((*self.xs.last()?, *self.ys.last()?))
    }
}

pub struct AnimationDriver {
    pendulum: Multipendulum,
    config: DriverConfig,
    trace: TraceBuffer,
}

impl AnimationDriver {
    pub fn new(pendulum: Multipendulum, config: DriverConfig) -> Self {
        let trace = TraceBuffer::new(config.trace_length);
        Self {
            pendulum,
            config,
            trace,
        }
    }

    /// Empties the trace and takes the first step so frame 0 has real joint positions.
    pub fn initialize(&mut self) -> PendulumResult<()> {
        self.trace.clear();
        self.pendulum.advance()
    }

    /// Records the tip, snapshots the chain as it is drawn now, then advances.
    pub fn next_frame(&mut self) -> PendulumResult<Frame> {
        self.trace.push(self.pendulum.tip());
        let frame = Frame::from_points(&self.pendulum.chain_points());
        self.pendulum.advance()?;
        Ok(frame)
    }

    /// `initialize()` followed by `frames` calls to `next_frame()`.
    pub fn run(&mut self, frames: usize) -> PendulumResult<Vec<Frame>> {
        self.initialize()?;
        let mut out = Vec::with_capacity(frames);
        for _ in 0..frames {
            out.push(self.next_frame()?);
        }
        debug!(
            frames,
            trace_points = self.trace.len(),
            steps = self.pendulum.steps(),
            "driver run finished"
        );
        Ok(out)
    }

    /// Wall-clock delay between drawn frames, in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 * self.pendulum.params().time_step() / self.config.time_lapse
    }

    /// Half-size of the square viewport: the fully stretched chain.
    pub fn plot_limit(&self) -> f64 {
        let params = self.pendulum.params();
        params.rod_length() * params.segment_count() as f64
    }

    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    pub fn pendulum(&self) -> &Multipendulum {
        &self.pendulum
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PendulumConfig;

    fn driver(trace_length: usize) -> AnimationDriver {
        let params = PendulumConfig::default().validate().unwrap();
        let pendulum =
            Multipendulum::with_state(params, vec![2.0, 2.5, 3.0], vec![0.0; 3]).unwrap();
        AnimationDriver::new(
            pendulum,
            DriverConfig {
                trace_length,
                ..DriverConfig::default()
            },
        )
    }

    #[test]
    fn trace_keeps_one_more_than_limit() {
        let mut trace = TraceBuffer::new(3);
        for i in 0..10 {
            trace.push((i as f64, 0.0));
        }
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.iter().next(), Some((6.0, 0.0)));
    }

    #[test]
    fn zero_length_trace_holds_latest_point() {
        let mut trace = TraceBuffer::new(0);
        trace.push((1.0, 1.0));
        trace.push((2.0, 2.0));
        assert_eq!(trace.to_vec(), vec![(2.0, 2.0)]);
    }

    #[test]
    fn frames_are_anchor_prefixed() {
        let mut d = driver(10);
        let frames = d.run(5).unwrap();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.xs.len() == 4 && f.ys.len() == 4));
        assert!(frames.iter().all(|f| f.xs[0] == 0.0 && f.ys[0] == 0.0));
        // initialize() plus one step per frame.
        assert_eq!(d.pendulum().steps(), 6);
    }

    #[test]
    fn trace_follows_frame_tips() {
        let mut d = driver(100);
        let frames = d.run(20).unwrap();
        let tips: Vec<_> = frames.iter().filter_map(Frame::tip).collect();
        assert_eq!(d.trace().to_vec(), tips);
    }

    #[test]
    fn trace_is_bounded_over_long_runs() {
        let mut d = driver(7);
        d.run(50).unwrap();
        assert_eq!(d.trace().len(), 8);
    }

    #[test]
    fn time_lapse_must_be_positive_and_finite() {
        assert!(DriverConfig::default().validate().is_ok());
        for time_lapse in [0.0, -40.0, f64::INFINITY, f64::NAN] {
            let config = DriverConfig {
                time_lapse,
                ..DriverConfig::default()
            };
            assert!(config.validate().unwrap_err().is_invalid_configuration());
        }
    }

    #[test]
    fn pacing_and_viewport() {
        let d = driver(1);
        assert!((d.frame_interval_ms() - 1.0).abs() < 1e-12);
        assert_eq!(d.plot_limit(), 3.0);
    }
}
