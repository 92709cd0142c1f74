//! Observer collaborator — the thing a view is rendered from.

use glam::{DVec3, Quat};

/// A camera-relative-positioning participant: anything a
/// [`super::context::RenderContext`] view can be driven from (spec §6).
///
/// Positions are `f64` world-space (spec §2: camera-relative positioning):
/// the orchestrator subtracts the observer's position from every scene
/// entity's position before narrowing to `f32` for the GPU.
pub trait Observer {
    /// World-space position at time `t`.
    fn position(&self, t: f64) -> DVec3;
    /// World-space orientation at time `t`.
    fn orientation(&self, t: f64) -> Quat;
}
