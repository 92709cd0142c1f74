//! Visualizer collaborator — secondary geometry hosted by a scene entity
//! (e.g. an orbit trail, a velocity vector, a label billboard).

use glam::Quat;

use super::geometry::Geometry;
use super::scene::SceneEntity;

/// How a visualizer's orientation is derived from its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizerPlacement {
    /// Use the host entity's own orientation unmodified.
    AsIs,
    /// Recompute an orientation that faces the observer each frame (e.g.
    /// for a billboard-style visualizer).
    AdjustToFront,
}

/// A piece of geometry attached to a [`SceneEntity`] but rendered with its
/// own orientation policy (spec §6: "Visualizer").
pub trait Visualizer {
    /// The geometry to draw.
    fn geometry(&self) -> &dyn Geometry;

    /// How this visualizer's orientation should be derived.
    fn placement(&self) -> VisualizerPlacement;

    /// The orientation to render with at time `t`, given the hosting
    /// entity. Called by the orchestrator after resolving `placement()`
    /// (callers implementing `AdjustToFront` still receive the host so
    /// they can combine it with observer-facing logic).
    fn orientation(&self, host: &dyn SceneEntity, t: f64) -> Quat;
}
