//! Scene collaborator — the orchestrator's view of "the world".
//!
//! Scene storage itself (an ECS, a slotmap pool, a simple `Vec`) is an
//! external concern (spec §1); `Scene` only describes what the orchestrator
//! needs to pull out of it. Iteration is index-based (`entity_count()` +
//! `entity(index)`) rather than returning an iterator of trait objects,
//! mirroring the teacher's `cull.rs` pattern of walking storage by index to
//! sidestep borrow-checker conflicts between iterating and mutating
//! per-entity render state.

use glam::{DVec3, Quat};

use super::context::CubeMapFramebuffer;
use super::geometry::{Geometry, GeometryHandle};
use super::light::LightSourceDescriptor;
use super::visualizer::Visualizer;

/// Opaque identifier for a scene entity, used only for bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u64);

/// A sky layer: a background drawn behind everything else, in explicit
/// draw order (spec §6: "SkyLayer").
#[derive(Debug, Clone)]
pub struct SkyLayer {
    pub name: String,
    /// Lower values draw first (further back).
    pub draw_order: i32,
    pub visible: bool,
}

/// One thing in the scene: a planet, a spacecraft, a light, or any
/// combination (spec §6: "SceneEntity").
pub trait SceneEntity {
    /// `false` excludes the entity from every pass this frame.
    fn is_visible(&self) -> bool;

    /// World-space position at time `t`.
    fn position(&self, t: f64) -> DVec3;

    /// World-space orientation at time `t`.
    fn orientation(&self, t: f64) -> Quat;

    /// The renderable geometry this entity carries, if any.
    fn geometry(&self) -> Option<&dyn Geometry>;

    /// Identifier for `geometry()`, for bookkeeping; `None` when
    /// `geometry()` is `None`.
    fn geometry_handle(&self) -> Option<GeometryHandle> {
        None
    }

    /// The light this entity carries, if any.
    fn light_source(&self) -> Option<LightSourceDescriptor> {
        None
    }

    /// Secondary geometry hosted by this entity (trails, markers).
    fn visualizers(&self) -> &[&dyn Visualizer] {
        &[]
    }
}

/// The full set of entities and sky layers the orchestrator draws from
/// (spec §6: "Scene").
pub trait Scene {
    /// Number of entities currently in the scene.
    fn entity_count(&self) -> usize;

    /// The entity at `index` (`0..entity_count()`), with its handle.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `index >= entity_count()`.
    fn entity(&self, index: usize) -> (EntityHandle, &dyn SceneEntity);

    /// Sky layers, in no particular order (the orchestrator sorts by
    /// `draw_order` itself).
    fn sky_layers(&self) -> &[SkyLayer] {
        &[]
    }

    /// The reflection cube map for the current lighting environment, if
    /// the scene provides one. Bound onto every opaque/translucent item
    /// drawn by [`crate::render::span_renderer::SpanRenderer`] (spec
    /// §4.4 step 6).
    fn environment_map(&self) -> Option<&dyn CubeMapFramebuffer> {
        None
    }
}
