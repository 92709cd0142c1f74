//! Geometry collaborator.
//!
//! Leaf geometry classes are out of scope for this crate (spec §1); what
//! they must expose to the orchestrator is captured here as [`Geometry`].

use glam::Vec3;

use super::context::RenderContext;

/// Opaque identifier for a piece of geometry, as handed back by a
/// [`super::scene::SceneEntity`]. Used only for bookkeeping (e.g. dedup,
/// logging) — the orchestrator never interprets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Controls how [`VisibleItemCollector`](crate::render::visible_items) picks
/// a near-plane distance for a piece of geometry (spec §4.2 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClippingPolicy {
    /// Depth precision matters more than avoiding clipping; the near plane
    /// is bounded by `bounding_radius * 2 * MinimumNearFarRatio`.
    PreserveDepthPrecision,
    /// Clipping must never happen; the near plane is bounded only by
    /// `MinimumNearPlaneDistance`.
    PreventClipping,
    /// Like `PreventClipping`, but additionally routes the item into the
    /// splittable list so it is redrawn in every span it overlaps.
    SplitToPreventClipping,
}

/// A renderable shape, polymorphic over the capability set described in
/// spec §9 ("Polymorphism"): bounding radius, a near-plane function,
/// a clipping policy, and opaque/caster/receiver flags.
pub trait Geometry {
    /// Radius of the geometry's bounding sphere, in its own local units.
    fn bounding_radius(&self) -> f32;

    /// Distance from the origin to the geometry's near-plane-relevant
    /// extent along `view_vector` (camera-space, pointing from the
    /// geometry toward the camera). Used as the starting point before
    /// clipping-policy and FOV adjustments (spec §4.2 steps 3–5).
    fn near_plane_distance(&self, view_vector: Vec3) -> f32;

    /// How this geometry's near plane should be chosen.
    fn clipping_policy(&self) -> ClippingPolicy;

    /// `false` for translucent geometry; translucent items are excluded
    /// from the opaque sub-pass (spec §4.4 step 6).
    fn is_opaque(&self) -> bool;

    /// `true` if this geometry contributes depth to shadow maps.
    fn is_shadow_caster(&self) -> bool;

    /// `true` if this geometry samples shadow maps when shaded.
    fn is_shadow_receiver(&self) -> bool;

    /// Draws the geometry using the context's currently configured
    /// projection/modelview/lighting state.
    fn render(&self, ctx: &mut dyn RenderContext, t: f64);

    /// Draws the geometry into a shadow map (depth-only; the context has
    /// already been configured for the shadow pass by the caller).
    fn render_shadow(&self, ctx: &mut dyn RenderContext, t: f64);
}
