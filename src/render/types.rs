//! Per-frame data types rebuilt by the orchestrator (spec §3).

use glam::{DVec3, Quat, Vec3};

use crate::collab::{EntityHandle, GeometryHandle, LightHandle};

/// A light entry in the snapshot built at `begin_view_set` (spec §3:
/// "LightSourceItem").
///
/// `handle` is `None` for the Sun sentinel, which is always present at
/// index 0 with `world_position == DVec3::ZERO`.
#[derive(Debug, Clone, Copy)]
pub struct LightSourceItem {
    pub handle: Option<LightHandle>,
    pub world_position: DVec3,
    pub range: f32,
    pub is_shadow_caster: bool,
}

impl LightSourceItem {
    /// `true` for the Sun sentinel.
    #[must_use]
    pub fn is_sun(&self) -> bool {
        self.handle.is_none()
    }
}

/// A light survivor of [`crate::render::light_visibility::LightVisibilityFilter`]
/// (spec §3: "VisibleLightSourceItem").
#[derive(Debug, Clone, Copy)]
pub struct VisibleLightSourceItem {
    pub handle: Option<LightHandle>,
    pub world_position: DVec3,
    pub camera_relative_position: Vec3,
    pub range: f32,
    pub is_shadow_caster: bool,
}

/// Where a [`VisibleItem`]'s geometry lives, so passes that need to render
/// or shadow-test it can look it back up through [`crate::collab::Scene`]
/// without this crate owning a `&dyn Geometry` (spec §1 treats geometry
/// storage as external).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    /// The entity's own geometry, at `scene.entity(entity_index)`.
    Entity { entity_index: usize },
    /// A visualizer hosted by `scene.entity(entity_index)`, at
    /// `visualizers()[visualizer_index]`.
    Visualizer {
        entity_index: usize,
        visualizer_index: usize,
    },
}

/// A scene entity (or visualizer) that survived
/// [`crate::render::visible_items::VisibleItemCollector`] (spec §3:
/// "VisibleItem").
#[derive(Debug, Clone, Copy)]
pub struct VisibleItem {
    pub entity_handle: EntityHandle,
    pub geometry_handle: Option<GeometryHandle>,
    pub source: ItemSource,
    pub world_position: DVec3,
    pub camera_relative_position: DVec3,
    pub camera_space_position: Vec3,
    pub orientation: Quat,
    pub bounding_radius: f32,
    pub near_distance: f32,
    pub far_distance: f32,
    pub outside_frustum: bool,
}

/// A disjoint world-depth range with its own sliced projection and
/// fractional hardware-depth allocation (spec §3: "DepthBufferSpan").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBufferSpan {
    pub near_distance: f64,
    pub far_distance: f64,
    /// Index into the visible-item array of the furthest item contained by
    /// this span (items are stored back-to-front, so walking forward from
    /// here in front-to-back order means walking the index downward).
    pub back_item_index: usize,
    pub item_count: usize,
}

impl DepthBufferSpan {
    /// `true` if this span, as currently bounded, contains no items (an
    /// empty span synthesized purely to keep split-phase spans disjoint).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// Why a light was culled by [`crate::render::light_visibility::LightVisibilityFilter`]
/// (spec.md §4.1). Carried only as a `log::trace!` payload today; broken
/// out as its own type (rather than an inline string) so a caller wiring
/// up structured logging can match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCullReason {
    /// `(range / distance) / pixel_size < LightCullThresholdPx`.
    SubpixelInfluence,
    /// The light's influence sphere does not intersect the view frustum.
    OutsideFrustum,
}

/// Summary counts from one `render_view` / `render_cube_map` call.
///
/// Spec.md §8's testable properties ("one draw call per pass", "≥ 2 merged
/// spans") are otherwise unobservable by a caller without re-deriving the
/// whole pipeline; this is read-only telemetry alongside `RenderStatus` and
/// never changes rendering behavior, mirroring the teacher's own per-frame
/// counts (`myth::engine::FrameState`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Lights that survived [`crate::render::light_visibility::LightVisibilityFilter`].
    pub visible_light_count: usize,
    /// Items in the normal (non-splittable) visible-item list.
    pub normal_item_count: usize,
    /// Items in the splittable visible-item list.
    pub splittable_item_count: usize,
    /// Depth spans produced by [`crate::render::depth_span::DepthSpanPartitioner`].
    pub span_count: usize,
    /// Directional shadow passes that actually rendered (receiver and
    /// caster sets both non-empty), summed across all spans.
    pub directional_shadow_passes: usize,
    /// Omni shadow passes that actually rendered, summed across all spans.
    pub omni_shadow_passes: usize,
}

impl RenderStats {
    /// Accumulates another call's counts into this one (used by
    /// [`crate::render::cubemap_view::CubeMapViewDriver`] to aggregate
    /// across its six per-face calls).
    pub fn accumulate(&mut self, other: &RenderStats) {
        self.visible_light_count = self.visible_light_count.max(other.visible_light_count);
        self.normal_item_count += other.normal_item_count;
        self.splittable_item_count += other.splittable_item_count;
        self.span_count += other.span_count;
        self.directional_shadow_passes += other.directional_shadow_passes;
        self.omni_shadow_passes += other.omni_shadow_passes;
    }
}
