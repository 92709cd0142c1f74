//! Visible-item collection (spec §4.2).

use glam::{DVec3, Quat, Vec3};

use crate::collab::{
    BoundingSphere, ClippingPolicy, EntityHandle, Frustum, Geometry, GeometryHandle, Scene,
    VisualizerPlacement,
};

use crate::config::EngineConfig;

use super::types::{ItemSource, VisibleItem};

/// The near-plane FOV adjustment factor `A = cos(fov/2) / sqrt(1 + aspect^2)`
/// (spec §4.2).
#[must_use]
pub fn fov_adjustment_factor(fov: f32, aspect: f32) -> f32 {
    (fov * 0.5).cos() / (1.0 + aspect * aspect).sqrt()
}

/// Looks a visible item's geometry back up through `scene`, following
/// [`ItemSource`]. Returns `None` if the underlying entity or visualizer
/// has since disappeared (the snapshot taken at `begin_view_set` is
/// assumed immutable for the duration of a view set, so this should not
/// normally happen).
#[must_use]
pub fn resolve_geometry<'a>(scene: &'a dyn Scene, item: &VisibleItem) -> Option<&'a dyn Geometry> {
    match item.source {
        ItemSource::Entity { entity_index } => scene.entity(entity_index).1.geometry(),
        ItemSource::Visualizer {
            entity_index,
            visualizer_index,
        } => scene
            .entity(entity_index)
            .1
            .visualizers()
            .get(visualizer_index)
            .map(|v| v.geometry()),
    }
}

/// Builds the per-frame `VisibleItem` list from scene entities and their
/// visualizers.
#[derive(Debug, Default)]
pub struct VisibleItemCollector;

impl VisibleItemCollector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Collects visible items for `scene` at `current_time`.
    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        &self,
        scene: &dyn Scene,
        current_time: f64,
        camera_position: DVec3,
        camera_orientation: Quat,
        frustum: &Frustum,
        pixel_size: f32,
        fov_adjustment: f32,
        config: &EngineConfig,
    ) -> CollectedItems {
        let mut normal = Vec::new();
        let mut splittable = Vec::new();

        for entity_index in 0..scene.entity_count() {
            let (handle, entity) = scene.entity(entity_index);
            if !entity.is_visible() {
                continue;
            }

            let world_pos = entity.position(current_time);
            let cam_rel = world_pos - camera_position;
            let cam_rel_f32 = cam_rel.as_vec3();
            let cam_rel_cam_space = camera_orientation.inverse() * cam_rel_f32;
            let entity_orientation = entity.orientation(current_time);

            if let Some(geometry) = entity.geometry() {
                let distance = cam_rel_f32.length();
                let significance = if distance > 0.0 {
                    (geometry.bounding_radius() / distance) / pixel_size
                } else {
                    f32::INFINITY
                };

                if significance >= config.size_cull_threshold_px {
                    Self::push_item(
                        &mut normal,
                        &mut splittable,
                        geometry,
                        BuildArgs {
                            entity_handle: handle,
                            geometry_handle: entity.geometry_handle(),
                            source: ItemSource::Entity { entity_index },
                            world_position: world_pos,
                            cam_rel,
                            cam_rel_single: cam_rel_f32,
                            cam_rel_cam_space,
                            orientation: entity_orientation,
                            fov_adjustment,
                            config,
                            frustum,
                        },
                    );
                }
            }

            for (visualizer_index, visualizer) in entity.visualizers().iter().enumerate() {
                let geometry = visualizer.geometry();
                let mut effective_cam_rel = cam_rel;
                let mut effective_cam_rel_cam_space = cam_rel_cam_space;

                if visualizer.placement() == VisualizerPlacement::AdjustToFront {
                    let neg_z = -cam_rel_cam_space.z;
                    if neg_z > 0.0 {
                        let factor = ((neg_z - geometry.bounding_radius()) / neg_z).max(0.0);
                        effective_cam_rel = cam_rel * f64::from(factor);
                        effective_cam_rel_cam_space = cam_rel_cam_space * factor;
                    }
                }

                let orientation = visualizer.orientation(entity, current_time);

                Self::push_item(
                    &mut normal,
                    &mut splittable,
                    geometry,
                    BuildArgs {
                        entity_handle: handle,
                        geometry_handle: None,
                        source: ItemSource::Visualizer {
                            entity_index,
                            visualizer_index,
                        },
                        world_position: camera_position + effective_cam_rel,
                        cam_rel: effective_cam_rel,
                        cam_rel_single: effective_cam_rel.as_vec3(),
                        cam_rel_cam_space: effective_cam_rel_cam_space,
                        orientation,
                        fov_adjustment,
                        config,
                        frustum,
                    },
                );
            }
        }

        normal.sort_by(|a, b| a.far_distance.partial_cmp(&b.far_distance).unwrap());
        splittable.sort_by(|a, b| a.far_distance.partial_cmp(&b.far_distance).unwrap());

        CollectedItems { normal, splittable }
    }

    fn push_item(
        normal: &mut Vec<VisibleItem>,
        splittable: &mut Vec<VisibleItem>,
        geometry: &dyn Geometry,
        args: BuildArgs<'_>,
    ) {
        let policy = geometry.clipping_policy();
        // Spec §4.2 step 3: the view vector is expressed in the geometry's
        // own orientation frame, not the camera's — `orientation^-1 *
        // (-cam_rel)`, using the single-precision, un-rotated camera-relative
        // position (`cam_rel_single`), not `cam_rel_cam_space` (already
        // rotated into camera space).
        let view_vector = args.orientation.inverse() * (-args.cam_rel_single);
        let initial_near = geometry.near_plane_distance(view_vector);
        if let Some(item) = Self::build_item(args, geometry.bounding_radius(), initial_near, policy) {
            match policy {
                ClippingPolicy::SplitToPreventClipping => splittable.push(item),
                _ => normal.push(item),
            }
        }
    }

    fn build_item(
        args: BuildArgs<'_>,
        bounding_radius: f32,
        initial_near: f32,
        policy: ClippingPolicy,
    ) -> Option<VisibleItem> {
        let far = -args.cam_rel_cam_space.z + bounding_radius;

        let near = match policy {
            ClippingPolicy::PreserveDepthPrecision => {
                initial_near.max(bounding_radius * 2.0 * args.config.minimum_near_far_ratio)
            }
            ClippingPolicy::PreventClipping | ClippingPolicy::SplitToPreventClipping => {
                initial_near.max(args.config.minimum_near_plane_distance)
            }
        };

        let near = near * args.fov_adjustment;

        if !(far > 0.0 && near < far) {
            return None;
        }

        let outside_frustum =
            !args.frustum.intersects_sphere(args.cam_rel_cam_space, bounding_radius);

        Some(VisibleItem {
            entity_handle: args.entity_handle,
            geometry_handle: args.geometry_handle,
            source: args.source,
            world_position: args.world_position,
            camera_relative_position: args.cam_rel,
            camera_space_position: args.cam_rel_cam_space,
            orientation: args.orientation,
            bounding_radius,
            near_distance: near,
            far_distance: far,
            outside_frustum,
        })
    }
}

struct BuildArgs<'a> {
    entity_handle: EntityHandle,
    geometry_handle: Option<GeometryHandle>,
    source: ItemSource,
    world_position: DVec3,
    cam_rel: DVec3,
    /// `cam_rel` narrowed to `f32`, still in world orientation (i.e. not
    /// rotated into camera space — see [`VisibleItemCollector::push_item`]).
    cam_rel_single: Vec3,
    cam_rel_cam_space: Vec3,
    orientation: Quat,
    fov_adjustment: f32,
    config: &'a EngineConfig,
    frustum: &'a Frustum,
}

/// Result of [`VisibleItemCollector::collect`].
#[derive(Debug, Default)]
pub struct CollectedItems {
    /// Ascending by `far_distance`.
    pub normal: Vec<VisibleItem>,
    /// Ascending by `far_distance`; redrawn in every span it overlaps.
    pub splittable: Vec<VisibleItem>,
}

impl CollectedItems {
    /// The union bounding sphere, camera-relative (spec §4.5 step 1:
    /// `receiver_bounds = ⋃ BoundingSphere(item.cam_rel, item.radius)`), of
    /// a slice of items. Used by the shadow passes to compute receiver
    /// bounds — deliberately the unrotated camera-relative position, not
    /// [`VisibleItem::camera_space_position`], since the shadow passes
    /// build their own light-space view rather than reusing the main
    /// camera's orientation.
    #[must_use]
    pub fn union_bounds(items: &[VisibleItem]) -> Option<BoundingSphere> {
        items
            .iter()
            .map(|item| {
                BoundingSphere::new(item.camera_relative_position.as_vec3(), item.bounding_radius)
            })
            .reduce(|acc, sphere| acc.union(&sphere))
    }
}
