//! Reflection cube-map capture (spec §4.7).

use glam::Quat;

use crate::collab::{Chirality, CubeFace, CubeMapFramebuffer, PlanarProjection, RenderContext, Scene};
use crate::config::EngineConfig;
use crate::status::RenderStatus;

use super::depth_span::DepthSpanPartitioner;
use super::span_renderer::{ShadowResources, SpanRenderer};
use super::types::{RenderStats, VisibleLightSourceItem};
use super::util::FramebufferGuard;
use super::visible_items::VisibleItemCollector;

/// Drives the full span-renderer pipeline six times, once per cube face,
/// to fill a reflection cube map.
#[derive(Debug, Default)]
pub struct CubeMapViewDriver;

impl CubeMapViewDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Captures a reflection cube map centered at `camera_position`, with
    /// each face optionally pre-composed with `extra_rotation`.
    ///
    /// Any face-level failure aborts the whole call and returns that
    /// status; on exit the cube-map framebuffer is unbound regardless of
    /// outcome (spec §4.7). The returned [`RenderStats`] sums the counts
    /// from every face rendered before an abort, if any.
    #[allow(clippy::too_many_arguments)]
    pub fn capture(
        &self,
        ctx: &mut dyn RenderContext,
        scene: &dyn Scene,
        cube_map: &dyn CubeMapFramebuffer,
        cube_map_size: u32,
        camera_position: glam::DVec3,
        extra_rotation: Quat,
        current_time: f64,
        pixel_size: f32,
        visible_lights: &[VisibleLightSourceItem],
        shadows: Option<&mut ShadowResources>,
        config: &EngineConfig,
    ) -> (RenderStatus, RenderStats) {
        if !cube_map.is_valid() {
            return (RenderStatus::BadParameter, RenderStats::default());
        }

        let mut guard = FramebufferGuard::new(ctx);
        let mut shadows = shadows;
        let mut total_stats = RenderStats::default();

        for face in CubeFace::ALL {
            let framebuffer = cube_map.face_framebuffer(face);
            if !framebuffer.is_valid() {
                return (RenderStatus::BadParameter, total_stats);
            }

            guard.bind(framebuffer);
            let ctx = guard.ctx();
            ctx.set_viewport(0, 0, cube_map_size, cube_map_size);
            let orientation = face.look_rotation() * extra_rotation;
            ctx.set_camera_orientation(orientation);

            let projection = ctx.build_perspective_projection(
                Chirality::LeftHanded,
                std::f32::consts::FRAC_PI_2,
                1.0,
                1.0,
                config.maximum_far_plane_distance,
            );

            let fov_adjustment = super::visible_items::fov_adjustment_factor(
                std::f32::consts::FRAC_PI_2,
                1.0,
            );
            let frustum = projection.frustum();

            let collector = VisibleItemCollector::new();
            let collected = collector.collect(
                scene,
                current_time,
                camera_position,
                orientation,
                &frustum,
                pixel_size,
                fov_adjustment,
                config,
            );

            // The view-set's light visibility filtering already ran once
            // in `render_view`; a cube-map capture reuses that snapshot
            // verbatim across all six faces rather than re-deriving it.
            let lights = visible_lights;

            let light_slots: Vec<&VisibleLightSourceItem> =
                lights.iter().filter(|l| l.handle.is_some()).collect();
            ctx.set_active_light_count(light_slots.len() as u32);
            for (slot, light) in light_slots.iter().enumerate() {
                if let Some(handle) = light.handle {
                    ctx.set_light(slot as u32, handle, light.camera_relative_position);
                }
            }

            let partitioner = DepthSpanPartitioner::new();
            let spans = partitioner.partition(
                &collected.normal,
                &collected.splittable,
                projection.near(),
                projection.far(),
                config,
            );

            let span_renderer = SpanRenderer::new();
            let mut face_stats = span_renderer.render_spans(
                ctx,
                scene,
                &spans,
                &collected.normal,
                &collected.splittable,
                lights,
                projection.as_ref(),
                shadows.as_deref_mut(),
                current_time,
                config,
            );
            face_stats.visible_light_count = lights.len();
            face_stats.normal_item_count = collected.normal.len();
            face_stats.splittable_item_count = collected.splittable.len();
            total_stats.accumulate(&face_stats);
        }

        drop(guard);
        (RenderStatus::Ok, total_stats)
    }
}
