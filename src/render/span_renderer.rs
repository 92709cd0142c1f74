//! Per-span multi-pass rendering (spec §4.4).

use glam::Vec3;
use log::debug;

use crate::collab::{
    CubeMapFramebuffer, Framebuffer, Geometry, PlanarProjection, RenderContext, RenderPassKind,
    Scene,
};
use crate::config::EngineConfig;

use super::shadow_directional::{self, DirectionalShadowPass};
use super::shadow_omni::{self, OmniShadowPass};
use super::types::{DepthBufferSpan, RenderStats, VisibleItem, VisibleLightSourceItem};
use super::visible_items::resolve_geometry;

/// Shadow-map resources the orchestrator owns across a view set, indexed
/// by slot (spec §4.4 step 4, §5 "Lifecycle").
pub struct ShadowResources {
    pub directional: Option<Box<dyn Framebuffer>>,
    pub omni: Vec<Box<dyn CubeMapFramebuffer>>,
    pub shadow_map_size: u32,
    pub omni_shadow_map_size: u32,
}

impl ShadowResources {
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.directional.is_some()
    }
}

/// Drives the two-subpass (opaque/translucent) render of every span, plus
/// the shadow passes that precede each span when shadows are enabled.
#[derive(Debug, Default)]
pub struct SpanRenderer;

impl SpanRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders every span, far to near, into `ctx`. Returns the shadow-pass
    /// counts that actually ran, for the caller to fold into a
    /// [`RenderStats`].
    #[allow(clippy::too_many_arguments)]
    pub fn render_spans(
        &self,
        ctx: &mut dyn RenderContext,
        scene: &dyn Scene,
        spans: &[DepthBufferSpan],
        normal_items: &[VisibleItem],
        splittable_items: &[VisibleItem],
        visible_lights: &[VisibleLightSourceItem],
        projection: &dyn PlanarProjection,
        shadows: Option<&mut ShadowResources>,
        current_time: f64,
        config: &EngineConfig,
    ) -> RenderStats {
        let span_count = spans.len();
        let mut stats = RenderStats {
            span_count,
            ..RenderStats::default()
        };
        if span_count == 0 {
            return stats;
        }

        let mut shadows = shadows;

        for (span_index, span) in spans.iter().enumerate() {
            self.render_one_span(
                ctx,
                scene,
                span,
                span_index,
                span_count,
                normal_items,
                splittable_items,
                visible_lights,
                projection,
                shadows.as_deref_mut(),
                current_time,
                config,
                &mut stats,
            );
        }

        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn render_one_span(
        &self,
        ctx: &mut dyn RenderContext,
        scene: &dyn Scene,
        span: &DepthBufferSpan,
        span_index: usize,
        span_count: usize,
        normal_items: &[VisibleItem],
        splittable_items: &[VisibleItem],
        visible_lights: &[VisibleLightSourceItem],
        projection: &dyn PlanarProjection,
        mut shadows: Option<&mut ShadowResources>,
        current_time: f64,
        config: &EngineConfig,
        stats: &mut RenderStats,
    ) {
        // Step 1: this span's fractional slice of the hardware depth range.
        let slice_lo = span_index as f32 / span_count as f32;
        let slice_hi = (span_index + 1) as f32 / span_count as f32;
        ctx.set_depth_range(slice_lo, slice_hi);

        // Step 2/3.
        let near = projection.near().max(span.near_distance);
        let far = projection.far().min(span.far_distance) * (1.0 + config.far_plane_safety_epsilon);
        if far <= near {
            debug!("span {span_index}: collapsed ({near} >= {far}), skipping");
            return;
        }

        let span_items: Vec<&VisibleItem> = normal_items
            [..=span.back_item_index.min(normal_items.len().saturating_sub(1))]
            .iter()
            .filter(|item| {
                f64::from(item.far_distance) > span.near_distance
                    && f64::from(item.near_distance) < span.far_distance
            })
            .collect();

        // Step 4: shadow passes.
        let (mut active_shadow_count, mut active_omni_count) = (0u32, 0u32);
        if let Some(shadows) = shadows.as_deref_mut() {
            if shadows.enabled() && !visible_lights.is_empty() {
                let (dir_ran, omni_ran) = self.run_shadow_passes(
                    ctx,
                    scene,
                    &span_items,
                    visible_lights,
                    shadows,
                    config,
                    stats,
                );
                active_shadow_count = u32::from(dir_ran);
                active_omni_count = u32::try_from(omni_ran).unwrap_or(0);
            }
        }

        // Step 5: sliced projection for the main pass.
        let sliced = projection.slice(near, far);
        ctx.push_projection();
        ctx.set_projection(sliced.as_ref());

        ctx.set_environment_map(scene.environment_map());

        // Step 6: opaque then translucent sub-passes.
        ctx.set_pass(RenderPassKind::Opaque);
        self.render_sub_pass(
            ctx,
            scene,
            &span_items,
            splittable_items,
            span,
            current_time,
            true,
            active_shadow_count,
            active_omni_count,
        );
        ctx.set_pass(RenderPassKind::Translucent);
        self.render_sub_pass(
            ctx,
            scene,
            &span_items,
            splittable_items,
            span,
            current_time,
            false,
            active_shadow_count,
            active_omni_count,
        );

        ctx.pop_projection();

        // Step 7.
        ctx.set_shadow_map_count(0);
        ctx.set_omni_shadow_map_count(0);
    }

    #[allow(clippy::too_many_arguments)]
    fn run_shadow_passes(
        &self,
        ctx: &mut dyn RenderContext,
        scene: &dyn Scene,
        span_items: &[&VisibleItem],
        visible_lights: &[VisibleLightSourceItem],
        shadows: &mut ShadowResources,
        config: &EngineConfig,
        stats: &mut RenderStats,
    ) -> (bool, usize) {
        let items: Vec<VisibleItem> = span_items.iter().map(|i| **i).collect();
        let mut directional_ran = false;
        let mut omni_ran_count = 0usize;

        let is_receiver = |item: &VisibleItem| {
            resolve_geometry(scene, item).is_some_and(Geometry::is_shadow_receiver)
        };
        let is_caster = |item: &VisibleItem| {
            resolve_geometry(scene, item).is_some_and(Geometry::is_shadow_caster)
        };
        let render_caster = |ctx: &mut dyn RenderContext, item: &VisibleItem| {
            if let Some(geometry) = resolve_geometry(scene, item) {
                geometry.render_shadow(ctx, 0.0);
            }
        };

        let pre_pass = DirectionalShadowPass::new();
        if let Some(sun) = visible_lights.iter().find(|l| l.handle.is_none()) {
            if let Some(framebuffer) = shadows.directional.as_deref() {
                let pre_state = shadow_directional::PrePassState {
                    color_write: true,
                    cull_mode: crate::collab::CullMode::Back,
                    front_face: crate::collab::Winding::CounterClockwise,
                    viewport: ctx.current_viewport(),
                    depth_range: ctx.current_depth_range(),
                };
                let ran = pre_pass.run(
                    ctx,
                    &items,
                    sun.camera_relative_position,
                    0,
                    framebuffer,
                    shadows.shadow_map_size,
                    is_receiver,
                    is_caster,
                    render_caster,
                    pre_state,
                );
                if ran {
                    stats.directional_shadow_passes += 1;
                    directional_ran = true;
                }
            }
        }

        let omni_pass = OmniShadowPass::new();
        let mut omni_slot = 0usize;
        for light in visible_lights
            .iter()
            .filter(|l| l.handle.is_some() && l.is_shadow_caster)
        {
            if omni_slot >= shadows.omni.len() || omni_slot as u32 >= config.max_omni_shadow_maps {
                break;
            }
            let cube_map = shadows.omni[omni_slot].as_ref();
            let pre_state = shadow_omni::PrePassState {
                color_write: true,
                cull_mode: crate::collab::CullMode::Back,
                front_face: crate::collab::Winding::CounterClockwise,
                viewport: ctx.current_viewport(),
                depth_range: ctx.current_depth_range(),
                clear_color: Vec3::ZERO.extend(1.0),
            };
            let ran = omni_pass.run(
                ctx,
                &items,
                light.camera_relative_position,
                light.range,
                omni_slot as u32,
                cube_map,
                shadows.omni_shadow_map_size,
                is_receiver,
                is_caster,
                render_caster,
                pre_state,
            );
            if ran {
                stats.omni_shadow_passes += 1;
                omni_ran_count += 1;
            }
            omni_slot += 1;
        }

        (directional_ran, omni_ran_count)
    }

    #[allow(clippy::too_many_arguments)]
    fn render_sub_pass(
        &self,
        ctx: &mut dyn RenderContext,
        scene: &dyn Scene,
        span_items: &[&VisibleItem],
        splittable_items: &[VisibleItem],
        span: &DepthBufferSpan,
        current_time: f64,
        opaque: bool,
        active_shadow_count: u32,
        active_omni_count: u32,
    ) {
        for item in span_items.iter().rev() {
            if item.outside_frustum {
                continue;
            }
            let Some(geometry) = resolve_geometry(scene, item) else {
                continue;
            };
            if geometry.is_opaque() != opaque {
                continue;
            }
            Self::draw_item(
                ctx,
                item,
                geometry,
                current_time,
                active_shadow_count,
                active_omni_count,
            );
        }

        for item in splittable_items {
            let overlaps = f64::from(item.far_distance) > span.near_distance
                && f64::from(item.near_distance) < span.far_distance;
            if !overlaps || item.outside_frustum {
                continue;
            }
            let Some(geometry) = resolve_geometry(scene, item) else {
                continue;
            };
            if geometry.is_opaque() != opaque {
                continue;
            }
            Self::draw_item(
                ctx,
                item,
                geometry,
                current_time,
                active_shadow_count,
                active_omni_count,
            );
        }
    }

    /// Per item, sets the shadow-map counts the shader should sample from —
    /// zero for an item whose geometry does not receive shadows, even when
    /// the span itself ran shadow passes (spec §4.4 step 6).
    fn draw_item(
        ctx: &mut dyn RenderContext,
        item: &VisibleItem,
        geometry: &dyn Geometry,
        t: f64,
        active_shadow_count: u32,
        active_omni_count: u32,
    ) {
        let is_receiver = geometry.is_shadow_receiver();
        ctx.set_shadow_map_count(if is_receiver { active_shadow_count } else { 0 });
        ctx.set_omni_shadow_map_count(if is_receiver { active_omni_count } else { 0 });

        let modelview = glam::DAffine3::from_rotation_translation(
            item.orientation.as_dquat(),
            item.camera_relative_position,
        );
        ctx.push_modelview();
        ctx.set_modelview(modelview);
        geometry.render(ctx, t);
        ctx.pop_modelview();
    }
}
