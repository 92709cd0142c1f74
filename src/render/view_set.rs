//! View-set lifecycle: the public entry point tying every component
//! together (spec §4.8, §5, §7).

use glam::{DVec3, Quat};
use log::{error, info, warn};

use crate::collab::{
    Chirality, CubeMapFramebuffer, Observer, RenderContext, Scene,
};
use crate::config::EngineConfig;
use crate::status::RenderStatus;

use super::cubemap_view::CubeMapViewDriver;
use super::depth_span::DepthSpanPartitioner;
use super::light_visibility::LightVisibilityFilter;
use super::span_renderer::{ShadowResources, SpanRenderer};
use super::types::{LightSourceItem, RenderStats, VisibleLightSourceItem};
use super::visible_items::{fov_adjustment_factor, VisibleItemCollector};

/// The angular size of one pixel at the given vertical FOV and viewport
/// height, the `pixel_size` metric the culling thresholds in spec §4.1/§4.2
/// are expressed in.
#[must_use]
pub fn pixel_angular_size(fov: f32, viewport_height: u32) -> f32 {
    if viewport_height == 0 {
        return f32::INFINITY;
    }
    2.0 * (fov * 0.5).tan() / viewport_height as f32
}

/// Snapshot held for the duration of a view set (spec §4.8).
struct ViewSetState {
    lights: Vec<LightSourceItem>,
    time: f64,
}

/// Owns the shadow-map resources and view-set state for a sequence of
/// `render_view` / `render_cube_map` calls (spec §4.8).
///
/// This is the crate's top-level entry point: construct one per GPU
/// context, call [`ViewSetSession::initialize_graphics`] once, optionally
/// [`ViewSetSession::initialize_shadow_maps`] /
/// [`ViewSetSession::initialize_omni_shadow_maps`], then drive frames with
/// `begin_view_set` / `render_view` (or `render_cube_map`) / `end_view_set`.
pub struct ViewSetSession {
    config: EngineConfig,
    graphics_initialized: bool,
    shadows_enabled: bool,
    shadow_resources: Option<ShadowResources>,
    view_set: Option<ViewSetState>,
}

impl ViewSetSession {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            graphics_initialized: false,
            shadows_enabled: false,
            shadow_resources: None,
            view_set: None,
        }
    }

    /// Marks graphics resources ready. Must precede any render call (spec
    /// §5 "Lifecycle").
    pub fn initialize_graphics(&mut self) -> RenderStatus {
        self.graphics_initialized = true;
        RenderStatus::Ok
    }

    /// Allocates the directional shadow framebuffer. On allocation failure
    /// the feature is silently disabled and a warning is logged (spec
    /// §7.2); this is never an error from the caller's point of view.
    pub fn initialize_shadow_maps(&mut self, ctx: &mut dyn RenderContext) -> RenderStatus {
        if !self.graphics_initialized {
            return RenderStatus::Uninitialized;
        }

        match ctx.create_shadow_framebuffer(self.config.shadow_map_size) {
            Some(framebuffer) if framebuffer.is_valid() => {
                let resources = self
                    .shadow_resources
                    .get_or_insert_with(|| ShadowResources {
                        directional: None,
                        omni: Vec::new(),
                        shadow_map_size: self.config.shadow_map_size,
                        omni_shadow_map_size: self.config.omni_shadow_map_size,
                    });
                resources.directional = Some(framebuffer);
                self.shadows_enabled = true;
                info!("directional shadow map initialized");
            }
            _ => {
                let err = crate::errors::EngineError::ShadowMapAllocationFailed {
                    size: self.config.shadow_map_size,
                    reason: "collaborator returned no framebuffer or an invalid one".to_string(),
                };
                warn!("{err}; shadows disabled");
                if let Some(resources) = self.shadow_resources.as_mut() {
                    resources.directional = None;
                }
                self.shadows_enabled = false;
            }
        }

        RenderStatus::Ok
    }

    /// Allocates up to `max_omni_shadow_maps` cube-map framebuffers for
    /// point-light shadows. Partial allocation failure truncates the list
    /// to however many succeeded rather than disabling directional shadows
    /// (spec §7.2: each resource category fails independently).
    pub fn initialize_omni_shadow_maps(&mut self, ctx: &mut dyn RenderContext) -> RenderStatus {
        if !self.graphics_initialized {
            return RenderStatus::Uninitialized;
        }

        let mut cube_maps: Vec<Box<dyn CubeMapFramebuffer>> = Vec::new();
        for _ in 0..self.config.max_omni_shadow_maps {
            match ctx.create_omni_shadow_framebuffer(self.config.omni_shadow_map_size) {
                Some(cube_map) if cube_map.is_valid() => cube_maps.push(cube_map),
                _ => {
                    let err = crate::errors::EngineError::CubeMapAllocationFailed {
                        size: self.config.omni_shadow_map_size,
                        reason: "collaborator returned no cube map or an invalid one".to_string(),
                    };
                    warn!("{err}; stopping after {} maps", cube_maps.len());
                    break;
                }
            }
        }

        let resources = self
            .shadow_resources
            .get_or_insert_with(|| ShadowResources {
                directional: None,
                omni: Vec::new(),
                shadow_map_size: self.config.shadow_map_size,
                omni_shadow_map_size: self.config.omni_shadow_map_size,
            });
        resources.omni = cube_maps;

        RenderStatus::Ok
    }

    /// Snapshots the scene's light list (spec §4.8). Reentrant calls
    /// return `ViewSetAlreadyStarted`.
    pub fn begin_view_set(&mut self, scene: &dyn Scene, time: f64) -> RenderStatus {
        if self.view_set.is_some() {
            return RenderStatus::ViewSetAlreadyStarted;
        }

        let mut lights = vec![LightSourceItem {
            handle: None,
            world_position: DVec3::ZERO,
            range: 0.0,
            is_shadow_caster: true,
        }];

        for index in 0..scene.entity_count() {
            let (_handle, entity) = scene.entity(index);
            let Some(descriptor) = entity.light_source() else {
                continue;
            };
            if let crate::collab::LightSourceKind::External(handle) = descriptor.kind {
                lights.push(LightSourceItem {
                    handle: Some(handle),
                    world_position: entity.position(time),
                    range: descriptor.range,
                    is_shadow_caster: descriptor.is_shadow_caster,
                });
            }
        }

        self.view_set = Some(ViewSetState { lights, time });
        RenderStatus::Ok
    }

    /// Clears the light-list snapshot, ending the view set.
    pub fn end_view_set(&mut self) -> RenderStatus {
        self.view_set = None;
        RenderStatus::Ok
    }

    /// Renders one view: a camera with the given projection parameters,
    /// through the full light-filter → collect → partition → span-render
    /// pipeline (spec §4.1-§4.4). The [`RenderStats`] is always returned
    /// (zeroed on a non-`Ok` status); see spec.md §8.
    #[allow(clippy::too_many_arguments)]
    pub fn render_view(
        &mut self,
        ctx: &mut dyn RenderContext,
        scene: &dyn Scene,
        camera: &dyn Observer,
        viewport_width: u32,
        viewport_height: u32,
        fov: f32,
        projection_near: f64,
        projection_far: f64,
    ) -> (RenderStatus, RenderStats) {
        if !self.graphics_initialized {
            return (RenderStatus::Uninitialized, RenderStats::default());
        }
        let Some(view_set) = self.view_set.as_ref() else {
            return (RenderStatus::NoViewSet, RenderStats::default());
        };
        if viewport_width == 0 || viewport_height == 0 || fov <= 0.0 || projection_far <= projection_near
        {
            return (RenderStatus::BadParameter, RenderStats::default());
        }

        let time = view_set.time;
        let camera_position = camera.position(time);
        let camera_orientation = camera.orientation(time);
        let aspect = viewport_width as f32 / viewport_height as f32;
        let pixel_size = pixel_angular_size(fov, viewport_height);
        let fov_adjustment = fov_adjustment_factor(fov, aspect);

        let far = projection_far.min(self.config.maximum_far_plane_distance);
        let projection =
            ctx.build_perspective_projection(Chirality::RightHanded, fov, aspect, projection_near, far);
        let frustum = projection.frustum();

        ctx.set_viewport_size(viewport_width, viewport_height);
        ctx.set_pixel_size(pixel_size);
        ctx.set_camera_orientation(camera_orientation);
        ctx.push_projection();
        ctx.set_projection(projection.as_ref());

        let light_filter = LightVisibilityFilter::new();
        let visible_lights: Vec<VisibleLightSourceItem> = light_filter.filter(
            &view_set.lights,
            camera_position,
            camera_orientation,
            &frustum,
            pixel_size,
        );

        let light_slots: Vec<&VisibleLightSourceItem> =
            visible_lights.iter().filter(|l| l.handle.is_some()).collect();
        ctx.set_active_light_count(light_slots.len() as u32);
        for (slot, light) in light_slots.iter().enumerate() {
            if let Some(handle) = light.handle {
                ctx.set_light(slot as u32, handle, light.camera_relative_position);
            }
        }

        let collector = VisibleItemCollector::new();
        let collected = collector.collect(
            scene,
            time,
            camera_position,
            camera_orientation,
            &frustum,
            pixel_size,
            fov_adjustment,
            &self.config,
        );

        let partitioner = DepthSpanPartitioner::new();
        let spans = partitioner.partition(
            &collected.normal,
            &collected.splittable,
            projection.near(),
            projection.far(),
            &self.config,
        );

        // Snapshot the depth range / viewport active before span rendering
        // starts; the span loop mutates both per span (spec §4.4 step 1)
        // and must leave them as found on return (spec §8).
        let pre_depth_range = ctx.current_depth_range();
        let pre_viewport = ctx.current_viewport();

        let span_renderer = SpanRenderer::new();
        let mut stats = span_renderer.render_spans(
            ctx,
            scene,
            &spans,
            &collected.normal,
            &collected.splittable,
            &visible_lights,
            projection.as_ref(),
            if self.shadows_enabled {
                self.shadow_resources.as_mut()
            } else {
                None
            },
            time,
            &self.config,
        );
        stats.visible_light_count = visible_lights.len();
        stats.normal_item_count = collected.normal.len();
        stats.splittable_item_count = collected.splittable.len();

        ctx.set_depth_range(pre_depth_range.0, pre_depth_range.1);
        let (x, y, w, h) = pre_viewport;
        ctx.set_viewport(x, y, w, h);

        ctx.pop_projection();

        (RenderStatus::Ok, stats)
    }

    /// Renders a reflection cube map (spec §4.7). The returned
    /// [`RenderStats`] is summed across all six faces.
    #[allow(clippy::too_many_arguments)]
    pub fn render_cube_map(
        &mut self,
        ctx: &mut dyn RenderContext,
        scene: &dyn Scene,
        cube_map: &dyn CubeMapFramebuffer,
        cube_map_size: u32,
        camera_position: DVec3,
        extra_rotation: Quat,
    ) -> (RenderStatus, RenderStats) {
        if !self.graphics_initialized {
            return (RenderStatus::Uninitialized, RenderStats::default());
        }
        let Some(view_set) = self.view_set.as_ref() else {
            return (RenderStatus::NoViewSet, RenderStats::default());
        };

        let time = view_set.time;
        let pixel_size = pixel_angular_size(std::f32::consts::FRAC_PI_2, cube_map_size);

        let light_filter = LightVisibilityFilter::new();
        let frustum_for_filter = crate::collab::Frustum::unbounded();
        let visible_lights = light_filter.filter(
            &view_set.lights,
            camera_position,
            Quat::IDENTITY,
            &frustum_for_filter,
            pixel_size,
        );

        let driver = CubeMapViewDriver::new();
        let (status, stats) = driver.capture(
            ctx,
            scene,
            cube_map,
            cube_map_size,
            camera_position,
            extra_rotation,
            time,
            pixel_size,
            &visible_lights,
            if self.shadows_enabled {
                self.shadow_resources.as_mut()
            } else {
                None
            },
            &self.config,
        );

        if status != RenderStatus::Ok {
            error!("cube-map capture failed: {status:?}");
        }

        (status, stats)
    }
}
