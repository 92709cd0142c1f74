//! Fake implementations of the `collab` traits, used only by integration
//! tests under `tests/*.rs`. Exercises the orchestrator end to end without
//! a GPU, the natural consequence of treating geometry/context/scene as
//! external collaborators (spec.md §6).

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use farview::collab::{
    Chirality, ClippingPolicy, CubeFace, CubeMapFramebuffer, CullMode, EntityHandle, Framebuffer,
    Frustum, Geometry, GeometryHandle, LightHandle, LightSourceDescriptor, Observer,
    PlanarProjection, RenderContext, RenderPassKind, RendererOutput, Scene, SceneEntity, SkyLayer,
    TextureHandle, Winding,
};
use glam::{DAffine3, DMat4, DVec3, Mat4, Quat, Vec3, Vec4};

/// A sphere of fixed radius, with configurable policy/flags, that records
/// how many times it was drawn (shaded or shadow) for test assertions.
pub struct FakeGeometry {
    pub bounding_radius: f32,
    pub near_plane: f32,
    pub clipping_policy: ClippingPolicy,
    pub opaque: bool,
    pub shadow_caster: bool,
    pub shadow_receiver: bool,
    pub render_calls: Rc<Cell<u32>>,
    pub shadow_calls: Rc<Cell<u32>>,
}

impl FakeGeometry {
    pub fn new(bounding_radius: f32, near_plane: f32, policy: ClippingPolicy) -> Self {
        Self {
            bounding_radius,
            near_plane,
            clipping_policy: policy,
            opaque: true,
            shadow_caster: true,
            shadow_receiver: true,
            render_calls: Rc::new(Cell::new(0)),
            shadow_calls: Rc::new(Cell::new(0)),
        }
    }
}

impl Geometry for FakeGeometry {
    fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    fn near_plane_distance(&self, _view_vector: Vec3) -> f32 {
        self.near_plane
    }

    fn clipping_policy(&self) -> ClippingPolicy {
        self.clipping_policy
    }

    fn is_opaque(&self) -> bool {
        self.opaque
    }

    fn is_shadow_caster(&self) -> bool {
        self.shadow_caster
    }

    fn is_shadow_receiver(&self) -> bool {
        self.shadow_receiver
    }

    fn render(&self, _ctx: &mut dyn RenderContext, _t: f64) {
        self.render_calls.set(self.render_calls.get() + 1);
    }

    fn render_shadow(&self, _ctx: &mut dyn RenderContext, _t: f64) {
        self.shadow_calls.set(self.shadow_calls.get() + 1);
    }
}

/// A scene entity at a fixed world position and orientation, carrying at
/// most one geometry and one light.
pub struct FakeEntity {
    pub visible: bool,
    pub position: DVec3,
    pub orientation: Quat,
    pub geometry: Option<FakeGeometry>,
    pub light: Option<LightSourceDescriptor>,
    pub geometry_handle: Option<GeometryHandle>,
}

impl FakeEntity {
    pub fn new(position: DVec3) -> Self {
        Self {
            visible: true,
            position,
            orientation: Quat::IDENTITY,
            geometry: None,
            light: None,
            geometry_handle: None,
        }
    }

    pub fn with_geometry(mut self, geometry: FakeGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_light(mut self, light: LightSourceDescriptor) -> Self {
        self.light = Some(light);
        self
    }
}

impl SceneEntity for FakeEntity {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn position(&self, _t: f64) -> DVec3 {
        self.position
    }

    fn orientation(&self, _t: f64) -> Quat {
        self.orientation
    }

    fn geometry(&self) -> Option<&dyn Geometry> {
        self.geometry.as_ref().map(|g| g as &dyn Geometry)
    }

    fn geometry_handle(&self) -> Option<GeometryHandle> {
        self.geometry_handle
    }

    fn light_source(&self) -> Option<LightSourceDescriptor> {
        self.light
    }
}

/// A fixed list of [`FakeEntity`] values, indexable the way
/// [`farview::collab::Scene`] requires.
#[derive(Default)]
pub struct FakeScene {
    pub entities: Vec<FakeEntity>,
    pub sky_layers: Vec<SkyLayer>,
}

impl Scene for FakeScene {
    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn entity(&self, index: usize) -> (EntityHandle, &dyn SceneEntity) {
        (EntityHandle(index as u64), &self.entities[index] as &dyn SceneEntity)
    }

    fn sky_layers(&self) -> &[SkyLayer] {
        &self.sky_layers
    }
}

/// A stationary, axis-aligned camera.
pub struct FakeObserver {
    pub position: DVec3,
    pub orientation: Quat,
}

impl Observer for FakeObserver {
    fn position(&self, _t: f64) -> DVec3 {
        self.position
    }

    fn orientation(&self, _t: f64) -> Quat {
        self.orientation
    }
}

/// A square depth-only framebuffer that can be made to fail allocation.
pub struct FakeFramebuffer {
    pub valid: bool,
}

impl Framebuffer for FakeFramebuffer {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn depth_texture_handle(&self) -> TextureHandle {
        TextureHandle(1)
    }
}

/// Six [`FakeFramebuffer`] faces bundled as a cube map.
pub struct FakeCubeMapFramebuffer {
    pub faces: [FakeFramebuffer; 6],
}

impl FakeCubeMapFramebuffer {
    pub fn new(valid: bool) -> Self {
        Self {
            faces: std::array::from_fn(|_| FakeFramebuffer { valid }),
        }
    }
}

impl CubeMapFramebuffer for FakeCubeMapFramebuffer {
    fn is_valid(&self) -> bool {
        self.faces.iter().all(Framebuffer::is_valid)
    }

    fn face_framebuffer(&self, face: CubeFace) -> &dyn Framebuffer {
        let index = match face {
            CubeFace::PosX => 0,
            CubeFace::NegX => 1,
            CubeFace::PosY => 2,
            CubeFace::NegY => 3,
            CubeFace::PosZ => 4,
            CubeFace::NegZ => 5,
        };
        &self.faces[index]
    }

    fn cube_texture_handle(&self) -> TextureHandle {
        TextureHandle(2)
    }
}

/// A perspective or orthographic projection built from plain `glam`
/// matrices, slice-able per spec.md §4.3/§4.4.
#[derive(Clone)]
pub struct FakeProjection {
    pub chirality: Chirality,
    pub fov: f32,
    pub aspect: f32,
    pub near: f64,
    pub far: f64,
    pub orthographic: Option<(f64, f64, f64)>,
}

impl FakeProjection {
    fn compute_matrix(&self) -> Mat4 {
        let near = self.near.max(1e-6) as f32;
        let far = self.far.max(near as f64 + 1e-6) as f32;
        if let Some((half_width, half_height, _half_depth)) = self.orthographic {
            Mat4::orthographic_rh(
                -half_width as f32,
                half_width as f32,
                -half_height as f32,
                half_height as f32,
                near,
                far,
            )
        } else {
            match self.chirality {
                Chirality::RightHanded => Mat4::perspective_rh(self.fov, self.aspect, near, far),
                Chirality::LeftHanded => Mat4::perspective_lh(self.fov, self.aspect, near, far),
            }
        }
    }
}

impl PlanarProjection for FakeProjection {
    fn chirality(&self) -> Chirality {
        self.chirality
    }

    fn near(&self) -> f64 {
        self.near
    }

    fn far(&self) -> f64 {
        self.far
    }

    fn fov(&self) -> f32 {
        self.fov
    }

    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn frustum(&self) -> Frustum {
        Frustum::from_matrix(self.compute_matrix())
    }

    fn matrix(&self) -> Mat4 {
        self.compute_matrix()
    }

    fn slice(&self, near: f64, far: f64) -> Box<dyn PlanarProjection> {
        Box::new(FakeProjection {
            near,
            far,
            ..self.clone()
        })
    }
}

/// One draw-call observation recorded by [`FakeRenderContext`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    pub pass: RenderPassKind,
}

/// In-memory stand-in for a GPU render context: tracks stack depth, the
/// restorable state spec.md §5 requires, and every projection push so
/// tests can assert balance and restoration.
pub struct FakeRenderContext {
    pub projection_stack_depth: i32,
    pub modelview_stack_depth: i32,
    pub max_projection_stack_depth: i32,
    pub color_write: bool,
    pub cull_mode: CullMode,
    pub front_face: Winding,
    pub viewport: (u32, u32, u32, u32),
    pub depth_range: (f32, f32),
    pub bound_framebuffer: Option<TextureHandle>,
    pub current_pass: Option<RenderPassKind>,
    pub draw_log: Rc<RefCell<Vec<DrawRecord>>>,
    pub shadow_map_matrices: RefCell<Vec<(u32, DMat4)>>,
    pub shadow_fail: bool,
    pub omni_fail_after: Option<usize>,
    omni_created: Cell<usize>,
    pub renderer_output: RendererOutput,
}

impl Default for FakeRenderContext {
    fn default() -> Self {
        Self {
            projection_stack_depth: 0,
            modelview_stack_depth: 0,
            max_projection_stack_depth: 0,
            color_write: true,
            cull_mode: CullMode::Back,
            front_face: Winding::CounterClockwise,
            viewport: (0, 0, 1, 1),
            depth_range: (0.0, 1.0),
            bound_framebuffer: None,
            current_pass: None,
            draw_log: Rc::new(RefCell::new(Vec::new())),
            shadow_map_matrices: RefCell::new(Vec::new()),
            shadow_fail: false,
            omni_fail_after: None,
            omni_created: Cell::new(0),
            renderer_output: RendererOutput::FragmentColor,
        }
    }
}

impl RenderContext for FakeRenderContext {
    fn push_projection(&mut self) {
        self.projection_stack_depth += 1;
        self.max_projection_stack_depth = self.max_projection_stack_depth.max(self.projection_stack_depth);
    }

    fn pop_projection(&mut self) {
        self.projection_stack_depth -= 1;
    }

    fn push_modelview(&mut self) {
        self.modelview_stack_depth += 1;
    }

    fn pop_modelview(&mut self) {
        self.modelview_stack_depth -= 1;
    }

    fn set_projection(&mut self, _projection: &dyn PlanarProjection) {}

    fn set_modelview(&mut self, _modelview: DAffine3) {
        if let Some(pass) = self.current_pass {
            self.draw_log.borrow_mut().push(DrawRecord { pass });
        }
    }

    fn set_camera_orientation(&mut self, _orientation: Quat) {}

    fn set_model_translation(&mut self, _translation: Vec3) {}

    fn set_pixel_size(&mut self, _pixel_size: f32) {}

    fn set_viewport_size(&mut self, _width: u32, _height: u32) {}

    fn set_active_light_count(&mut self, _count: u32) {}

    fn set_light(&mut self, _slot: u32, _light: LightHandle, _camera_relative_position: Vec3) {}

    fn set_ambient_light(&mut self, _color: Vec3) {}

    fn set_shadow_map_count(&mut self, _count: u32) {}

    fn set_omni_shadow_map_count(&mut self, _count: u32) {}

    fn set_shadow_map_matrix(&mut self, slot: u32, shadow_transform: DMat4) {
        self.shadow_map_matrices.borrow_mut().push((slot, shadow_transform));
    }

    fn set_shadow_map_texture(&mut self, _slot: u32, _framebuffer: &dyn Framebuffer) {}

    fn set_omni_shadow_map_texture(&mut self, _slot: u32, _cube_map: &dyn CubeMapFramebuffer) {}

    fn set_environment_map(&mut self, _cube_map: Option<&dyn CubeMapFramebuffer>) {}

    fn set_renderer_output(&mut self, output: RendererOutput) {
        self.renderer_output = output;
    }

    fn set_pass(&mut self, pass: RenderPassKind) {
        self.current_pass = Some(pass);
    }

    fn unbind_shader(&mut self) {}

    fn current_frustum(&self) -> Frustum {
        Frustum::unbounded()
    }

    fn current_modelview(&self) -> DAffine3 {
        DAffine3::IDENTITY
    }

    fn current_camera_orientation(&self) -> Quat {
        Quat::IDENTITY
    }

    fn shader_capability(&self, _name: &str) -> bool {
        true
    }

    fn current_viewport(&self) -> (u32, u32, u32, u32) {
        self.viewport
    }

    fn current_depth_range(&self) -> (f32, f32) {
        self.depth_range
    }

    fn set_color_write(&mut self, enabled: bool) {
        self.color_write = enabled;
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    fn set_front_face(&mut self, winding: Winding) {
        self.front_face = winding;
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = (x, y, width, height);
    }

    fn set_depth_range(&mut self, near: f32, far: f32) {
        self.depth_range = (near, far);
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<&dyn Framebuffer>) {
        self.bound_framebuffer = framebuffer.map(Framebuffer::depth_texture_handle);
    }

    fn clear_depth(&mut self, _depth: f32) {}

    fn clear_color(&mut self, _color: Vec4) {}

    fn create_shadow_framebuffer(&mut self, _size: u32) -> Option<Box<dyn Framebuffer>> {
        if self.shadow_fail {
            None
        } else {
            Some(Box::new(FakeFramebuffer { valid: true }))
        }
    }

    fn create_omni_shadow_framebuffer(&mut self, _size: u32) -> Option<Box<dyn CubeMapFramebuffer>> {
        let count = self.omni_created.get();
        self.omni_created.set(count + 1);
        if let Some(limit) = self.omni_fail_after {
            if count >= limit {
                return None;
            }
        }
        Some(Box::new(FakeCubeMapFramebuffer::new(true)))
    }

    fn build_perspective_projection(
        &self,
        chirality: Chirality,
        fov: f32,
        aspect: f32,
        near: f64,
        far: f64,
    ) -> Box<dyn PlanarProjection> {
        Box::new(FakeProjection {
            chirality,
            fov,
            aspect,
            near,
            far,
            orthographic: None,
        })
    }

    fn build_orthographic_projection(
        &self,
        half_width: f64,
        half_height: f64,
        half_depth: f64,
        near: f64,
        far: f64,
    ) -> Box<dyn PlanarProjection> {
        Box::new(FakeProjection {
            chirality: Chirality::RightHanded,
            fov: 0.0,
            aspect: 1.0,
            near,
            far,
            orthographic: Some((half_width, half_height, half_depth)),
        })
    }
}
