//! External collaborators.
//!
//! Spec §1/§6 treat geometry, scene storage, math primitives, and the GPU
//! context as pre-existing types the orchestrator consumes rather than
//! owns. Each submodule here defines the trait (or small value type) this
//! crate needs from that collaborator, without implementing it — a real
//! integration supplies concrete types; `tests/support` supplies fakes.

pub mod context;
pub mod geometry;
pub mod geometry_math;
pub mod light;
pub mod observer;
pub mod scene;
pub mod visualizer;

pub use context::{
    Chirality, CubeFace, CubeMapFramebuffer, CullMode, Framebuffer, PlanarProjection,
    RenderContext, RenderPassKind, RendererOutput, TextureHandle, Winding,
};
pub use geometry::{ClippingPolicy, Geometry, GeometryHandle};
pub use geometry_math::{BoundingSphere, Frustum};
pub use light::{LightHandle, LightSourceDescriptor, LightSourceKind};
pub use observer::Observer;
pub use scene::{EntityHandle, Scene, SceneEntity, SkyLayer};
pub use visualizer::{Visualizer, VisualizerPlacement};
