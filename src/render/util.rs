//! GPU state restoration (spec §5, §9 Design Note: "Global GPU state").
//!
//! The renderer mutates process-wide graphics state during a span or a
//! shadow pass. Rather than hand-unwinding that state at every exit point,
//! callers acquire a guard on entry; the guard snapshots the restorable
//! state and puts it back on drop, so early returns (including error
//! paths) can never leak state into the caller.

use crate::collab::{CullMode, Framebuffer, RenderContext, Winding};

/// Snapshot of the GPU state items spec §5 requires to be restored on
/// every exit path: color mask, cull face, front face, viewport, depth
/// range, and bound framebuffer.
struct Snapshot {
    color_write: bool,
    cull_mode: CullMode,
    front_face: Winding,
    viewport: (u32, u32, u32, u32),
    depth_range: (f32, f32),
}

/// Acquire-on-entry / release-on-all-exits guard over the GPU state a
/// shadow pass or span render mutates.
///
/// Because [`RenderContext`] only exposes setters (no getters for most of
/// this state — a real GPU context wouldn't cheaply support reading driver
/// state back either), the guard is constructed with the values the caller
/// is about to set *from*, which it then restores on drop. This mirrors
/// how a caller would naturally have those values in hand already (they
/// are whatever was active before the pass began).
pub struct GraphicsStateGuard<'a> {
    ctx: &'a mut dyn RenderContext,
    snapshot: Snapshot,
}

impl<'a> GraphicsStateGuard<'a> {
    /// Captures `ctx`'s current restorable state as described by the
    /// caller (the values active immediately before this guard is
    /// constructed).
    pub fn new(
        ctx: &'a mut dyn RenderContext,
        color_write: bool,
        cull_mode: CullMode,
        front_face: Winding,
        viewport: (u32, u32, u32, u32),
        depth_range: (f32, f32),
    ) -> Self {
        Self {
            ctx,
            snapshot: Snapshot {
                color_write,
                cull_mode,
                front_face,
                viewport,
                depth_range,
            },
        }
    }

    /// Mutable access to the wrapped context while the guard is held.
    pub fn ctx(&mut self) -> &mut dyn RenderContext {
        self.ctx
    }
}

impl Drop for GraphicsStateGuard<'_> {
    fn drop(&mut self) {
        self.ctx.set_color_write(self.snapshot.color_write);
        self.ctx.set_cull_mode(self.snapshot.cull_mode);
        self.ctx.set_front_face(self.snapshot.front_face);
        let (x, y, w, h) = self.snapshot.viewport;
        self.ctx.set_viewport(x, y, w, h);
        let (near, far) = self.snapshot.depth_range;
        self.ctx.set_depth_range(near, far);
        self.ctx.bind_framebuffer(None);
    }
}

/// Guard over a bound framebuffer alone, for passes (cube-map capture)
/// that only need to restore the binding on exit, not the full GPU state
/// set (spec §4.7: "On exit the cube-map framebuffer is unbound").
pub struct FramebufferGuard<'a> {
    ctx: &'a mut dyn RenderContext,
}

impl<'a> FramebufferGuard<'a> {
    pub fn new(ctx: &'a mut dyn RenderContext) -> Self {
        Self { ctx }
    }

    pub fn ctx(&mut self) -> &mut dyn RenderContext {
        self.ctx
    }

    pub fn bind(&mut self, framebuffer: &dyn Framebuffer) {
        self.ctx.bind_framebuffer(Some(framebuffer));
    }
}

impl Drop for FramebufferGuard<'_> {
    fn drop(&mut self) {
        self.ctx.bind_framebuffer(None);
    }
}

/// Builds a stable orthonormal basis around a unit `forward` vector,
/// choosing an `up` hint that avoids degeneracy when `forward` is nearly
/// vertical (spec §4.5 step 2: "stable unit-orthogonal basis").
#[must_use]
pub fn stable_orthonormal_basis(forward: glam::Vec3) -> (glam::Vec3, glam::Vec3, glam::Vec3) {
    let up_hint = if forward.y.abs() > 0.99 {
        glam::Vec3::X
    } else {
        glam::Vec3::Y
    };
    let right = forward.cross(up_hint).normalize();
    let up = right.cross(forward).normalize();
    (right, up, forward)
}
