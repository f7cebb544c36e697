// GPU-side primitives the engine needs from a host: one shader program, one full-screen
// quad and one texture that receives each frame. The host hands the context to
// `create_app`, which keeps it for the life of the app.

use crate::error::SurfaceResult;

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod webgl;

pub use headless::HeadlessSurface;
#[cfg(target_arch = "wasm32")]
pub use webgl::WebGlSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Program(ProgramHandle),
    Buffer(BufferHandle),
    Texture(TextureHandle),
}

// GLSL ES 3.00 vertex stage: a clip-space quad with the attribute at location 0.
// Texture rows are stored top row first, so v is flipped.
pub const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec2 position;
out vec2 v_uv;
void main() {
    v_uv = vec2(position.x * 0.5 + 0.5, 0.5 - position.y * 0.5);
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;
uniform sampler2D u_field;
in vec2 v_uv;
out vec4 o_color;
void main() {
    o_color = texture(u_field, v_uv);
}
"#;

// Full-screen quad as a triangle strip.
pub const QUAD_VERTICES: [f32; 8] = [-1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0];

// Minimal GPU-backed drawing target.
// All calls are synchronous from the caller's point of view. A surface is owned by
// exactly one app and never driven from two threads at once.
pub trait RenderSurface {
    // Attach to the drawable and set the viewport. Called again on resize.
    fn bind(&mut self, width: u32, height: u32) -> SurfaceResult<()>;

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> SurfaceResult<ProgramHandle>;

    // Upload 2D clip-space vertices, two floats each.
    fn create_quad(&mut self, vertices: &[f32]) -> SurfaceResult<BufferHandle>;

    // Allocate an RGBA8 texture.
    fn create_texture(&mut self, width: u32, height: u32) -> SurfaceResult<TextureHandle>;

    // Replace the whole texture. `rgba` is row-major, top row first.
    fn upload_texture(&mut self, texture: TextureHandle, rgba: &[u8]) -> SurfaceResult<()>;

    fn draw_quad(
        &mut self,
        program: ProgramHandle,
        quad: BufferHandle,
        texture: TextureHandle,
    ) -> SurfaceResult<()>;

    // Free a resource. Unknown handles are ignored.
    fn release(&mut self, resource: Resource);
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn bind(&mut self, width: u32, height: u32) -> SurfaceResult<()> {
        (**self).bind(width, height)
    }

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> SurfaceResult<ProgramHandle> {
        (**self).compile_program(vertex_src, fragment_src)
    }

    fn create_quad(&mut self, vertices: &[f32]) -> SurfaceResult<BufferHandle> {
        (**self).create_quad(vertices)
    }

    fn create_texture(&mut self, width: u32, height: u32) -> SurfaceResult<TextureHandle> {
        (**self).create_texture(width, height)
    }

    fn upload_texture(&mut self, texture: TextureHandle, rgba: &[u8]) -> SurfaceResult<()> {
        (**self).upload_texture(texture, rgba)
    }

    fn draw_quad(
        &mut self,
        program: ProgramHandle,
        quad: BufferHandle,
        texture: TextureHandle,
    ) -> SurfaceResult<()> {
        (**self).draw_quad(program, quad, texture)
    }

    fn release(&mut self, resource: Resource) {
        (**self).release(resource)
    }
}
