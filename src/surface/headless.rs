// In-memory surface for tests and offline rendering. Hands out handles, checks shader
// sources and keeps the last drawn texture. Failures can be injected.

use log::{info, trace};

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::{BufferHandle, ProgramHandle, RenderSurface, Resource, TextureHandle};

struct Texture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[derive(Default)]
pub struct HeadlessSurface {
    size: Option<(u32, u32)>,
    programs: Vec<bool>,
    quads: Vec<Option<usize>>,
    textures: Vec<Option<Texture>>,
    presented: Vec<u8>,
    frames_presented: u64,
    max_texture_size: Option<u32>,
    refuse_bind: bool,
    failing_submissions: u32,
}

impl HeadlessSurface {
    pub fn new() -> HeadlessSurface {
        HeadlessSurface::default()
    }

    // Refuse to bind, as a lost or foreign context would.
    pub fn refusing_bind(mut self) -> HeadlessSurface {
        self.refuse_bind = true;
        self
    }

    // Fail texture allocations above this edge length.
    pub fn with_max_texture_size(mut self, size: u32) -> HeadlessSurface {
        self.max_texture_size = Some(size);
        self
    }

    // Make the next `count` uploads fail.
    pub fn fail_next_submissions(&mut self, count: u32) {
        self.failing_submissions = count;
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    // RGBA bytes of the most recently drawn frame, top row first.
    pub fn last_frame(&self) -> Option<&[u8]> {
        if self.frames_presented == 0 {
            None
        } else {
            Some(&self.presented)
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    // Number of resources allocated and not yet released.
    pub fn live_resources(&self) -> usize {
        self.programs.iter().filter(|x| **x).count()
            + self.quads.iter().filter(|x| x.is_some()).count()
            + self.textures.iter().filter(|x| x.is_some()).count()
    }
}

fn check_shader(stage: &str, source: &str) -> SurfaceResult<()> {
    if !source.trim_start().starts_with("#version") {
        return Err(SurfaceError::ShaderCompile(format!(
            "{} shader is missing a #version directive",
            stage
        )));
    }
    if !source.contains("void main()") {
        return Err(SurfaceError::ShaderCompile(format!(
            "{} shader has no entry point",
            stage
        )));
    }
    Ok(())
}

impl RenderSurface for HeadlessSurface {
    fn bind(&mut self, width: u32, height: u32) -> SurfaceResult<()> {
        if self.refuse_bind {
            return Err(SurfaceError::Bind("headless surface refused to bind".to_owned()));
        }
        info!("HeadlessSurface: bound at {}x{}", width, height);
        self.size = Some((width, height));
        Ok(())
    }

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> SurfaceResult<ProgramHandle> {
        check_shader("vertex", vertex_src)?;
        check_shader("fragment", fragment_src)?;
        if !fragment_src.contains("out vec4") {
            return Err(SurfaceError::ProgramLink(
                "fragment shader writes no colour output".to_owned(),
            ));
        }

        self.programs.push(true);
        Ok(ProgramHandle(self.programs.len() as u32 - 1))
    }

    fn create_quad(&mut self, vertices: &[f32]) -> SurfaceResult<BufferHandle> {
        if vertices.is_empty() || vertices.len() % 2 != 0 {
            return Err(SurfaceError::Allocation(format!(
                "expected pairs of clip-space coordinates, got {} floats",
                vertices.len()
            )));
        }

        self.quads.push(Some(vertices.len() / 2));
        Ok(BufferHandle(self.quads.len() as u32 - 1))
    }

    fn create_texture(&mut self, width: u32, height: u32) -> SurfaceResult<TextureHandle> {
        if let Some(max) = self.max_texture_size {
            if width > max || height > max {
                return Err(SurfaceError::Allocation(format!(
                    "texture {}x{} exceeds maximum size {}",
                    width, height, max
                )));
            }
        }

        let len = width as usize * height as usize * 4;
        self.textures.push(Some(Texture {
            width,
            height,
            data: vec![0; len],
        }));
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn upload_texture(&mut self, texture: TextureHandle, rgba: &[u8]) -> SurfaceResult<()> {
        if self.failing_submissions > 0 {
            self.failing_submissions -= 1;
            return Err(SurfaceError::Submission("injected upload failure".to_owned()));
        }

        let target = self
            .textures
            .get_mut(texture.0 as usize)
            .and_then(|x| x.as_mut())
            .ok_or(SurfaceError::UnknownHandle(texture.0))?;
        if target.data.len() != rgba.len() {
            return Err(SurfaceError::SizeMismatch {
                expected: target.data.len(),
                actual: rgba.len(),
            });
        }
        target.data.copy_from_slice(rgba);
        Ok(())
    }

    fn draw_quad(
        &mut self,
        program: ProgramHandle,
        quad: BufferHandle,
        texture: TextureHandle,
    ) -> SurfaceResult<()> {
        if !self.programs.get(program.0 as usize).copied().unwrap_or(false) {
            return Err(SurfaceError::UnknownHandle(program.0));
        }
        if self.quads.get(quad.0 as usize).and_then(|x| *x).is_none() {
            return Err(SurfaceError::UnknownHandle(quad.0));
        }

        let source = self
            .textures
            .get(texture.0 as usize)
            .and_then(|x| x.as_ref())
            .ok_or(SurfaceError::UnknownHandle(texture.0))?;
        trace!(
            "HeadlessSurface: present {}x{} texture",
            source.width,
            source.height
        );
        // Reuses the allocation once sizes settle.
        self.presented.clear();
        self.presented.extend_from_slice(&source.data);
        self.frames_presented += 1;
        Ok(())
    }

    fn release(&mut self, resource: Resource) {
        match resource {
            Resource::Program(h) => {
                if let Some(slot) = self.programs.get_mut(h.0 as usize) {
                    *slot = false;
                }
            }
            Resource::Buffer(h) => {
                if let Some(slot) = self.quads.get_mut(h.0 as usize) {
                    *slot = None;
                }
            }
            Resource::Texture(h) => {
                if let Some(slot) = self.textures.get_mut(h.0 as usize) {
                    *slot = None;
                }
            }
        }
    }
}
