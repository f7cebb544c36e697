// WebGL2 implementation of RenderSurface, for the browser build.

use wasm_bindgen::JsValue;
use web_sys::{
    WebGl2RenderingContext, WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture,
    WebGlVertexArrayObject,
};

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::{BufferHandle, ProgramHandle, RenderSurface, Resource, TextureHandle};

type GL = WebGl2RenderingContext;

const POSITION_LOCATION: u32 = 0;

struct Quad {
    buffer: WebGlBuffer,
    vao: WebGlVertexArrayObject,
    vert_count: i32,
}

struct Texture {
    texture: WebGlTexture,
    width: i32,
    height: i32,
}

pub struct WebGlSurface {
    context: GL,
    programs: Vec<Option<WebGlProgram>>,
    quads: Vec<Option<Quad>>,
    textures: Vec<Option<Texture>>,
}

impl WebGlSurface {
    pub fn new(context: GL) -> WebGlSurface {
        WebGlSurface {
            context,
            programs: Vec::new(),
            quads: Vec::new(),
            textures: Vec::new(),
        }
    }

    fn compile_shader(&self, shader_type: u32, source: &str) -> SurfaceResult<WebGlShader> {
        let context = &self.context;
        let shader = context
            .create_shader(shader_type)
            .ok_or_else(|| {
                SurfaceError::ShaderCompile("Unable to create shader object".to_owned())
            })?;
        context.shader_source(&shader, source);
        context.compile_shader(&shader);

        if context
            .get_shader_parameter(&shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(shader)
        } else {
            let log = context
                .get_shader_info_log(&shader)
                .unwrap_or_else(|| String::from("Unknown error creating shader"));
            context.delete_shader(Some(&shader));
            Err(SurfaceError::ShaderCompile(log))
        }
    }

    fn link_program(
        &self,
        vert_shader: &WebGlShader,
        frag_shader: &WebGlShader,
    ) -> SurfaceResult<WebGlProgram> {
        let context = &self.context;
        let program = context
            .create_program()
            .ok_or_else(|| {
                SurfaceError::ProgramLink("Unable to create program object".to_owned())
            })?;

        context.attach_shader(&program, vert_shader);
        context.attach_shader(&program, frag_shader);
        context.link_program(&program);

        if context
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(program)
        } else {
            let log = context
                .get_program_info_log(&program)
                .unwrap_or_else(|| String::from("Unknown error creating program object"));
            context.delete_program(Some(&program));
            Err(SurfaceError::ProgramLink(log))
        }
    }
}

fn js_message(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn slot<T>(items: &[Option<T>], id: u32) -> SurfaceResult<&T> {
    items
        .get(id as usize)
        .and_then(|x| x.as_ref())
        .ok_or(SurfaceError::UnknownHandle(id))
}

impl RenderSurface for WebGlSurface {
    fn bind(&mut self, width: u32, height: u32) -> SurfaceResult<()> {
        if self.context.is_context_lost() {
            return Err(SurfaceError::Bind("WebGL context is lost".to_owned()));
        }
        self.context.viewport(0, 0, width as i32, height as i32);
        Ok(())
    }

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> SurfaceResult<ProgramHandle> {
        let vert_shader = self.compile_shader(GL::VERTEX_SHADER, vertex_src)?;
        let frag_shader = match self.compile_shader(GL::FRAGMENT_SHADER, fragment_src) {
            Ok(shader) => shader,
            Err(e) => {
                self.context.delete_shader(Some(&vert_shader));
                return Err(e);
            }
        };

        let program = self.link_program(&vert_shader, &frag_shader);
        // Linked programs keep their own copy.
        self.context.delete_shader(Some(&vert_shader));
        self.context.delete_shader(Some(&frag_shader));

        self.programs.push(Some(program?));
        Ok(ProgramHandle(self.programs.len() as u32 - 1))
    }

    fn create_quad(&mut self, vertices: &[f32]) -> SurfaceResult<BufferHandle> {
        let context = &self.context;
        let buffer = context
            .create_buffer()
            .ok_or_else(|| SurfaceError::Allocation("Couldn't create buffer".to_owned()))?;
        context.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));

        // The view aliases wasm memory and must not outlive `vertices`; nothing allocates
        // between creating it and handing it to WebGL.
        unsafe {
            let positions_array_buf_view = js_sys::Float32Array::view(vertices);
            context.buffer_data_with_array_buffer_view(
                GL::ARRAY_BUFFER,
                &positions_array_buf_view,
                GL::STATIC_DRAW,
            );
        }

        let vao = context
            .create_vertex_array()
            .ok_or_else(|| {
                SurfaceError::Allocation("Could not create vertex array object".to_owned())
            })?;
        context.bind_vertex_array(Some(&vao));
        context.vertex_attrib_pointer_with_i32(POSITION_LOCATION, 2, GL::FLOAT, false, 0, 0);
        context.enable_vertex_attrib_array(POSITION_LOCATION);
        context.bind_vertex_array(None);

        self.quads.push(Some(Quad {
            buffer,
            vao,
            vert_count: vertices.len() as i32 / 2,
        }));
        Ok(BufferHandle(self.quads.len() as u32 - 1))
    }

    fn create_texture(&mut self, width: u32, height: u32) -> SurfaceResult<TextureHandle> {
        let context = &self.context;
        let texture = context
            .create_texture()
            .ok_or_else(|| SurfaceError::Allocation("Couldn't create texture".to_owned()))?;
        context.bind_texture(GL::TEXTURE_2D, Some(&texture));
        context
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                GL::TEXTURE_2D,
                0,
                GL::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                None,
            )
            .map_err(|e| SurfaceError::Allocation(js_message(e)))?;
        context.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::NEAREST as i32);
        context.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::NEAREST as i32);
        context.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        context.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);

        self.textures.push(Some(Texture {
            texture,
            width: width as i32,
            height: height as i32,
        }));
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn upload_texture(&mut self, texture: TextureHandle, rgba: &[u8]) -> SurfaceResult<()> {
        let target = slot(&self.textures, texture.0)?;
        let expected = target.width as usize * target.height as usize * 4;
        if rgba.len() != expected {
            return Err(SurfaceError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }

        let context = &self.context;
        context.bind_texture(GL::TEXTURE_2D, Some(&target.texture));
        context
            .tex_sub_image_2d_with_i32_and_i32_and_u32_and_type_and_opt_u8_array(
                GL::TEXTURE_2D,
                0,
                0,
                0,
                target.width,
                target.height,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                Some(rgba),
            )
            .map_err(|e| SurfaceError::Submission(js_message(e)))
    }

    fn draw_quad(
        &mut self,
        program: ProgramHandle,
        quad: BufferHandle,
        texture: TextureHandle,
    ) -> SurfaceResult<()> {
        let program = slot(&self.programs, program.0)?;
        let quad = slot(&self.quads, quad.0)?;
        let texture = slot(&self.textures, texture.0)?;
        let context = &self.context;

        if context.is_context_lost() {
            return Err(SurfaceError::Submission("WebGL context is lost".to_owned()));
        }

        context.clear_color(0.0, 0.0, 0.0, 1.0);
        context.clear(GL::COLOR_BUFFER_BIT);
        context.use_program(Some(program));
        context.active_texture(GL::TEXTURE0);
        context.bind_texture(GL::TEXTURE_2D, Some(&texture.texture));
        context.bind_vertex_array(Some(&quad.vao));
        context.draw_arrays(GL::TRIANGLE_STRIP, 0, quad.vert_count);
        context.bind_vertex_array(None);
        Ok(())
    }

    fn release(&mut self, resource: Resource) {
        let context = &self.context;
        match resource {
            Resource::Program(h) => {
                if let Some(program) = self.programs.get_mut(h.0 as usize).and_then(|x| x.take()) {
                    context.delete_program(Some(&program));
                }
            }
            Resource::Buffer(h) => {
                if let Some(quad) = self.quads.get_mut(h.0 as usize).and_then(|x| x.take()) {
                    context.delete_vertex_array(Some(&quad.vao));
                    context.delete_buffer(Some(&quad.buffer));
                }
            }
            Resource::Texture(h) => {
                if let Some(texture) = self.textures.get_mut(h.0 as usize).and_then(|x| x.take()) {
                    context.delete_texture(Some(&texture.texture));
                }
            }
        }
    }
}
