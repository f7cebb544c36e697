// `initialise` once per process, then `create_app` per surface, then `App::draw` per
// animation frame. Dropping the app releases its GPU resources.
// `draw` never fails outward: bad parameters are clamped and a frame that cannot be
// submitted is skipped.

use log::{debug, info, warn};
use ndarray::{Array2, Array3};
use once_cell::sync::OnceCell;

use crate::{
    colormap::ColorTables,
    config::EngineConfig,
    error::{EngineError, SurfaceError, SurfaceResult},
    guard::{Adjustments, ParameterGuard, RawParameters},
    raster::{FieldRasterizer, FrameBuffers},
    surface::{
        BufferHandle, ProgramHandle, RenderSurface, Resource, TextureHandle, FRAGMENT_SHADER,
        QUAD_VERTICES, VERTEX_SHADER,
    },
};

static COLOR_TABLES: OnceCell<ColorTables> = OnceCell::new();

// One-time process-wide setup. Safe to call more than once.
pub fn initialise() {
    COLOR_TABLES.get_or_init(|| {
        info!("Building colour lookup tables");
        ColorTables::build()
    });
}

pub fn is_initialised() -> bool {
    COLOR_TABLES.get().is_some()
}

// Binds an app to `surface` with the default configuration.
pub fn create_app<S: RenderSurface>(
    surface: S,
    width: u32,
    height: u32,
) -> Result<App<S>, EngineError> {
    create_app_with_config(surface, width, height, EngineConfig::default())
}

pub fn create_app_with_config<S: RenderSurface>(
    surface: S,
    width: u32,
    height: u32,
    config: EngineConfig,
) -> Result<App<S>, EngineError> {
    let tables = COLOR_TABLES.get().ok_or(EngineError::NotInitialised)?;
    App::new(tables, surface, width, height, config)
}

// GPU-side state, created once and only read afterwards.
#[derive(Debug, Clone, Copy)]
struct GpuResources {
    program: ProgramHandle,
    quad: BufferHandle,
    texture: TextureHandle,
}

impl GpuResources {
    fn create<S: RenderSurface>(
        surface: &mut S,
        width: u32,
        height: u32,
    ) -> SurfaceResult<GpuResources> {
        let program = surface.compile_program(VERTEX_SHADER, FRAGMENT_SHADER)?;
        let quad = match surface.create_quad(&QUAD_VERTICES) {
            Ok(quad) => quad,
            Err(e) => {
                surface.release(Resource::Program(program));
                return Err(e);
            }
        };
        let texture = match surface.create_texture(width, height) {
            Ok(texture) => texture,
            Err(e) => {
                surface.release(Resource::Buffer(quad));
                surface.release(Resource::Program(program));
                return Err(e);
            }
        };

        Ok(GpuResources {
            program,
            quad,
            texture,
        })
    }

    fn release<S: RenderSurface>(&self, surface: &mut S) {
        surface.release(Resource::Texture(self.texture));
        surface.release(Resource::Buffer(self.quad));
        surface.release(Resource::Program(self.program));
    }
}

// Outcome of one `draw` call.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameStatus {
    Presented,
    // The frame could not be submitted and was dropped. The next draw tries again.
    Skipped(SurfaceError),
}

impl FrameStatus {
    pub fn is_presented(&self) -> bool {
        matches!(self, FrameStatus::Presented)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub presented: u64,
    pub skipped: u64,
    pub last_adjustments: Adjustments,
}

pub struct App<S: RenderSurface> {
    surface: S,
    resources: GpuResources,
    guard: ParameterGuard,
    rasterizer: FieldRasterizer<'static>,
    buffers: FrameBuffers,
    stats: FrameStats,
}

impl<S: RenderSurface> App<S> {
    fn new(
        tables: &'static ColorTables,
        mut surface: S,
        width: u32,
        height: u32,
        config: EngineConfig,
    ) -> Result<App<S>, EngineError> {
        config.validate()?;
        if width == 0 || height == 0 {
            return Err(EngineError::EmptySurface { width, height });
        }

        surface.bind(width, height)?;
        let resources = GpuResources::create(&mut surface, width, height)?;
        info!("Created app on a {}x{} surface", width, height);

        Ok(App {
            surface,
            resources,
            guard: ParameterGuard::new(config.max_elements),
            rasterizer: FieldRasterizer::new(config.clone(), tables.get(config.colormap)),
            buffers: FrameBuffers::new(width, height),
            stats: FrameStats::default(),
        })
    }

    // Renders one frame. See `App::draw_raw`.
    pub fn draw(
        &mut self,
        time: f64,
        num_elements: u32,
        spacing: f64,
        frequency: f64,
        phase: f64,
        zoom: f64,
    ) -> FrameStatus {
        self.draw_raw(RawParameters {
            time,
            num_elements: num_elements as i64,
            spacing,
            frequency,
            phase,
            zoom,
        })
    }

    // Clamps the parameters, rasterizes the field and submits it to the surface.
    pub fn draw_raw(&mut self, raw: RawParameters) -> FrameStatus {
        let (frame, adjusted) = self.guard.sanitize(raw);
        self.stats.last_adjustments = adjusted;

        self.rasterizer.render(&frame, &mut self.buffers);

        match self.submit() {
            Ok(()) => {
                self.stats.presented += 1;
                FrameStatus::Presented
            }
            Err(e) => {
                warn!("Skipping frame: {}", e);
                self.stats.skipped += 1;
                FrameStatus::Skipped(e)
            }
        }
    }

    fn submit(&mut self) -> SurfaceResult<()> {
        let rgba = self.buffers.rgba_bytes().ok_or_else(|| {
            SurfaceError::Submission("frame buffer is not contiguous".to_owned())
        })?;
        self.surface.upload_texture(self.resources.texture, rgba)?;
        self.surface
            .draw_quad(self.resources.program, self.resources.quad, self.resources.texture)
    }

    // Rebinds at a new size. The texture and frame buffers are replaced; the program and
    // quad are kept. On failure the app keeps its previous size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::EmptySurface { width, height });
        }
        if (width, height) == (self.width(), self.height()) {
            return Ok(());
        }

        let texture = self.surface.create_texture(width, height)?;
        if let Err(e) = self.surface.bind(width, height) {
            self.surface.release(Resource::Texture(texture));
            return Err(e.into());
        }

        self.surface.release(Resource::Texture(self.resources.texture));
        self.resources.texture = texture;
        self.buffers = FrameBuffers::new(width, height);
        debug!("Resized app to {}x{}", width, height);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.buffers.width()
    }

    pub fn height(&self) -> u32 {
        self.buffers.height()
    }

    pub fn config(&self) -> &EngineConfig {
        self.rasterizer.config()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    // Steady-state amplitude of the last rendered frame, (height, width), row 0 on top.
    pub fn amplitudes(&self) -> &Array2<f64> {
        self.buffers.amplitudes()
    }

    // RGBA image of the last rendered frame, (height, width, 4).
    pub fn image(&self) -> &Array3<u8> {
        self.buffers.image()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: RenderSurface> Drop for App<S> {
    fn drop(&mut self) {
        debug!("Releasing GPU resources");
        self.resources.release(&mut self.surface);
    }
}
