use thiserror::Error;

// Failures reported by a RenderSurface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    // The surface could not be bound at the requested size
    #[error("Failed to bind surface: {0}")]
    Bind(String),

    #[error("Shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("Program link failed: {0}")]
    ProgramLink(String),

    // Buffer or texture allocation failed
    #[error("Allocation failed: {0}")]
    Allocation(String),

    // Uploading or drawing a frame failed. Transient.
    #[error("Frame submission failed: {0}")]
    Submission(String),

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Unknown resource handle {0}")]
    UnknownHandle(u32),
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("initialise() must be called before create_app()")]
    NotInitialised,

    // Surface binding or GPU resource creation failed. Fatal for the app.
    #[error("Initialization failed: {0}")]
    Initialization(#[from] SurfaceError),

    #[error("Surface dimensions must be non-zero, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Plotting backend error: {0}")]
    Backend(String),

    #[error("Frame has no pixels")]
    EmptyFrame,
}
