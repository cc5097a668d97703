use thiserror::Error;

/// Errors raised by the painting engine
#[derive(Debug, Error)]
pub enum PaintError {
    #[error("Failed to allocate {width}x{height} pixel buffer")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("Invalid configuration: {0}")]
    Config(#[from] dzyn_config::ConfigError),

    #[error("Invalid texture size: {0}")]
    InvalidTextureSize(u32),

    #[error("Failed to encode texture: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to read font {path}: {source}")]
    FontRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid font data: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),

    #[error("Gradient ramp has {count} stops, at most {max} are supported")]
    TooManyStops { count: usize, max: usize },

    #[error("Gradient ramp needs at least one stop")]
    EmptyRamp,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by the control point and text stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
