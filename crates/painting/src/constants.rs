/// Default tile size for dirty tracking.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Largest texture edge the painter will allocate.
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Spots are never rasterized smaller than one pixel.
pub const MIN_SPOT_RADIUS_PX: f32 = 1.0;

/// Control point radius is kept within (MIN_POINT_RADIUS, 1].
pub const MIN_POINT_RADIUS: f32 = 1e-4;

/// Maximum number of stops in a gradient ramp.
pub const MAX_RAMP_STOPS: usize = 8;

/// Minimum text size when none is configured.
pub const MIN_FONT_SIZE_PX: f32 = 8.0;

/// A text mask may cover at most this many times the texture's area.
pub const MAX_TEXT_MASK_AREA_SCALE: usize = 4;

/// Handle spheres never shrink below this world-space radius.
pub const MIN_HANDLE_RADIUS: f32 = 0.02;

/// Handle radius as a fraction of the control point radius.
pub const HANDLE_RADIUS_SCALE: f32 = 0.15;
