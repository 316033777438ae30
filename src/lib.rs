//! Aviary - ambient bird and firefly background simulation
//!
//! Core modules:
//! - `sim`: Deterministic particle simulation (flight, depth recycling, fireflies)
//! - `settings`: Density presets and accessibility toggles
//! - `error`: Engine error types
//!
//! The engine never touches a drawing surface. The host owns the frame clock
//! and the viewport: it feeds `advance` a frame-relative delta, paints the
//! snapshot from `EngineState::renderables`, and reports viewport changes
//! through `EngineState::resize`.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::EngineError;
pub use settings::{DensityPreset, EffectSettings};
pub use sim::{
    Bird, Bounds, EngineState, Firefly, FlightState, ParticleKind, Renderable, advance,
};

/// Engine tuning constants
pub mod consts {
    /// Depth at which a receding bird is recycled back to the near side
    pub const Z_FAR_PLANE: f32 = 200.0;
    /// Depth below which an approaching bird begins its exit dive
    pub const Z_NEAR_RESET_THRESHOLD: f32 = -75.0;
    /// Depth assigned when a bird re-enters from far away after an exit
    pub const Z_REAPPEAR_FAR: f32 = 180.0;
    /// Depth assigned when a receding bird wraps around the far plane
    pub const Z_REAPPEAR_NEAR: f32 = -50.0;

    /// Perspective projection constant (focal-length analog)
    pub const PERSPECTIVE_FACTOR: f32 = 100.0;

    /// Clamp band for the perspective scale
    pub const SCALE_MIN: f32 = 0.05;
    pub const SCALE_MAX: f32 = 4.0;
    /// Clamp band for depth-derived opacity
    pub const ALPHA_MIN: f32 = 0.15;
    pub const ALPHA_MAX: f32 = 1.0;

    /// Exit dive length in frame units
    pub const EXIT_DURATION_FRAMES: f32 = 90.0;
    /// Scale a diving bird grows toward while rushing past the viewer
    pub const EXIT_SCALE_TARGET: f32 = 7.0;
    /// Per-frame blend rate toward the exit rotation
    pub const EXIT_TURN_RATE: f32 = 0.05;
    /// Per-frame blend rate toward the exit scale
    pub const EXIT_GROW_RATE: f32 = 0.03;
    /// Fade multiplier - alpha reaches zero before the dive finishes
    pub const EXIT_FADE_RATE: f32 = 1.5;

    /// Untransformed bird sprite footprint; wrap margins use sprite * scale
    pub const BIRD_SPRITE_WIDTH: f32 = 15.0;
    pub const BIRD_SPRITE_HEIGHT: f32 = 10.0;

    /// Frame-unit conversion for cadences authored in seconds
    pub const FRAMES_PER_SECOND: f32 = 60.0;
    /// Firefly pool is reshuffled on this interval of simulated time
    pub const FIREFLY_REGEN_INTERVAL: f32 = 45.0 * FRAMES_PER_SECOND;
    /// Fireflies paint above every bird
    pub const FIREFLY_DRAW_ORDER: i32 = 300;
    /// Number of distinct firefly drift paths
    pub const FIREFLY_PATTERNS: usize = 5;
}

/// Quadratic ease-out: fast start, slow finish
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}
