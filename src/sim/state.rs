//! Particle pools and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::spawn;
use crate::consts::*;
use crate::error::EngineError;
use crate::settings::EffectSettings;

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The host must withhold frames until the surface has real dimensions.
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if !self.width.is_finite()
            || !self.height.is_finite()
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(EngineError::InvalidConfiguration(format!(
                "viewport bounds must be positive and finite, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Bird flight state - either cruising or diving past the viewer
///
/// Exit fields live only in the `Exiting` variant, so they cannot be read
/// while a bird is cruising.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightState {
    /// Steady-state cruising with depth drift
    Flying,
    /// Rushing off-screen after overshooting the near depth threshold
    Exiting {
        /// Dive completion in [0, 1]
        progress: f32,
        /// Horizontal carry, derived from the bird's heading at trigger time
        speed_x: f32,
        /// Upward rush speed, derived from the viewport height
        speed_y: f32,
    },
}

/// A single flying entity
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    /// Displayed position in viewport pixels
    pub pos: Vec2,
    /// Slow-drifting vertical anchor the sinusoidal bob rides on
    pub drift_anchor: f32,
    /// Horizontal speed (sign encodes facing)
    pub vx: f32,
    /// Vertical anchor drift speed
    pub drift_speed: f32,
    /// Bob height in pixels
    pub amplitude: f32,
    /// Bob frequency in radians per frame unit
    pub frequency: f32,
    /// Per-bird time accumulator (desynchronizes the bobbing)
    pub phase_time: f32,
    /// Simulated distance from the viewer
    pub z: f32,
    /// Depth-closing speed
    pub vz: f32,
    /// Intrinsic size multiplier before perspective scaling
    pub base_scale: f32,
    /// Current perspective-projected scale
    pub scale: f32,
    /// Current depth-derived opacity
    pub alpha: f32,
    /// Facing angle: 0 when heading right, pi when heading left
    pub rotation: f32,
    pub state: FlightState,
}

impl Bird {
    /// Recompute scale and opacity from depth.
    ///
    /// Closer birds are bigger and more opaque; both attributes are clamped
    /// so a bird never vanishes entirely nor grows without bound.
    pub fn apply_projection(&mut self) {
        let denom = (PERSPECTIVE_FACTOR + self.z).max(1.0);
        self.scale =
            (self.base_scale * (PERSPECTIVE_FACTOR / denom)).clamp(SCALE_MIN, SCALE_MAX);
        self.alpha = (PERSPECTIVE_FACTOR * 1.2 / denom).clamp(ALPHA_MIN, ALPHA_MAX);
    }

    /// Painter's-algorithm key: nearer birds draw on top
    pub fn draw_order(&self) -> i32 {
        (Z_FAR_PLANE - self.z).floor() as i32
    }

    /// Scaled sprite extents used by the wrap rules
    pub fn scaled_width(&self) -> f32 {
        BIRD_SPRITE_WIDTH * self.scale
    }

    pub fn scaled_height(&self) -> f32 {
        BIRD_SPRITE_HEIGHT * self.scale
    }
}

/// A glowing dot drifting on a fixed closed path
///
/// Fireflies are anchored by viewport fraction, so a resize keeps their
/// relative placement while the pool is re-rolled.
#[derive(Debug, Clone, PartialEq)]
pub struct Firefly {
    /// Home position as a fraction of the viewport, in [0, 1)^2
    pub anchor: Vec2,
    /// Dot diameter in pixels
    pub size: f32,
    /// Resting glow between blinks
    pub base_alpha: f32,
    /// Drift loop length in frame units
    pub move_period: f32,
    /// Blink cycle length in frame units
    pub blink_period: f32,
    /// Frames before the drift loop starts
    pub move_delay: f32,
    /// Frames before the first blink
    pub blink_delay: f32,
    /// Drift path selector, 1..=FIREFLY_PATTERNS
    pub pattern: u8,
    pub phase_time: f32,
}

impl Firefly {
    /// Displayed position: fractional anchor scaled to the viewport plus the
    /// pattern's drift offset
    pub fn position(&self, bounds: Bounds) -> Vec2 {
        Vec2::new(self.anchor.x * bounds.width, self.anchor.y * bounds.height)
            + self.drift_offset()
    }

    fn drift_offset(&self) -> Vec2 {
        let t = (self.phase_time - self.move_delay).max(0.0) / self.move_period;
        let theta = t * TAU;
        match self.pattern {
            1 => Vec2::new(theta.cos() * 18.0, theta.sin() * 18.0),
            2 => Vec2::new(theta.sin() * 32.0, (2.0 * theta).sin() * 14.0),
            3 => Vec2::new(theta.sin() * 40.0, (3.0 * theta).sin() * 6.0),
            4 => Vec2::new((2.0 * theta).sin() * 10.0, theta.cos() * 28.0),
            _ => Vec2::new(theta.sin() * 22.0, (2.0 * theta).cos() * 22.0),
        }
    }

    /// Current glow: holds at the resting level until the blink delay
    /// elapses, then pulses to full brightness on the blink cadence
    pub fn alpha(&self) -> f32 {
        let t = self.phase_time - self.blink_delay;
        if t <= 0.0 {
            return self.base_alpha;
        }
        let pulse = 0.5 - 0.5 * (t / self.blink_period * TAU).cos();
        self.base_alpha + (1.0 - self.base_alpha) * pulse
    }
}

/// Sprite family a renderable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Bird,
    Firefly,
}

/// One paintable particle, snapshot form
///
/// `scale` multiplies the host's unit sprite for the kind (the bird glyph or
/// a one-pixel dot). Entries are sorted back-to-front.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Renderable {
    pub kind: ParticleKind,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
    pub alpha: f32,
    pub draw_order: i32,
}

/// Complete simulation state
///
/// Exclusively owned by the caller; `advance` is the only mutation path
/// besides `resize`.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub bounds: Bounds,
    /// Frames advanced since construction
    pub frame: u64,
    pub birds: Vec<Bird>,
    pub fireflies: Vec<Firefly>,
    pub settings: EffectSettings,
    pub(crate) firefly_timer: f32,
    pub(crate) rng: Pcg32,
}

impl EngineState {
    /// Build the particle pools with randomized initial state.
    ///
    /// Fails fast on an empty bird pool or degenerate bounds rather than
    /// silently simulating nothing.
    pub fn new(
        settings: &EffectSettings,
        bounds: Bounds,
        seed: u64,
    ) -> Result<Self, EngineError> {
        bounds.validate()?;
        let bird_count = settings.effective_bird_count();
        if bird_count == 0 {
            return Err(EngineError::InvalidConfiguration(
                "bird pool must not be empty".into(),
            ));
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let birds = (0..bird_count)
            .map(|_| spawn::spawn_bird(&mut rng, bounds))
            .collect();
        let fireflies = (0..settings.effective_firefly_count())
            .map(|i| spawn::spawn_firefly(&mut rng, i))
            .collect::<Vec<_>>();

        log::debug!(
            "engine initialized: {} birds, {} fireflies, {}x{} viewport, seed {}",
            bird_count,
            fireflies.len(),
            bounds.width,
            bounds.height,
            seed
        );

        Ok(Self {
            seed,
            bounds,
            frame: 0,
            birds,
            fireflies,
            settings: settings.clone(),
            firefly_timer: 0.0,
            rng,
        })
    }

    /// Update the viewport.
    ///
    /// Birds keep their in-flight state and pick up the new wrap extents on
    /// the next `advance`; the firefly pool is re-rolled since its anchors
    /// are placed relative to the viewport.
    pub fn resize(&mut self, bounds: Bounds) -> Result<(), EngineError> {
        bounds.validate()?;
        self.bounds = bounds;
        self.regenerate_fireflies();
        log::debug!("viewport resized to {}x{}", bounds.width, bounds.height);
        Ok(())
    }

    /// Read-only snapshot for the host to paint, sorted back-to-front
    pub fn renderables(&self) -> Vec<Renderable> {
        let mut out = Vec::with_capacity(self.birds.len() + self.fireflies.len());
        for bird in &self.birds {
            out.push(Renderable {
                kind: ParticleKind::Bird,
                x: bird.pos.x,
                y: bird.pos.y,
                scale: bird.scale,
                rotation: bird.rotation,
                alpha: bird.alpha,
                draw_order: bird.draw_order(),
            });
        }
        for fly in &self.fireflies {
            let pos = fly.position(self.bounds);
            out.push(Renderable {
                kind: ParticleKind::Firefly,
                x: pos.x,
                y: pos.y,
                scale: fly.size,
                rotation: 0.0,
                alpha: fly.alpha(),
                draw_order: FIREFLY_DRAW_ORDER,
            });
        }
        out.sort_by_key(|r| r.draw_order);
        out
    }

    pub(crate) fn regenerate_fireflies(&mut self) {
        let count = self.settings.effective_firefly_count();
        let rng = &mut self.rng;
        self.fireflies = (0..count).map(|i| spawn::spawn_firefly(rng, i)).collect();
    }
}
