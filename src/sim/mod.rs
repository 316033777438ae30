//! Deterministic background simulation
//!
//! All particle logic lives here. This module must be pure and deterministic:
//! - Frame-relative time only (the host owns the clock)
//! - Seeded RNG only, threaded through every spawn and recycle path
//! - Stable iteration order (pool index)
//! - No rendering or platform dependencies

pub mod spawn;
pub mod state;
pub mod tick;

pub use state::{Bird, Bounds, EngineState, Firefly, FlightState, ParticleKind, Renderable};
pub use tick::advance;
