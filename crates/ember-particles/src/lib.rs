//! Ember Particles - CPU particle lifecycle and swarm simulation
//!
//! Provides pooled particle simulation for real-time visual effects:
//! - Fuzzy (randomized) parameter sampling for spawn state
//! - Slot-based particle pool with birth, aging and death
//! - Swarm/flocking rules: cohesion, separation, alignment, boundaries
//! - Fixed-timestep scheduling decoupled from render rate
//! - A zero-copy vertex snapshot published to the renderer each frame
//!
//! A driver constructs an [`Emitter`] or [`Swarm`], advances it once per
//! frame, and reads [`Emitter::frame`]/[`Swarm::frame`] to feed a draw
//! call. All state is owned by the engine instance; nothing is global.

pub mod clock;
pub mod emitter;
pub mod fuzzy;
pub mod rng;
pub mod swarm;
pub mod vertex;

pub use clock::{StepClock, DEFAULT_MAX_FRAME_TIME, DEFAULT_TIMESTEP};
pub use emitter::{Emitter, EmitterConfig, TickStats};
pub use fuzzy::{Distribution, FuzzyColor, FuzzyDouble, FuzzyScalar, FuzzyVector};
pub use rng::EmberRng;
pub use swarm::{Locality, SpeedLimits, Swarm, SwarmConfig};
pub use vertex::{Frame, Vertex};
