//! Slot-based particle pool with time-throttled emission
//!
//! An `Emitter` owns a fixed arena of particle slots and a matching vertex
//! array. Each tick ages and integrates the live particles, retires the
//! expired ones, and fills free slots up to the spawn budget. The vertex
//! array always mirrors the post-tick state of every slot.

use ember_core::{Color, EmberError, Result, Vec3};

use crate::fuzzy::{Distribution, FuzzyColor, FuzzyDouble, FuzzyScalar, FuzzyVector};
use crate::rng::EmberRng;
use crate::vertex::{Frame, Vertex};

/// Default RNG seed for engines constructed without an explicit one
const DEFAULT_SEED: u32 = 0x9E37_79B9;

/// Configuration for a particle emitter
#[derive(Clone, Debug)]
pub struct EmitterConfig {
    /// Number of pool slots; the hard cap on simultaneously live particles
    pub particle_count: usize,
    /// Size (in pixels) of the rendered point sprite
    pub particle_size: f32,
    /// Spawn-rate throttle. The name is historical: the value multiplies
    /// the tick time in seconds, so 2000 here yields at most
    /// `2000 * dt` new particles per tick.
    pub new_particles_per_ms: f64,
    /// While false the spawn budget is zero; live particles still age out
    pub source_active: bool,
    /// Spawn position
    pub position: FuzzyVector,
    /// Launch direction; normalized at spawn, so it need not be unit length
    pub direction: FuzzyVector,
    /// Launch speed, scales the normalized direction
    pub speed: FuzzyScalar,
    /// Spawn color; faded linearly over each particle's life
    pub color: FuzzyColor,
    /// Lifespan in seconds
    pub lifespan: FuzzyDouble,
    /// Global acceleration (gravity, wind) applied to every live particle
    pub acceleration: Vec3,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            particle_count: 512,
            particle_size: 3.0,
            new_particles_per_ms: 100.0,
            source_active: true,
            position: FuzzyVector::fixed([0.0; 3]),
            direction: FuzzyVector::fixed([0.0, 1.0, 0.0]),
            speed: FuzzyScalar::fixed(10.0),
            color: FuzzyColor::default(),
            lifespan: FuzzyDouble::fixed(2.0),
            acceleration: Vec3::ZERO,
        }
    }
}

impl EmitterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(EmberError::Config(
                "particle_count must be positive".into(),
            ));
        }
        if self.particle_size <= 0.0 {
            return Err(EmberError::Config("particle_size must be positive".into()));
        }
        if self.new_particles_per_ms < 0.0 {
            return Err(EmberError::Config(
                "new_particles_per_ms must not be negative".into(),
            ));
        }
        self.position.validate("position")?;
        self.direction.validate("direction")?;
        self.speed.validate("speed")?;
        self.color.validate("color")?;
        self.lifespan.validate("lifespan")
    }

    /// Parse a config from TOML preset text. The parsed config is not yet
    /// validated; `Emitter::new` does that.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::value::Table = toml::from_str(text)?;
        Ok(Self::from_toml(&table))
    }

    /// Parse a config from a TOML table, falling back to defaults for
    /// missing keys. Integer and float TOML values are interchangeable.
    pub fn from_toml(table: &toml::value::Table) -> Self {
        let mut config = Self::default();

        if let Some(v) = table.get("particle_count") {
            config.particle_count = v.as_integer().unwrap_or(512).max(0) as usize;
        }
        if let Some(v) = table.get("particle_size") {
            config.particle_size = toml_f32(v, config.particle_size);
        }
        if let Some(v) = table.get("new_particles_per_ms") {
            config.new_particles_per_ms = toml_f64(v, config.new_particles_per_ms);
        }
        if let Some(v) = table.get("source_active") {
            config.source_active = v.as_bool().unwrap_or(true);
        }
        if let Some(v) = table.get("acceleration") {
            config.acceleration = Vec3::from_array(toml_vec3(v, config.acceleration.to_array()));
        }
        if let Some(t) = table.get("position").and_then(|v| v.as_table()) {
            config.position = toml_fuzzy_vector(t, config.position);
        }
        if let Some(t) = table.get("direction").and_then(|v| v.as_table()) {
            config.direction = toml_fuzzy_vector(t, config.direction);
        }
        if let Some(t) = table.get("speed").and_then(|v| v.as_table()) {
            config.speed = toml_fuzzy_scalar(t, config.speed);
        }
        if let Some(t) = table.get("lifespan").and_then(|v| v.as_table()) {
            config.lifespan = toml_fuzzy_double(t, config.lifespan);
        }
        if let Some(t) = table.get("color").and_then(|v| v.as_table()) {
            let mut color = config.color;
            if let Some(h) = t.get("hue").and_then(|v| v.as_table()) {
                color.hue = toml_fuzzy_scalar(h, color.hue);
            }
            if let Some(s) = t.get("saturation").and_then(|v| v.as_table()) {
                color.saturation = toml_fuzzy_scalar(s, color.saturation);
            }
            if let Some(l) = t.get("luminance").and_then(|v| v.as_table()) {
                color.luminance = toml_fuzzy_scalar(l, color.luminance);
            }
            config.color = color;
        }

        config
    }
}

/// Per-tick bookkeeping returned by `Emitter::tick`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub created: usize,
    pub destroyed: usize,
}

/// One pool slot. A slot is either fully zeroed (inactive) or holds a
/// fully-initialized particle.
#[derive(Clone, Copy, Debug, Default)]
struct Particle {
    position: Vec3,
    velocity: Vec3,
    initial_color: Color,
    /// Lifespan in seconds, fixed at spawn
    max_age: f64,
    /// Remaining life; the slot is retired when this reaches zero
    ttl: f64,
    active: bool,
}

/// The particle pool engine
pub struct Emitter {
    config: EmitterConfig,
    rng: EmberRng,
    particles: Vec<Particle>,
    vertices: Vec<Vertex>,
    active_count: usize,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Result<Self> {
        Self::with_seed(config, DEFAULT_SEED)
    }

    /// Construct with an explicit RNG seed; a fixed seed and config
    /// reproduce a run exactly.
    pub fn with_seed(config: EmitterConfig, seed: u32) -> Result<Self> {
        config.validate()?;
        let count = config.particle_count;
        Ok(Self {
            config,
            rng: EmberRng::new(seed),
            particles: vec![Particle::default(); count],
            vertices: vec![Vertex::default(); count],
            active_count: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Pause or resume emission. Live particles keep aging either way.
    pub fn set_source_active(&mut self, active: bool) {
        self.config.source_active = active;
    }

    pub fn set_new_particles_per_ms(&mut self, rate: f64) {
        self.config.new_particles_per_ms = rate.max(0.0);
    }

    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.config.acceleration = acceleration;
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> TickStats {
        let dt = dt.max(0.0);

        let max_new = if self.config.source_active {
            (dt * self.config.new_particles_per_ms) as usize
        } else {
            0
        };

        // The write section: `self` is borrowed mutably for the whole
        // tick, so no snapshot can observe a half-updated vertex array.
        let starting_active = self.active_count;
        let mut updated = 0;
        let mut created = 0;
        let mut destroyed = 0;

        for i in 0..self.particles.len() {
            // Nothing left to age and nothing left to spawn
            if updated >= starting_active && created >= max_new {
                break;
            }

            if self.particles[i].active {
                let p = &mut self.particles[i];
                p.ttl -= dt;

                if p.ttl <= 0.0 {
                    self.particles[i] = Particle::default();
                    self.vertices[i] = Vertex::default();
                    destroyed += 1;
                } else {
                    let fdt = dt as f32;
                    p.velocity += self.config.acceleration * fdt;
                    p.position += p.velocity * fdt;

                    let fade = (p.ttl / p.max_age) as f32;
                    self.vertices[i] = Vertex::new(p.position, p.initial_color.scaled(fade));
                }
                updated += 1;
            } else if created < max_new {
                let p = spawn_particle(&self.config, &mut self.rng);
                self.vertices[i] = Vertex::new(p.position, p.initial_color);
                self.particles[i] = p;
                created += 1;
            }
        }

        self.active_count = self.active_count + created - destroyed;

        TickStats { created, destroyed }
    }

    /// Publish the current renderable state. The borrow keeps the engine
    /// immutable for as long as the snapshot is held.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            vertex_count: self.vertices.len(),
            vertices: &self.vertices,
            point_size: self.config.particle_size,
        }
    }
}

fn spawn_particle(config: &EmitterConfig, rng: &mut EmberRng) -> Particle {
    let position = config.position.sample(rng);
    let speed = config.speed.sample(rng);

    // A degenerate direction sample falls back to the launch axis rather
    // than propagating NaN through the normalize
    let mut direction = config.direction.sample(rng).normalized();
    if direction == Vec3::ZERO {
        direction = Vec3::UP;
    }

    let initial_color = config.color.sample(rng);
    let max_age = config.lifespan.sample(rng);

    Particle {
        position,
        velocity: direction * speed,
        initial_color,
        max_age,
        ttl: max_age,
        active: true,
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .unwrap_or(default)
}

fn toml_f64(v: &toml::Value, default: f64) -> f64 {
    v.as_float()
        .or_else(|| v.as_integer().map(|i| i as f64))
        .unwrap_or(default)
}

fn toml_vec3(v: &toml::Value, default: [f32; 3]) -> [f32; 3] {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 3 {
            return [
                toml_f32(&arr[0], default[0]),
                toml_f32(&arr[1], default[1]),
                toml_f32(&arr[2], default[2]),
            ];
        }
    }
    default
}

fn toml_distribution(v: &toml::Value, default: Distribution) -> Distribution {
    match v.as_str() {
        Some("none") => Distribution::None,
        Some("linear") => Distribution::Linear,
        Some("proportional") => Distribution::Proportional,
        Some("irwin_hall") => Distribution::IrwinHall,
        _ => default,
    }
}

fn toml_fuzzy_scalar(t: &toml::value::Table, default: FuzzyScalar) -> FuzzyScalar {
    let mut f = default;
    if let Some(v) = t.get("value") {
        f.value = toml_f32(v, f.value);
    }
    if let Some(v) = t.get("variance") {
        f.variance = toml_f32(v, f.variance);
        // A spread without an explicit kind means a uniform spread
        if f.distribution == Distribution::None {
            f.distribution = Distribution::Linear;
        }
    }
    if let Some(v) = t.get("distribution") {
        f.distribution = toml_distribution(v, f.distribution);
    }
    f
}

fn toml_fuzzy_double(t: &toml::value::Table, default: FuzzyDouble) -> FuzzyDouble {
    let mut f = default;
    if let Some(v) = t.get("value") {
        f.value = toml_f64(v, f.value);
    }
    if let Some(v) = t.get("variance") {
        f.variance = toml_f64(v, f.variance);
        if f.distribution == Distribution::None {
            f.distribution = Distribution::Linear;
        }
    }
    if let Some(v) = t.get("distribution") {
        f.distribution = toml_distribution(v, f.distribution);
    }
    f
}

fn toml_fuzzy_vector(t: &toml::value::Table, default: FuzzyVector) -> FuzzyVector {
    let mut f = default;
    if let Some(v) = t.get("value") {
        f.value = toml_vec3(v, f.value);
    }
    if let Some(v) = t.get("variance") {
        f.variance = toml_vec3(v, f.variance);
        if f.distribution == Distribution::None {
            f.distribution = Distribution::Linear;
        }
    }
    if let Some(v) = t.get("distribution") {
        f.distribution = toml_distribution(v, f.distribution);
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmitterConfig {
        EmitterConfig {
            particle_count: 100,
            new_particles_per_ms: 1000.0,
            lifespan: FuzzyDouble::fixed(2.0),
            speed: FuzzyScalar::fixed(5.0),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_bad_configs() {
        let zero_count = EmitterConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(Emitter::new(zero_count).is_err());

        let zero_proportional = EmitterConfig {
            speed: FuzzyScalar::proportional(10.0, 0.0),
            ..Default::default()
        };
        assert!(Emitter::new(zero_proportional).is_err());
    }

    #[test]
    fn spawn_budget_is_respected() {
        let mut emitter = Emitter::new(test_config()).unwrap();
        // dt * rate = 0.005 * 1000 = 5 particles per tick
        let stats = emitter.tick(0.005);
        assert_eq!(stats.created, 5);
        assert_eq!(emitter.active_count(), 5);
    }

    #[test]
    fn inactive_source_spawns_nothing() {
        let mut emitter = Emitter::new(test_config()).unwrap();
        emitter.tick(0.005);
        emitter.set_source_active(false);
        let stats = emitter.tick(0.005);
        assert_eq!(stats.created, 0);
        // Existing particles still age
        assert_eq!(emitter.active_count(), 5);
    }

    #[test]
    fn population_accounting_holds_every_tick() {
        let mut emitter = Emitter::new(test_config()).unwrap();
        for _ in 0..300 {
            let before = emitter.active_count();
            let stats = emitter.tick(0.01);
            assert_eq!(
                emitter.active_count(),
                before + stats.created - stats.destroyed
            );
            assert!(stats.created <= 10); // floor(0.01 * 1000)
        }
        assert!(emitter.active_count() <= emitter.capacity());
    }

    #[test]
    fn pool_saturates_then_holds_steady() {
        // 10 spawns/tick against a 100-slot pool: full by tick 10
        // (t = 0.1s), then births match deaths
        let mut emitter = Emitter::new(test_config()).unwrap();
        for _ in 0..10 {
            emitter.tick(0.01);
        }
        assert_eq!(emitter.active_count(), 100);
        for _ in 0..290 {
            emitter.tick(0.01);
            assert!(emitter.active_count() >= 90);
            assert!(emitter.active_count() <= 100);
        }
    }

    #[test]
    fn ttl_decreases_by_dt_then_slot_dies() {
        let config = EmitterConfig {
            particle_count: 1,
            new_particles_per_ms: 1000.0,
            lifespan: FuzzyDouble::fixed(0.25),
            ..Default::default()
        };
        let mut emitter = Emitter::new(config).unwrap();
        emitter.tick(0.0625);
        assert!(emitter.particles[0].active);
        let mut last_ttl = emitter.particles[0].ttl;
        assert_eq!(last_ttl, 0.25);

        // Binary-exact dt: the pool is full, so each tick only ages the
        // particle, by exactly dt
        for _ in 0..3 {
            emitter.tick(0.0625);
            let ttl = emitter.particles[0].ttl;
            assert_eq!(ttl, last_ttl - 0.0625);
            last_ttl = ttl;
        }

        // Fourth tick drains ttl to zero and retires the slot immediately
        emitter.tick(0.0625);
        assert!(!emitter.particles[0].active);
        assert_eq!(emitter.active_count(), 0);

        // The freed slot is eligible again on the next tick
        emitter.tick(0.0625);
        assert_eq!(emitter.active_count(), 1);
    }

    #[test]
    fn expired_slot_zeroes_particle_and_vertex() {
        let config = EmitterConfig {
            particle_count: 1,
            new_particles_per_ms: 1000.0,
            lifespan: FuzzyDouble::fixed(0.1),
            source_active: true,
            ..Default::default()
        };
        let mut emitter = Emitter::new(config).unwrap();
        emitter.tick(0.05);
        assert_ne!(emitter.vertices[0], Vertex::default());

        // Kill it, with the source off so the slot stays empty
        emitter.set_source_active(false);
        emitter.tick(0.2);
        assert_eq!(emitter.vertices[0], Vertex::default());
        assert!(!emitter.particles[0].active);
        assert_eq!(emitter.active_count(), 0);
    }

    #[test]
    fn color_fades_with_remaining_life() {
        let config = EmitterConfig {
            particle_count: 1,
            new_particles_per_ms: 1000.0,
            lifespan: FuzzyDouble::fixed(1.0),
            ..Default::default()
        };
        let mut emitter = Emitter::new(config).unwrap();
        emitter.tick(0.25); // spawn
        let spawn_alpha = emitter.vertices[0].color[3];
        assert_eq!(spawn_alpha, 1.0);

        emitter.tick(0.25); // ttl 0.75
        let faded = emitter.vertices[0].color[3];
        assert!((faded - 0.75).abs() < 1e-6);
    }

    #[test]
    fn fixed_seed_runs_are_bit_identical() {
        // A config that draws from the RNG on every spawn
        let config = EmitterConfig {
            particle_count: 100,
            new_particles_per_ms: 1000.0,
            position: FuzzyVector::linear([0.0, 0.0, 0.0], [20.0, 20.0, 20.0]),
            direction: FuzzyVector::irwin_hall([0.0, 1.0, 0.0], [0.8, 0.2, 0.8]),
            speed: FuzzyScalar::proportional(30.0, 2.0),
            lifespan: FuzzyDouble::linear(0.5, 0.4),
            ..Default::default()
        };
        let mut a = Emitter::with_seed(config.clone(), 42).unwrap();
        let mut b = Emitter::with_seed(config, 42).unwrap();
        for _ in 0..50 {
            a.tick(0.01);
            b.tick(0.01);
        }
        assert!(a.active_count() > 0);
        assert_eq!(a.frame().vertices, b.frame().vertices);
    }

    #[test]
    fn frame_exposes_every_slot() {
        let mut emitter = Emitter::new(test_config()).unwrap();
        emitter.tick(0.01);
        let frame = emitter.frame();
        assert_eq!(frame.vertex_count, 100);
        assert_eq!(frame.vertices.len(), 100);
        assert_eq!(frame.point_size, 3.0);
    }

    #[test]
    fn parse_from_toml() {
        let toml_str = r#"
particle_count = 2000
particle_size = 4
new_particles_per_ms = 250
acceleration = [0, 40, 0]

[position]
value = [512, -80, 0]
variance = [1536, 0, 0]

[speed]
value = 30.0
variance = 1.0
distribution = "proportional"

[direction]
value = [0.0, 0.5, 0.0]
variance = [0.8, 0.0, 0.0]
distribution = "irwin_hall"

[lifespan]
value = 6.5
variance = 1.5

[color.luminance]
value = 0.9
variance = 0.15
distribution = "proportional"
"#;
        let table: toml::value::Table = toml::from_str(toml_str).unwrap();
        let config = EmitterConfig::from_toml(&table);
        assert_eq!(config.particle_count, 2000);
        // Integer TOML values coerce to floats
        assert!((config.particle_size - 4.0).abs() < 1e-6);
        assert!((config.acceleration.y - 40.0).abs() < 1e-6);
        assert_eq!(config.speed.distribution, Distribution::Proportional);
        assert_eq!(config.direction.distribution, Distribution::IrwinHall);
        // A variance with no explicit kind reads as a uniform spread
        assert_eq!(config.lifespan.distribution, Distribution::Linear);
        assert_eq!(config.position.distribution, Distribution::Linear);
        assert!((config.color.luminance.value - 0.9).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_preset_text_is_rejected() {
        assert!(EmitterConfig::from_toml_str("particle_count = [oops").is_err());
    }
}
