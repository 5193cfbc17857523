//! Swarm behavior engine: flocking rules over a fixed population
//!
//! A `Swarm` owns `particle_count` particles for its whole life. Each
//! fixed step accumulates a velocity delta per particle from cohesion,
//! separation, alignment and boundary avoidance plus a global force,
//! clamps speed, and integrates position. `advance` drives the fixed-step
//! clock from wall-clock frame times.

use ember_core::{EmberError, Result, Vec3};

use crate::clock::StepClock;
use crate::fuzzy::FuzzyColor;
use crate::rng::EmberRng;
use crate::vertex::{Frame, Vertex};

const DEFAULT_SEED: u32 = 0x9E37_79B9;

/// Which population the cohesion and alignment rules average over
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locality {
    /// Swarm-wide aggregates, recomputed once per tick
    Hive,
    /// Only neighbors within `sight_radius` of each particle
    #[default]
    Flock,
}

/// Particle speed bounds. Only `max` is enforced; `min` is carried as
/// configuration surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedLimits {
    pub min: f32,
    pub max: f32,
}

/// Configuration for a swarm
#[derive(Clone, Debug)]
pub struct SwarmConfig {
    pub particle_count: usize,
    /// Size (in pixels) of the rendered point sprite
    pub particle_size: f32,
    /// Hard bounds of the swarm space: width, height, depth
    pub boundaries: Vec3,
    /// Fraction of each boundary axis forming the soft repulsion band,
    /// in [0, 0.5]
    pub boundary_threshold: f32,
    pub boundary_repulsion_rate: f32,
    pub speed_limits: SpeedLimits,
    /// Pull toward the neighborhood center of mass
    pub cohesion_rate: f32,
    /// Pull toward the neighborhood average velocity
    pub velocity_consistency: f32,
    /// Distance under which particles repel each other
    pub particle_distance: f32,
    pub repulsion_rate: f32,
    /// Neighborhood range for `Locality::Flock`
    pub sight_radius: f32,
    /// Uniform force (wind, gravity)
    pub global_acceleration: Vec3,
    pub locality: Locality,
    pub color: FuzzyColor,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particle_count: 500,
            particle_size: 3.0,
            boundaries: Vec3::new(1024.0, 768.0, 512.0),
            boundary_threshold: 0.25,
            boundary_repulsion_rate: 3.0,
            speed_limits: SpeedLimits { min: 0.1, max: 2.0 },
            cohesion_rate: 0.03,
            velocity_consistency: 0.1,
            particle_distance: 20.0,
            repulsion_rate: 0.05,
            sight_radius: 100.0,
            global_acceleration: Vec3::ZERO,
            locality: Locality::Flock,
            color: FuzzyColor::default(),
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(EmberError::Config(
                "particle_count must be positive".into(),
            ));
        }
        if self.particle_size <= 0.0 {
            return Err(EmberError::Config("particle_size must be positive".into()));
        }
        if self.boundaries.x <= 0.0 || self.boundaries.y <= 0.0 || self.boundaries.z <= 0.0 {
            return Err(EmberError::Config(
                "boundaries must be positive on every axis".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.boundary_threshold) {
            return Err(EmberError::ValueOutOfRange {
                field: "boundary_threshold".into(),
                min: 0.0,
                max: 0.5,
                value: self.boundary_threshold as f64,
            });
        }
        if self.speed_limits.min < 0.0 || self.speed_limits.min > self.speed_limits.max {
            return Err(EmberError::Config(
                "speed_limits.min must be within [0, max]".into(),
            ));
        }
        for (name, rate) in [
            ("boundary_repulsion_rate", self.boundary_repulsion_rate),
            ("cohesion_rate", self.cohesion_rate),
            ("velocity_consistency", self.velocity_consistency),
            ("particle_distance", self.particle_distance),
            ("repulsion_rate", self.repulsion_rate),
            ("sight_radius", self.sight_radius),
        ] {
            if rate < 0.0 {
                return Err(EmberError::Config(format!("{name} must not be negative")));
            }
        }
        self.color.validate("color")
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct SwarmParticle {
    position: Vec3,
    velocity: Vec3,
}

/// The swarm engine
pub struct Swarm {
    config: SwarmConfig,
    particles: Vec<SwarmParticle>,
    vertices: Vec<Vertex>,
    /// Soft repulsion band edges, fixed at construction
    boundary_min: Vec3,
    boundary_max: Vec3,
    /// Fixed-step scheduler; replace before the first `advance` to run at
    /// a non-default rate
    pub clock: StepClock,
}

impl Swarm {
    pub fn new(config: SwarmConfig) -> Result<Self> {
        Self::with_seed(config, DEFAULT_SEED)
    }

    /// Construct with an explicit RNG seed. The RNG seeds starting
    /// positions, velocities and colors; ticks themselves draw nothing,
    /// so a fixed seed reproduces a whole run.
    pub fn with_seed(config: SwarmConfig, seed: u32) -> Result<Self> {
        config.validate()?;

        let boundary_min = config.boundaries * config.boundary_threshold;
        let boundary_max = config.boundaries - boundary_min;

        let mut rng = EmberRng::new(seed);
        let mut particles = Vec::with_capacity(config.particle_count);
        let mut vertices = Vec::with_capacity(config.particle_count);

        for _ in 0..config.particle_count {
            // Start somewhere in the soft-boundary box with a small
            // random drift
            let position = Vec3::new(
                rng.range_f32(boundary_min.x, boundary_max.x),
                rng.range_f32(boundary_min.y, boundary_max.y),
                rng.range_f32(boundary_min.z, boundary_max.z),
            );
            let velocity = Vec3::new(
                (rng.next_f32() - 0.5) * 4.0,
                (rng.next_f32() - 0.5) * 4.0,
                (rng.next_f32() - 0.5) * 4.0,
            );
            let color = config.color.sample(&mut rng);

            particles.push(SwarmParticle { position, velocity });
            vertices.push(Vertex::new(position, color));
        }

        Ok(Self {
            config,
            particles,
            vertices,
            boundary_min,
            boundary_max,
            clock: StepClock::new(),
        })
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn set_global_acceleration(&mut self, acceleration: Vec3) {
        self.config.global_acceleration = acceleration;
    }

    /// Credit one frame's wall-clock time and run the fixed steps it
    /// covers. Returns the number of steps run.
    pub fn advance(&mut self, frame_time: f64) -> u32 {
        let steps = self.clock.advance(frame_time);
        let dt = self.clock.dt;
        for _ in 0..steps {
            self.tick(dt);
        }
        steps
    }

    /// Run exactly one simulation step of `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        let dt = dt as f32;
        let count = self.particles.len();

        // Per-tick force scales
        let cohesion_accel = self.config.cohesion_rate * dt;
        let boundary_accel = self.config.boundary_repulsion_rate * dt;
        let global_accel = self.config.global_acceleration * dt;

        // Swarm-wide sums for Hive locality, computed once per tick
        let (position_sum, velocity_sum) = if self.config.locality == Locality::Hive {
            let mut ps = Vec3::ZERO;
            let mut vs = Vec3::ZERO;
            for p in &self.particles {
                ps += p.position;
                vs += p.velocity;
            }
            (ps, vs)
        } else {
            (Vec3::ZERO, Vec3::ZERO)
        };

        // Particles update sequentially in place: later particles see the
        // already-updated state of earlier ones, matching a single shared
        // buffer walked in index order.
        for i in 0..count {
            let position = self.particles[i].position;
            let velocity = self.particles[i].velocity;

            let mut dv = Vec3::ZERO;

            // Neighborhood pass: separation for everyone in range, plus
            // Flock aggregates gathered in the same walk
            let mut center_of_mass = Vec3::ZERO;
            let mut velocity_avg = Vec3::ZERO;
            let mut neighbors = 0usize;

            for j in 0..count {
                if j == i {
                    continue;
                }
                let other = &self.particles[j];
                let distance = (position - other.position).length();

                if distance < self.config.particle_distance {
                    dv += -(other.position - position) * self.config.repulsion_rate;
                }

                if self.config.locality == Locality::Flock
                    && distance < self.config.sight_radius
                {
                    center_of_mass += other.position;
                    velocity_avg += other.velocity;
                    neighbors += 1;
                }
            }

            // Resolve the cohesion/alignment reference frame
            let divisor = match self.config.locality {
                Locality::Hive => {
                    center_of_mass = position_sum - position;
                    velocity_avg = velocity_sum - velocity;
                    count - 1
                }
                Locality::Flock => neighbors,
            };

            let (center_of_mass, velocity_avg) = if divisor == 0 {
                // An isolated particle compares against itself: no pull
                // in any direction
                (position, velocity)
            } else {
                let inv = 1.0 / divisor as f32;
                (center_of_mass * inv, velocity_avg * inv)
            };

            dv += (center_of_mass - position) * cohesion_accel;
            dv += (velocity_avg - velocity) * self.config.velocity_consistency;

            // Boundary avoidance, per axis
            let (p, min, max) = (
                position.to_array(),
                self.boundary_min.to_array(),
                self.boundary_max.to_array(),
            );
            let mut boundary = [0.0f32; 3];
            for axis in 0..3 {
                if p[axis] < min[axis] {
                    boundary[axis] = boundary_accel;
                } else if p[axis] > max[axis] {
                    boundary[axis] = -boundary_accel;
                }
            }
            dv += Vec3::from_array(boundary);

            dv += global_accel;

            // Combine, enforce the terminal velocity, integrate
            let particle = &mut self.particles[i];
            particle.velocity += dv;
            particle.velocity = particle.velocity.clamped_length(self.config.speed_limits.max);
            particle.position += particle.velocity;

            self.vertices[i].position = particle.position.to_array();
        }
    }

    /// Publish the current renderable state.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            vertex_count: self.vertices.len(),
            vertices: &self.vertices,
            point_size: self.config.particle_size,
        }
    }
}
