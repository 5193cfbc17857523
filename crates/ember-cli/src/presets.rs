//! Built-in demo scenes
//!
//! Coordinates follow the classic screen convention: the origin is the
//! top-left corner, +y points down, so "down" forces are positive y.

use ember_core::Vec3;
use ember_particles::{
    EmitterConfig, FuzzyColor, FuzzyDouble, FuzzyScalar, FuzzyVector, Locality, SpeedLimits,
    SwarmConfig,
};

pub const WIDTH: f32 = 1024.0;
pub const HEIGHT: f32 = 768.0;

/// A row of five fountains along the bottom edge: a taller central jet
/// flanked by two pairs, the outermost angled inward from the corners.
pub fn fountains() -> Vec<EmitterConfig> {
    let base = EmitterConfig {
        particle_count: 10_000,
        particle_size: 3.0,
        new_particles_per_ms: 2000.0,
        lifespan: FuzzyDouble::proportional(2.0, 0.75),
        position: FuzzyVector::linear([0.0, HEIGHT + 5.0, 0.0], [10.0, 10.0, 10.0]),
        direction: FuzzyVector::irwin_hall([0.0, -1.0, 0.0], [0.5, 0.5, 0.5]),
        speed: FuzzyScalar::irwin_hall(700.0, 250.0),
        color: FuzzyColor {
            hue: FuzzyScalar::proportional(236.0, 0.05),
            saturation: FuzzyScalar::fixed(1.0),
            luminance: FuzzyScalar::proportional(0.9, 0.15),
        },
        ..Default::default()
    };

    let mut center = base.clone();
    center.position.value[0] = WIDTH / 2.0;
    center.source_active = false;
    center.speed = FuzzyScalar::irwin_hall(900.0, 250.0);
    center.direction.variance = [0.3, 0.3, 0.3];

    let mut inner_left = base.clone();
    inner_left.position.value[0] = WIDTH / 4.0;

    let mut inner_right = base.clone();
    inner_right.position.value[0] = WIDTH / 4.0 * 3.0;

    let mut corner_left = base.clone();
    corner_left.particle_count = 2000;
    corner_left.position.value[0] = 0.0;
    corner_left.speed = FuzzyScalar::irwin_hall(600.0, 0.05);
    corner_left.direction.value = [0.5, -0.7, 0.0];

    let mut corner_right = base;
    corner_right.particle_count = 2000;
    corner_right.position.value[0] = WIDTH;
    corner_right.speed = FuzzyScalar::irwin_hall(600.0, 0.05);
    corner_right.direction.value = [-0.5, -0.7, 0.0];

    vec![center, inner_left, inner_right, corner_left, corner_right]
}

/// A steady stream of snowflakes drifting down from above the top edge.
/// The driver animates the wind (`acceleration.x`) and the spawn rate
/// every frame.
pub fn snow() -> EmitterConfig {
    EmitterConfig {
        particle_count: 2000,
        particle_size: 4.0,
        new_particles_per_ms: 250.0,
        acceleration: Vec3::new(0.0, 40.0, 0.0),
        position: FuzzyVector::linear(
            [WIDTH / 2.0, -80.0, 0.0],
            [WIDTH + WIDTH / 2.0, 0.0, 0.0],
        ),
        speed: FuzzyScalar::proportional(30.0, 1.0),
        direction: FuzzyVector::irwin_hall([0.0, 0.5, 0.0], [0.8, 0.0, 0.0]),
        lifespan: FuzzyDouble::linear(6.5, 1.5),
        color: FuzzyColor {
            hue: FuzzyScalar::fixed(0.0),
            saturation: FuzzyScalar::fixed(1.0),
            luminance: FuzzyScalar::fixed(1.0),
        },
        ..Default::default()
    }
}

/// A flock of pale blue motes in a bounded box.
pub fn swarm(locality: Locality) -> SwarmConfig {
    SwarmConfig {
        particle_count: 500,
        particle_size: 3.0,
        boundaries: Vec3::new(WIDTH, HEIGHT, 512.0),
        boundary_threshold: 0.25,
        boundary_repulsion_rate: 3.0,
        speed_limits: SpeedLimits { min: 0.1, max: 2.0 },
        cohesion_rate: 0.03,
        velocity_consistency: 0.1,
        particle_distance: 20.0,
        repulsion_rate: 0.05,
        sight_radius: 100.0,
        global_acceleration: Vec3::ZERO,
        locality,
        color: FuzzyColor {
            hue: FuzzyScalar::fixed(210.0),
            saturation: FuzzyScalar::fixed(0.6),
            luminance: FuzzyScalar::linear(0.7, 0.2),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_pass_validation() {
        for config in fountains() {
            assert!(config.validate().is_ok());
        }
        assert!(snow().validate().is_ok());
        assert!(swarm(Locality::Hive).validate().is_ok());
        assert!(swarm(Locality::Flock).validate().is_ok());
    }

    #[test]
    fn central_fountain_starts_paused() {
        let row = fountains();
        assert!(!row[0].source_active);
        assert!(row.iter().skip(1).all(|c| c.source_active));
    }
}
