//! Ember CLI - headless drivers for the particle simulations
//!
//! Each subcommand runs one of the demo scenes for a fixed number of
//! frames with a synthetic frame clock, printing population and spread
//! statistics as it goes. Useful for profiling and for eyeballing engine
//! behavior without a renderer attached.

mod presets;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ember_core::Vec3;
use ember_particles::{Emitter, EmitterConfig, EmberRng, Locality, Swarm};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Headless drivers for the Ember particle engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// A row of five pulsing particle fountains
    Fountain {
        /// Number of frames to simulate
        #[arg(long, default_value_t = 600)]
        frames: u32,

        /// Synthetic frame rate driving the simulation
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// RNG seed; a fixed seed reproduces a run exactly
        #[arg(long, default_value_t = 1)]
        seed: u32,
    },

    /// Falling snow with wind and spawn rate animated per frame
    Snow {
        #[arg(long, default_value_t = 600)]
        frames: u32,

        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        #[arg(long, default_value_t = 1)]
        seed: u32,

        /// Emitter preset TOML replacing the built-in scene
        #[arg(long)]
        preset: Option<PathBuf>,
    },

    /// A flocking swarm in a bounded box
    Swarm {
        #[arg(long, default_value_t = 600)]
        frames: u32,

        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        #[arg(long, default_value_t = 1)]
        seed: u32,

        /// Whether rules average over the whole swarm or a local
        /// neighborhood
        #[arg(long, value_enum, default_value_t = LocalityArg::Flock)]
        locality: LocalityArg,

        /// Override the preset's particle count
        #[arg(long)]
        particles: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LocalityArg {
    Hive,
    Flock,
}

impl From<LocalityArg> for Locality {
    fn from(arg: LocalityArg) -> Self {
        match arg {
            LocalityArg::Hive => Locality::Hive,
            LocalityArg::Flock => Locality::Flock,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let fps = match &cli.command {
        Commands::Fountain { fps, .. } | Commands::Snow { fps, .. } | Commands::Swarm { fps, .. } => *fps,
    };
    anyhow::ensure!(fps >= 1.0, "--fps must be at least 1");

    match cli.command {
        Commands::Fountain { frames, fps, seed } => run_fountain(frames, fps, seed),
        Commands::Snow {
            frames,
            fps,
            seed,
            preset,
        } => run_snow(frames, fps, seed, preset),
        Commands::Swarm {
            frames,
            fps,
            seed,
            locality,
            particles,
        } => run_swarm(frames, fps, seed, locality.into(), particles),
    }
}

fn run_fountain(frames: u32, fps: f64, seed: u32) -> Result<()> {
    let mut emitters = presets::fountains()
        .into_iter()
        .enumerate()
        .map(|(i, config)| Emitter::with_seed(config, seed.wrapping_add(i as u32)))
        .collect::<ember_core::Result<Vec<_>>>()
        .context("invalid fountain preset")?;

    println!("[ember] fountain: {} emitters, {frames} frames", emitters.len());

    let dt = 1.0 / fps;
    for frame in 0..frames {
        // Pulse the three main jets every two seconds
        if frame > 0 && frame % (fps as u32 * 2) == 0 {
            for emitter in emitters.iter_mut().take(3) {
                let active = emitter.config().source_active;
                emitter.set_source_active(!active);
            }
        }

        for emitter in emitters.iter_mut() {
            emitter.tick(dt);
        }

        if frame % (fps as u32) == 0 {
            let total: usize = emitters.iter().map(|e| e.active_count()).sum();
            println!("[ember] t={:6.2}s active={total}", frame as f64 * dt);
        }
    }

    let total: usize = emitters.iter().map(|e| e.active_count()).sum();
    println!("[ember] done, {total} particles live");
    Ok(())
}

fn run_snow(frames: u32, fps: f64, seed: u32, preset: Option<PathBuf>) -> Result<()> {
    let config = match preset {
        Some(path) => load_emitter_preset(&path)?,
        None => presets::snow(),
    };
    let mut emitter = Emitter::with_seed(config, seed).context("invalid snow preset")?;

    println!(
        "[ember] snow: {} slots, {frames} frames",
        emitter.capacity()
    );

    // Wind direction and flurry intensity drift over time
    let mut gust = EmberRng::new(seed ^ 0x5EED);
    let mut flurry_phase = 0.0f64;

    let dt = 1.0 / fps;
    for frame in 0..frames {
        let t = frame as f64 * dt;
        emitter.set_acceleration(Vec3::new(
            15.0 * (0.25 * t).sin() as f32,
            40.0,
            0.0,
        ));
        flurry_phase += gust.range_f64(0.0, 0.005);
        emitter.set_new_particles_per_ms(30.0 + (300.0 * flurry_phase.sin()).abs());

        emitter.tick(dt);

        if frame % (fps as u32) == 0 {
            println!(
                "[ember] t={t:6.2}s active={}/{}",
                emitter.active_count(),
                emitter.capacity()
            );
        }
    }

    println!("[ember] done, {} particles live", emitter.active_count());
    Ok(())
}

fn run_swarm(
    frames: u32,
    fps: f64,
    seed: u32,
    locality: Locality,
    particles: Option<usize>,
) -> Result<()> {
    let mut config = presets::swarm(locality);
    if let Some(count) = particles {
        config.particle_count = count;
    }
    let mut swarm = Swarm::with_seed(config, seed).context("invalid swarm preset")?;

    println!(
        "[ember] swarm: {} particles, {frames} frames",
        swarm.particle_count()
    );

    let dt = 1.0 / fps;
    let mut ticks = 0u32;
    for frame in 0..frames {
        ticks += swarm.advance(dt);

        if frame % (fps as u32) == 0 {
            let (centroid, spread) = cloud_stats(&swarm);
            println!(
                "[ember] t={:6.2}s ticks={ticks} centroid=({:.0}, {:.0}, {:.0}) spread={spread:.0}",
                frame as f64 * dt,
                centroid.x,
                centroid.y,
                centroid.z
            );
        }
    }

    println!("[ember] done after {ticks} simulation steps");
    Ok(())
}

/// Mean position and RMS distance from it, from the published vertices
fn cloud_stats(swarm: &Swarm) -> (Vec3, f32) {
    let frame = swarm.frame();
    let count = frame.vertex_count.max(1) as f32;

    let mut centroid = Vec3::ZERO;
    for v in frame.vertices {
        centroid += Vec3::from_array(v.position);
    }
    centroid = centroid * (1.0 / count);

    let mut variance = 0.0;
    for v in frame.vertices {
        let d = Vec3::from_array(v.position) - centroid;
        variance += d.length() * d.length();
    }

    (centroid, (variance / count).sqrt())
}

fn load_emitter_preset(path: &PathBuf) -> Result<EmitterConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read preset {}", path.display()))?;
    EmitterConfig::from_toml_str(&text)
        .with_context(|| format!("failed to parse preset {}", path.display()))
}
