//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the types that all other Ember crates depend on:
//! - `Vec3` - 3-component vector math for positions, velocities and forces
//! - `Color` - RGBA color
//! - Error types and Result alias

mod error;
mod types;

pub use error::{EmberError, Result};
pub use types::{Color, Vec3};
