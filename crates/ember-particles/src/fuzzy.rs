//! Fuzzy value descriptors: a base value, a spread, and a distribution
//!
//! Everything an emitter or swarm randomizes (spawn position, launch
//! speed, lifespan, color) is described by one of these and sampled many
//! times against the engine's own RNG. Descriptors are immutable once
//! configured.

use ember_core::{Color, EmberError, Result, Vec3};

use crate::rng::EmberRng;

/// How a fuzzy value spreads around its base value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Distribution {
    /// Always returns the base value
    #[default]
    None,
    /// Uniform in `value ± variance / 2`
    Linear,
    /// Uniform in `value ± value / variance`.
    ///
    /// The half-width really is `value / variance`, dividing rather than
    /// multiplying. A percentage spread was presumably intended, but every
    /// shipped revision of this formula divides, so callers rely on it and
    /// it is kept verbatim.
    Proportional,
    /// Sum-of-twelve-uniforms bell curve, symmetric around the base value
    /// and bounded to `value ± variance`
    IrwinHall,
}

fn check_proportional(distribution: Distribution, variance: f64, field: &str) -> Result<()> {
    if distribution == Distribution::Proportional && variance == 0.0 {
        return Err(EmberError::Config(format!(
            "{field}: proportional variance of zero divides by zero"
        )));
    }
    Ok(())
}

/// A randomized scalar
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FuzzyScalar {
    pub value: f32,
    pub variance: f32,
    pub distribution: Distribution,
}

impl FuzzyScalar {
    pub const fn fixed(value: f32) -> Self {
        Self {
            value,
            variance: 0.0,
            distribution: Distribution::None,
        }
    }

    pub const fn linear(value: f32, variance: f32) -> Self {
        Self {
            value,
            variance,
            distribution: Distribution::Linear,
        }
    }

    pub const fn proportional(value: f32, variance: f32) -> Self {
        Self {
            value,
            variance,
            distribution: Distribution::Proportional,
        }
    }

    pub const fn irwin_hall(value: f32, variance: f32) -> Self {
        Self {
            value,
            variance,
            distribution: Distribution::IrwinHall,
        }
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        check_proportional(self.distribution, self.variance as f64, field)
    }

    pub fn sample(&self, rng: &mut EmberRng) -> f32 {
        match self.distribution {
            Distribution::None => self.value,
            Distribution::Linear => {
                let v = self.variance / 2.0;
                rng.range_f32(self.value - v, self.value + v)
            }
            Distribution::Proportional => {
                let v = self.value / self.variance;
                rng.range_f32(self.value - v, self.value + v)
            }
            Distribution::IrwinHall => self.value + self.variance * (rng.irwin_hall() / 6.0),
        }
    }
}

/// A randomized double-precision scalar. Lifespans stay in `f64` so the
/// per-tick `ttl` decrements don't erode over long-lived particles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FuzzyDouble {
    pub value: f64,
    pub variance: f64,
    pub distribution: Distribution,
}

impl FuzzyDouble {
    pub const fn fixed(value: f64) -> Self {
        Self {
            value,
            variance: 0.0,
            distribution: Distribution::None,
        }
    }

    pub const fn linear(value: f64, variance: f64) -> Self {
        Self {
            value,
            variance,
            distribution: Distribution::Linear,
        }
    }

    pub const fn proportional(value: f64, variance: f64) -> Self {
        Self {
            value,
            variance,
            distribution: Distribution::Proportional,
        }
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        check_proportional(self.distribution, self.variance, field)
    }

    pub fn sample(&self, rng: &mut EmberRng) -> f64 {
        match self.distribution {
            Distribution::None => self.value,
            Distribution::Linear => {
                let v = self.variance / 2.0;
                rng.range_f64(self.value - v, self.value + v)
            }
            Distribution::Proportional => {
                let v = self.value / self.variance;
                rng.range_f64(self.value - v, self.value + v)
            }
            Distribution::IrwinHall => {
                self.value + self.variance * (rng.irwin_hall() as f64 / 6.0)
            }
        }
    }
}

/// A randomized 3-vector, sampled per axis
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FuzzyVector {
    pub value: [f32; 3],
    pub variance: [f32; 3],
    pub distribution: Distribution,
}

impl FuzzyVector {
    pub const fn fixed(value: [f32; 3]) -> Self {
        Self {
            value,
            variance: [0.0; 3],
            distribution: Distribution::None,
        }
    }

    pub const fn linear(value: [f32; 3], variance: [f32; 3]) -> Self {
        Self {
            value,
            variance,
            distribution: Distribution::Linear,
        }
    }

    pub const fn irwin_hall(value: [f32; 3], variance: [f32; 3]) -> Self {
        Self {
            value,
            variance,
            distribution: Distribution::IrwinHall,
        }
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        if self.distribution == Distribution::Proportional {
            for (axis, &v) in self.variance.iter().enumerate() {
                if v == 0.0 {
                    return Err(EmberError::Config(format!(
                        "{field}[{axis}]: proportional variance of zero divides by zero"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn sample(&self, rng: &mut EmberRng) -> Vec3 {
        let mut out = [0.0f32; 3];
        for i in 0..3 {
            let axis = FuzzyScalar {
                value: self.value[i],
                variance: self.variance[i],
                distribution: self.distribution,
            };
            out[i] = axis.sample(rng);
        }
        Vec3::from_array(out)
    }
}

/// A randomized color, described as fuzzy HSL and sampled to RGBA.
/// Alpha is always 1.0 at spawn; the engine fades it afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyColor {
    pub hue: FuzzyScalar,
    pub saturation: FuzzyScalar,
    pub luminance: FuzzyScalar,
}

impl Default for FuzzyColor {
    fn default() -> Self {
        // White
        Self {
            hue: FuzzyScalar::fixed(0.0),
            saturation: FuzzyScalar::fixed(0.0),
            luminance: FuzzyScalar::fixed(1.0),
        }
    }
}

impl FuzzyColor {
    pub fn validate(&self, field: &str) -> Result<()> {
        self.hue.validate(&format!("{field}.hue"))?;
        self.saturation.validate(&format!("{field}.saturation"))?;
        self.luminance.validate(&format!("{field}.luminance"))
    }

    pub fn sample(&self, rng: &mut EmberRng) -> Color {
        Color::from_hsl(
            self.hue.sample(rng),
            self.saturation.sample(rng),
            self.luminance.sample(rng),
        )
    }
}
