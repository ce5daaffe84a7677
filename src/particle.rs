// Simple particle struct to keep track of individual position, velocity, size and color

use crate::color::{Color, Palette};
use crate::config::FieldConfig;
use glm::TVec2;
use rand::Rng;
use std::f64::consts::PI;

pub type Vec2 = TVec2<f64>;

#[derive(Copy, Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub color: Color,
    pub phase: f64,
}

impl Particle {
    pub fn new(
        pos_x: f64,
        pos_y: f64,
        vel_x: f64,
        vel_y: f64,
        radius: f64,
        color: Color,
    ) -> Particle {
        Particle {
            pos: glm::vec2(pos_x, pos_y),
            vel: glm::vec2(vel_x, vel_y),
            radius,
            color,
            phase: 0.0,
        }
    }

    // Uniform position inside the surface, small velocity, palette color picked per particle
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        width: f64,
        height: f64,
        config: &FieldConfig,
        palette: &Palette,
    ) -> Particle {
        let speed = config.initial_speed.abs();
        let (min_radius, max_radius) = config.radius_range();
        let color = if rng.gen::<bool>() {
            palette.primary
        } else {
            palette.secondary
        };
        let mut particle = Particle::new(
            rng.gen::<f64>() * width,
            rng.gen::<f64>() * height,
            (rng.gen::<f64>() * 2.0 - 1.0) * speed,
            (rng.gen::<f64>() * 2.0 - 1.0) * speed,
            min_radius + rng.gen::<f64>() * (max_radius - min_radius),
            color,
        );
        particle.phase = rng.gen::<f64>() * 2.0 * PI;
        particle
    }

    pub fn speed(&self) -> f64 {
        glm::length(&self.vel)
    }

    // A non-finite velocity is dropped rather than scaled
    pub fn clamp_speed(&mut self, max_speed: f64) {
        let speed = self.speed();
        if !speed.is_finite() {
            self.vel = glm::vec2(0.0, 0.0);
        } else if speed > max_speed && speed > 0.0 {
            self.vel *= max_speed / speed;
        }
    }

    // Oscillation in [-1, 1] driven by the phase accumulator
    pub fn pulse(&self) -> f64 {
        self.phase.sin()
    }

    pub fn drawn_radius(&self, amplitude: f64) -> f64 {
        (self.radius * (1.0 + amplitude * self.pulse())).max(0.0)
    }

    pub fn drawn_opacity(&self, amplitude: f64) -> f64 {
        (1.0 - amplitude * 0.5 * (1.0 - self.pulse())).max(0.0).min(1.0)
    }
}
