// The particle field: a fixed set of particles drifting over a bounded surface,
// pushed around by the pointer and linked to each other and to the focal center.

use crate::color::{Color, Palette};
use crate::config::FieldConfig;
use crate::particle::{Particle, Vec2};
use crate::pointer::Pointer;
use crate::surface::Surface;
use crate::utils::Timer;
use rand::Rng;

const LINK_WIDTH: f64 = 0.6;
const FOCAL_LINK_WIDTH: f64 = 0.4;
// Links are drawn fainter than the particles themselves
const LINK_OPACITY: f64 = 0.5;
// Lower bound on the pointer distance divisor whatever min_distance is set to
const DISTANCE_FLOOR: f64 = 1.0;

pub struct ParticleField {
    width: u32,
    height: u32,
    config: FieldConfig,
    palette: Palette,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        config: FieldConfig,
        palette: Palette,
        rng: &mut R,
    ) -> ParticleField {
        let width = width.max(1);
        let height = height.max(1);
        let particles = (0..config.particle_count)
            .map(|_| Particle::random(rng, width as f64, height as f64, &config, &palette))
            .collect();
        ParticleField {
            width,
            height,
            config,
            palette,
            particles,
        }
    }

    // Field with caller-placed particles, positions are pulled into bounds
    pub fn from_particles(
        width: u32,
        height: u32,
        config: FieldConfig,
        palette: Palette,
        mut particles: Vec<Particle>,
    ) -> ParticleField {
        let width = width.max(1);
        let height = height.max(1);
        for particle in &mut particles {
            particle.pos.x = particle.pos.x.max(0.0).min(width as f64);
            particle.pos.y = particle.pos.y.max(0.0).min(height as f64);
        }
        ParticleField {
            width,
            height,
            config,
            palette,
            particles,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn focal_center(&self) -> Vec2 {
        glm::vec2(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    // Advances every particle by one frame
    pub fn update(&mut self, pointer: &Pointer) {
        let _timer = Timer::new("ParticleField::update()");
        let width = self.width as f64;
        let height = self.height as f64;
        let center = self.focal_center();
        let config = &self.config;
        let distance_floor = config.min_distance.max(DISTANCE_FLOOR);
        for particle in &mut self.particles {
            particle.pos += particle.vel;

            if particle.pos.x < 0.0 || particle.pos.x > width {
                particle.vel.x *= -1.0;
                particle.pos.x = particle.pos.x.max(0.0).min(width);
            }
            if particle.pos.y < 0.0 || particle.pos.y > height {
                particle.vel.y *= -1.0;
                particle.pos.y = particle.pos.y.max(0.0).min(height);
            }

            let distance = pointer.distance_to(&particle.pos);
            if distance < config.interaction_radius {
                let force = config.interaction_radius / distance.max(distance_floor);
                let angle =
                    (particle.pos.y - pointer.pos.y).atan2(particle.pos.x - pointer.pos.x);
                let impulse = force * config.force_scale * config.force_mode.sign();
                particle.vel += glm::vec2(angle.cos(), angle.sin()) * impulse;
            }

            if config.focal_pull > 0.0 {
                let to_center = center - particle.pos;
                let distance_from_center = glm::length(&to_center);
                if distance_from_center > 0.0 {
                    particle.vel += to_center * (config.focal_pull / distance_from_center);
                }
            }

            particle.clamp_speed(config.max_speed);
            particle.phase += config.pulse_speed;
        }
    }

    // Draws one frame: links first, particles over them
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let _timer = Timer::new("ParticleField::render()");
        surface.clear()?;

        let center = self.focal_center();
        let focal_color = self.palette.blend();
        if self.config.focal_link_radius > 0.0 {
            for particle in &self.particles {
                let distance = glm::distance(&particle.pos, &center);
                if let Some(opacity) = link_opacity(distance, self.config.focal_link_radius) {
                    surface.stroke_line(
                        particle.pos,
                        center,
                        FOCAL_LINK_WIDTH,
                        focal_color.with_opacity(opacity * LINK_OPACITY),
                    )?;
                }
            }
        }

        if self.config.link_radius > 0.0 {
            for (i, a) in self.particles.iter().enumerate() {
                for b in &self.particles[i + 1..] {
                    let distance = glm::distance(&a.pos, &b.pos);
                    if let Some(opacity) = link_opacity(distance, self.config.link_radius) {
                        let color = a.color.with_opacity(opacity * LINK_OPACITY);
                        surface.stroke_line(a.pos, b.pos, LINK_WIDTH, color)?;
                    }
                }
            }
        }

        let amplitude = self.config.pulse_amplitude;
        for particle in &self.particles {
            let radius = particle.drawn_radius(amplitude);
            let color: Color = particle.color.with_opacity(particle.drawn_opacity(amplitude));
            let glow_radius = radius * self.config.glow_scale;
            surface.fill_glow(particle.pos, glow_radius, color.with_opacity(0.4))?;
            surface.fill_circle(particle.pos, radius, color)?;
        }

        surface.present()
    }
}

// 1 - d/r inside the radius, nothing at or beyond it
fn link_opacity(distance: f64, radius: f64) -> Option<f64> {
    if distance < radius {
        Some(1.0 - distance / radius)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ForceMode, Preset};
    use crate::surface::PixelSurface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::convert::Infallible;

    fn still_config() -> FieldConfig {
        let mut config = FieldConfig::preset(Preset::Hero);
        config.force_scale = 1.0;
        config.max_speed = 2.0;
        config.interaction_radius = 100.0;
        config.min_distance = 30.0;
        config.focal_pull = 0.0;
        config
    }

    fn single(x: f64, y: f64, vx: f64, vy: f64, config: FieldConfig) -> ParticleField {
        let particle = Particle::new(x, y, vx, vy, 2.0, Color::from_u32(0xffffffff));
        ParticleField::from_particles(100, 100, config, Palette::default(), vec![particle])
    }

    #[derive(Default)]
    struct Recorder {
        clears: usize,
        circles: Vec<(Vec2, f64)>,
        glows: usize,
        lines: Vec<(Vec2, Vec2, Color)>,
        presents: usize,
    }

    impl Surface for Recorder {
        type Error = Infallible;

        fn size(&self) -> (u32, u32) {
            (100, 100)
        }

        fn clear(&mut self) -> Result<(), Infallible> {
            self.clears += 1;
            Ok(())
        }

        fn fill_circle(&mut self, center: Vec2, radius: f64, _: Color) -> Result<(), Infallible> {
            self.circles.push((center, radius));
            Ok(())
        }

        fn fill_glow(&mut self, _: Vec2, _: f64, _: Color) -> Result<(), Infallible> {
            self.glows += 1;
            Ok(())
        }

        fn stroke_line(
            &mut self,
            from: Vec2,
            to: Vec2,
            _: f64,
            color: Color,
        ) -> Result<(), Infallible> {
            self.lines.push((from, to, color));
            Ok(())
        }

        fn present(&mut self) -> Result<(), Infallible> {
            self.presents += 1;
            Ok(())
        }
    }

    #[test]
    fn seeds_requested_count_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = FieldConfig::preset(Preset::Loader).with_particle_count(17);
        let field = ParticleField::new(0, 50, config, Palette::default(), &mut rng);
        assert_eq!(field.width(), 1);
        assert_eq!(field.particles().len(), 17);
        assert!(field.particles().iter().all(|p| p.pos.x <= 1.0 && p.pos.y <= 50.0));
    }

    #[test]
    fn particles_never_escape_and_never_speed_up() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut config = FieldConfig::preset(Preset::Hero);
        config.initial_speed = 5.0;
        config.force_scale = 3.0;
        let mut field = ParticleField::new(160, 90, config, Palette::default(), &mut rng);
        let mut pointer = Pointer::centered(160.0, 90.0);
        let count = field.particles().len();
        for frame in 0..2000 {
            if frame % 50 == 0 {
                pointer.move_to(rng.gen::<f64>() * 160.0, rng.gen::<f64>() * 90.0);
            }
            field.update(&pointer);
            for p in field.particles() {
                assert!(p.pos.x >= 0.0 && p.pos.x <= 160.0, "x escaped: {}", p.pos.x);
                assert!(p.pos.y >= 0.0 && p.pos.y <= 90.0, "y escaped: {}", p.pos.y);
                assert!(p.speed() <= config.max_speed + 1e-9);
            }
        }
        assert_eq!(field.particles().len(), count);
    }

    #[test]
    fn pointer_on_particle_stays_finite() {
        let mut field = single(50.0, 50.0, 0.0, 0.0, still_config());
        // the particle lands exactly on the pointer after integration
        let pointer = Pointer::at(50.0, 50.0);
        field.update(&pointer);
        let p = field.particles()[0];
        assert!(p.vel.x.is_finite() && p.vel.y.is_finite());
        assert!(p.speed() > 0.0);
        assert!(p.speed() <= 2.0 + 1e-9);
    }

    #[test]
    fn zero_min_distance_still_has_a_floor() {
        let mut config = FieldConfig::preset(Preset::Hero);
        config.min_distance = 0.0;
        let mut field = single(50.0, 50.0, 0.0, 0.0, config);
        let pointer = Pointer::at(50.0, 50.0);
        for _ in 0..3 {
            field.update(&pointer);
            let p = field.particles()[0];
            assert!(p.vel.x.is_finite() && p.vel.y.is_finite());
            assert!(p.pos.x >= 0.0 && p.pos.x <= 100.0);
            assert!(p.pos.y >= 0.0 && p.pos.y <= 100.0);
            assert!(p.speed() <= config.max_speed + 1e-9);
        }
    }

    #[test]
    fn oversized_seed_velocity_is_clamped_on_first_frame() {
        let mut field = single(50.0, 50.0, 3.0, 0.0, still_config());
        // pointer far outside the interaction radius
        let pointer = Pointer::at(-1000.0, -1000.0);
        field.update(&pointer);
        let p = field.particles()[0];
        assert!(p.speed() <= 2.0 + 1e-9);
        assert!((p.vel.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn reflects_off_right_edge() {
        let mut field = single(99.0, 50.0, 2.0, 0.0, still_config());
        let pointer = Pointer::at(-1000.0, -1000.0);
        field.update(&pointer);
        let p = field.particles()[0];
        assert!(p.pos.x >= 100.0 - 1e-9);
        assert_eq!(p.vel.x, -2.0);
        field.update(&pointer);
        assert_eq!(field.particles()[0].pos.x, 98.0);
    }

    #[test]
    fn pointer_repels_along_positive_x() {
        let mut field = single(5.0, 0.0, 0.0, 0.0, still_config());
        let pointer = Pointer::at(0.0, 0.0);
        field.update(&pointer);
        let p = field.particles()[0];
        assert!(p.vel.x > 0.0);
        assert!(p.vel.y.abs() < 1e-9);
    }

    #[test]
    fn attract_mode_pulls_toward_pointer() {
        let mut config = still_config();
        config.force_mode = ForceMode::Attract;
        let mut field = single(60.0, 50.0, 0.0, 0.0, config);
        field.update(&Pointer::at(50.0, 50.0));
        assert!(field.particles()[0].vel.x < 0.0);
    }

    #[test]
    fn focal_pull_moves_toward_center() {
        let mut config = still_config();
        config.focal_pull = 0.1;
        config.interaction_radius = 0.0;
        let mut field = single(10.0, 50.0, 0.0, 0.0, config);
        field.update(&Pointer::at(0.0, 0.0));
        assert!(field.particles()[0].vel.x > 0.0);
    }

    #[test]
    fn phase_accumulates() {
        let mut field = single(50.0, 50.0, 0.0, 0.0, still_config());
        let pointer = Pointer::at(-1000.0, -1000.0);
        for _ in 0..10 {
            field.update(&pointer);
        }
        assert!((field.particles()[0].phase - 10.0 * still_config().pulse_speed).abs() < 1e-9);
    }

    #[test]
    fn render_links_close_particles_only() {
        let mut config = still_config();
        config.link_radius = 20.0;
        config.focal_link_radius = 0.0;
        let white = Color::from_u32(0xffffffff);
        let particles = vec![
            Particle::new(10.0, 10.0, 0.0, 0.0, 2.0, white),
            Particle::new(20.0, 10.0, 0.0, 0.0, 2.0, white),
            Particle::new(90.0, 90.0, 0.0, 0.0, 2.0, white),
        ];
        let field = ParticleField::from_particles(100, 100, config, Palette::default(), particles);
        let mut recorder = Recorder::default();
        field.render(&mut recorder).unwrap();

        assert_eq!(recorder.clears, 1);
        assert_eq!(recorder.presents, 1);
        assert_eq!(recorder.circles.len(), 3);
        assert_eq!(recorder.glows, 3);
        assert_eq!(recorder.lines.len(), 1);
        let (from, to, color) = recorder.lines[0];
        assert_eq!(from, glm::vec2(10.0, 10.0));
        assert_eq!(to, glm::vec2(20.0, 10.0));
        // half way into the link radius: 1 - 10/20, then the link dimming
        assert_eq!(color.a, (255.0_f64 * 0.5 * LINK_OPACITY).round() as u8);
    }

    #[test]
    fn render_links_to_focal_center() {
        let mut config = still_config();
        config.link_radius = 0.0;
        config.focal_link_radius = 30.0;
        let white = Color::from_u32(0xffffffff);
        let particles = vec![
            Particle::new(45.0, 50.0, 0.0, 0.0, 2.0, white),
            Particle::new(0.0, 0.0, 0.0, 0.0, 2.0, white),
        ];
        let field = ParticleField::from_particles(100, 100, config, Palette::default(), particles);
        let mut recorder = Recorder::default();
        field.render(&mut recorder).unwrap();
        assert_eq!(recorder.lines.len(), 1);
        assert_eq!(recorder.lines[0].1, field.focal_center());
    }

    #[test]
    fn render_paints_particles_into_pixels() {
        let mut config = still_config();
        config.pulse_amplitude = 0.0;
        let particle = Particle::new(30.0, 30.0, 0.0, 0.0, 3.0, Color::from_u32(0xff0000ff));
        let field =
            ParticleField::from_particles(60, 60, config, Palette::default(), vec![particle]);
        let mut surface = PixelSurface::new(60, 60);
        field.render(&mut surface).unwrap();
        let center = surface.pixel(30, 30).unwrap();
        assert_eq!((center.r, center.a), (255, 255));
        assert_eq!(surface.pixel(2, 2).unwrap().a, 0);
    }
}
