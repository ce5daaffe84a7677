// Frame loop bookkeeping around a particle field. The browser side asks for
// animation frames and hands the handles in here; this type decides whether a
// frame should run and what has to be cancelled on teardown.

use crate::field::ParticleField;
use crate::pointer::Pointer;
use crate::surface::Surface;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running { handle: i32 },
}

pub struct Animator<S: Surface> {
    field: ParticleField,
    pointer: Pointer,
    surface: S,
    state: LoopState,
    frames: u64,
}

impl<S: Surface> Animator<S> {
    pub fn new(field: ParticleField, surface: S) -> Self {
        let pointer = Pointer::centered(field.width() as f64, field.height() as f64);
        Animator {
            field,
            pointer,
            surface,
            state: LoopState::Stopped,
            frames: 0,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    // Stopped -> Running, or a fresh handle for the next frame while running
    pub fn schedule(&mut self, handle: i32) {
        self.state = LoopState::Running { handle };
    }

    // Runs one frame if the loop is live. Returns false once stopped, in which
    // case the caller must not request another frame.
    pub fn on_frame(&mut self) -> Result<bool, S::Error> {
        if !self.is_running() {
            return Ok(false);
        }
        self.frames += 1;
        self.field.update(&self.pointer);
        self.field.render(&mut self.surface)?;
        Ok(true)
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer.move_to(x, y);
    }

    pub fn reset_pointer(&mut self) {
        self.pointer.reset();
    }

    // Running -> Stopped. Hands back the pending frame handle the first time,
    // None on every later call.
    pub fn teardown(&mut self) -> Option<i32> {
        match std::mem::replace(&mut self.state, LoopState::Stopped) {
            LoopState::Running { handle } => Some(handle),
            LoopState::Stopped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;
    use crate::config::{FieldConfig, Preset};
    use crate::surface::PixelSurface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn animator() -> Animator<PixelSurface> {
        let mut rng = StdRng::seed_from_u64(3);
        let config = FieldConfig::preset(Preset::Avatar).with_particle_count(5);
        let field = ParticleField::new(64, 48, config, Palette::default(), &mut rng);
        Animator::new(field, PixelSurface::new(64, 48))
    }

    #[test]
    fn stopped_until_scheduled() {
        let mut animator = animator();
        assert_eq!(animator.state(), LoopState::Stopped);
        assert_eq!(animator.on_frame(), Ok(false));
        assert_eq!(animator.frame_count(), 0);

        animator.schedule(1);
        assert!(animator.is_running());
        assert_eq!(animator.on_frame(), Ok(true));
        animator.schedule(2);
        assert_eq!(animator.on_frame(), Ok(true));
        assert_eq!(animator.frame_count(), 2);
        assert_eq!(animator.state(), LoopState::Running { handle: 2 });
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut animator = animator();
        animator.schedule(7);
        assert_eq!(animator.teardown(), Some(7));
        assert_eq!(animator.teardown(), None);
        assert!(!animator.is_running());
        // a late frame callback does nothing
        assert_eq!(animator.on_frame(), Ok(false));
        assert_eq!(animator.frame_count(), 0);
    }

    #[test]
    fn teardown_before_start_is_harmless() {
        let mut animator = animator();
        assert_eq!(animator.teardown(), None);
        assert_eq!(animator.state(), LoopState::Stopped);
    }

    #[test]
    fn pointer_defaults_to_center_and_follows_moves() {
        let mut animator = animator();
        assert_eq!(animator.pointer().pos, glm::vec2(32.0, 24.0));
        animator.on_pointer_move(5.0, 6.0);
        assert_eq!(animator.pointer().pos, glm::vec2(5.0, 6.0));
        animator.reset_pointer();
        assert!(animator.pointer().is_home());
    }

    #[test]
    fn frames_draw_into_surface() {
        let mut animator = animator();
        animator.schedule(1);
        animator.on_frame().unwrap();
        assert!(animator.surface().pixel_data().chunks(4).any(|p| p[3] > 0));
        assert_eq!(animator.field().particles().len(), 5);
    }
}
