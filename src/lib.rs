// Decorative particle field for canvas backgrounds, loaders and avatars.
// Particles drift inside the canvas, bounce off its edges, react to the pointer
// and are linked to their neighbours and to the focal center.

extern crate nalgebra_glm as glm;

#[macro_use]
pub mod utils;

pub mod animator;
pub mod canvas;
pub mod color;
pub mod config;
pub mod field;
pub mod particle;
pub mod pointer;
pub mod surface;

use wasm_bindgen::prelude::*;

pub use animator::{Animator, LoopState};
pub use canvas::ParticleAnimator;
pub use color::{Color, Palette};
pub use config::{FieldConfig, ForceMode, Preset};
pub use field::ParticleField;
pub use particle::{Particle, Vec2};
pub use pointer::Pointer;
pub use surface::{PixelSurface, Surface};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
}
