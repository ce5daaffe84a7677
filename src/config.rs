// Tunables for a particle field, with named presets for the places the
// animation is mounted (hero scene, loading spinner, avatar ring)

use std::str::FromStr;
use wasm_bindgen::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ForceMode {
    Repel,
    Attract,
}

impl ForceMode {
    pub fn sign(self) -> f64 {
        match self {
            ForceMode::Repel => 1.0,
            ForceMode::Attract => -1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Preset {
    Hero,
    Loader,
    Avatar,
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hero" => Ok(Preset::Hero),
            "loader" | "loading" | "spinner" => Ok(Preset::Loader),
            "avatar" => Ok(Preset::Avatar),
            other => Err(format!("unknown particle field preset '{}'", other)),
        }
    }
}

#[wasm_bindgen]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub particle_count: u32,
    pub interaction_radius: f64,
    pub link_radius: f64,
    pub focal_link_radius: f64,
    // Substituted for the pointer distance when closer than this, keeps the impulse finite
    pub min_distance: f64,
    pub force_scale: f64,
    pub max_speed: f64,
    pub initial_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub glow_scale: f64,
    pub pulse_speed: f64,
    pub pulse_amplitude: f64,
    pub focal_pull: f64,
    #[wasm_bindgen(skip)]
    pub force_mode: ForceMode,
}

impl FieldConfig {
    pub fn preset(preset: Preset) -> FieldConfig {
        match preset {
            Preset::Hero => FieldConfig {
                particle_count: 80,
                interaction_radius: 120.0,
                link_radius: 100.0,
                focal_link_radius: 180.0,
                min_distance: 30.0,
                force_scale: 0.05,
                max_speed: 2.0,
                initial_speed: 0.5,
                min_radius: 1.0,
                max_radius: 3.0,
                glow_scale: 4.0,
                pulse_speed: 0.05,
                pulse_amplitude: 0.3,
                focal_pull: 0.0,
                force_mode: ForceMode::Repel,
            },
            Preset::Loader => FieldConfig {
                particle_count: 24,
                interaction_radius: 60.0,
                link_radius: 50.0,
                focal_link_radius: 90.0,
                min_distance: 30.0,
                force_scale: 0.03,
                max_speed: 2.0,
                initial_speed: 1.0,
                min_radius: 1.5,
                max_radius: 3.0,
                glow_scale: 3.0,
                pulse_speed: 0.1,
                pulse_amplitude: 0.5,
                focal_pull: 0.02,
                force_mode: ForceMode::Repel,
            },
            Preset::Avatar => FieldConfig {
                particle_count: 36,
                interaction_radius: 80.0,
                link_radius: 60.0,
                focal_link_radius: 120.0,
                min_distance: 30.0,
                force_scale: 0.04,
                max_speed: 2.0,
                initial_speed: 0.6,
                min_radius: 1.0,
                max_radius: 2.5,
                glow_scale: 3.5,
                pulse_speed: 0.04,
                pulse_amplitude: 0.2,
                focal_pull: 0.01,
                force_mode: ForceMode::Attract,
            },
        }
    }

    // Radius range with min <= max and both positive
    pub fn radius_range(&self) -> (f64, f64) {
        let min = self.min_radius.max(0.1);
        let max = self.max_radius.max(min);
        (min, max)
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig::preset(Preset::Hero)
    }
}

#[wasm_bindgen]
impl FieldConfig {
    // Unknown preset names fall back to the hero field
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str) -> FieldConfig {
        match preset.parse::<Preset>() {
            Ok(preset) => FieldConfig::preset(preset),
            Err(err) => {
                crate::warning!("{}, falling back to hero", err);
                FieldConfig::default()
            }
        }
    }

    pub fn with_particle_count(mut self, particle_count: u32) -> FieldConfig {
        self.particle_count = particle_count;
        self
    }

    pub fn with_interaction_radius(mut self, radius: f64) -> FieldConfig {
        self.interaction_radius = radius.max(0.0);
        self
    }

    pub fn with_link_radius(mut self, radius: f64) -> FieldConfig {
        self.link_radius = radius.max(0.0);
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> FieldConfig {
        self.max_speed = max_speed.max(0.0);
        self
    }

    pub fn with_attract(mut self, attract: bool) -> FieldConfig {
        self.force_mode = if attract {
            ForceMode::Attract
        } else {
            ForceMode::Repel
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_names_parse() {
        assert_eq!("Hero".parse::<Preset>(), Ok(Preset::Hero));
        assert_eq!(" spinner ".parse::<Preset>(), Ok(Preset::Loader));
        assert_eq!("avatar".parse::<Preset>(), Ok(Preset::Avatar));
        assert!("gallery".parse::<Preset>().is_err());
    }

    #[test]
    fn unknown_preset_falls_back_to_hero() {
        assert_eq!(FieldConfig::new("gallery"), FieldConfig::preset(Preset::Hero));
    }

    #[test]
    fn builder_overrides_preset_values() {
        let config = FieldConfig::new("loader")
            .with_particle_count(3)
            .with_max_speed(-1.0)
            .with_attract(true);
        assert_eq!(config.particle_count, 3);
        assert_eq!(config.max_speed, 0.0);
        assert_eq!(config.force_mode, ForceMode::Attract);
        assert_eq!(config.link_radius, 50.0);
    }

    #[test]
    fn radius_range_is_ordered() {
        let mut config = FieldConfig::default();
        config.min_radius = 4.0;
        config.max_radius = 2.0;
        assert_eq!(config.radius_range(), (4.0, 4.0));
    }
}
