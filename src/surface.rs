// Drawing surface the field renders into. The browser backends live in
// canvas.rs, PixelSurface rasterizes into an RGBA buffer in memory.

use crate::color::Color;
use crate::particle::Vec2;
use std::convert::Infallible;

pub trait Surface {
    type Error;

    fn size(&self) -> (u32, u32);

    fn clear(&mut self) -> Result<(), Self::Error>;

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), Self::Error>;

    // Radial gradient from `color` at the center fading to transparent at `radius`
    fn fill_glow(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), Self::Error>;

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f64,
        color: Color,
    ) -> Result<(), Self::Error>;

    // Called once after every frame has been drawn
    fn present(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct PixelSurface {
    width: u32,
    height: u32,
    background: Color,
    pixel_data: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> PixelSurface {
        PixelSurface::with_background(width, height, Color::TRANSPARENT)
    }

    pub fn with_background(width: u32, height: u32, background: Color) -> PixelSurface {
        let width = width.max(1);
        let height = height.max(1);
        let mut surface = PixelSurface {
            width,
            height,
            background,
            pixel_data: vec![0x00; (width * height * 4) as usize],
        };
        surface.fill_background();
        surface
    }

    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.get_pixel_index(x, y).map(|idx| Color {
            r: self.pixel_data[idx],
            g: self.pixel_data[idx + 1],
            b: self.pixel_data[idx + 2],
            a: self.pixel_data[idx + 3],
        })
    }

    fn fill_background(&mut self) {
        let bg = self.background;
        for pixel in self.pixel_data.chunks_exact_mut(4) {
            pixel[0] = bg.r;
            pixel[1] = bg.g;
            pixel[2] = bg.b;
            pixel[3] = bg.a;
        }
    }

    fn get_pixel_index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(((y * self.width as i32 + x) * 4) as usize)
        } else {
            None
        }
    }

    // Source-over compositing of `color` scaled by `coverage` onto the pixel
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f64) {
        let idx = match self.get_pixel_index(x, y) {
            Some(idx) => idx,
            None => return,
        };
        let src_a = color.alpha() * coverage.max(0.0).min(1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst_a = self.pixel_data[idx + 3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mix = |src: u8, dst: u8| {
            let value = (src as f64 * src_a + dst as f64 * dst_a * (1.0 - src_a)) / out_a;
            value.round().max(0.0).min(255.0) as u8
        };
        self.pixel_data[idx] = mix(color.r, self.pixel_data[idx]);
        self.pixel_data[idx + 1] = mix(color.g, self.pixel_data[idx + 1]);
        self.pixel_data[idx + 2] = mix(color.b, self.pixel_data[idx + 2]);
        self.pixel_data[idx + 3] = (out_a * 255.0).round() as u8;
    }

    // Visits every pixel whose center lies within `radius` of `center`,
    // handing over the normalized distance from the center
    fn for_each_in_disc<F>(&mut self, center: Vec2, radius: f64, mut f: F)
    where
        F: FnMut(&mut Self, i32, i32, f64),
    {
        if radius <= 0.0 {
            return;
        }
        let min_x = (center.x - radius).floor().max(0.0) as i32;
        let max_x = (center.x + radius).ceil().min(self.width as f64 - 1.0) as i32;
        let min_y = (center.y - radius).floor().max(0.0) as i32;
        let max_y = (center.y + radius).ceil().min(self.height as f64 - 1.0) as i32;
        for pixel_y in min_y..=max_y {
            for pixel_x in min_x..=max_x {
                let dx = pixel_x as f64 + 0.5 - center.x;
                let dy = pixel_y as f64 + 0.5 - center.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance <= radius {
                    f(self, pixel_x, pixel_y, distance / radius);
                }
            }
        }
    }
}

impl Surface for PixelSurface {
    type Error = Infallible;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) -> Result<(), Infallible> {
        self.fill_background();
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), Infallible> {
        // at least one pixel so tiny particles stay visible
        let radius = radius.max(0.5);
        self.for_each_in_disc(center, radius, |surface, x, y, _| {
            surface.blend_pixel(x, y, color, 1.0)
        });
        Ok(())
    }

    fn fill_glow(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), Infallible> {
        self.for_each_in_disc(center, radius, |surface, x, y, t| {
            surface.blend_pixel(x, y, color, 1.0 - t)
        });
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f64,
        color: Color,
    ) -> Result<(), Infallible> {
        let delta = to - from;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as i32;
        let coverage = width.max(0.0).min(1.0);
        for step in 0..=steps {
            let point = from + delta * (step as f64 / steps as f64);
            self.blend_pixel(point.x.floor() as i32, point.y.floor() as i32, color, coverage);
        }
        Ok(())
    }
}
