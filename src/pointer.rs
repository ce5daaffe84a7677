// Last known pointer location in canvas pixels, the force source for the field.
// Sits on the focal center until the user interacts with the canvas.

use crate::particle::Vec2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pointer {
    pub pos: Vec2,
    home: Vec2,
}

impl Pointer {
    pub fn centered(width: f64, height: f64) -> Self {
        let home = glm::vec2(width / 2.0, height / 2.0);
        Pointer { pos: home, home }
    }

    pub fn at(x: f64, y: f64) -> Self {
        let pos = glm::vec2(x, y);
        Pointer { pos, home: pos }
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.pos = glm::vec2(x, y);
    }

    pub fn reset(&mut self) {
        self.pos = self.home;
    }

    pub fn is_home(&self) -> bool {
        self.pos == self.home
    }

    pub fn distance_to(&self, point: &Vec2) -> f64 {
        glm::distance(&self.pos, point)
    }
}

// Client (viewport) coordinates to canvas pixel coordinates. `rect` is the canvas
// bounding client rect as (left, top, css width, css height), `size` the canvas
// pixel dimensions, which differ from the css box when the canvas is scaled.
pub fn client_to_canvas(
    client_x: f64,
    client_y: f64,
    rect: (f64, f64, f64, f64),
    size: (u32, u32),
) -> (f64, f64) {
    let (left, top, css_width, css_height) = rect;
    let scale_x = if css_width > 0.0 { size.0 as f64 / css_width } else { 1.0 };
    let scale_y = if css_height > 0.0 { size.1 as f64 / css_height } else { 1.0 };
    ((client_x - left) * scale_x, (client_y - top) * scale_y)
}
