// Browser side of the animator: owns the canvas element, the 2d context,
// the requestAnimationFrame closure and the pointer listeners.

use crate::animator::Animator;
use crate::color::{Color, Palette};
use crate::config::FieldConfig;
use crate::field::ParticleField;
use crate::particle::Vec2;
use crate::pointer::client_to_canvas;
use crate::surface::{PixelSurface, Surface};
use std::cell::RefCell;
use std::convert::Infallible;
use std::f64::consts::PI;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Element, HtmlCanvasElement, ImageData, MouseEvent, TouchEvent, Window,
};

// Draws with the 2d context's own paths and gradients
pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    pub fn new(context: CanvasRenderingContext2d, width: u32, height: u32) -> Self {
        CanvasSurface {
            context,
            width,
            height,
        }
    }
}

#[allow(deprecated)]
impl Surface for CanvasSurface {
    type Error = JsValue;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) -> Result<(), JsValue> {
        self.context
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), JsValue> {
        self.context.begin_path();
        self.context.arc(center.x, center.y, radius, 0.0, 2.0 * PI)?;
        self.context
            .set_fill_style(&JsValue::from_str(&color.to_string()));
        self.context.fill();
        Ok(())
    }

    fn fill_glow(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), JsValue> {
        if radius <= 0.0 {
            return Ok(());
        }
        let gradient = self
            .context
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)?;
        gradient.add_color_stop(0.0, &color.to_string())?;
        gradient.add_color_stop(1.0, &color.with_opacity(0.0).to_string())?;
        self.context.begin_path();
        self.context.arc(center.x, center.y, radius, 0.0, 2.0 * PI)?;
        self.context.set_fill_style(&gradient);
        self.context.fill();
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f64,
        color: Color,
    ) -> Result<(), JsValue> {
        self.context.begin_path();
        self.context.move_to(from.x, from.y);
        self.context.line_to(to.x, to.y);
        self.context.set_line_width(width);
        self.context
            .set_stroke_style(&JsValue::from_str(&color.to_string()));
        self.context.stroke();
        Ok(())
    }
}

// Rasterizes in wasm memory and blits the whole buffer once per frame
pub struct ImageDataSurface {
    context: CanvasRenderingContext2d,
    pixels: PixelSurface,
}

impl ImageDataSurface {
    pub fn new(context: CanvasRenderingContext2d, width: u32, height: u32) -> Self {
        ImageDataSurface {
            context,
            pixels: PixelSurface::new(width, height),
        }
    }
}

impl Surface for ImageDataSurface {
    type Error = JsValue;

    fn size(&self) -> (u32, u32) {
        self.pixels.size()
    }

    fn clear(&mut self) -> Result<(), JsValue> {
        infallible(self.pixels.clear())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), JsValue> {
        infallible(self.pixels.fill_circle(center, radius, color))
    }

    fn fill_glow(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), JsValue> {
        infallible(self.pixels.fill_glow(center, radius, color))
    }

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f64,
        color: Color,
    ) -> Result<(), JsValue> {
        infallible(self.pixels.stroke_line(from, to, width, color))
    }

    fn present(&mut self) -> Result<(), JsValue> {
        let (width, height) = self.pixels.size();
        let image_data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(self.pixels.pixel_data()),
            width,
            height,
        )?;
        self.context.put_image_data(&image_data, 0.0, 0.0)
    }
}

fn infallible(result: Result<(), Infallible>) -> Result<(), JsValue> {
    result.map_err(|never| match never {})
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    Vector,
    Pixels,
}

impl Backend {
    fn from_name(name: &str) -> Backend {
        match name {
            "pixels" | "imagedata" => Backend::Pixels,
            "vector" | "" => Backend::Vector,
            other => {
                crate::warning!("unknown render backend '{}', using vector", other);
                Backend::Vector
            }
        }
    }
}

pub enum BrowserSurface {
    Vector(CanvasSurface),
    Pixels(ImageDataSurface),
}

impl Surface for BrowserSurface {
    type Error = JsValue;

    fn size(&self) -> (u32, u32) {
        match self {
            BrowserSurface::Vector(s) => s.size(),
            BrowserSurface::Pixels(s) => s.size(),
        }
    }

    fn clear(&mut self) -> Result<(), JsValue> {
        match self {
            BrowserSurface::Vector(s) => s.clear(),
            BrowserSurface::Pixels(s) => s.clear(),
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), JsValue> {
        match self {
            BrowserSurface::Vector(s) => s.fill_circle(center, radius, color),
            BrowserSurface::Pixels(s) => s.fill_circle(center, radius, color),
        }
    }

    fn fill_glow(&mut self, center: Vec2, radius: f64, color: Color) -> Result<(), JsValue> {
        match self {
            BrowserSurface::Vector(s) => s.fill_glow(center, radius, color),
            BrowserSurface::Pixels(s) => s.fill_glow(center, radius, color),
        }
    }

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f64,
        color: Color,
    ) -> Result<(), JsValue> {
        match self {
            BrowserSurface::Vector(s) => s.stroke_line(from, to, width, color),
            BrowserSurface::Pixels(s) => s.stroke_line(from, to, width, color),
        }
    }

    fn present(&mut self) -> Result<(), JsValue> {
        match self {
            BrowserSurface::Vector(s) => s.present(),
            BrowserSurface::Pixels(s) => s.present(),
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type SharedAnimator = Rc<RefCell<Animator<BrowserSurface>>>;

struct Listener {
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

// Everything that only exists while mounted
struct Mounted {
    window: Window,
    canvas: HtmlCanvasElement,
    animator: SharedAnimator,
    frame_callback: FrameCallback,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
pub struct ParticleAnimator {
    mounted: Option<Mounted>,
    particle_count: u32,
    frames_at_teardown: u64,
}

#[wasm_bindgen]
impl ParticleAnimator {
    // Creates a canvas inside `container` and starts animating it. If the page
    // can't give us a 2d context the animator stays empty and never runs.
    pub fn mount(
        container: &Element,
        width: u32,
        height: u32,
        config: &FieldConfig,
        primary: &str,
        secondary: &str,
        backend: &str,
    ) -> ParticleAnimator {
        let palette = Palette::from_hex(primary, secondary);
        let backend = Backend::from_name(backend);
        match mount_canvas(container, width.max(1), height.max(1), *config, palette, backend) {
            Ok(mounted) => ParticleAnimator {
                mounted: Some(mounted),
                particle_count: config.particle_count,
                frames_at_teardown: 0,
            },
            Err(err) => {
                crate::warning!("particle field left empty: {:?}", err);
                ParticleAnimator::empty()
            }
        }
    }

    pub fn empty() -> ParticleAnimator {
        ParticleAnimator {
            mounted: None,
            particle_count: 0,
            frames_at_teardown: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mounted.is_none()
    }

    pub fn is_running(&self) -> bool {
        self.mounted
            .as_ref()
            .map_or(false, |m| m.animator.borrow().is_running())
    }

    pub fn frame_count(&self) -> f64 {
        let frames = self
            .mounted
            .as_ref()
            .map_or(self.frames_at_teardown, |m| m.animator.borrow().frame_count());
        frames as f64
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn on_pointer_move(&self, client_x: f64, client_y: f64) {
        if let Some(mounted) = &self.mounted {
            pointer_to_canvas(&mounted.canvas, &mounted.animator, client_x, client_y);
        }
    }

    pub fn reset_pointer(&self) {
        if let Some(mounted) = &self.mounted {
            mounted.animator.borrow_mut().reset_pointer();
        }
    }

    // Safe to call any number of times
    pub fn teardown(&mut self) {
        let mounted = match self.mounted.take() {
            Some(mounted) => mounted,
            None => return,
        };
        let (pending, frames) = {
            let mut animator = mounted.animator.borrow_mut();
            (animator.teardown(), animator.frame_count())
        };
        self.frames_at_teardown = frames;
        if let Some(handle) = pending {
            if let Err(err) = mounted.window.cancel_animation_frame(handle) {
                crate::warning!("cancel_animation_frame failed: {:?}", err);
            }
        }
        for listener in &mounted.listeners {
            let callback = listener.callback.as_ref().unchecked_ref();
            if let Err(err) = mounted
                .canvas
                .remove_event_listener_with_callback(listener.event, callback)
            {
                crate::warning!("removing {} listener failed: {:?}", listener.event, err);
            }
        }
        release_frame_callback(&mounted.frame_callback);
        mounted.canvas.remove();
        crate::log!("particle field stopped after {} frames", frames);
    }
}

impl Drop for ParticleAnimator {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn mount_canvas(
    container: &Element,
    width: u32,
    height: u32,
    config: FieldConfig,
    palette: Palette,
    backend: Backend,
) -> Result<Mounted, JsValue> {
    let window = web_sys::window().ok_or("no global window")?;
    let document = window.document().ok_or("window has no document")?;
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context = canvas
        .get_context("2d")?
        .ok_or("2d context unavailable")?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let surface = match backend {
        Backend::Vector => BrowserSurface::Vector(CanvasSurface::new(context, width, height)),
        Backend::Pixels => BrowserSurface::Pixels(ImageDataSurface::new(context, width, height)),
    };
    let mut rng = rand::thread_rng();
    let field = ParticleField::new(width, height, config, palette, &mut rng);
    let animator: SharedAnimator = Rc::new(RefCell::new(Animator::new(field, surface)));

    let listeners = attach_pointer_listeners(&canvas, &animator)?;
    container.append_child(&canvas)?;
    let frame_callback = match start_frame_loop(&window, &animator) {
        Ok(frame_callback) => frame_callback,
        Err(err) => {
            // listeners die with the closures, take the canvas out before they can fire
            canvas.remove();
            return Err(err);
        }
    };
    crate::log!(
        "particle field mounted: {}x{}, {} particles, {:?} backend",
        width,
        height,
        config.particle_count,
        backend
    );

    Ok(Mounted {
        window,
        canvas,
        animator,
        frame_callback,
        listeners,
    })
}

// The callback holds a handle to its own slot so it can request the next frame.
// Teardown empties the slot, which drops the closure and ends the loop.
fn start_frame_loop(window: &Window, animator: &SharedAnimator) -> Result<FrameCallback, JsValue> {
    let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
    let next_frame = frame_callback.clone();
    let loop_window = window.clone();
    let loop_animator = animator.clone();

    *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_timestamp: f64| {
        let keep_going = match loop_animator.borrow_mut().on_frame() {
            Ok(keep_going) => keep_going,
            Err(err) => {
                crate::warning!("particle field frame failed: {:?}", err);
                true
            }
        };
        if !keep_going {
            return;
        }
        if let Some(callback) = next_frame.borrow().as_ref() {
            match loop_window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                Ok(handle) => loop_animator.borrow_mut().schedule(handle),
                Err(err) => {
                    crate::warning!("request_animation_frame failed: {:?}", err);
                    loop_animator.borrow_mut().teardown();
                }
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let requested = match frame_callback.borrow().as_ref() {
        Some(callback) => window.request_animation_frame(callback.as_ref().unchecked_ref()),
        None => Err("frame callback missing".into()),
    };
    match requested {
        Ok(handle) => {
            animator.borrow_mut().schedule(handle);
            Ok(frame_callback)
        }
        Err(err) => {
            release_frame_callback(&frame_callback);
            Err(err)
        }
    }
}

// The closure keeps a clone of its own slot, emptying the slot breaks that cycle
fn release_frame_callback(frame_callback: &FrameCallback) {
    frame_callback.borrow_mut().take();
}

fn attach_pointer_listeners(
    canvas: &HtmlCanvasElement,
    animator: &SharedAnimator,
) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = Vec::new();

    let mouse_canvas = canvas.clone();
    let mouse_animator = animator.clone();
    listeners.push(Listener {
        event: "mousemove",
        callback: Closure::wrap(Box::new(move |event: web_sys::Event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let (x, y) = (event.client_x() as f64, event.client_y() as f64);
                pointer_to_canvas(&mouse_canvas, &mouse_animator, x, y);
            }
        }) as Box<dyn FnMut(web_sys::Event)>),
    });

    let touch_canvas = canvas.clone();
    let touch_animator = animator.clone();
    listeners.push(Listener {
        event: "touchmove",
        callback: Closure::wrap(Box::new(move |event: web_sys::Event| {
            let touch = event
                .dyn_ref::<TouchEvent>()
                .and_then(|event| event.touches().get(0));
            if let Some(touch) = touch {
                let (x, y) = (touch.client_x() as f64, touch.client_y() as f64);
                pointer_to_canvas(&touch_canvas, &touch_animator, x, y);
            }
        }) as Box<dyn FnMut(web_sys::Event)>),
    });

    for &event in &["mouseleave", "touchend"] {
        let leave_animator = animator.clone();
        listeners.push(Listener {
            event,
            callback: Closure::wrap(Box::new(move |_: web_sys::Event| {
                leave_animator.borrow_mut().reset_pointer();
            }) as Box<dyn FnMut(web_sys::Event)>),
        });
    }

    for listener in &listeners {
        let callback = listener.callback.as_ref().unchecked_ref();
        canvas.add_event_listener_with_callback(listener.event, callback)?;
    }
    Ok(listeners)
}

fn pointer_to_canvas(
    canvas: &HtmlCanvasElement,
    animator: &SharedAnimator,
    client_x: f64,
    client_y: f64,
) {
    let rect = canvas.get_bounding_client_rect();
    let (x, y) = client_to_canvas(
        client_x,
        client_y,
        (rect.left(), rect.top(), rect.width(), rect.height()),
        (canvas.width(), canvas.height()),
    );
    animator.borrow_mut().on_pointer_move(x, y);
}
