//! Browser host: `<canvas>` surfaces, `setTimeout` timers and a
//! `requestAnimationFrame` driver.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::engine::{Engine, FrameClock, run_frame};
use crate::error::SurfaceError;
use crate::services::Timers;
use crate::surface::{Canvas2d, Color, SurfaceProvider, TextStyle};

fn js_reason(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// A canvas element and its 2D context
pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl WebCanvas {
    fn circle_path(&self, center: Vec2, radius: f32) -> Result<(), SurfaceError> {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .map_err(|e| SurfaceError::draw("arc", js_reason(e)))
    }
}

impl Canvas2d for WebCanvas {
    fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self, color: Color) -> Result<(), SurfaceError> {
        let (w, h) = self.size();
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
        Ok(())
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) -> Result<(), SurfaceError> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<(), SurfaceError> {
        self.circle_path(center, radius)?;
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
        Ok(())
    }

    fn stroke_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        line_width: f32,
        color: Color,
    ) -> Result<(), SurfaceError> {
        self.circle_path(center, radius)?;
        self.ctx.set_line_width(line_width as f64);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.stroke();
        Ok(())
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, style: TextStyle) -> Result<(), SurfaceError> {
        self.ctx.set_font(&format!("{}px sans-serif", style.size.round()));
        self.ctx.set_text_align(style.align.as_str());
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&style.color.to_css());
        self.ctx
            .fill_text(text, pos.x as f64, pos.y as f64)
            .map_err(|e| SurfaceError::draw("fill_text", js_reason(e)))
    }

    fn show_container_message(&mut self, text: &str) -> Result<(), SurfaceError> {
        let parent = self
            .canvas
            .parent_element()
            .ok_or_else(|| SurfaceError::draw("show_container_message", "canvas is detached"))?;
        parent.set_text_content(Some(text));
        Ok(())
    }
}

/// Resolves canvas element ids in the page
pub struct WebHost {
    document: Document,
}

impl WebHost {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }
}

impl SurfaceProvider for WebHost {
    fn resolve(&self, id: &str) -> Result<Box<dyn Canvas2d>, SurfaceError> {
        let canvas: HtmlCanvasElement = self
            .document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| SurfaceError::NotFound(id.to_string()))?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| SurfaceError::ContextUnavailable(id.to_string()))?;
        Ok(Box::new(WebCanvas { canvas, ctx }))
    }
}

/// `setTimeout`-backed timers
#[derive(Debug, Clone, Copy, Default)]
pub struct WebTimers;

impl Timers for WebTimers {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            log::warn!("no window; dropping timer");
            return;
        };
        let closure = Closure::once(move || task());
        let scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms.min(i32::MAX as u32) as i32,
        );
        if let Err(e) = scheduled {
            log::warn!("setTimeout failed: {}", js_reason(e));
        }
        closure.forget();
    }
}

/// Drive `engine` from `requestAnimationFrame` until it stops running
pub fn run_loop(engine: Rc<RefCell<dyn Engine>>) {
    let clock = Rc::new(RefCell::new(FrameClock::new()));
    request_animation_frame(engine, clock);
}

fn request_animation_frame(engine: Rc<RefCell<dyn Engine>>, clock: Rc<RefCell<FrameClock>>) {
    let Some(window) = web_sys::window() else {
        log::error!("no window; frame loop not started");
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(engine, clock, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(engine: Rc<RefCell<dyn Engine>>, clock: Rc<RefCell<FrameClock>>, time: f64) {
    let more = {
        let dt = clock.borrow_mut().tick(time);
        let mut engine = engine.borrow_mut();
        run_frame(&mut *engine, dt)
    };
    // stop() takes effect here: no further frame is requested
    if more {
        request_animation_frame(engine, clock);
    }
}
