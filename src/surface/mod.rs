//! Render surfaces
//!
//! A surface is a 2D drawing context resolved from a host identifier (a canvas
//! element id on the web, a registry key in headless runs). Engines own their
//! surface exclusively and never resize it.

pub mod color;

use glam::Vec2;

use crate::error::SurfaceError;

pub use color::Color;

/// Horizontal anchor for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Font size, fill and anchor for a text draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
}

impl TextStyle {
    pub const fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Center,
        }
    }

    pub const fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// The drawing operations engines need from a 2D context.
///
/// Every call may fail (lost context, detached canvas); engines propagate the
/// error to their frame boundary.
pub trait Canvas2d {
    /// Backing size in pixels
    fn size(&self) -> (f32, f32);

    /// Fill the whole surface
    fn clear(&mut self, color: Color) -> Result<(), SurfaceError>;

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) -> Result<(), SurfaceError>;

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<(), SurfaceError>;

    fn stroke_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        line_width: f32,
        color: Color,
    ) -> Result<(), SurfaceError>;

    fn fill_text(&mut self, text: &str, pos: Vec2, style: TextStyle) -> Result<(), SurfaceError>;

    /// Replace the surface's host container content with a plain message
    fn show_container_message(&mut self, text: &str) -> Result<(), SurfaceError>;
}

/// Resolves surface identifiers to drawing contexts
pub trait SurfaceProvider {
    fn resolve(&self, id: &str) -> Result<Box<dyn Canvas2d>, SurfaceError>;
}

/// A resolved, validated surface owned by one engine
pub struct RenderSurface {
    id: String,
    canvas: Box<dyn Canvas2d>,
    width: f32,
    height: f32,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl RenderSurface {
    /// Resolve `id` through `provider` and check the context is usable
    pub fn resolve(provider: &dyn SurfaceProvider, id: &str) -> Result<Self, SurfaceError> {
        let canvas = provider.resolve(id)?;
        let (width, height) = canvas.size();
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SurfaceError::InvalidSize {
                id: id.to_string(),
                width,
                height,
            });
        }
        Ok(Self {
            id: id.to_string(),
            canvas,
            width,
            height,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn canvas(&mut self) -> &mut dyn Canvas2d {
        self.canvas.as_mut()
    }

    /// Paint a dimmed banner with `text` across the middle of the surface
    pub fn paint_message(&mut self, text: &str) -> Result<(), SurfaceError> {
        let center = self.center();
        let banner = Vec2::new(self.width, 80.0_f32.min(self.height));
        self.canvas.fill_rect(
            Vec2::new(0.0, center.y - banner.y / 2.0),
            banner,
            Color::OVERLAY,
        )?;
        self.canvas
            .fill_text(text, center, TextStyle::new(20.0, Color::WHITE))
    }

    /// Replace the host container with `text`
    pub fn show_container_message(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.canvas.show_container_message(text)
    }
}
