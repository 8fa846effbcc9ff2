//! RGBA colors and the shared palette

/// An sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha multiplied by `factor` (clamped to 0-1)
    pub fn faded(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS `rgba()` string for canvas fill styles
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const SPACE: Color = Color::rgb(8, 10, 32);
    pub const OVERLAY: Color = Color::rgba(0, 0, 0, 0.7);
    pub const ERROR_RED: Color = Color::rgb(255, 90, 90);
    pub const SUN: Color = Color::rgb(255, 200, 60);
    pub const LASER: Color = Color::rgb(120, 255, 160);
    pub const ASTEROID: Color = Color::rgb(150, 120, 100);
    pub const HEALTH_GOOD: Color = Color::rgb(80, 220, 120);
    pub const HEALTH_LOW: Color = Color::rgb(240, 80, 80);
    pub const GOLD: Color = Color::rgb(255, 215, 0);
}

/// Planet palette, one entry per visual variant
pub const PLANET_COLORS: [Color; 9] = [
    Color::rgb(231, 76, 60),
    Color::rgb(230, 126, 34),
    Color::rgb(241, 196, 15),
    Color::rgb(46, 204, 113),
    Color::rgb(26, 188, 156),
    Color::rgb(52, 152, 219),
    Color::rgb(155, 89, 182),
    Color::rgb(236, 112, 160),
    Color::rgb(149, 165, 166),
];

/// Particle palette indexed by `Particle::color`
pub const PARTICLE_COLORS: [Color; 6] = [
    Color::rgb(255, 170, 60),  // explosion
    Color::rgb(255, 240, 120), // spark
    Color::rgb(120, 220, 255), // shield / power-up
    Color::rgb(255, 90, 90),   // damage
    Color::rgb(180, 120, 255), // super attack
    Color::rgb(120, 255, 160), // celebration
];
