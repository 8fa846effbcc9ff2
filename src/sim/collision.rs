//! Circle collision tests
//!
//! Every arcade entity is treated as a circle; that is all the precision a
//! falling-rocks shooter needs.

use glam::Vec2;

/// Result of a circle overlap check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the second circle toward the first
    pub normal: Vec2,
    /// Overlap depth (> 0 when touching)
    pub penetration: f32,
}

/// Overlap between two circles, if any
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let delta = a_pos - b_pos;
    let reach = a_radius + b_radius;
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    Some(Contact {
        normal: if dist > f32::EPSILON { delta / dist } else { Vec2::Y },
        penetration: reach - dist,
    })
}

#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    circle_contact(a_pos, a_radius, b_pos, b_radius).is_some()
}

/// Whether `point` lies inside the circle (boundary inclusive)
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Whether a circle lies entirely outside the `[0, width] × [0, height]` box
pub fn outside_bounds(pos: Vec2, radius: f32, width: f32, height: f32) -> bool {
    pos.x + radius < 0.0
        || pos.x - radius > width
        || pos.y + radius < 0.0
        || pos.y - radius > height
}
