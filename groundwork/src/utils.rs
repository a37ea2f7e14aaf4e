//! Vector helpers shared by the surface model, the grounding classifier and the integrator.
//!
//! Every normalize or divide here is guarded: degenerate inputs produce a neutral value
//! (zero vector, unchanged input or `None`) instead of NaN.

use nalgebra::Unit;

use crate::collision::{
    settings::DIST_EPS,
    types::{UnitVec3, Vec3},
};

/// Squared horizontal length below which a direction has no meaningful yaw.
const YAW_EPS: f32 = 1.0e-8;

/// Angle in degrees between `normal` and world up. Zero for a zero vector.
pub fn slope_degrees(normal: Vec3) -> f32 {
    if normal.norm_squared() <= DIST_EPS * DIST_EPS {
        return 0.0;
    }
    normal.angle(&Vec3::y()).to_degrees()
}

/// Component of `v` perpendicular to `on_normal`.
pub fn rejection(v: Vec3, on_normal: Vec3) -> Vec3 {
    let len_sq = on_normal.norm_squared();
    if len_sq <= DIST_EPS * DIST_EPS {
        return v;
    }
    v - on_normal * (v.dot(&on_normal) / len_sq)
}

/// `v` with its vertical component removed.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Splits `v` into unit direction and magnitude. `None` for (near) zero vectors.
#[inline]
pub fn split(v: Vec3) -> Option<(UnitVec3, f32)> {
    Unit::try_new_and_get(v, DIST_EPS)
}

/// The step from `current` toward `target`, at most `max_delta` long.
pub fn move_delta(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let offset = target - current;
    let max_delta = max_delta.max(0.0);
    let len_sq = offset.norm_squared();
    if len_sq <= max_delta * max_delta {
        return offset;
    }
    offset * (max_delta / len_sq.sqrt())
}

/// Moves `current` toward `target` by at most `max_delta`, without overshooting.
#[inline]
pub fn move_towards_vec(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    current + move_delta(current, target, max_delta)
}

/// Scalar move-towards.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// `v` rescaled down to `max` if it is longer.
pub fn clamp_magnitude(v: Vec3, max: f32) -> Vec3 {
    let max = max.max(0.0);
    let len_sq = v.norm_squared();
    if len_sq <= max * max {
        return v;
    }
    v * (max / len_sq.sqrt())
}

/// Moves `point` vertically onto the plane through the origin with normal `plane_normal`.
///
/// The normal does not need to be normalized. A vertical plane leaves the point unchanged.
pub fn snap_point_to_plane_vertically(point: Vec3, plane_normal: Vec3) -> Vec3 {
    if plane_normal.y == 0.0 {
        return point;
    }
    let y = (-point.x * plane_normal.x - point.z * plane_normal.z) / plane_normal.y;
    Vec3::new(point.x, y, point.z)
}

/// Yaw in degrees of a direction's horizontal part: 0 along +Z, 90 along +X.
pub fn yaw_degrees(direction: Vec3) -> Option<f32> {
    if direction.x * direction.x + direction.z * direction.z <= YAW_EPS {
        return None;
    }
    Some(90.0 - direction.z.atan2(direction.x).to_degrees())
}

/// Friction deceleration available on a slope: `|g * cos(slope) * mu|`.
pub fn friction_acceleration_magnitude(slope_degrees: f32, gravity: f32, coefficient: f32) -> f32 {
    (gravity * slope_degrees.to_radians().cos() * coefficient).abs()
}

/// Quadratic air drag magnitude that balances `gravity` at `terminal_speed`.
pub fn drag_acceleration(speed: f32, terminal_speed: f32, gravity: f32) -> f32 {
    let terminal = f64::from(terminal_speed.max(0.001));
    let fraction = f64::from(speed) / terminal;
    (f64::from(gravity) * fraction * fraction).abs() as f32
}

/// Replaces non-finite components with zero.
pub fn fix_nans(v: Vec3) -> Vec3 {
    v.map(|c| if c.is_finite() { c } else { 0.0 })
}
