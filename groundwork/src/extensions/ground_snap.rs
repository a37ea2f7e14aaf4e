//! Downward pull that keeps a running character glued to ramps and stairs instead of
//! briefly free falling over every change of slope.

use crate::{
    collision::{query::SceneQuery, types::Vec3},
    motor::{CharacterBody, CharacterMotor},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSnap {
    /// Max gap below the feet (meters) at which the pull applies.
    pub max_distance: f32,
    /// Downward acceleration (m/s^2).
    pub acceleration: f32,
}

impl Default for GroundSnap {
    fn default() -> Self {
        Self {
            max_distance: 0.2,
            acceleration: 15.0,
        }
    }
}

impl GroundSnap {
    /// Acceleration the host should add to the character this step, if any.
    ///
    /// Call after `fixed_update`. Applies only while the character free falls within
    /// `max_distance` of non-steep ground, and never toward ground that is itself
    /// falling.
    pub fn evaluate<W: SceneQuery + ?Sized>(
        &self,
        motor: &CharacterMotor,
        body: &CharacterBody,
        world: &W,
    ) -> Option<Vec3> {
        let state = motor.state();
        let surface = motor.surface();
        surface.collider()?;
        if state.ground_distance() > self.max_distance || state.is_on_steep_slope() {
            return None;
        }
        if !motor.is_free_falling(body, world) {
            return None;
        }
        let ground_falling = surface.body().is_some()
            && ground_is_falling(surface.acceleration(), world.gravity(), motor);
        if ground_falling {
            return None;
        }
        Some(Vec3::new(0.0, -self.acceleration.max(0.0), 0.0))
    }
}

fn ground_is_falling(acceleration: Vec3, gravity: Vec3, motor: &CharacterMotor) -> bool {
    if gravity.y == 0.0 {
        return false;
    }
    let sign = gravity.y.signum();
    acceleration.y * sign > gravity.y * sign * motor.config().tuning.gravity_percent_threshold
}
