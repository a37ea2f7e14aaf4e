//! Gravity scaling, air drag and free-fall detection for a character body.

use crate::{
    collision::{
        settings::{DEFAULT_TERMINAL_SPEED, GRAVITY_PERCENT_THRESHOLD},
        types::Vec3,
    },
    motor::CharacterBody,
    utils::{drag_acceleration, split},
};

#[derive(Clone, Debug, PartialEq)]
pub struct FreeFall {
    terminal_speed: f32,
    /// Multiplier on world gravity for this body.
    pub gravity_scale: f32,
    gravity: Vec3,
    drag: Vec3,
    is_free_falling: bool,
    prior_velocity: Vec3,
}

impl Default for FreeFall {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINAL_SPEED, 1.0)
    }
}

impl FreeFall {
    pub fn new(terminal_speed: f32, gravity_scale: f32) -> Self {
        Self {
            terminal_speed: terminal_speed.max(0.0),
            gravity_scale,
            gravity: Vec3::zeros(),
            drag: Vec3::zeros(),
            is_free_falling: false,
            prior_velocity: Vec3::zeros(),
        }
    }

    /// Speed at which drag cancels gravity.
    pub fn terminal_speed(&self) -> f32 {
        self.terminal_speed
    }

    pub fn set_terminal_speed(&mut self, speed: f32) {
        self.terminal_speed = speed.max(0.0);
    }

    /// Scaled gravity from the last update. Zero for bodies that ignore gravity.
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn drag(&self) -> Vec3 {
        self.drag
    }

    pub fn is_free_falling(&self) -> bool {
        self.is_free_falling
    }

    /// Samples `body` and returns the extra acceleration (drag plus gravity bonus)
    /// the host should apply to it this step.
    pub fn fixed_update(&mut self, body: &CharacterBody, world_gravity: Vec3, dt: f32) -> Vec3 {
        if dt <= 0.0 || !dt.is_finite() {
            return Vec3::zeros();
        }
        let velocity = body.linvel;
        let prior_velocity = std::mem::replace(&mut self.prior_velocity, velocity);
        if !body.uses_gravity {
            self.gravity = Vec3::zeros();
            self.drag = Vec3::zeros();
            self.is_free_falling = false;
            return Vec3::zeros();
        }

        self.gravity = world_gravity * self.gravity_scale;
        self.drag = match split(velocity) {
            Some((dir, speed)) => {
                -dir.into_inner() * drag_acceleration(speed, self.terminal_speed, self.gravity.y)
            }
            None => Vec3::zeros(),
        };

        let fall = self.gravity.y + self.drag.y;
        let sign = fall.signum();
        let acceleration = (velocity - prior_velocity) / dt;
        self.is_free_falling = acceleration.y * sign > fall * sign * GRAVITY_PERCENT_THRESHOLD;

        let gravity_bonus = world_gravity * (self.gravity_scale - 1.0);
        self.drag + gravity_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::types::{CapsuleSpec, Iso};

    fn body(linvel: Vec3) -> CharacterBody {
        CharacterBody {
            pose: Iso::identity(),
            linvel,
            mass: 70.0,
            uses_gravity: true,
            shape: Some(CapsuleSpec {
                radius: 0.5,
                half_height: 0.5,
            }),
        }
    }

    #[test]
    fn falling_at_gravity_is_free_fall() {
        let g = Vec3::new(0.0, -9.81, 0.0);
        let dt = 0.02;
        let mut ff = FreeFall::default();
        let mut v = Vec3::zeros();
        for _ in 0..5 {
            ff.fixed_update(&body(v), g, dt);
            v += g * dt;
        }
        assert!(ff.is_free_falling());
        assert_eq!(ff.gravity(), g);
    }

    #[test]
    fn resting_is_not_free_fall() {
        let g = Vec3::new(0.0, -9.81, 0.0);
        let mut ff = FreeFall::default();
        for _ in 0..5 {
            ff.fixed_update(&body(Vec3::zeros()), g, 0.02);
        }
        assert!(!ff.is_free_falling());
    }

    #[test]
    fn drag_opposes_velocity_and_matches_gravity_at_terminal_speed() {
        let g = Vec3::new(0.0, -9.81, 0.0);
        let mut ff = FreeFall::new(50.0, 1.0);
        let extra = ff.fixed_update(&body(Vec3::new(0.0, -50.0, 0.0)), g, 0.02);
        assert!((ff.drag() - Vec3::new(0.0, 9.81, 0.0)).norm() < 1.0e-4);
        // Unit scale adds no gravity bonus.
        assert!((extra - ff.drag()).norm() < 1.0e-6);
    }

    #[test]
    fn gravity_scale_adds_bonus() {
        let g = Vec3::new(0.0, -10.0, 0.0);
        let mut ff = FreeFall::new(1.0e6, 2.0);
        let extra = ff.fixed_update(&body(Vec3::zeros()), g, 0.02);
        assert_eq!(ff.gravity(), Vec3::new(0.0, -20.0, 0.0));
        assert_eq!(extra, Vec3::new(0.0, -10.0, 0.0));
    }

    #[test]
    fn no_gravity_body_is_neutral() {
        let g = Vec3::new(0.0, -9.81, 0.0);
        let mut ff = FreeFall::default();
        let mut b = body(Vec3::new(0.0, -5.0, 0.0));
        b.uses_gravity = false;
        let extra = ff.fixed_update(&b, g, 0.02);
        assert_eq!(extra, Vec3::zeros());
        assert_eq!(ff.gravity(), Vec3::zeros());
        assert!(!ff.is_free_falling());
    }
}
