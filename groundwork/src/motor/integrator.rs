//! Ground-relative velocity integration with friction and a reaction force on the ground.

use super::{CharacterBody, CharacterMotor, RestAnchor};
use crate::{
    collision::{
        query::{PhysicsWorld, SceneQuery},
        types::Vec3,
    },
    utils::{
        clamp_magnitude, fix_nans, friction_acceleration_magnitude, move_delta, move_towards_vec,
        rejection, snap_point_to_plane_vertically, split,
    },
};

impl CharacterMotor {
    /// Gravity acting on the character: the free-fall collaborator's when present.
    pub(super) fn gravity<W: SceneQuery + ?Sized>(&self, body: &CharacterBody, world: &W) -> Vec3 {
        if !body.uses_gravity {
            return Vec3::zeros();
        }
        match &self.free_fall {
            Some(free_fall) => free_fall.gravity(),
            None => world.gravity(),
        }
    }

    /// Re-projects the goal direction vertically onto the ground plane, keeping its magnitude.
    pub(super) fn snap_goal_to_ground(&mut self) {
        let Some((direction, speed)) = split(self.state.local_velocity_goal) else {
            return;
        };
        let snapped = snap_point_to_plane_vertically(direction.into_inner(), self.surface.normal());
        self.state.local_velocity_goal =
            split(snapped).map_or(Vec3::zeros(), |(dir, _)| dir.into_inner() * speed);
    }

    /// Integrates the body velocity toward the goal. Returns the force applied to the ground body.
    pub(super) fn integrate<W: PhysicsWorld + ?Sized>(
        &mut self,
        body: &mut CharacterBody,
        world: &mut W,
        dt: f32,
    ) -> Option<Vec3> {
        let secant = self.surface.point_secant_velocity();
        let prior_local = body.linvel - secant;
        self.state.local_velocity = prior_local;
        self.rest = None;
        if !self.state.is_grounded {
            return None;
        }

        let tuning = self.config.tuning;
        let mut local = prior_local;

        // Sliding friction on steep ground, never strong enough to reverse the slide.
        if let Some((slide_dir, slide_speed)) = split(rejection(prior_local, self.surface.normal()))
        {
            let gravity = self.gravity(body, &*world).norm();
            let friction = friction_acceleration_magnitude(
                self.surface.slope_degrees(),
                gravity,
                self.surface.dynamic_friction(),
            );
            let decel = (friction * dt * self.steep_slope_value).min(slide_speed);
            local -= slide_dir.into_inner() * decel;
        }

        let friction = if local.norm() < self.state.max_local_speed {
            self.surface.static_friction()
        } else {
            self.surface.dynamic_friction()
        };
        let mut delta = move_delta(
            local,
            self.state.local_velocity_goal,
            self.state.acceleration_goal * friction * dt,
        );
        delta.y = delta.y.max(0.0);
        local += delta * (1.0 - self.steep_slope_value);

        // Newton's third law, rate limited so the ground and character do not chase each other.
        let feet_force = (local - prior_local) / dt * body.mass;
        self.ground_force = move_towards_vec(
            self.ground_force,
            -feet_force,
            tuning.ground_force_rate * dt,
        );
        let mut applied = None;
        if let Some(id) = self.surface.body() {
            if world.body(id).is_some_and(|b| b.is_dynamic) {
                let max = self.ground_force.norm().min(feet_force.norm());
                let force = fix_nans(clamp_magnitude(self.ground_force, max));
                world.apply_force_at_point(id, force, self.surface.point(), dt);
                applied = Some(force);
            }
        }

        if self.state.ground_distance < tuning.tolerance
            && !self.state.is_on_steep_slope
            && local.x == 0.0
            && local.z == 0.0
            && self.state.local_velocity_goal == Vec3::zeros()
        {
            self.rest = RestAnchor::capture(body.position(), self.surface.body(), &*world);
        }

        self.state.local_velocity = local;
        body.linvel = fix_nans(local + secant);
        applied
    }
}
