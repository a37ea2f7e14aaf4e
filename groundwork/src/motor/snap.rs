//! Static-friction snap: removes the slow creep a resting character picks up from the solver.

use super::{CharacterBody, CharacterMotor};
use crate::{
    collision::{
        capsule::Capsule,
        cast::{CastFilter, capsule_cast},
        query::SceneQuery,
        types::{BodyId, Vec3},
    },
    error::MotorError,
    utils::{friction_acceleration_magnitude, split},
};

/// Where the character came to rest, in the ground body's frame (world frame without a body).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RestAnchor {
    body: Option<BodyId>,
    local: Vec3,
}

impl RestAnchor {
    pub(crate) fn capture<W: SceneQuery + ?Sized>(
        position: Vec3,
        body: Option<BodyId>,
        world: &W,
    ) -> Option<Self> {
        let local = match body {
            Some(id) => world
                .body(id)?
                .pose
                .inverse_transform_point(&position.into())
                .coords,
            None => position,
        };
        Some(Self { body, local })
    }

    /// The anchor at the ground body's current pose.
    pub(crate) fn world_position<W: SceneQuery + ?Sized>(&self, world: &W) -> Option<Vec3> {
        match self.body {
            Some(id) => Some(world.body(id)?.pose.transform_point(&self.local.into()).coords),
            None => Some(self.local),
        }
    }
}

impl CharacterMotor {
    /// Deferred pass, run after the engine's solver and collision callbacks.
    ///
    /// Teleports a resting character back to its anchor when it drifted slower than
    /// static friction could have stopped it. Returns true when the body was moved.
    pub fn late_fixed_update<W: SceneQuery + ?Sized>(
        &mut self,
        body: &mut CharacterBody,
        world: &W,
        dt: f32,
    ) -> Result<bool, MotorError> {
        if !self.enabled {
            return Err(MotorError::Disabled);
        }
        if dt <= 0.0 || !dt.is_finite() || !self.state.is_grounded {
            return Ok(false);
        }
        let Some(anchor) = self.rest else {
            return Ok(false);
        };
        let capsule = match (self.contacts.capsule(), body.shape) {
            (Some(capsule), _) => capsule,
            (None, Some(spec)) => Capsule::from_spec(spec, &body.pose),
            (None, None) => return Ok(false),
        };

        let tolerance = self.config.tuning.tolerance;
        let secant = self.surface.point_secant_velocity();
        let local = body.linvel - secant;
        let max_delta = friction_acceleration_magnitude(
            self.surface.slope_degrees(),
            self.state.max_acceleration,
            self.surface.static_friction(),
        ) * dt;
        if local.norm() >= max_delta || local.y > tolerance {
            return Ok(false);
        }
        if self
            .contacts
            .contacts()
            .iter()
            .any(|c| c.separation < -tolerance)
        {
            return Ok(false);
        }

        let Some(target) = anchor.world_position(world) else {
            return Ok(false);
        };
        if let Some((direction, distance)) = split(target - body.position()) {
            let shrunk = capsule.with_radius((capsule.radius - tolerance).max(0.0));
            let filter = CastFilter {
                mask: self.config.layer_mask,
                ignored: &self.config.ignored_colliders,
            };
            if capsule_cast(
                world,
                &shrunk,
                &direction,
                distance + tolerance,
                filter,
                &mut self.hits,
            )
            .is_some()
            {
                return Ok(false);
            }
        }

        log::trace!(
            "step {}: static friction snap by {:.4} m",
            self.step,
            (target - body.position()).norm()
        );
        body.set_position(target);
        body.linvel = secant;
        Ok(true)
    }
}
