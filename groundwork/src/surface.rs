//! The ground the character currently stands on (or would land on).

use nalgebra::UnitQuaternion;

use crate::{
    collision::{
        query::SceneQuery,
        settings::{DEFAULT_DYNAMIC_FRICTION, DEFAULT_STATIC_FRICTION},
        types::{BodyId, BodyState, ColliderId, Vec3},
    },
    utils::{slope_degrees, split},
};

/// Friction used when the ground collider carries no material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultFriction {
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

impl Default for DefaultFriction {
    fn default() -> Self {
        Self {
            static_friction: DEFAULT_STATIC_FRICTION,
            dynamic_friction: DEFAULT_DYNAMIC_FRICTION,
        }
    }
}

/// A point on a ground collider together with the motion of the body it belongs to.
///
/// Owned and mutated by the motor. Everything else reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    point: Vec3,
    normal: Vec3,
    slope_degrees: f32,
    static_friction: f32,
    dynamic_friction: f32,
    collider: Option<ColliderId>,
    body: Option<BodyId>,
    velocity: Vec3,
    angular_velocity: Vec3,
    point_velocity: Vec3,
    point_secant_velocity: Vec3,
    acceleration: Vec3,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            point: Vec3::zeros(),
            normal: Vec3::y(),
            slope_degrees: 0.0,
            static_friction: DEFAULT_STATIC_FRICTION,
            dynamic_friction: DEFAULT_DYNAMIC_FRICTION,
            collider: None,
            body: None,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            point_velocity: Vec3::zeros(),
            point_secant_velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
        }
    }
}

impl Surface {
    /// Points the surface at `point` on `collider`.
    ///
    /// Body motion is re-sampled from `world`. The body acceleration is a finite
    /// difference and only survives while the same body stays attached.
    pub fn update<W: SceneQuery + ?Sized>(
        &mut self,
        point: Vec3,
        normal: Vec3,
        collider: ColliderId,
        world: &W,
        dt: f32,
        defaults: DefaultFriction,
    ) {
        self.point = point;
        self.normal = split(normal).map_or(Vec3::y(), |(dir, _)| dir.into_inner());
        self.slope_degrees = slope_degrees(self.normal);
        self.collider = Some(collider);

        let info = world.collider(collider);
        let (static_friction, dynamic_friction) = match info.and_then(|i| i.material) {
            Some(m) => (m.static_friction, m.dynamic_friction),
            None => (defaults.static_friction, defaults.dynamic_friction),
        };
        self.static_friction = static_friction.clamp(0.0, 1.0);
        self.dynamic_friction = dynamic_friction.clamp(0.0, 1.0);

        let prior_body = self.body;
        let prior_velocity = self.velocity;
        let attached = info
            .and_then(|i| i.body)
            .and_then(|id| world.body(id).map(|state| (id, state)));

        match attached {
            Some((id, state)) => {
                self.body = Some(id);
                self.velocity = state.linvel;
                self.angular_velocity = state.angvel;
                self.point_velocity = state.point_velocity(point);
                self.point_secant_velocity = point_secant_velocity(&state, point, dt);
                self.acceleration = if prior_body == Some(id) && dt > 0.0 {
                    (self.velocity - prior_velocity) / dt
                } else {
                    Vec3::zeros()
                };
            }
            None => {
                self.body = None;
                self.velocity = Vec3::zeros();
                self.angular_velocity = Vec3::zeros();
                self.point_velocity = Vec3::zeros();
                self.point_secant_velocity = Vec3::zeros();
                self.acceleration = Vec3::zeros();
            }
        }
    }

    /// Back to flat, motionless ground with default friction.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    /// Unit normal. Up when there is no ground.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn slope_degrees(&self) -> f32 {
        self.slope_degrees
    }

    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }

    pub fn collider(&self) -> Option<ColliderId> {
        self.collider
    }

    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    /// Linear velocity of the attached body's center of mass.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Tangential velocity of the ground point if released from the body right now.
    pub fn point_velocity(&self) -> Vec3 {
        self.point_velocity
    }

    /// Velocity that carries the ground point to where the body will hold it next step.
    pub fn point_secant_velocity(&self) -> Vec3 {
        self.point_secant_velocity
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }
}

/// Chord velocity of a point pinned to a rotating body over `dt`.
///
/// Rotates the point's offset from the center of mass by `angvel * dt` and divides the
/// displacement by `dt`. Falls back to the tangential point velocity for a degenerate `dt`.
pub fn point_secant_velocity(body: &BodyState, point: Vec3, dt: f32) -> Vec3 {
    if dt <= 0.0 || !dt.is_finite() {
        return body.point_velocity(point);
    }
    let rotation = UnitQuaternion::from_scaled_axis(body.angvel * dt);
    let offset = point - body.center_of_mass;
    let displacement = rotation * offset - offset;
    displacement / dt + body.linvel
}
