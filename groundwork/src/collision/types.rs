/*!
Core collision types and math aliases shared by the collision submodules and the motor.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the host physics engine (contact callbacks, shape casts, collider/body lookups)
- the shape-cast helpers
- the surface model and the character motor

Identities are opaque integers. Hosts map their own handles onto them
(see `rapier_world` for the rapier mapping).
*/

use nalgebra as na;

use crate::layers::LayerMask;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;
pub type UnitVec3 = na::Unit<Vec3>;

/// Opaque identity of a collider owned by the host engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

/// Opaque identity of a rigid body owned by the host engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// Capsule specification for the character's collision shape.
///
/// half_height is the half-length of the cylinder section (aligned with local +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

/// Friction coefficients of a surface material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrictionMaterial {
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

/// What the motor needs to know about a collider it touched or hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderInfo {
    /// Rigid body the collider is attached to, if any.
    pub body: Option<BodyId>,
    /// Surface material, if the collider has one.
    pub material: Option<FrictionMaterial>,
    /// Layers the collider belongs to.
    pub layers: LayerMask,
}

/// Snapshot of a host rigid body for the current step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    /// World-space pose (center of the body frame).
    pub pose: Iso,
    /// Linear velocity of the center of mass (m/s).
    pub linvel: Vec3,
    /// Angular velocity (rad/s), world-space axis scaled by speed.
    pub angvel: Vec3,
    /// World-space center of mass.
    pub center_of_mass: Vec3,
    /// Only dynamic bodies receive reaction forces.
    pub is_dynamic: bool,
}

impl BodyState {
    /// A static body at `pose`: no motion, not dynamic.
    pub fn fixed(pose: Iso) -> Self {
        Self {
            pose,
            linvel: Vec3::zeros(),
            angvel: Vec3::zeros(),
            center_of_mass: pose.translation.vector,
            is_dynamic: false,
        }
    }

    /// Tangential velocity of a world point rigidly attached to this body.
    #[inline]
    pub fn point_velocity(&self, point: Vec3) -> Vec3 {
        self.linvel + self.angvel.cross(&(point - self.center_of_mass))
    }
}

/// One contact point between the character and another collider,
/// as reported by the host's collision callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactSample {
    /// World-space contact point.
    pub point: Vec3,
    /// World-space contact normal. Either orientation is accepted;
    /// see [`ContactSample::normal_towards`].
    pub normal: Vec3,
    /// Signed separation (negative = penetrating).
    pub separation: f32,
    /// The other collider.
    pub collider: ColliderId,
    /// Layers of the other collider.
    pub layers: LayerMask,
}

impl ContactSample {
    /// The contact normal flipped, if needed, to point from the surface toward `origin`.
    #[inline]
    pub fn normal_towards(&self, origin: Vec3) -> Vec3 {
        if (origin - self.point).dot(&self.normal) > 0.0 {
            self.normal
        } else {
            -self.normal
        }
    }
}

/// A single hit returned by a host shape cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastHit {
    pub collider: ColliderId,
    /// World-space impact point on the hit collider.
    pub point: Vec3,
    /// World-space surface normal at the impact point.
    pub normal: Vec3,
    /// Distance traveled along the cast direction before impact.
    pub distance: f32,
}

impl CastHit {
    /// The hit some engines report when a cast starts inside a collider:
    /// zero distance, zero point, normal opposite the cast direction.
    #[inline]
    pub fn initial_intersection(collider: ColliderId, direction: &UnitVec3) -> Self {
        Self {
            collider,
            point: Vec3::zeros(),
            normal: -direction.into_inner(),
            distance: 0.0,
        }
    }
}
