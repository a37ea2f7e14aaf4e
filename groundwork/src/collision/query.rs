//! Host engine seams.
//!
//! The motor never owns a physics world. Hosts implement these traits over their
//! engine (see `rapier_world::RapierScene`) and pass the world into every phase.

use super::{
    capsule::Capsule,
    sphere::Sphere,
    types::{BodyId, BodyState, CastHit, ColliderId, ColliderInfo, UnitVec3, Vec3},
};
use crate::layers::LayerMask;

/// Read-only queries against the host scene.
///
/// Cast methods append every hit (in any order) to `hits` and must not clear it.
/// Trigger/sensor colliders are the host's business and should not be reported.
/// A cast that starts inside a collider reports it as
/// [`CastHit::initial_intersection`].
pub trait SceneQuery {
    /// World gravity (m/s^2).
    fn gravity(&self) -> Vec3;

    fn collider(&self, id: ColliderId) -> Option<ColliderInfo>;

    fn body(&self, id: BodyId) -> Option<BodyState>;

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    );

    fn cast_sphere(
        &self,
        sphere: &Sphere,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    );

    fn cast_capsule(
        &self,
        capsule: &Capsule,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    );
}

/// Scene access plus the one write the motor performs on other bodies.
pub trait PhysicsWorld: SceneQuery {
    /// Apply `force` (newtons) at world `point` on `body` for the coming step of length `dt`.
    fn apply_force_at_point(&mut self, body: BodyId, force: Vec3, point: Vec3, dt: f32);
}
