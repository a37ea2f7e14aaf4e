//! Rapier host adapter.
//!
//! `RapierScene` borrows a rapier `RigidBodySet`/`ColliderSet` pair for one phase and
//! implements [`SceneQuery`] and [`PhysicsWorld`] over it. The helpers below move the
//! character body and its contacts between rapier and the motor.
//!
//! Conventions
//! - Handles map to ids as `(generation << 32) | index`.
//! - Layers are the collider's collision-group memberships.
//! - Rapier has a single friction coefficient. It is used for both static and dynamic friction.
//! - Sensors, disabled colliders and colliders of the character's own body are never reported.

// Re-export Rapier so hosts can use the exact version the adapter was built against.
pub use rapier3d;

use rapier3d::{
    parry::{
        query::{self, Ray, RayCast, ShapeCastOptions, ShapeCastStatus},
        shape::{Ball, Capsule as CapsuleShape, Shape},
    },
    prelude::{Collider, ColliderHandle, ColliderSet, NarrowPhase, RigidBodyHandle, RigidBodySet},
};

use crate::{
    collision::{
        capsule::Capsule,
        query::{PhysicsWorld, SceneQuery},
        sphere::Sphere,
        types::{
            BodyId, BodyState, CapsuleSpec, CastHit, ColliderId, ColliderInfo, ContactSample,
            FrictionMaterial, Iso, UnitVec3, Vec3,
        },
    },
    layers::LayerMask,
    motor::CharacterBody,
};

/// Longest cast handed to rapier. Unbounded casts are clamped to it.
const MAX_CAST_DISTANCE: f32 = 1.0e4;

pub fn collider_id(handle: ColliderHandle) -> ColliderId {
    let (index, generation) = handle.into_raw_parts();
    ColliderId((u64::from(generation) << 32) | u64::from(index))
}

pub fn collider_handle(id: ColliderId) -> ColliderHandle {
    ColliderHandle::from_raw_parts(id.0 as u32, (id.0 >> 32) as u32)
}

pub fn body_id(handle: RigidBodyHandle) -> BodyId {
    let (index, generation) = handle.into_raw_parts();
    BodyId((u64::from(generation) << 32) | u64::from(index))
}

pub fn body_handle(id: BodyId) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(id.0 as u32, (id.0 >> 32) as u32)
}

/// Collision-group memberships as a layer mask.
#[inline]
pub fn collider_layers(collider: &Collider) -> LayerMask {
    LayerMask::new(collider.collision_groups().memberships.bits())
}

/// One phase's view of a rapier scene.
pub struct RapierScene<'a> {
    bodies: &'a mut RigidBodySet,
    colliders: &'a ColliderSet,
    gravity: Vec3,
    character: Option<RigidBodyHandle>,
}

impl<'a> RapierScene<'a> {
    pub fn new(bodies: &'a mut RigidBodySet, colliders: &'a ColliderSet, gravity: Vec3) -> Self {
        Self {
            bodies,
            colliders,
            gravity,
            character: None,
        }
    }

    /// Hides the colliders of `body` from every cast.
    pub fn with_character(mut self, body: RigidBodyHandle) -> Self {
        self.character = Some(body);
        self
    }

    fn queryable(&self, collider: &Collider, mask: LayerMask) -> bool {
        collider.is_enabled()
            && !collider.is_sensor()
            && (self.character.is_none() || collider.parent() != self.character)
            && collider_layers(collider).intersects(&mask)
    }

    /// Sweeps `shape` (placed at `pose`) along `direction` against every queryable collider.
    fn cast_shape(
        &self,
        pose: &Iso,
        shape: &dyn Shape,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        let velocity = direction.into_inner();
        let zero = Vec3::zeros();
        for (handle, collider) in self.colliders.iter() {
            if !self.queryable(collider, mask) {
                continue;
            }
            let mut opts =
                ShapeCastOptions::with_max_time_of_impact(max_distance.min(MAX_CAST_DISTANCE));
            opts.stop_at_penetration = true;
            let Ok(Some(hit)) = query::cast_shapes(
                pose,
                &velocity,
                shape,
                collider.position(),
                &zero,
                collider.shape(),
                opts,
            ) else {
                continue;
            };
            let id = collider_id(handle);
            if hit.status == ShapeCastStatus::PenetratingOrWithinTargetDist {
                hits.push(CastHit::initial_intersection(id, direction));
                continue;
            }
            let position = collider.position();
            hits.push(CastHit {
                collider: id,
                point: (position * hit.witness2).coords,
                normal: position.rotation * hit.normal2.into_inner(),
                distance: hit.time_of_impact,
            });
        }
    }
}

impl SceneQuery for RapierScene<'_> {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn collider(&self, id: ColliderId) -> Option<ColliderInfo> {
        let collider = self.colliders.get(collider_handle(id))?;
        Some(ColliderInfo {
            body: collider.parent().map(body_id),
            material: Some(FrictionMaterial {
                static_friction: collider.friction(),
                dynamic_friction: collider.friction(),
            }),
            layers: collider_layers(collider),
        })
    }

    fn body(&self, id: BodyId) -> Option<BodyState> {
        let rb = self.bodies.get(body_handle(id))?;
        Some(BodyState {
            pose: *rb.position(),
            linvel: *rb.linvel(),
            angvel: *rb.angvel(),
            center_of_mass: rb.center_of_mass().coords,
            is_dynamic: rb.is_dynamic(),
        })
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        let ray = Ray::new(origin.into(), direction.into_inner());
        let max_distance = max_distance.min(MAX_CAST_DISTANCE);
        for (handle, collider) in self.colliders.iter() {
            if !self.queryable(collider, mask) {
                continue;
            }
            let Some(hit) = collider.shape().cast_ray_and_get_normal(
                collider.position(),
                &ray,
                max_distance,
                true,
            ) else {
                continue;
            };
            let id = collider_id(handle);
            if hit.time_of_impact <= 0.0 {
                hits.push(CastHit::initial_intersection(id, direction));
                continue;
            }
            hits.push(CastHit {
                collider: id,
                point: ray.point_at(hit.time_of_impact).coords,
                normal: hit.normal,
                distance: hit.time_of_impact,
            });
        }
    }

    fn cast_sphere(
        &self,
        sphere: &Sphere,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        let c = sphere.center;
        let pose = Iso::translation(c.x, c.y, c.z);
        let ball = Ball::new(sphere.radius);
        self.cast_shape(&pose, &ball, direction, max_distance, mask, hits);
    }

    fn cast_capsule(
        &self,
        capsule: &Capsule,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        let shape = CapsuleShape::new(
            capsule.lower_center().into(),
            capsule.upper_center().into(),
            capsule.radius,
        );
        self.cast_shape(
            &Iso::identity(),
            &shape,
            direction,
            max_distance,
            mask,
            hits,
        );
    }
}

impl PhysicsWorld for RapierScene<'_> {
    fn apply_force_at_point(&mut self, body: BodyId, force: Vec3, point: Vec3, dt: f32) {
        let Some(rb) = self.bodies.get_mut(body_handle(body)) else {
            log::warn!("reaction force for unknown body {:?} dropped", body);
            return;
        };
        rb.apply_impulse_at_point(force * dt, point.into(), true);
    }
}

/// Every contact point between `character` and other non-sensor colliders, in world space.
///
/// Points lie on the other collider and normals face the character.
pub fn collect_contacts(
    narrow_phase: &NarrowPhase,
    colliders: &ColliderSet,
    character: ColliderHandle,
) -> Vec<ContactSample> {
    let mut samples = Vec::new();
    for pair in narrow_phase.contact_pairs_with(character) {
        // Manifold normals point from collider1 to collider2.
        let character_first = pair.collider1 == character;
        let other = if character_first {
            pair.collider2
        } else {
            pair.collider1
        };
        let Some(other_collider) = colliders.get(other) else {
            continue;
        };
        if other_collider.is_sensor() {
            continue;
        }
        let layers = collider_layers(other_collider);
        let other_pose = other_collider.position();
        for manifold in &pair.manifolds {
            let normal = if character_first {
                -manifold.data.normal
            } else {
                manifold.data.normal
            };
            for point in &manifold.points {
                let local = if character_first {
                    point.local_p2
                } else {
                    point.local_p1
                };
                samples.push(ContactSample {
                    point: (other_pose * local).coords,
                    normal,
                    separation: point.dist,
                    collider: collider_id(other),
                    layers,
                });
            }
        }
    }
    samples
}

/// Copies a rapier body into the motor's view. The first capsule collider becomes the shape.
pub fn read_character(
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    handle: RigidBodyHandle,
) -> Option<CharacterBody> {
    let rb = bodies.get(handle)?;
    let shape = rb
        .colliders()
        .iter()
        .filter_map(|h| colliders.get(*h))
        .find_map(|co| co.shape().as_capsule())
        .map(|capsule| CapsuleSpec {
            radius: capsule.radius,
            half_height: capsule.half_height(),
        });
    Some(CharacterBody {
        pose: *rb.position(),
        linvel: *rb.linvel(),
        mass: rb.mass(),
        uses_gravity: rb.gravity_scale() != 0.0,
        shape,
    })
}

/// Writes the motor's pose and velocity back. Returns false for an unknown handle.
pub fn write_character(
    bodies: &mut RigidBodySet,
    handle: RigidBodyHandle,
    body: &CharacterBody,
) -> bool {
    let Some(rb) = bodies.get_mut(handle) else {
        return false;
    };
    if rb.position() != &body.pose {
        rb.set_position(body.pose, true);
    }
    rb.set_linvel(body.linvel, true);
    true
}
