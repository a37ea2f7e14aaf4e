//! Analytic plane world used by the unit tests.
//!
//! Every collider is a half-space `n . x <= offset`, optionally clipped to `x <= max_x`.
//! `simulate` stands in for the host solver: gravity, position integration and a
//! push out of every plane the capsule sinks into.

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
    layers::{Layer, LayerMask},
    motor::{CharacterBody, CharacterMotor},
};

/// Separation below which `contacts_for` reports a contact.
const CONTACT_MARGIN: f32 = 0.02;
const SOLVER_PASSES: usize = 8;

#[derive(Clone, Debug)]
struct Plane {
    normal: Vec3,
    offset: f32,
    max_x: Option<f32>,
    layers: LayerMask,
    material: Option<FrictionMaterial>,
    body: Option<BodyState>,
}

impl Plane {
    fn covers(&self, point: Vec3) -> bool {
        self.max_x.is_none_or(|max_x| point.x <= max_x)
    }

    /// Capsule segment end closest to the plane.
    fn support(&self, capsule: &Capsule) -> Vec3 {
        let (lower, upper) = (capsule.lower_center(), capsule.upper_center());
        if self.normal.dot(&lower) <= self.normal.dot(&upper) {
            lower
        } else {
            upper
        }
    }

    fn gap(&self, center: Vec3, radius: f32) -> f32 {
        self.normal.dot(&center) - self.offset - radius
    }

    fn project(&self, point: Vec3) -> Vec3 {
        point - self.normal * (self.normal.dot(&point) - self.offset)
    }
}

#[derive(Clone, Debug)]
pub struct PlaneWorld {
    planes: Vec<Plane>,
    gravity: Vec3,
    /// First plane added, if any.
    pub ground: ColliderId,
    /// Every `apply_force_at_point` call: body, force, point.
    pub forces: Vec<(BodyId, Vec3, Vec3)>,
}

impl PlaneWorld {
    pub fn empty() -> Self {
        Self {
            planes: Vec::new(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            ground: ColliderId(0),
            forces: Vec::new(),
        }
    }

    /// Infinite floor at y = 0.
    pub fn flat() -> Self {
        let mut world = Self::empty();
        world.add_plane(Vec3::y(), 0.0);
        world
    }

    /// Floor at y = 0 that ends at x = 0.
    pub fn ledge() -> Self {
        let mut world = Self::flat();
        world.planes[0].max_x = Some(0.0);
        world
    }

    /// Incline through the origin rising toward -x.
    pub fn inclined(degrees: f32) -> Self {
        let a = degrees.to_radians();
        let mut world = Self::empty();
        world.add_plane(Vec3::new(a.sin(), a.cos(), 0.0), 0.0);
        world
    }

    pub fn add_plane(&mut self, normal: Vec3, offset: f32) -> ColliderId {
        self.planes.push(Plane {
            normal: normal.normalize(),
            offset,
            max_x: None,
            layers: LayerMask::from_layers(&[Layer(0)]),
            material: None,
            body: None,
        });
        let id = ColliderId(self.planes.len() as u64);
        if self.planes.len() == 1 {
            self.ground = id;
        }
        id
    }

    fn plane(&mut self, id: ColliderId) -> &mut Plane {
        &mut self.planes[id.0 as usize - 1]
    }

    fn planes(&self) -> impl Iterator<Item = (ColliderId, &Plane)> {
        self.planes
            .iter()
            .enumerate()
            .map(|(i, p)| (ColliderId(i as u64 + 1), p))
    }

    pub fn set_material(&mut self, id: ColliderId, material: FrictionMaterial) {
        self.plane(id).material = Some(material);
    }

    pub fn set_layers(&mut self, id: ColliderId, layers: LayerMask) {
        self.plane(id).layers = layers;
    }

    /// Attaches (or updates) the body behind a plane. The body id equals the collider id.
    pub fn attach_body(&mut self, id: ColliderId, state: BodyState) -> BodyId {
        self.plane(id).body = Some(state);
        BodyId(id.0)
    }

    /// Contacts between the body's capsule and every plane within the contact margin.
    pub fn contacts_for(&self, body: &CharacterBody) -> Vec<ContactSample> {
        let Some(spec) = body.shape else {
            return Vec::new();
        };
        let capsule = Capsule::from_spec(spec, &body.pose);
        self.planes()
            .filter_map(|(id, plane)| {
                let center = plane.support(&capsule);
                let separation = plane.gap(center, capsule.radius);
                let point = plane.project(center);
                (separation <= CONTACT_MARGIN && plane.covers(point)).then_some(ContactSample {
                    point,
                    normal: plane.normal,
                    separation,
                    collider: id,
                    layers: plane.layers,
                })
            })
            .collect()
    }

    fn cast(
        &self,
        center: impl Fn(&Plane) -> Vec3,
        radius: f32,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        for (id, plane) in self.planes() {
            if !plane.layers.intersects(&mask) {
                continue;
            }
            let c = center(plane);
            let gap = plane.gap(c, radius);
            if gap < 0.0 {
                if plane.covers(plane.project(c)) {
                    hits.push(CastHit::initial_intersection(id, direction));
                }
                continue;
            }
            let approach = -plane.normal.dot(direction);
            if approach <= 0.0 {
                continue;
            }
            let distance = gap / approach;
            if distance > max_distance {
                continue;
            }
            let point = c + direction.into_inner() * distance - plane.normal * radius;
            if plane.covers(point) {
                hits.push(CastHit {
                    collider: id,
                    point,
                    normal: plane.normal,
                    distance,
                });
            }
        }
    }
}

impl SceneQuery for PlaneWorld {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn collider(&self, id: ColliderId) -> Option<ColliderInfo> {
        let plane = self.planes.get((id.0 as usize).checked_sub(1)?)?;
        Some(ColliderInfo {
            body: plane.body.map(|_| BodyId(id.0)),
            material: plane.material,
            layers: plane.layers,
        })
    }

    fn body(&self, id: BodyId) -> Option<BodyState> {
        self.planes.get((id.0 as usize).checked_sub(1)?)?.body
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        self.cast(|_| origin, 0.0, direction, max_distance, mask, hits);
    }

    fn cast_sphere(
        &self,
        sphere: &Sphere,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        let center = sphere.center;
        self.cast(|_| center, sphere.radius, direction, max_distance, mask, hits);
    }

    fn cast_capsule(
        &self,
        capsule: &Capsule,
        direction: &UnitVec3,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<CastHit>,
    ) {
        self.cast(
            |plane| plane.support(capsule),
            capsule.radius,
            direction,
            max_distance,
            mask,
            hits,
        );
    }
}

impl PhysicsWorld for PlaneWorld {
    fn apply_force_at_point(&mut self, body: BodyId, force: Vec3, point: Vec3, _dt: f32) {
        self.forces.push((body, force, point));
    }
}

/// A 2 m tall, 0.5 m radius, 70 kg character resting on the first plane.
pub fn character_on_plane(world: &PlaneWorld) -> CharacterBody {
    let spec = CapsuleSpec {
        radius: 0.5,
        half_height: 0.5,
    };
    let lower_center = match world.planes.first() {
        Some(plane) => plane.normal * (plane.offset + spec.radius),
        None => Vec3::new(0.0, spec.radius, 0.0),
    };
    let center = lower_center + Vec3::new(0.0, spec.half_height, 0.0);
    CharacterBody {
        pose: Iso::translation(center.x, center.y, center.z),
        linvel: Vec3::zeros(),
        mass: 70.0,
        uses_gravity: true,
        shape: Some(spec),
    }
}

/// One solver step: gravity, integration, then push out of planes and cancel inward velocity.
pub fn simulate(body: &mut CharacterBody, world: &PlaneWorld, dt: f32) {
    if body.uses_gravity {
        body.linvel += world.gravity * dt;
    }
    body.set_position(body.position() + body.linvel * dt);

    let Some(spec) = body.shape else {
        return;
    };
    for _ in 0..SOLVER_PASSES {
        for plane in &world.planes {
            let capsule = Capsule::from_spec(spec, &body.pose);
            let center = plane.support(&capsule);
            let gap = plane.gap(center, capsule.radius);
            if gap >= 0.0 || !plane.covers(plane.project(center)) {
                continue;
            }
            body.set_position(body.position() - plane.normal * gap);
            let inward = body.linvel.dot(&plane.normal);
            if inward < 0.0 {
                body.linvel -= plane.normal * inward;
            }
        }
    }
}

/// Runs the full per-step sequence `n` times: motor, solver, contact report, snap.
pub fn run_steps(
    motor: &mut CharacterMotor,
    body: &mut CharacterBody,
    world: &mut PlaneWorld,
    dt: f32,
    n: usize,
) {
    for _ in 0..n {
        motor.fixed_update(body, world, dt).unwrap();
        simulate(body, world, dt);
        let contacts = world.contacts_for(body);
        motor.record_contacts(body, contacts);
        motor.late_fixed_update(body, world, dt).unwrap();
    }
}
