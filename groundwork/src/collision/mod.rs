/*!
Collision root module.

Geometry and scene-query plumbing for the character motor. The host engine owns
collision detection; this module only describes what the motor reads from it.

- types:    shared data types (ids, contact samples, cast hits, body snapshots)
- settings: tolerances and default tuning constants
- capsule:  world-space capsule with containment and nearest-surface queries
- sphere:   world-space sphere used as a cast shape
- query:    the `SceneQuery` / `PhysicsWorld` host traits
- cast:     filtered ray/sphere/capsule casts returning the nearest valid hit
- contacts: per-step contact buffer fed by the host's collision callbacks
*/

pub mod capsule;
pub mod cast;
pub mod contacts;
pub mod query;
pub mod settings;
pub mod sphere;
pub mod types;

// Re-export commonly used types and functions.
pub use capsule::{Capsule, SurfacePoint};
pub use cast::{CastFilter, capsule_cast, nearest_valid_hit, ray_cast, sphere_cast};
pub use contacts::ContactBuffer;
pub use query::{PhysicsWorld, SceneQuery};
pub use sphere::Sphere;
pub use types::{
    BodyId, BodyState, CapsuleSpec, CastHit, ColliderId, ColliderInfo, ContactSample,
    FrictionMaterial, Iso, Quat, UnitVec3, Vec3,
};
