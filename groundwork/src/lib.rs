pub mod collision;
pub mod error;
pub mod extensions;
pub mod free_fall;
pub mod layers;
pub mod motor;
pub mod rapier_world;
pub mod surface;
pub mod utils;

#[cfg(test)]
mod testing;

pub use collision::{
    BodyId, BodyState, CapsuleSpec, CastHit, ColliderId, ColliderInfo, ContactSample,
    FrictionMaterial, PhysicsWorld, SceneQuery,
};
pub use error::MotorError;
pub use extensions::GroundSnap;
pub use free_fall::FreeFall;
pub use layers::{Layer, LayerMask};
pub use motor::{
    CharacterBody, CharacterMotor, MotorConfig, MotorControls, MotorState, StepOutcome,
    StepReport, SubscriptionId, Tuning,
};
pub use rapier_world::{RapierScene, collect_contacts, read_character, write_character};
pub use surface::Surface;
