//! Optional behaviours layered on top of the character motor.

pub mod ground_snap;

pub use ground_snap::GroundSnap;
