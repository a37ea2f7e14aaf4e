use thiserror::Error;

/// Failures surfaced by [`crate::motor::CharacterMotor`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotorError {
    /// The character body has no capsule collision shape.
    #[error("character body has no capsule collision shape")]
    MissingCollisionShape,
    /// A configuration value is out of range.
    #[error("invalid motor configuration: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f32 },
    /// The motor was disabled and has not been re-enabled.
    #[error("character motor is disabled")]
    Disabled,
}
