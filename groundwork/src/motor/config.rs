use std::collections::HashSet;

use crate::{
    collision::{settings::*, types::ColliderId},
    error::MotorError,
    layers::LayerMask,
    surface::DefaultFriction,
};

/// Tolerances and hysteresis rates of the classifier and integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    pub tolerance: f32,
    pub max_contact_slope_degrees: f32,
    pub free_fall_rate: f32,
    pub free_fall_saturation: f32,
    pub steep_slope_rate: f32,
    pub ground_force_rate: f32,
    pub default_static_friction: f32,
    pub default_dynamic_friction: f32,
    pub gravity_percent_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
            max_contact_slope_degrees: MAX_CONTACT_SLOPE_DEGREES,
            free_fall_rate: FREE_FALL_VALUE_RATE,
            free_fall_saturation: FREE_FALL_SATURATION,
            steep_slope_rate: STEEP_SLOPE_VALUE_RATE,
            ground_force_rate: GROUND_FORCE_RATE,
            default_static_friction: DEFAULT_STATIC_FRICTION,
            default_dynamic_friction: DEFAULT_DYNAMIC_FRICTION,
            gravity_percent_threshold: GRAVITY_PERCENT_THRESHOLD,
        }
    }
}

impl Tuning {
    #[inline]
    pub fn default_friction(&self) -> DefaultFriction {
        DefaultFriction {
            static_friction: self.default_static_friction,
            dynamic_friction: self.default_dynamic_friction,
        }
    }
}

/// Construction-time configuration of a [`super::CharacterMotor`].
#[derive(Clone, Debug, PartialEq)]
pub struct MotorConfig {
    /// Layers a collider must share to count as ground.
    pub layer_mask: LayerMask,
    /// Slope (degrees) above which the ground is steep. Clamped to [0, 90].
    pub steep_slope_threshold_degrees: f32,
    /// Max gap below the feet that still counts as grounded (meters).
    pub padding: f32,
    /// How far past a ledge the capsule center may rest (meters). Clamped to [0, radius].
    pub overhang_tolerance: f32,
    /// Colliders never treated as ground, typically the character's own.
    pub ignored_colliders: HashSet<ColliderId>,
    pub tuning: Tuning,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            layer_mask: LayerMask::all(),
            steep_slope_threshold_degrees: STEEP_SLOPE_THRESHOLD_DEGREES,
            padding: GROUND_PADDING,
            overhang_tolerance: OVERHANG_TOLERANCE,
            ignored_colliders: HashSet::new(),
            tuning: Tuning::default(),
        }
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), MotorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MotorError::InvalidConfig { field, value })
    }
}

impl MotorConfig {
    /// Rejects non-finite or negative distances, angles and rates.
    pub fn validate(&self) -> Result<(), MotorError> {
        non_negative(
            "steep_slope_threshold_degrees",
            self.steep_slope_threshold_degrees,
        )?;
        non_negative("padding", self.padding)?;
        non_negative("overhang_tolerance", self.overhang_tolerance)?;

        let t = &self.tuning;
        non_negative("tolerance", t.tolerance)?;
        non_negative("max_contact_slope_degrees", t.max_contact_slope_degrees)?;
        non_negative("free_fall_rate", t.free_fall_rate)?;
        non_negative("free_fall_saturation", t.free_fall_saturation)?;
        non_negative("steep_slope_rate", t.steep_slope_rate)?;
        non_negative("ground_force_rate", t.ground_force_rate)?;
        non_negative("default_static_friction", t.default_static_friction)?;
        non_negative("default_dynamic_friction", t.default_dynamic_friction)?;
        non_negative("gravity_percent_threshold", t.gravity_percent_threshold)?;
        Ok(())
    }

    /// Clamps the threshold to [0, 90] and the overhang to [0, radius].
    pub(crate) fn clamp_to_shape(&mut self, radius: f32) {
        let threshold = self.steep_slope_threshold_degrees.clamp(0.0, 90.0);
        if threshold != self.steep_slope_threshold_degrees {
            log::warn!(
                "steep slope threshold {} clamped to {}",
                self.steep_slope_threshold_degrees,
                threshold
            );
            self.steep_slope_threshold_degrees = threshold;
        }
        let overhang = self.overhang_tolerance.clamp(0.0, radius.max(0.0));
        if overhang != self.overhang_tolerance {
            log::warn!(
                "overhang tolerance {} clamped to capsule radius {}",
                self.overhang_tolerance,
                overhang
            );
            self.overhang_tolerance = overhang;
        }
    }
}
