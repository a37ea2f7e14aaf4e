/*!
Character motor settings and tolerances.

These constants centralize the defaults used by the grounding classifier, the
velocity integrator and the static-friction snap. `MotorConfig::default()` and
`Tuning::default()` are built from them; per-character overrides belong in the
config, not here.

Notes
- Distances are in meters, time in seconds, angles in degrees.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
- The hysteresis rates were tuned empirically. Treat them as defaults.
*/

/// General world-space tolerance (meters).
/// Used for contact separation, cast radius shrink and "near zero" ground distance.
pub const TOLERANCE: f32 = 0.01;

/// Slope (degrees) beyond which a contact is never treated as ground.
pub const MAX_CONTACT_SLOPE_DEGREES: f32 = 89.0;

/// Minimum slope (degrees) considered a steep slope.
pub const STEEP_SLOPE_THRESHOLD_DEGREES: f32 = 56.0;

/// Max distance between the bottom of the character and the ground while still grounded (meters).
/// Keeps small bumps and crevices from ungrounding the character.
pub const GROUND_PADDING: f32 = 0.1;

/// How far past a ledge the capsule center may rest while still grounded (meters).
pub const OVERHANG_TOLERANCE: f32 = 0.15;

/// Rate (per second) at which the free-fall accumulator moves toward 0 or 1.
pub const FREE_FALL_VALUE_RATE: f32 = 2.0;

/// Accumulator value above which the character counts as continually free falling.
pub const FREE_FALL_SATURATION: f32 = 0.99;

/// Rate (per second) at which the steep-slope accumulator moves toward 0 or 1.
pub const STEEP_SLOPE_VALUE_RATE: f32 = 5.0;

/// Max change (newtons per second) of the reaction force pushed into the ground.
pub const GROUND_FORCE_RATE: f32 = 10_000.0;

/// Fraction of gravity the vertical acceleration must reach to count as free fall.
pub const GRAVITY_PERCENT_THRESHOLD: f32 = 0.9;

/// Static friction used when a surface has no material.
pub const DEFAULT_STATIC_FRICTION: f32 = 1.0;

/// Dynamic friction used when a surface has no material.
pub const DEFAULT_DYNAMIC_FRICTION: f32 = 0.6;

/// Default max ground-relative speed (m/s).
pub const DEFAULT_MAX_LOCAL_SPEED: f32 = 10.0;

/// Default acceleration toward the velocity goal (m/s^2).
pub const DEFAULT_ACCELERATION_GOAL: f32 = 30.0;

/// Default max acceleration (m/s^2). Also bounds the static-friction snap.
pub const DEFAULT_MAX_ACCELERATION: f32 = 30.0;

/// Lower bound for cos(threshold) when deriving the ledge cast distance.
pub const MIN_FLATNESS: f32 = 0.001;

/// Practical small length for normalize/divide guards.
pub const DIST_EPS: f32 = 1.0e-6;

/// Default free-fall terminal speed (m/s).
pub const DEFAULT_TERMINAL_SPEED: f32 = 53.0;

/// Default world gravity (m/s^2), used by hosts that do not provide one.
pub const GRAVITY_MPS2: f32 = 9.81;
