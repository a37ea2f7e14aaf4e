use crate::{
    collision::{
        settings::{DEFAULT_ACCELERATION_GOAL, DEFAULT_MAX_ACCELERATION, DEFAULT_MAX_LOCAL_SPEED},
        types::{CapsuleSpec, Iso, Vec3},
    },
    surface::Surface,
};

/// The host rigid body driven by the motor.
///
/// The host copies its body into this struct before each phase and writes
/// `pose` and `linvel` back afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterBody {
    pub pose: Iso,
    pub linvel: Vec3,
    pub mass: f32,
    pub uses_gravity: bool,
    /// Capsule collision shape. The motor refuses to run without one.
    pub shape: Option<CapsuleSpec>,
}

impl CharacterBody {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.pose.translation.vector
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.pose.translation.vector = position;
    }
}

/// Grounding results and movement parameters of a motor.
///
/// Public fields are the knobs other behaviours may turn. The rest is written by
/// the motor and exposed through getters.
#[derive(Clone, Debug, PartialEq)]
pub struct MotorState {
    /// Overwritable by collaborators (a jump ungrounds the character for the rest of the step).
    pub is_grounded: bool,
    pub move_input: Vec3,
    /// Desired velocity relative to the ground.
    pub local_velocity_goal: Vec3,
    pub max_local_speed: f32,
    pub acceleration_goal: f32,
    pub max_acceleration: f32,
    pub(crate) is_on_steep_slope: bool,
    pub(crate) ground_distance: f32,
    pub(crate) local_velocity: Vec3,
    pub(crate) acceleration: Vec3,
}

impl Default for MotorState {
    fn default() -> Self {
        Self {
            is_grounded: false,
            move_input: Vec3::zeros(),
            local_velocity_goal: Vec3::zeros(),
            max_local_speed: DEFAULT_MAX_LOCAL_SPEED,
            acceleration_goal: DEFAULT_ACCELERATION_GOAL,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            is_on_steep_slope: false,
            ground_distance: f32::INFINITY,
            local_velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
        }
    }
}

impl MotorState {
    pub fn is_on_steep_slope(&self) -> bool {
        self.is_on_steep_slope
    }

    /// Gap between the feet and the ground, `+inf` without ground.
    pub fn ground_distance(&self) -> f32 {
        self.ground_distance
    }

    /// Body velocity minus the ground's secant velocity.
    pub fn local_velocity(&self) -> Vec3 {
        self.local_velocity
    }

    /// Finite-difference acceleration of the character body.
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub(crate) fn unground(&mut self) {
        self.is_grounded = false;
        self.is_on_steep_slope = false;
        self.ground_distance = f32::INFINITY;
    }
}

/// Read-write view of a motor handed to extension hook subscribers.
pub struct MotorControls<'a> {
    pub state: &'a mut MotorState,
    pub surface: &'a Surface,
    /// Character velocity before integration.
    pub velocity: Vec3,
    pub dt: f32,
}
