/*!
Character motor: grounding classifier, velocity integrator and static-friction snap.

Per fixed step the host drives three phases in order:

1. `fixed_update`: classify the ground from contacts buffered since the last step
   (or a downward cast), fire the moving hook, then integrate the body velocity.
2. The host engine runs its solver and reports contacts through `record_contacts`.
3. `late_fixed_update`: snap a resting body back onto its anchor.

The motor never steps the simulation itself. It reads the host through
`SceneQuery`, pushes reaction forces through `PhysicsWorld`, and edits the
`CharacterBody` the host hands it.
*/

mod config;
mod grounding;
mod hook;
mod integrator;
mod snap;
mod state;

use std::collections::HashSet;

pub use config::{MotorConfig, Tuning};
pub use grounding::{
    feet_can_touch, feet_cast_distance, forward_ground_contact, is_surrounded, ledge_max_height,
};
pub use hook::{MovingHook, SubscriptionId};
pub(crate) use snap::RestAnchor;
pub use state::{CharacterBody, MotorControls, MotorState};

use crate::{
    collision::{
        capsule::Capsule,
        contacts::ContactBuffer,
        query::PhysicsWorld,
        types::{CastHit, ColliderId, ContactSample, Vec3},
    },
    error::MotorError,
    free_fall::FreeFall,
    surface::Surface,
};

/// What a `fixed_update` call did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// Degenerate time step. Nothing changed.
    Skipped,
    Stepped(StepReport),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub is_grounded: bool,
    pub is_on_steep_slope: bool,
    pub ground_distance: f32,
    /// Force pushed into a dynamic ground body this step.
    pub ground_force: Option<Vec3>,
    /// Drag and gravity bonus from the free-fall collaborator, for the host to apply.
    pub extra_acceleration: Vec3,
}

/// Drives a dynamic capsule body along arbitrary, possibly moving, ground.
#[derive(Debug)]
pub struct CharacterMotor {
    config: MotorConfig,
    state: MotorState,
    surface: Surface,
    hook: MovingHook,
    free_fall: Option<FreeFall>,
    contacts: ContactBuffer,
    enabled: bool,
    step: u64,
    prior_velocity: Vec3,
    free_fall_value: f32,
    steep_slope_value: f32,
    feet_can_touch: bool,
    surrounded: bool,
    ground_force: Vec3,
    rest: Option<RestAnchor>,
    hits: Vec<CastHit>,
    azimuths: Vec<f32>,
}

impl CharacterMotor {
    pub fn new(config: MotorConfig) -> Result<Self, MotorError> {
        if let Err(err) = config.validate() {
            log::error!("character motor rejected its configuration: {err}");
            return Err(err);
        }
        Ok(Self {
            config,
            state: MotorState::default(),
            surface: Surface::default(),
            hook: MovingHook::default(),
            free_fall: None,
            contacts: ContactBuffer::default(),
            enabled: true,
            step: 0,
            prior_velocity: Vec3::zeros(),
            free_fall_value: 0.0,
            steep_slope_value: 0.0,
            feet_can_touch: false,
            surrounded: false,
            ground_force: Vec3::zeros(),
            rest: None,
            hits: Vec::new(),
            azimuths: Vec::new(),
        })
    }

    /// Attaches a free-fall collaborator. Its gravity and verdict replace the motor's own.
    pub fn with_free_fall(mut self, free_fall: FreeFall) -> Self {
        self.free_fall = Some(free_fall);
        self
    }

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn state(&self) -> &MotorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MotorState {
        &mut self.state
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn free_fall(&self) -> Option<&FreeFall> {
        self.free_fall.as_ref()
    }

    pub fn free_fall_mut(&mut self) -> Option<&mut FreeFall> {
        self.free_fall.as_mut()
    }

    pub fn ignored_colliders_mut(&mut self) -> &mut HashSet<ColliderId> {
        &mut self.config.ignored_colliders
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of non-degenerate steps taken.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Smoothed steep-slope flag in [0, 1].
    pub fn steep_slope_value(&self) -> f32 {
        self.steep_slope_value
    }

    /// Smoothed free-fall flag in [0, 1].
    pub fn free_fall_value(&self) -> f32 {
        self.free_fall_value
    }

    pub fn can_feet_touch_ground(&self) -> bool {
        self.feet_can_touch
    }

    pub fn is_surrounded_by_contacts(&self) -> bool {
        self.surrounded
    }

    /// Adds a subscriber to the moving hook, fired after grounding and before integration.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&mut MotorControls<'_>) + 'static,
    ) -> SubscriptionId {
        self.hook.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.hook.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.hook.len()
    }

    /// Disabling ungrounds the character and forgets the ground immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            log::debug!("character motor enabled");
            return;
        }
        self.state.unground();
        self.surface.clear();
        self.steep_slope_value = 0.0;
        self.rest = None;
        log::debug!("character motor disabled");
    }

    /// Buffers contacts reported by the host after its solver ran.
    pub fn record_contacts(
        &mut self,
        body: &CharacterBody,
        samples: impl IntoIterator<Item = ContactSample>,
    ) {
        if !self.enabled {
            return;
        }
        let capsule = body.shape.map(|spec| Capsule::from_spec(spec, &body.pose));
        self.contacts.record(self.step, capsule, samples);
    }

    /// Primary phase: classify the ground, fire the hook, integrate `body.linvel`.
    pub fn fixed_update<W: PhysicsWorld + ?Sized>(
        &mut self,
        body: &mut CharacterBody,
        world: &mut W,
        dt: f32,
    ) -> Result<StepOutcome, MotorError> {
        if !self.enabled {
            return Err(MotorError::Disabled);
        }
        if dt <= 0.0 || !dt.is_finite() {
            return Ok(StepOutcome::Skipped);
        }
        let Some(spec) = body.shape else {
            log::error!("character body has no capsule collision shape, disabling motor");
            self.set_enabled(false);
            return Err(MotorError::MissingCollisionShape);
        };

        self.contacts.clear_stale(self.step);
        self.step += 1;
        self.config.clamp_to_shape(spec.radius);
        let capsule = Capsule::from_spec(spec, &body.pose);

        let gravity = world.gravity();
        let extra_acceleration = match &mut self.free_fall {
            Some(free_fall) => free_fall.fixed_update(body, gravity, dt),
            None => Vec3::zeros(),
        };

        self.state.acceleration = (body.linvel - self.prior_velocity) / dt;
        self.prior_velocity = body.linvel;

        self.update_grounding(body, &*world, capsule, dt);
        self.contacts.clear_contacts();

        self.snap_goal_to_ground();
        let mut controls = MotorControls {
            state: &mut self.state,
            surface: &self.surface,
            velocity: body.linvel,
            dt,
        };
        self.hook.fire(&mut controls);
        self.snap_goal_to_ground();

        let ground_force = self.integrate(body, world, dt);
        self.contacts.clear_capsule();

        Ok(StepOutcome::Stepped(StepReport {
            is_grounded: self.state.is_grounded,
            is_on_steep_slope: self.state.is_on_steep_slope,
            ground_distance: self.state.ground_distance,
            ground_force,
            extra_acceleration,
        }))
    }
}
