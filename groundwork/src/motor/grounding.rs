//! Grounding classification: which surface the character stands on, and how.

use super::{CharacterBody, CharacterMotor, config::MotorConfig};
use crate::{
    collision::{
        capsule::Capsule,
        cast::{CastFilter, ray_cast, sphere_cast},
        query::SceneQuery,
        settings::MIN_FLATNESS,
        sphere::Sphere,
        types::{CastHit, ContactSample, Vec3},
    },
    utils::{horizontal, move_towards, slope_degrees},
};

/// The usable ground contact furthest along the horizontal goal direction.
///
/// Without a goal the lowest contact wins. Ties keep the first contact.
pub fn forward_ground_contact<'a>(
    contacts: &'a [ContactSample],
    origin: Vec3,
    goal: Vec3,
    config: &MotorConfig,
) -> Option<&'a ContactSample> {
    let tuning = &config.tuning;
    let forward = if goal == Vec3::zeros() {
        -Vec3::y()
    } else {
        horizontal(goal)
    };

    let mut best: Option<(&ContactSample, f32)> = None;
    for contact in contacts {
        if contact.separation > tuning.tolerance {
            continue;
        }
        let slope = slope_degrees(contact.normal_towards(origin));
        if slope > tuning.max_contact_slope_degrees || slope > config.steep_slope_threshold_degrees
        {
            continue;
        }
        if !contact.layers.intersects(&config.layer_mask)
            || config.ignored_colliders.contains(&contact.collider)
        {
            continue;
        }
        let dot = forward.dot(&contact.point);
        if best.is_none_or(|(_, d)| dot > d) {
            best = Some((contact, dot));
        }
    }
    best.map(|(c, _)| c)
}

/// Highest a ground point may sit above the lower tip while the center is at most
/// `overhang` past the ledge.
#[inline]
pub fn ledge_max_height(radius: f32, overhang: f32) -> f32 {
    radius - (radius * radius - overhang * overhang).max(0.0).sqrt()
}

/// How far below the lower center a steep-threshold slope could still hold the feet.
#[inline]
pub fn feet_cast_distance(
    radius: f32,
    overhang: f32,
    threshold_degrees: f32,
    tolerance: f32,
) -> f32 {
    let flatness = threshold_degrees.to_radians().cos().max(MIN_FLATNESS);
    (radius - overhang) / flatness + tolerance
}

/// Ledge check: can the feet reach the ground rather than hang over its edge?
pub fn feet_can_touch<W: SceneQuery + ?Sized>(
    world: &W,
    capsule: &Capsule,
    ground_point: Vec3,
    config: &MotorConfig,
    hits: &mut Vec<CastHit>,
) -> bool {
    let radius = capsule.radius;
    let overhang = config.overhang_tolerance;
    let height = ground_point.y - capsule.lower_tip().y;
    if height <= ledge_max_height(radius, overhang) {
        return true;
    }

    let distance = feet_cast_distance(
        radius,
        overhang,
        config.steep_slope_threshold_degrees,
        config.tuning.tolerance,
    );
    if distance > capsule.length() * 5.0 {
        return true;
    }

    let filter = CastFilter {
        mask: config.layer_mask,
        ignored: &config.ignored_colliders,
    };
    let down = -Vec3::y_axis();
    let origin = capsule.lower_center();
    if overhang > 0.0 {
        let feet = Sphere::new(origin, overhang);
        sphere_cast(world, &feet, &down, distance, filter, hits).is_some()
    } else {
        ray_cast(world, origin, &down, distance, filter, hits).is_some()
    }
}

/// Corner check: do contact normals below the lower center enclose the body horizontally?
///
/// Needs at least two usable contacts and no horizontal gap of 181 degrees or more.
pub fn is_surrounded(
    contacts: &[ContactSample],
    lower_center: Vec3,
    tolerance: f32,
    azimuths: &mut Vec<f32>,
) -> bool {
    azimuths.clear();
    for contact in contacts {
        if contact.point.y > lower_center.y {
            continue;
        }
        let n = contact.normal_towards(lower_center);
        if n.x.abs() < tolerance && n.z.abs() < tolerance {
            continue;
        }
        let mut degrees = (-n.z).atan2(-n.x).to_degrees();
        if degrees < 0.0 {
            degrees += 360.0;
        }
        azimuths.push(degrees);
    }
    if azimuths.len() <= 1 {
        return false;
    }
    azimuths.sort_by(f32::total_cmp);

    let mut max_gap = 0.0_f32;
    for (i, &a) in azimuths.iter().enumerate() {
        let next = match azimuths.get(i + 1) {
            Some(&b) => b,
            None => azimuths[0] + 360.0,
        };
        max_gap = max_gap.max(next - a);
    }
    max_gap < 181.0
}

impl CharacterMotor {
    /// Instantaneous free-fall verdict for this step.
    ///
    /// A free-fall collaborator decides when present. Otherwise a body without gravity
    /// always counts as falling, so it cannot stay grounded.
    pub fn is_free_falling<W: SceneQuery + ?Sized>(&self, body: &CharacterBody, world: &W) -> bool {
        if let Some(free_fall) = &self.free_fall {
            return free_fall.is_free_falling();
        }
        if !body.uses_gravity {
            return true;
        }
        let gravity = world.gravity().y;
        if gravity == 0.0 {
            return false;
        }
        let sign = gravity.signum();
        self.state.acceleration.y * sign
            > gravity * sign * self.config.tuning.gravity_percent_threshold
    }

    pub(super) fn update_grounding<W: SceneQuery + ?Sized>(
        &mut self,
        body: &CharacterBody,
        world: &W,
        current: Capsule,
        dt: f32,
    ) {
        let capsule = self.contacts.capsule().unwrap_or(current);
        let tolerance = self.config.tuning.tolerance;
        let lower_center = capsule.lower_center();
        let defaults = self.config.tuning.default_friction();
        let was_grounded = self.state.is_grounded;

        let contact = forward_ground_contact(
            self.contacts.contacts(),
            lower_center,
            self.state.local_velocity_goal,
            &self.config,
        )
        .copied();

        match contact {
            Some(c) => {
                self.state.ground_distance = 0.0;
                let normal = c.normal_towards(lower_center);
                self.surface
                    .update(c.point, normal, c.collider, world, dt, defaults);
            }
            None => {
                let shrunk = Sphere::new(lower_center, (capsule.radius - tolerance).max(0.0));
                let filter = CastFilter {
                    mask: self.config.layer_mask,
                    ignored: &self.config.ignored_colliders,
                };
                let down = -Vec3::y_axis();
                match sphere_cast(world, &shrunk, &down, f32::INFINITY, filter, &mut self.hits) {
                    Some(hit) => {
                        self.state.ground_distance = hit.distance - tolerance;
                        self.surface
                            .update(hit.point, hit.normal, hit.collider, world, dt, defaults);
                    }
                    None => {
                        self.state.ground_distance = f32::INFINITY;
                        self.surface.clear();
                    }
                }
            }
        }

        self.feet_can_touch = self.state.ground_distance.is_finite()
            && feet_can_touch(
                world,
                &capsule,
                self.surface.point(),
                &self.config,
                &mut self.hits,
            );
        self.surrounded = is_surrounded(
            self.contacts.contacts(),
            lower_center,
            tolerance,
            &mut self.azimuths,
        );

        let falling = self.is_free_falling(body, world);
        self.free_fall_value = move_towards(
            self.free_fall_value,
            if falling { 1.0 } else { 0.0 },
            self.config.tuning.free_fall_rate * dt,
        );
        let continually_falling = self.free_fall_value > self.config.tuning.free_fall_saturation;

        let threshold = self.config.steep_slope_threshold_degrees;
        let slope = self.surface.slope_degrees();
        let near_ground = self.state.ground_distance <= self.config.padding
            && (self.feet_can_touch || slope > threshold);
        self.state.is_grounded = !continually_falling && (near_ground || self.surrounded);

        let raw_steep = slope > threshold || !self.feet_can_touch;
        let steep_goal = if self.state.is_grounded && !self.surrounded && raw_steep {
            1.0
        } else {
            0.0
        };
        self.steep_slope_value = move_towards(
            self.steep_slope_value,
            steep_goal,
            self.config.tuning.steep_slope_rate * dt,
        );

        let was_steep = self.state.is_on_steep_slope;
        if self.steep_slope_value >= 1.0 - tolerance {
            self.state.is_on_steep_slope = true;
        } else if self.steep_slope_value <= 0.0 {
            self.state.is_on_steep_slope = false;
        }

        if was_grounded != self.state.is_grounded {
            log::trace!(
                "step {}: grounded {} -> {} (distance {:.3}, slope {:.1})",
                self.step,
                was_grounded,
                self.state.is_grounded,
                self.state.ground_distance,
                slope
            );
        }
        if was_steep != self.state.is_on_steep_slope {
            log::trace!(
                "step {}: steep slope {} -> {}",
                self.step,
                was_steep,
                self.state.is_on_steep_slope
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::types::ColliderId,
        layers::{Layer, LayerMask},
        testing::PlaneWorld,
    };

    fn contact(point: Vec3, normal: Vec3) -> ContactSample {
        ContactSample {
            point,
            normal,
            separation: 0.0,
            collider: ColliderId(1),
            layers: LayerMask::from_layers(&[Layer(0)]),
        }
    }

    fn horizontal_normal(degrees: f32) -> Vec3 {
        let r = degrees.to_radians();
        Vec3::new(r.cos(), 0.0, r.sin())
    }

    #[test]
    fn forward_contact_prefers_goal_direction() {
        let cfg = MotorConfig::default();
        let origin = Vec3::new(0.0, 0.5, 0.0);
        let contacts = [
            contact(Vec3::new(-0.2, 0.0, 0.0), Vec3::y()),
            contact(Vec3::new(0.2, 0.0, 0.0), Vec3::y()),
        ];
        let goal = Vec3::new(3.0, 1.0, 0.0);
        let picked = forward_ground_contact(&contacts, origin, goal, &cfg);
        assert_eq!(picked.map(|c| c.point.x), Some(0.2));

        let goal = Vec3::new(-3.0, 0.0, 0.0);
        let picked = forward_ground_contact(&contacts, origin, goal, &cfg);
        assert_eq!(picked.map(|c| c.point.x), Some(-0.2));
    }

    #[test]
    fn forward_contact_defaults_to_lowest() {
        let cfg = MotorConfig::default();
        let origin = Vec3::new(0.0, 0.5, 0.0);
        let contacts = [
            contact(Vec3::new(0.0, 0.1, 0.0), Vec3::y()),
            contact(Vec3::new(0.0, -0.1, 0.0), Vec3::y()),
        ];
        let picked = forward_ground_contact(&contacts, origin, Vec3::zeros(), &cfg);
        assert_eq!(picked.map(|c| c.point.y), Some(-0.1));
    }

    #[test]
    fn forward_contact_filters() {
        let mut cfg = MotorConfig {
            layer_mask: LayerMask::from_layers(&[Layer(0)]),
            ..MotorConfig::default()
        };
        let origin = Vec3::new(0.0, 0.5, 0.0);

        let mut separated = contact(Vec3::zeros(), Vec3::y());
        separated.separation = 0.05;
        let wall = contact(Vec3::new(0.5, 0.5, 0.0), -Vec3::x());
        let steep = contact(Vec3::zeros(), Vec3::new(1.0, 0.5, 0.0));
        let mut other_layer = contact(Vec3::zeros(), Vec3::y());
        other_layer.layers = LayerMask::from_layers(&[Layer(4)]);
        let mut ignored = contact(Vec3::zeros(), Vec3::y());
        ignored.collider = ColliderId(9);
        cfg.ignored_colliders.insert(ColliderId(9));

        let contacts = [separated, wall, steep, other_layer, ignored];
        assert!(forward_ground_contact(&contacts, origin, Vec3::zeros(), &cfg).is_none());
    }

    #[test]
    fn forward_contact_accepts_flipped_normals() {
        let cfg = MotorConfig::default();
        let origin = Vec3::new(0.0, 0.5, 0.0);
        let contacts = [contact(Vec3::zeros(), -Vec3::y())];
        assert!(forward_ground_contact(&contacts, origin, Vec3::zeros(), &cfg).is_some());
    }

    #[test]
    fn ledge_height_and_cast_distance() {
        assert_eq!(ledge_max_height(0.5, 0.0), 0.0);
        assert!((ledge_max_height(0.5, 0.5) - 0.5).abs() < 1.0e-6);
        let expected = 0.5 - (0.25_f32 - 0.0225).sqrt();
        assert!((ledge_max_height(0.5, 0.15) - expected).abs() < 1.0e-6);

        let d = feet_cast_distance(0.5, 0.15, 56.0, 0.01);
        assert!((d - (0.35 / 56.0_f32.to_radians().cos() + 0.01)).abs() < 1.0e-5);
        // A vertical threshold is bounded by the flatness floor.
        assert!(feet_cast_distance(0.5, 0.0, 90.0, 0.01) > 100.0);
    }

    #[test]
    fn ledge_check_without_overhang() {
        // Floor exists only for x <= 0.
        let world = PlaneWorld::ledge();
        let cfg = MotorConfig {
            overhang_tolerance: 0.0,
            ..MotorConfig::default()
        };
        let mut hits = Vec::new();

        // Past the edge: nothing below the lower center.
        let over = Capsule::new(Vec3::new(0.3, 0.5, 0.0), Vec3::new(0.3, 1.5, 0.0), 0.5);
        let tip_y = over.lower_tip().y;
        let at = |dy: f32| Vec3::new(0.0, tip_y + dy, 0.0);
        assert!(feet_can_touch(&world, &over, at(0.0), &cfg, &mut hits));
        assert!(feet_can_touch(&world, &over, at(-0.05), &cfg, &mut hits));
        assert!(!feet_can_touch(&world, &over, at(0.05), &cfg, &mut hits));

        // Same raised ground point, but with floor under the center the ray reaches it.
        let inside = Capsule::new(Vec3::new(-0.3, 0.5, 0.0), Vec3::new(-0.3, 1.5, 0.0), 0.5);
        let raised = Vec3::new(0.0, 0.05, 0.0);
        assert!(feet_can_touch(&world, &inside, raised, &cfg, &mut hits));
    }

    #[test]
    fn surrounded_by_three_spread_normals() {
        let center = Vec3::new(0.0, 0.5, 0.0);
        let contacts: Vec<_> = [0.0, 120.0, 240.0]
            .into_iter()
            .map(|deg| contact(Vec3::new(0.0, 0.2, 0.0), horizontal_normal(deg)))
            .collect();
        let mut scratch = Vec::new();
        assert!(is_surrounded(&contacts, center, 0.01, &mut scratch));
    }

    #[test]
    fn not_surrounded_when_normals_agree() {
        let center = Vec3::new(0.0, 0.5, 0.0);
        let n = horizontal_normal(30.0);
        let contacts = [
            contact(Vec3::new(0.0, 0.2, 0.0), n),
            contact(Vec3::new(0.0, 0.1, 0.0), n),
        ];
        let mut scratch = Vec::new();
        assert!(!is_surrounded(&contacts, center, 0.01, &mut scratch));
    }

    #[test]
    fn surround_ignores_high_and_vertical_contacts() {
        let center = Vec3::new(0.0, 0.5, 0.0);
        let contacts = [
            contact(Vec3::new(0.0, 0.2, 0.0), horizontal_normal(0.0)),
            // Above the lower center.
            contact(Vec3::new(0.0, 0.8, 0.0), horizontal_normal(120.0)),
            // Flat ground has no azimuth.
            contact(Vec3::new(0.0, 0.0, 0.0), Vec3::y()),
            contact(Vec3::new(0.0, 0.2, 0.0), horizontal_normal(240.0)),
        ];
        let mut scratch = Vec::new();
        // 0 and 240 leave a 240 degree gap.
        assert!(!is_surrounded(&contacts, center, 0.01, &mut scratch));
    }

    #[test]
    fn two_opposed_normals_just_enclose() {
        let center = Vec3::new(0.0, 0.5, 0.0);
        let contacts = [
            contact(Vec3::new(0.0, 0.2, 0.0), horizontal_normal(0.0)),
            contact(Vec3::new(0.0, 0.2, 0.0), horizontal_normal(180.0)),
        ];
        let mut scratch = Vec::new();
        assert!(is_surrounded(&contacts, center, 0.01, &mut scratch));
    }

    #[test]
    fn flipped_normals_on_one_slope_do_not_enclose() {
        let center = Vec3::new(0.0, 0.5, 0.0);
        let a = 70.0_f32.to_radians();
        let n = Vec3::new(a.sin(), a.cos(), 0.0);
        let touch = center - n * 0.5;
        let contacts = [contact(touch, n), contact(touch + Vec3::z() * 0.1, -n)];
        let mut scratch = Vec::new();
        assert!(!is_surrounded(&contacts, center, 0.01, &mut scratch));
    }
}
