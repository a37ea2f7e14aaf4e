use super::{
    settings::DIST_EPS,
    types::{CapsuleSpec, Iso, Vec3},
};

/// A world-space capsule: two sphere centers and a radius.
///
/// Built once per step from the character's collision shape and pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub lower: Vec3,
    pub upper: Vec3,
    pub radius: f32,
}

/// Nearest point on a capsule surface to some query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub point: Vec3,
    /// Outward normal. Zero when the query point lies on the core segment.
    pub normal: Vec3,
    /// Signed distance from the surface (negative inside).
    pub distance: f32,
}

impl Capsule {
    #[inline]
    pub fn new(lower: Vec3, upper: Vec3, radius: f32) -> Self {
        Self {
            lower,
            upper,
            radius,
        }
    }

    /// Capsule for a Y-aligned shape spec placed at `pose`.
    pub fn from_spec(spec: CapsuleSpec, pose: &Iso) -> Self {
        let half = Vec3::new(0.0, spec.half_height.max(0.0), 0.0);
        Self {
            lower: pose.transform_point(&(-half).into()).coords,
            upper: pose.transform_point(&half.into()).coords,
            radius: spec.radius,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.lower + self.upper) * 0.5
    }

    /// Moves both sphere centers so the capsule is centered at `center`.
    pub fn set_center(&mut self, center: Vec3) {
        let offset = center - self.center();
        self.lower += offset;
        self.upper += offset;
    }

    /// Tip-to-tip length.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.upper - self.lower).norm() + self.radius * 2.0
    }

    #[inline]
    pub fn with_radius(&self, radius: f32) -> Self {
        Self { radius, ..*self }
    }

    /// Sphere center with the larger height.
    #[inline]
    pub fn upper_center(&self) -> Vec3 {
        if self.upper.y > self.lower.y {
            self.upper
        } else {
            self.lower
        }
    }

    /// Sphere center with the smaller height.
    #[inline]
    pub fn lower_center(&self) -> Vec3 {
        if self.upper.y > self.lower.y {
            self.lower
        } else {
            self.upper
        }
    }

    #[inline]
    pub fn upper_tip(&self) -> Vec3 {
        self.upper_center() + Vec3::y() * self.radius
    }

    #[inline]
    pub fn lower_tip(&self) -> Vec3 {
        self.lower_center() - Vec3::y() * self.radius
    }

    /// Fraction along the core segment of the projection of `point`, clamped to [0, 1].
    fn segment_fraction(&self, point: Vec3) -> f32 {
        let segment = self.upper - self.lower;
        let len_sq = segment.norm_squared();
        if len_sq <= DIST_EPS * DIST_EPS {
            return 0.0;
        }
        (segment.dot(&(point - self.lower)) / len_sq).clamp(0.0, 1.0)
    }

    /// Strict containment: distance to the core segment is below the radius.
    pub fn contains(&self, point: Vec3) -> bool {
        let on_segment = self.lower + (self.upper - self.lower) * self.segment_fraction(point);
        (point - on_segment).norm_squared() < self.radius * self.radius
    }

    pub fn surface_point(&self, point: Vec3) -> SurfacePoint {
        let on_segment = self.lower + (self.upper - self.lower) * self.segment_fraction(point);
        let offset = point - on_segment;
        let dist = offset.norm();
        let normal = if dist > 0.0 { offset / dist } else { Vec3::zeros() };
        SurfacePoint {
            point: on_segment + normal * self.radius,
            normal,
            distance: dist - self.radius,
        }
    }
}
