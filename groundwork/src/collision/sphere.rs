use super::types::Vec3;

/// A sphere in world space, used as a cast shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    #[inline]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn bottom(&self) -> Vec3 {
        Vec3::new(self.center.x, self.center.y - self.radius, self.center.z)
    }

    #[inline]
    pub fn top(&self) -> Vec3 {
        Vec3::new(self.center.x, self.center.y + self.radius, self.center.z)
    }
}
