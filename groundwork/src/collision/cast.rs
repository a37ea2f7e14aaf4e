//! Filtered shape casts: the nearest hit that is neither an initial-intersection
//! artifact nor on an ignored collider.

use std::collections::HashSet;

use super::{
    capsule::Capsule,
    query::SceneQuery,
    sphere::Sphere,
    types::{CastHit, ColliderId, UnitVec3, Vec3},
};
use crate::layers::LayerMask;

/// Which colliders a cast may report.
#[derive(Clone, Copy, Debug)]
pub struct CastFilter<'a> {
    pub mask: LayerMask,
    pub ignored: &'a HashSet<ColliderId>,
}

/// True for the zero-distance hit reported when a cast starts inside a collider.
#[inline]
pub fn is_initial_intersection(hit: &CastHit, direction: &UnitVec3) -> bool {
    hit.distance == 0.0 && hit.point == Vec3::zeros() && hit.normal == -direction.into_inner()
}

/// Nearest valid hit. Ties keep the earliest hit in `hits`.
pub fn nearest_valid_hit(
    hits: &[CastHit],
    direction: &UnitVec3,
    ignored: &HashSet<ColliderId>,
) -> Option<CastHit> {
    let mut best: Option<CastHit> = None;
    for hit in hits {
        if is_initial_intersection(hit, direction) || ignored.contains(&hit.collider) {
            continue;
        }
        if best.as_ref().is_none_or(|b| hit.distance < b.distance) {
            best = Some(*hit);
        }
    }
    best
}

pub fn ray_cast<W: SceneQuery + ?Sized>(
    world: &W,
    origin: Vec3,
    direction: &UnitVec3,
    max_distance: f32,
    filter: CastFilter<'_>,
    hits: &mut Vec<CastHit>,
) -> Option<CastHit> {
    hits.clear();
    world.cast_ray(origin, direction, max_distance, filter.mask, hits);
    nearest_valid_hit(hits, direction, filter.ignored)
}

pub fn sphere_cast<W: SceneQuery + ?Sized>(
    world: &W,
    sphere: &Sphere,
    direction: &UnitVec3,
    max_distance: f32,
    filter: CastFilter<'_>,
    hits: &mut Vec<CastHit>,
) -> Option<CastHit> {
    hits.clear();
    world.cast_sphere(sphere, direction, max_distance, filter.mask, hits);
    nearest_valid_hit(hits, direction, filter.ignored)
}

pub fn capsule_cast<W: SceneQuery + ?Sized>(
    world: &W,
    capsule: &Capsule,
    direction: &UnitVec3,
    max_distance: f32,
    filter: CastFilter<'_>,
    hits: &mut Vec<CastHit>,
) -> Option<CastHit> {
    hits.clear();
    world.cast_capsule(capsule, direction, max_distance, filter.mask, hits);
    nearest_valid_hit(hits, direction, filter.ignored)
}
