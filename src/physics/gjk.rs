//! GJK overlap test on the Minkowski difference of two convex shapes.

use std::ops::Index;

use glam::Vec3;

use super::narrowphase::MinkowskiDifference;
use crate::shape::SupportMap;

const EPSILON: f32 = 1e-10;
/// Relative distance below which the origin counts as lying on a face plane.
const FACE_TOLERANCE: f32 = 1e-5;

/// Up to 4 Minkowski-difference points, newest first. Lives on the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simplex {
    points: [Vec3; 4],
    len: usize,
}

impl Simplex {
    pub const fn new() -> Self {
        Self {
            points: [Vec3::ZERO; 4],
            len: 0,
        }
    }

    /// Insert `point` as the newest vertex. A full simplex drops its oldest.
    #[inline]
    pub fn push(&mut self, point: Vec3) {
        let keep = self.len.min(3);
        for i in (0..keep).rev() {
            self.points[i + 1] = self.points[i];
        }
        self.points[0] = point;
        self.len = keep + 1;
    }

    #[inline]
    fn set(&mut self, points: &[Vec3]) {
        self.points[..points.len()].copy_from_slice(points);
        self.len = points.len();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points[..self.len]
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Simplex {
    type Output = Vec3;

    fn index(&self, index: usize) -> &Vec3 {
        &self.points()[index]
    }
}

/// GJK intersection test.
///
/// Returns the terminal tetrahedron enclosing the origin when the shapes
/// overlap, `None` when they are separated or the iteration cap is hit.
pub fn gjk_intersection<A, B>(
    pair: &MinkowskiDifference<'_, A, B>,
    max_iterations: u32,
) -> Option<Simplex>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut direction = pair.center_offset();
    if direction.length_squared() < EPSILON {
        direction = Vec3::X;
    }

    let mut simplex = Simplex::new();

    let first = pair.support(direction);
    simplex.push(first);
    direction = -first;

    if direction.length_squared() < EPSILON {
        // The origin is the furthest point along the first direction:
        // the shapes touch without penetrating.
        return None;
    }

    let second = pair.support(direction);
    if second.dot(direction) < 0.0 {
        return None;
    }
    simplex.push(second);

    let ab = first - second;
    direction = toward_origin_from_edge(ab, -second);

    for _ in 0..max_iterations {
        let point = pair.support(direction);
        if point.dot(direction) < 0.0 {
            return None;
        }
        simplex.push(point);

        let enclosed = match simplex.len() {
            2 => {
                line_case(&mut simplex, &mut direction);
                false
            }
            3 => {
                triangle_case(&mut simplex, &mut direction);
                false
            }
            _ => tetrahedron_case(&mut simplex, &mut direction),
        };

        if enclosed {
            return Some(simplex);
        }
    }

    None
}

/// Direction perpendicular to `edge`, pointing at the origin. Falls back to any
/// vector orthogonal to the edge when the origin lies on its line.
#[inline]
fn toward_origin_from_edge(edge: Vec3, to_origin: Vec3) -> Vec3 {
    let direction = edge.cross(to_origin).cross(edge);
    if direction.length_squared() > EPSILON {
        return direction;
    }
    let direction = edge.cross(Vec3::X);
    if direction.length_squared() > EPSILON {
        direction
    } else {
        edge.cross(Vec3::Z)
    }
}

fn line_case(simplex: &mut Simplex, direction: &mut Vec3) {
    let a = simplex[0];
    let b = simplex[1];
    let ab = b - a;
    let ao = -a;

    if ab.dot(ao) > 0.0 {
        *direction = toward_origin_from_edge(ab, ao);
    } else {
        simplex.set(&[a]);
        *direction = ao;
    }
}

fn triangle_case(simplex: &mut Simplex, direction: &mut Vec3) {
    let a = simplex[0];
    let b = simplex[1];
    let c = simplex[2];
    let ab = b - a;
    let ac = c - a;
    let ao = -a;
    let abc = ab.cross(ac);

    if abc.length_squared() < EPSILON {
        // Collinear triangle: keep the newest edge.
        simplex.set(&[a, b]);
        line_case(simplex, direction);
        return;
    }

    if abc.cross(ac).dot(ao) > 0.0 {
        if ac.dot(ao) > 0.0 {
            simplex.set(&[a, c]);
            *direction = toward_origin_from_edge(ac, ao);
        } else {
            simplex.set(&[a, b]);
            line_case(simplex, direction);
        }
    } else if ab.cross(abc).dot(ao) > 0.0 {
        simplex.set(&[a, b]);
        line_case(simplex, direction);
    } else if abc.dot(ao) > 0.0 {
        *direction = abc;
    } else {
        simplex.set(&[a, c, b]);
        *direction = -abc;
    }
}

/// Returns true when the tetrahedron encloses the origin, boundary included.
fn tetrahedron_case(simplex: &mut Simplex, direction: &mut Vec3) -> bool {
    let a = simplex[0];
    let b = simplex[1];
    let c = simplex[2];
    let d = simplex[3];
    let ao = -a;
    let scale = a
        .length()
        .max(b.length())
        .max(c.length())
        .max(d.length())
        .max(1.0);

    // Only faces touching the newest point can face the origin; the opposite
    // face was already tested when the triangle was built. An origin on a
    // face plane (an old edge through the origin, as with sphere pairs) is
    // inside: leaving through that face would rebuild the same simplex.
    for (p, q, opposite) in [(b, c, d), (c, d, b), (d, b, c)] {
        let mut normal = (p - a).cross(q - a);
        if normal.dot(opposite - a) > 0.0 {
            normal = -normal;
        }
        if normal.dot(ao) > FACE_TOLERANCE * scale * normal.length() {
            simplex.set(&[a, p, q]);
            *direction = normal;
            return false;
        }
    }

    true
}
