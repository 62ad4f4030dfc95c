//! EPA (Expanding Polytope Algorithm) penetration depth recovery.

use glam::Vec3;

use super::gjk::Simplex;
use super::narrowphase::MinkowskiDifference;
use crate::shape::SupportMap;

/// Face normals shorter than this are degenerate.
const DEGENERATE_NORMAL_SQ: f32 = 1e-12;
/// New faces are flipped only when they sit this far behind the origin.
const WINDING_BIAS: f32 = 1e-6;
/// Support points closer than this to an existing vertex cannot expand the polytope.
const DUPLICATE_VERTEX_SQ: f32 = 1e-12;
/// Upper bound on the up-front vertex reservation.
const MAX_RESERVED_VERTICES: u32 = 256;

/// Minimum translation separating two overlapping shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit normal from shape A toward shape B. Moving A by `-normal * depth`
    /// (or B by `+normal * depth`) separates them.
    pub normal: Vec3,
    /// Penetration depth, `>= 0`.
    pub depth: f32,
}

/// Outcome of an EPA run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpaResult {
    /// The polytope reached the Minkowski boundary within tolerance.
    Converged(Penetration),
    /// Iteration cap hit; the best face found so far. Underestimates depth.
    Unconverged(Penetration),
    /// The closest face had no usable normal. Treat as no contact.
    Degenerate,
}

impl EpaResult {
    /// The penetration if one was produced, regardless of convergence.
    pub fn penetration(&self) -> Option<Penetration> {
        match self {
            EpaResult::Converged(p) | EpaResult::Unconverged(p) => Some(*p),
            EpaResult::Degenerate => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Face {
    indices: [usize; 3],
    normal: Vec3,
    distance: f32,
    valid: bool,
}

impl Face {
    fn new(vertices: &[Vec3], indices: [usize; 3]) -> Self {
        let a = vertices[indices[0]];
        let b = vertices[indices[1]];
        let c = vertices[indices[2]];
        let normal = (b - a).cross(c - a);
        let len_sq = normal.length_squared();
        if len_sq < DEGENERATE_NORMAL_SQ {
            return Self {
                indices,
                normal: Vec3::ZERO,
                distance: 0.0,
                valid: false,
            };
        }
        let normal = normal / len_sq.sqrt();
        Self {
            indices,
            normal,
            distance: normal.dot(a),
            valid: true,
        }
    }

    /// Reverse winding and normal.
    fn flipped(self) -> Self {
        let [a, b, c] = self.indices;
        Self {
            indices: [a, c, b],
            normal: -self.normal,
            distance: -self.distance,
            valid: self.valid,
        }
    }

    fn penetration(&self, depth: f32) -> Penetration {
        Penetration {
            normal: self.normal,
            depth: depth.max(0.0),
        }
    }
}

/// Expand the GJK terminal tetrahedron until its closest face lies on the
/// boundary of the Minkowski difference.
///
/// `simplex` must be a 4-point simplex enclosing the origin, as returned by
/// [`gjk_intersection`](super::gjk::gjk_intersection).
pub fn epa_penetration<A, B>(
    simplex: &Simplex,
    pair: &MinkowskiDifference<'_, A, B>,
    max_iterations: u32,
    tolerance: f32,
) -> EpaResult
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    if simplex.len() < 4 {
        return EpaResult::Degenerate;
    }

    let reserve = 4 + max_iterations.min(MAX_RESERVED_VERTICES) as usize;
    let mut vertices: Vec<Vec3> = Vec::with_capacity(reserve);
    vertices.extend_from_slice(simplex.points());

    // Each face paired with the vertex it must face away from.
    let mut faces: Vec<Face> = [
        ([0, 1, 2], 3),
        ([0, 3, 1], 2),
        ([0, 2, 3], 1),
        ([1, 3, 2], 0),
    ]
    .into_iter()
    .map(|(indices, opposite)| {
        let face = Face::new(&vertices, indices);
        if face.valid && face.normal.dot(vertices[opposite] - vertices[indices[0]]) > 0.0 {
            face.flipped()
        } else {
            face
        }
    })
    .collect();

    let mut edges: Vec<(usize, usize)> = Vec::new();

    for _ in 0..max_iterations {
        let Some(closest) = closest_face(&faces) else {
            return EpaResult::Degenerate;
        };
        if !closest.valid {
            return EpaResult::Degenerate;
        }

        let support = pair.support(closest.normal);
        let improvement = support.dot(closest.normal) - closest.distance;
        let duplicate = vertices
            .iter()
            .any(|v| (*v - support).length_squared() < DUPLICATE_VERTEX_SQ);

        if improvement < tolerance || duplicate {
            return EpaResult::Converged(closest.penetration(closest.distance + tolerance));
        }

        let new_index = vertices.len();
        vertices.push(support);

        edges.clear();
        faces.retain(|face| {
            let a = vertices[face.indices[0]];
            let visible = face.valid && face.normal.dot(support - a) > 0.0;
            if visible {
                let [i, j, k] = face.indices;
                toggle_edge(&mut edges, i, j);
                toggle_edge(&mut edges, j, k);
                toggle_edge(&mut edges, k, i);
            }
            !visible
        });

        for &(i, j) in &edges {
            let face = Face::new(&vertices, [i, j, new_index]);
            let face = if face.valid && face.distance < -WINDING_BIAS {
                face.flipped()
            } else {
                face
            };
            faces.push(face);
        }

        if faces.is_empty() {
            return EpaResult::Degenerate;
        }
    }

    match closest_face(&faces) {
        Some(face) if face.valid => {
            tracing::trace!(
                depth = face.distance,
                "EPA hit the iteration cap before converging"
            );
            EpaResult::Unconverged(face.penetration(face.distance))
        }
        _ => EpaResult::Degenerate,
    }
}

fn closest_face(faces: &[Face]) -> Option<Face> {
    faces
        .iter()
        .copied()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Add an edge to the horizon, or cancel it if a neighbouring removed face
/// already contributed it.
fn toggle_edge(edges: &mut Vec<(usize, usize)>, a: usize, b: usize) {
    if let Some(pos) = edges
        .iter()
        .position(|&(i, j)| (i == b && j == a) || (i == a && j == b))
    {
        edges.swap_remove(pos);
    } else {
        edges.push((a, b));
    }
}
